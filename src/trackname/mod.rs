//! Filename parser and session inferencer for the teaching archive.
//!
//! Two pure, stateless functions: [`parse`] turns one filename into a
//! [`ParsedTrack`]; [`infer`] groups a batch of `ParsedTrack`s belonging to
//! one event into chronologically ordered [`InferredSession`]s. Neither
//! function does I/O, neither can fail — every input produces a
//! well-formed record. The extraction order inside `parse` is part of the
//! contract: later rules are allowed to overwrite fields earlier rules set,
//! and callers must not reorder them.

pub mod months;
pub mod parser;
pub mod sessions;

use serde::{Deserialize, Serialize};

pub use parser::parse;
pub use sessions::infer;

/// Teacher-code tokens that are never treated as a speaker, even though
/// they match the `[A-Z]{2,5}` shape speaker codes take. Mostly language
/// and role markers (`TRAD`, `ENG`, `PP1`) that show up in the same
/// position a speaker code would.
///
/// Extending this set is a contract change visible to downstream grouping:
/// a token moved out of here starts showing up in `speakers`.
pub const NON_TEACHER: &[&str] = &[
    "TRAD", "PT", "ENG", "TIB", "POR", "FR", "PBD", "SHA", "PP1", "PP2", "PP3", "PP4", "TM1",
    "TM2", "PART", "GRP", "ALUNA", "TSOK", "TRA", "HH",
];

fn is_non_teacher(token: &str) -> bool {
    let upper = token.to_ascii_uppercase();
    NON_TEACHER.contains(&upper.as_str())
}

/// Half-day session slot. Serializes to exactly `morning`/`afternoon`/`evening`
/// — downstream code compares on that exact string, so the wire form is
/// fixed independently of how the variants are spelled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Morning,
    Afternoon,
    Evening,
}

impl TimePeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Morning => "morning",
            TimePeriod::Afternoon => "afternoon",
            TimePeriod::Evening => "evening",
        }
    }

    /// Sort rank used by the session inferencer (`morning=0 .. unknown=3`).
    fn rank(period: Option<TimePeriod>) -> u8 {
        match period {
            Some(TimePeriod::Morning) => 0,
            Some(TimePeriod::Afternoon) => 1,
            Some(TimePeriod::Evening) => 2,
            None => 3,
        }
    }
}

impl std::fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed track, derived from a single filename. See module docs for
/// the extraction order that produces these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTrack {
    pub track_number: u32,
    pub speaker: Option<String>,
    pub speakers: Vec<String>,
    pub title: String,
    pub languages: Vec<String>,
    pub original_language: String,
    pub is_translation: bool,
    pub date: Option<String>,
    pub time_period: Option<TimePeriod>,
    pub part_number: Option<u32>,
    pub original_filename: String,
}

/// A chronologically ordered group of tracks recorded in the same half-day
/// slot, produced by [`infer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredSession {
    pub session_number: u32,
    pub date: Option<String>,
    pub time_period: Option<TimePeriod>,
    pub part_number: Option<u32>,
    pub title_en: String,
    pub tracks: Vec<ParsedTrack>,
}
