//! Batch of [`ParsedTrack`] → ordered [`InferredSession`]s.
//!
//! Groups tracks from one event into half-day sessions, reconciling
//! translations that carry no date of their own against the originals they
//! accompany. See the module-level docs for the overall contract.

use std::collections::HashMap;

use super::{InferredSession, ParsedTrack, TimePeriod};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    date: String,
    period: Option<TimePeriod>,
    part: String,
}

fn group_key(track: &ParsedTrack) -> GroupKey {
    GroupKey {
        date: track.date.clone().unwrap_or_else(|| "unknown".to_string()),
        period: track.time_period,
        part: track
            .part_number
            .map(|p| p.to_string())
            .unwrap_or_default(),
    }
}

fn unknown_key() -> GroupKey {
    GroupKey {
        date: "unknown".to_string(),
        period: None,
        part: String::new(),
    }
}

struct Group {
    key: GroupKey,
    tracks: Vec<ParsedTrack>,
}

/// Groups a batch of tracks from one event into chronologically ordered
/// sessions. Pure: never fails, never touches I/O. Tracks that cannot be
/// placed (translations with no date of their own, matching no original by
/// track number) fall into a trailing "unknown" session rather than being
/// dropped.
pub fn infer(tracks: &[ParsedTrack]) -> Vec<InferredSession> {
    let mut keyed: Vec<&ParsedTrack> = Vec::new();
    let mut orphans: Vec<&ParsedTrack> = Vec::new();

    for t in tracks {
        if !t.is_translation || t.date.is_some() {
            keyed.push(t);
        } else {
            orphans.push(t);
        }
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut index_of: HashMap<GroupKey, usize> = HashMap::new();

    for t in keyed {
        let key = group_key(t);
        let idx = *index_of.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key: key.clone(),
                tracks: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].tracks.push(t.clone());
    }

    for orphan in orphans {
        let home = groups.iter().position(|g| {
            g.tracks
                .iter()
                .any(|t| !t.is_translation && t.track_number == orphan.track_number)
        });

        match home {
            Some(idx) => groups[idx].tracks.push(orphan.clone()),
            None => {
                let key = unknown_key();
                let idx = *index_of.entry(key.clone()).or_insert_with(|| {
                    groups.push(Group {
                        key: key.clone(),
                        tracks: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[idx].tracks.push(orphan.clone());
            }
        }
    }

    groups.sort_by(|a, b| {
        a.key
            .date
            .cmp(&b.key.date)
            .then_with(|| TimePeriod::rank(a.key.period).cmp(&TimePeriod::rank(b.key.period)))
            .then_with(|| a.key.part.cmp(&b.key.part))
    });

    groups
        .into_iter()
        .enumerate()
        .map(|(i, mut group)| {
            group
                .tracks
                .sort_by(|a, b| a.track_number.cmp(&b.track_number).then(a.is_translation.cmp(&b.is_translation)));

            let session_number = (i + 1) as u32;
            let representative = group
                .tracks
                .iter()
                .find(|t| !t.is_translation)
                .or_else(|| group.tracks.first())
                .expect("a group is never created without at least one track");

            let title_en = derive_title(representative, session_number);

            InferredSession {
                session_number,
                date: representative.date.clone(),
                time_period: representative.time_period,
                part_number: representative.part_number,
                title_en,
                tracks: group.tracks,
            }
        })
        .collect()
}

fn derive_title(representative: &ParsedTrack, session_number: u32) -> String {
    match (&representative.date, representative.time_period) {
        (Some(date), Some(period)) => {
            let mut title = format!("{date} - {}", period_label(period));
            if let Some(part) = representative.part_number {
                title.push_str(&format!(" (Part {part})"));
            }
            title
        }
        (Some(date), None) => date.clone(),
        (None, _) => format!("Session {session_number}"),
    }
}

fn period_label(period: TimePeriod) -> &'static str {
    match period {
        TimePeriod::Morning => "Morning",
        TimePeriod::Afternoon => "Afternoon",
        TimePeriod::Evening => "Evening",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trackname::parse;

    #[test]
    fn s7_two_sessions_with_translations_reunited_by_track_number() {
        let filenames = [
            "001 JKR - The daily practice-(17 April AM).mp3",
            "001 TRAD - A pratica diaria.mp3",
            "002 JKR - The four thoughts-(17 April AM).mp3",
            "002 TRAD - Os quatro pensamentos.mp3",
            "014 JKR - Question about compassion-(17 April PM).mp3",
            "014 TRAD - Questao sobre compaixao.mp3",
        ];
        let tracks: Vec<ParsedTrack> = filenames.iter().map(|f| parse(f)).collect();
        let sessions = infer(&tracks);

        assert_eq!(sessions.len(), 2);

        assert_eq!(sessions[0].session_number, 1);
        assert_eq!(sessions[0].title_en, "April 17 - Morning");
        let numbers: Vec<u32> = sessions[0].tracks.iter().map(|t| t.track_number).collect();
        assert_eq!(numbers, vec![1, 1, 2, 2]);
        let translations: Vec<bool> = sessions[0].tracks.iter().map(|t| t.is_translation).collect();
        assert_eq!(translations, vec![false, true, false, true]);

        assert_eq!(sessions[1].session_number, 2);
        assert_eq!(sessions[1].title_en, "April 17 - Afternoon");
        let numbers: Vec<u32> = sessions[1].tracks.iter().map(|t| t.track_number).collect();
        assert_eq!(numbers, vec![14, 14]);
    }

    #[test]
    fn session_numbers_are_consecutive_from_one() {
        let filenames = [
            "001 JKR - A-(1 January AM).mp3",
            "002 JKR - B-(1 January PM).mp3",
            "003 JKR - C-(2 January AM).mp3",
        ];
        let tracks: Vec<ParsedTrack> = filenames.iter().map(|f| parse(f)).collect();
        let sessions = infer(&tracks);
        let numbers: Vec<u32> = sessions.iter().map(|s| s.session_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn orphan_translation_with_no_matching_original_falls_to_unknown() {
        let tracks = vec![parse("099 TRAD - Stray translation.mp3")];
        let sessions = infer(&tracks);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].title_en, "Session 1");
        assert_eq!(sessions[0].date, None);
    }

    #[test]
    fn groups_sort_by_date_then_period_then_part() {
        let filenames = [
            "001 JKR - Evening-(1 January EVENING).mp3", // won't match AM/PM pattern, stays unknown
            "002 JKR - Afternoon-(1 January PM).mp3",
            "003 JKR - Morning-(1 January AM).mp3",
        ];
        let tracks: Vec<ParsedTrack> = filenames.iter().map(|f| parse(f)).collect();
        let sessions = infer(&tracks);
        // Morning then afternoon on the same date; the unmatched "EVENING"
        // filename never hits the session-block regex (only AM/PM are
        // recognized tokens), so it has no date and sorts into "unknown"
        // last, titled by session number.
        assert_eq!(sessions[0].title_en, "January 1 - Morning");
        assert_eq!(sessions[1].title_en, "January 1 - Afternoon");
        assert_eq!(sessions[2].title_en, "Session 3");
    }

    #[test]
    fn within_group_originals_precede_translations_at_same_track_number() {
        let filenames = [
            "005 TRAD - Translated.mp3",
            "005 JKR - Original-(1 January AM).mp3",
        ];
        let tracks: Vec<ParsedTrack> = filenames.iter().map(|f| parse(f)).collect();
        let sessions = infer(&tracks);
        assert_eq!(sessions.len(), 1);
        assert!(!sessions[0].tracks[0].is_translation);
        assert!(sessions[0].tracks[1].is_translation);
    }

    #[test]
    fn infer_of_empty_batch_is_empty() {
        assert_eq!(infer(&[]), Vec::new());
    }
}
