//! Filename → [`ParsedTrack`]. See the module-level docs in `trackname/mod.rs`
//! for the overall contract; this file implements the extraction order from
//! the design spec section by section, in the order the sections are
//! numbered below. Each step only ever writes the fields it's documented to
//! write, and a later step is allowed to overwrite an earlier one — that
//! overwrite (the parenthetical session block overwriting a plain ISO date,
//! in particular) is intentional and must not be "fixed" by reordering.

use std::sync::LazyLock;

use regex::Regex;

use super::months;
use super::{is_non_teacher, ParsedTrack, TimePeriod};

const STRIPPED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg", "mpeg"];

// ── §1 pre-processing ──

fn strip_extension(filename: &str) -> String {
    if let Some(dot) = filename.rfind('.') {
        let ext = &filename[dot + 1..];
        if STRIPPED_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
        {
            return filename[..dot].to_string();
        }
    }
    filename.to_string()
}

// ── §2 leading-number interpretation ──

static LEADING_NUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)[_\s-]").unwrap());
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

fn parse_yyyymmdd(digits: &str) -> Option<String> {
    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    if (1900..=2099).contains(&year) && (1..=12).contains(&month) && (1..=31).contains(&day) {
        Some(format!("{year:04}-{month:02}-{day:02}"))
    } else {
        None
    }
}

fn interpret_leading_number(basename: &str) -> (u32, Option<String>) {
    let Some(caps) = LEADING_NUM_RE.captures(basename) else {
        return (0, None);
    };
    let digits = caps.get(1).unwrap().as_str();

    if digits.len() == 8 {
        if let Some(date) = parse_yyyymmdd(digits) {
            return (0, Some(date));
        }
        return (digits.parse().unwrap_or(0), None);
    }

    if digits.len() == 4 {
        let year: i32 = digits.parse().unwrap_or(0);
        if (1900..=2099).contains(&year) && ISO_DATE_RE.is_match(basename) {
            return (0, None);
        }
    }

    (digits.parse().unwrap_or(0), None)
}

// ── §3 speaker detection ──

static COMBO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\d+[_\s-]+([A-Z]{2,5})[+&]([A-Z]{2,5})(?:\s+-|\s+\[|\s+[A-Z]|\s+[a-z]|-)",
    )
    .unwrap()
});
static SINGLE_SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+[_\s-]+([A-Z]{2,5})(?:\s+-|\s+\[|-)").unwrap());
static FALLBACK_SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[_\s-]+([A-Z]{2,5})\s+").unwrap());

/// Outcome of §3, carried forward so the title-cleanup pass (§8) knows
/// exactly which leading token(s) to strip — including tokens rejected as
/// `NON_TEACHER`, since the raw prefix (e.g. `TRAD+JKR - `) still needs to
/// come off the title even when only one side becomes a `speaker`.
struct SpeakerDetection {
    combo_matched: bool,
    combo_translation: bool,
    speaker: Option<String>,
    speakers: Vec<String>,
    strip_tokens: Vec<String>,
}

fn detect_speakers(basename: &str) -> SpeakerDetection {
    if let Some(caps) = COMBO_RE.captures(basename) {
        let tok1 = caps.get(1).unwrap().as_str().to_ascii_uppercase();
        let tok2 = caps.get(2).unwrap().as_str().to_ascii_uppercase();

        let is_trad = |t: &str| t == "TRAD" || t == "TRA";

        if is_trad(&tok2) || is_trad(&tok1) {
            let speaker_tok = if is_trad(&tok2) { &tok1 } else { &tok2 };
            let mut speakers = Vec::new();
            if !is_non_teacher(speaker_tok) {
                speakers.push(speaker_tok.clone());
            }
            return SpeakerDetection {
                combo_matched: true,
                combo_translation: true,
                speaker: speakers.first().cloned(),
                speakers,
                strip_tokens: vec![tok1, tok2],
            };
        }

        // Two co-teaching speakers.
        let mut speakers = Vec::new();
        if !is_non_teacher(&tok1) {
            speakers.push(tok1.clone());
        }
        if !is_non_teacher(&tok2) {
            speakers.push(tok2.clone());
        }
        return SpeakerDetection {
            combo_matched: true,
            combo_translation: false,
            speaker: speakers.first().cloned(),
            speakers,
            strip_tokens: vec![tok1, tok2],
        };
    }

    if let Some(caps) = SINGLE_SPEAKER_RE.captures(basename) {
        let tok = caps.get(1).unwrap().as_str().to_ascii_uppercase();
        if !is_non_teacher(&tok) {
            return SpeakerDetection {
                combo_matched: false,
                combo_translation: false,
                speaker: Some(tok.clone()),
                speakers: vec![tok.clone()],
                strip_tokens: vec![tok],
            };
        }
    }

    if let Some(caps) = FALLBACK_SPEAKER_RE.captures(basename) {
        let tok = caps.get(1).unwrap().as_str().to_string();
        if !is_non_teacher(&tok) {
            return SpeakerDetection {
                combo_matched: false,
                combo_translation: false,
                speaker: Some(tok.clone()),
                speakers: vec![tok.clone()],
                strip_tokens: vec![tok],
            };
        }
    }

    SpeakerDetection {
        combo_matched: false,
        combo_translation: false,
        speaker: None,
        speakers: Vec::new(),
        strip_tokens: Vec::new(),
    }
}

// ── §4 standalone TRAD detection ──

static TRAD_STANDALONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[\s_])TRAD(?:[\s-]|$)").unwrap());

// ── §5 bracketed language tag ──

static BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[([A-Z]+)(?:\s*-\s*[^\]]+)?\]").unwrap());

fn normalize_bracket_code(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "ENG" | "ING" | "ENGLISH" => "en".to_string(),
        "POR" | "PORT" | "PT" | "PORTUGUÊS" | "PORTUGUESE" => "pt".to_string(),
        "TIB" | "TIBETAN" | "TIBETANO" => "tib".to_string(),
        "FR" | "FRENCH" | "FRANCÊS" => "fr".to_string(),
        _ => code.to_lowercase(),
    }
}

// ── §6 date extraction ──

static COMPACT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{4})(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])(?:\D|$)").unwrap()
});

fn extract_date(basename: &str) -> Option<String> {
    if let Some(m) = ISO_DATE_RE.find(basename) {
        return Some(m.as_str().to_string());
    }
    COMPACT_DATE_RE
        .captures(basename)
        .map(|caps| format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}

// ── §7 session block extraction ──

static SESSION_PAREN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let months = months::months_alternation();
    Regex::new(&format!(
        r"(?i)\((\d{{1,2}})[\s_-]+({months})[\s_-]+(AM|PM)(?:[\s_-]+part[\s_-]*(\d+)[^)]*)?\)"
    ))
    .unwrap()
});
static SESSION_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let months = months::months_alternation();
    Regex::new(&format!(
        r"(?i)[\s-]+(\d{{1,2}})[\s_-]+({months})[\s_-]+(AM|PM)(?:[\s_-]+part[\s_-]*(\d+)\w*)?$"
    ))
    .unwrap()
});

struct SessionBlock {
    date: String,
    period: TimePeriod,
    part: Option<u32>,
}

fn extract_session_block(basename: &str) -> Option<SessionBlock> {
    let caps = SESSION_PAREN_RE
        .captures(basename)
        .or_else(|| SESSION_TAIL_RE.captures(basename))?;

    let day: u32 = caps[1].parse().ok()?;
    let month_en = months::normalize_month(&caps[2])?;
    let period = match caps[3].to_ascii_uppercase().as_str() {
        "AM" => TimePeriod::Morning,
        "PM" => TimePeriod::Afternoon,
        _ => return None,
    };
    let part = caps.get(4).and_then(|m| m.as_str().parse::<u32>().ok());

    Some(SessionBlock {
        date: format!("{month_en} {day}"),
        period,
        part,
    })
}

// ── §8 title cleanup ──

static LEADING_ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[_\s-]+").unwrap());
static LEADING_NUM_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[_\s-]+").unwrap());
static LEADING_TRAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^TRAD(?:\s*-\s*|\s+)").unwrap());
static BRACKET_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[[A-Z]+(?:\s*-\s*[^\]]+)?\]\s*").unwrap());
static ISO_DATE_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d{4}-\d{2}-\d{2}").unwrap());
static COMPACT_DATE_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d{8}(?:\s|$)").unwrap());
static TRAILING_AMPM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[\s-])(?:AM|PM)\s*$").unwrap());
static TRAILING_TRIM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+$").unwrap());

/// Builds the (necessarily dynamic — it embeds the detected token text) regex
/// that strips the leading speaker prefix, e.g. `JKR+TRAD - ` or `KPS `.
fn speaker_strip_pattern(tokens: &[String]) -> Option<Regex> {
    let token_pat = match tokens {
        [single] => regex::escape(single),
        [first, second] => format!("{}[+&]{}", regex::escape(first), regex::escape(second)),
        _ => return None,
    };
    Regex::new(&format!(r"(?i)^{token_pat}(?:\s*-\s*|[\s-]+)")).ok()
}

fn clean_title(basename: &str, detection: &SpeakerDetection) -> String {
    let mut working = basename.to_string();

    working = LEADING_ISO_DATE_RE.replace(&working, "").into_owned();
    working = LEADING_NUM_STRIP_RE.replace(&working, "").into_owned();

    if !detection.speakers.is_empty() {
        if let Some(re) = speaker_strip_pattern(&detection.strip_tokens) {
            working = re.replace(&working, "").into_owned();
        }
    }

    working = LEADING_TRAD_RE.replace(&working, "").into_owned();
    working = BRACKET_STRIP_RE.replace(&working, "").into_owned();
    working = ISO_DATE_STRIP_RE.replace(&working, "").into_owned();
    working = COMPACT_DATE_STRIP_RE.replace(&working, "").into_owned();
    working = SESSION_PAREN_RE.replace(&working, "").into_owned();
    working = SESSION_TAIL_RE.replace(&working, "").into_owned();
    working = TRAILING_AMPM_RE.replace(&working, "").into_owned();
    working = TRAILING_TRIM_RE.replace(&working, "").into_owned();
    working = working.replace('_', " ");

    let trimmed = working.trim();
    if trimmed.is_empty() {
        basename.to_string()
    } else {
        trimmed.to_string()
    }
}

// ── entry point ──

/// Parses one filename into a [`ParsedTrack`]. Total and deterministic:
/// every string produces a well-formed record, and the same input always
/// produces the same output.
pub fn parse(filename: &str) -> ParsedTrack {
    let basename = strip_extension(filename);

    let (track_number, mut date) = interpret_leading_number(&basename);
    let detection = detect_speakers(&basename);

    let mut languages = vec!["en".to_string()];
    let mut original_language = "en".to_string();
    let mut is_translation = false;

    if detection.combo_translation {
        original_language = "en".to_string();
        languages = vec!["en".to_string(), "pt".to_string()];
        is_translation = false;
    } else if !detection.combo_matched && TRAD_STANDALONE_RE.is_match(&basename) {
        is_translation = true;
        original_language = "pt".to_string();
        languages = vec!["pt".to_string()];
    }

    if !detection.combo_translation {
        if let Some(caps) = BRACKET_RE.captures(&basename) {
            let normalized = normalize_bracket_code(&caps[1]);
            if normalized != "tib" {
                is_translation = true;
            }
            languages = vec![normalized.clone()];
            original_language = normalized;
        }
    }

    if date.is_none() {
        date = extract_date(&basename);
    }

    let mut time_period = None;
    let mut part_number = None;
    if let Some(block) = extract_session_block(&basename) {
        date = Some(block.date);
        time_period = Some(block.period);
        part_number = block.part;
    }

    let title = clean_title(&basename, &detection);

    ParsedTrack {
        track_number,
        speaker: detection.speaker.clone(),
        speakers: detection.speakers.clone(),
        title,
        languages,
        original_language,
        is_translation,
        date,
        time_period,
        part_number,
        original_filename: filename.to_string(),
    }
}
