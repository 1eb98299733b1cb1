// src/extractors/fields.rs
//
// Pure text -> field functions. Inputs are expected to be whitespace
// normalized already; nothing here fails, a pattern that does not match
// simply yields `None`.

use crate::gradcafe::models::{ApplicantStatus, Degree, Residency};
use once_cell::sync::Lazy;
use regex::Regex;

// Degree markers that get stripped out of program names ("Ph.D", "PsyD", "Masters", ...)
static DEGREE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:ph\.?d|psy\.?d|masters?)\b\.?")
        .expect("Failed to compile DEGREE_MARKER_RE")
});

// "12 Feb", "3 March" style decision dates
static DECISION_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}\s+[A-Za-z]{3,}\b").expect("Failed to compile DECISION_DATE_RE")
});

static START_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Fall|Spring|Summer|Winter)\s+20\d{2}\b")
        .expect("Failed to compile START_TERM_RE")
});

static GPA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bGPA\s*([0-4]\.\d+)\b").expect("Failed to compile GPA_RE")
});

/// Separator between program name and degree on listing rows.
pub const PROGRAM_DEGREE_SEPARATOR: char = '·';

/// Collapses all whitespace runs to a single space and trims.
/// Returns `None` for text that is empty after collapsing.
pub fn normalize(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Decision badge split into its status and the matching date slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    pub status: Option<ApplicantStatus>,
    pub acceptance_date: Option<String>,
    pub rejection_date: Option<String>,
}

/// Splits "Computer Science · PhD" into the program name and a canonical degree.
///
/// The degree is only read from the text after the separator. Degree markers
/// are stripped from the program name either way.
pub fn parse_program_and_degree(program_text: &str) -> (Option<String>, Option<Degree>) {
    let text = program_text.trim();
    if text.is_empty() {
        return (None, None);
    }

    let (name_part, degree) = match text.split_once(PROGRAM_DEGREE_SEPARATOR) {
        Some((left, right)) => (left.trim(), degree_from_label(right)),
        None => (text, None),
    };

    let stripped = DEGREE_MARKER_RE.replace_all(name_part, " ");
    (normalize(&stripped), degree)
}

/// Maps a free-form degree label to the canonical degree, checking
/// PhD, then PsyD, then Masters.
pub fn degree_from_label(label: &str) -> Option<Degree> {
    // "Ph.D" and "Psy.D" lose their dots so they compare like "phd" / "psyd"
    let compact = label.to_lowercase().replace('.', "");
    if compact.contains("phd") {
        Some(Degree::PhD)
    } else if compact.contains("psyd") {
        Some(Degree::PsyD)
    } else if compact.contains("master") {
        Some(Degree::Masters)
    } else {
        None
    }
}

/// Reads the decision badge, e.g. "Accepted 12 Feb".
pub fn parse_decision(decision_text: Option<&str>) -> Decision {
    let text = match decision_text.and_then(normalize) {
        Some(text) => text,
        None => return Decision::default(),
    };

    let lower = text.to_lowercase();
    let status = if lower.contains("accept") {
        ApplicantStatus::Accepted
    } else if lower.contains("reject") {
        ApplicantStatus::Rejected
    } else if lower.contains("wait") {
        ApplicantStatus::Waitlisted
    } else {
        ApplicantStatus::Other(text.clone())
    };

    let date = DECISION_DATE_RE
        .find(&text)
        .and_then(|m| normalize(m.as_str()));

    let (acceptance_date, rejection_date) = match status {
        ApplicantStatus::Accepted => (date, None),
        ApplicantStatus::Rejected => (None, date),
        _ => (None, None),
    };

    Decision {
        status: Some(status),
        acceptance_date,
        rejection_date,
    }
}

/// First "Fall 2026" style term in the text.
pub fn extract_start_term(text: &str) -> Option<String> {
    START_TERM_RE.find(text).and_then(|m| normalize(m.as_str()))
}

pub fn extract_residency(text: &str) -> Option<Residency> {
    let lower = text.to_lowercase();
    if lower.contains("international") {
        Some(Residency::International)
    } else if lower.contains("american") {
        Some(Residency::American)
    } else {
        None
    }
}

/// GPA digits following a "GPA" tag. The value range is not checked here.
pub fn extract_gpa(text: &str) -> Option<String> {
    GPA_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
