// src/analysis/mod.rs
//
// Aggregate statistics over a batch of cleaned records. Scores are stored as
// text; anything that does not parse or falls outside its plausible range is
// left out of the averages.

use crate::gradcafe::models::{ApplicantStatus, Degree, NormalizedRecord, Residency};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

pub const DEFAULT_TERM: &str = "Fall 2026";
pub const DEFAULT_TOP_PROGRAMS: usize = 3;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 100;

const GPA_RANGE: RangeInclusive<f64> = 0.0..=4.0;
const GRE_SECTION_RANGE: RangeInclusive<f64> = 130.0..=170.0;
const GRE_AW_RANGE: RangeInclusive<f64> = 0.0..=6.0;

// Institution and program filters match case-insensitive substrings of
// "University - Program".
const COMPUTER_SCIENCE: &str = "computer science";
const JHU_NAMES: [&str; 2] = ["johns hopkins", "jhu"];
const TARGET_SCHOOLS: [&str; 5] = [
    "georgetown",
    "massachusetts institute of technology",
    "mit",
    "stanford",
    "carnegie mellon",
];
const TARGET_YEAR: &str = "2026";

/// Keeps a requested result count within `MIN_LIMIT..=MAX_LIMIT`.
pub fn clamp_limit(raw: usize) -> usize {
    raw.clamp(MIN_LIMIT, MAX_LIMIT)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreAverages {
    pub gpa: Option<f64>,
    pub gre_total: Option<f64>,
    pub gre_verbal: Option<f64>,
    pub gre_analytical_writing: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramCount {
    pub program: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub term: String,
    pub total_records: usize,
    pub term_count: usize,
    pub international_pct: f64,
    pub averages: ScoreAverages,
    pub american_term_avg_gpa: Option<f64>,
    pub term_acceptance_pct: f64,
    pub accepted_term_avg_gpa: Option<f64>,
    pub top_programs: Vec<ProgramCount>,
    pub status_counts: BTreeMap<String, usize>,
    /// Masters Computer Science applicants at Johns Hopkins.
    pub jhu_masters_cs_count: usize,
    /// 2026 PhD Computer Science acceptances at Georgetown, MIT, Stanford or Carnegie Mellon.
    pub target_phd_cs_acceptances: usize,
    pub jhu_rejections: usize,
}

impl Summary {
    pub fn compute(records: &[NormalizedRecord], term: &str, top_n: usize) -> Self {
        let in_term: Vec<&NormalizedRecord> = records
            .iter()
            .filter(|r| {
                r.start_term
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(term.trim()))
            })
            .collect();

        let international = records
            .iter()
            .filter(|r| r.residency == Some(Residency::International))
            .count();

        let accepted_in_term: Vec<&NormalizedRecord> = in_term
            .iter()
            .copied()
            .filter(|r| r.applicant_status == Some(ApplicantStatus::Accepted))
            .collect();

        let american_in_term = in_term
            .iter()
            .copied()
            .filter(|r| r.residency == Some(Residency::American));

        let averages = ScoreAverages {
            gpa: average(records.iter().map(|r| r.gpa.as_deref()), &GPA_RANGE),
            gre_total: average(records.iter().map(|r| r.gre_total.as_deref()), &GRE_SECTION_RANGE),
            gre_verbal: average(records.iter().map(|r| r.gre_verbal.as_deref()), &GRE_SECTION_RANGE),
            gre_analytical_writing: average(
                records.iter().map(|r| r.gre_analytical_writing.as_deref()),
                &GRE_AW_RANGE,
            ),
        };

        Self {
            term: term.trim().to_string(),
            total_records: records.len(),
            term_count: in_term.len(),
            international_pct: percentage(international, records.len()),
            averages,
            american_term_avg_gpa: average(american_in_term.map(|r| r.gpa.as_deref()), &GPA_RANGE),
            term_acceptance_pct: percentage(accepted_in_term.len(), in_term.len()),
            accepted_term_avg_gpa: average(accepted_in_term.iter().map(|r| r.gpa.as_deref()), &GPA_RANGE),
            top_programs: top_programs(records, clamp_limit(top_n)),
            status_counts: status_counts(records),
            jhu_masters_cs_count: count_matching(records, is_jhu_masters_cs),
            target_phd_cs_acceptances: count_matching(records, is_target_phd_cs_acceptance),
            jhu_rejections: count_matching(records, |r| {
                r.applicant_status == Some(ApplicantStatus::Rejected)
                    && mentions_any(&program_label(r), &JHU_NAMES)
            }),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(100.0 * part as f64 / whole as f64)
}

fn average<'a>(
    values: impl Iterator<Item = Option<&'a str>>,
    range: &RangeInclusive<f64>,
) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|v| range.contains(v))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(round2(sum / count as f64))
    }
}

fn top_programs(records: &[NormalizedRecord], limit: usize) -> Vec<ProgramCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for program in records.iter().filter_map(|r| r.program_name.as_deref()) {
        *counts.entry(program).or_insert(0) += 1;
    }

    let mut ranked: Vec<ProgramCount> = counts
        .into_iter()
        .map(|(program, count)| ProgramCount { program: program.to_string(), count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.program.cmp(&b.program)));
    ranked.truncate(limit);
    ranked
}

fn status_counts(records: &[NormalizedRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for status in records.iter().filter_map(|r| r.applicant_status.as_ref()) {
        *counts.entry(status.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

fn count_matching(records: &[NormalizedRecord], predicate: impl Fn(&NormalizedRecord) -> bool) -> usize {
    records.iter().filter(|r| predicate(r)).count()
}

/// Lowercased "University - Program".
fn program_label(record: &NormalizedRecord) -> String {
    format!(
        "{} - {}",
        record.university.as_deref().unwrap_or_default(),
        record.program_name.as_deref().unwrap_or_default()
    )
    .to_lowercase()
}

fn mentions_any(label: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| label.contains(needle))
}

fn is_jhu_masters_cs(record: &NormalizedRecord) -> bool {
    let label = program_label(record);
    record.degree == Some(Degree::Masters)
        && label.contains(COMPUTER_SCIENCE)
        && mentions_any(&label, &JHU_NAMES)
}

fn is_target_phd_cs_acceptance(record: &NormalizedRecord) -> bool {
    let label = program_label(record);
    record.applicant_status == Some(ApplicantStatus::Accepted)
        && record.degree == Some(Degree::PhD)
        && record.start_term.as_deref().is_some_and(|t| t.contains(TARGET_YEAR))
        && label.contains(COMPUTER_SCIENCE)
        && mentions_any(&label, &TARGET_SCHOOLS)
}
