// src/gradcafe/models.rs
#![allow(dead_code)]
use serde::{Deserialize, Serialize};

/// One scraped listing row as handed over by the listing fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// The listing `<tr>` plus up to two trailing tag/comment rows. Null or
    /// missing when the listing scrape captured nothing for the entry.
    #[serde(default, alias = "combined_html")]
    pub html_fragment: Option<String>,
    /// Absolute URL of the entry's detail page, if the row linked to one.
    #[serde(default, alias = "entry_url")]
    pub detail_url: Option<String>,
}

impl RawEntry {
    pub fn new(html_fragment: impl Into<String>, detail_url: Option<String>) -> Self {
        Self {
            html_fragment: Some(html_fragment.into()),
            detail_url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Degree {
    PhD,
    Masters,
    PsyD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Residency {
    American,
    International,
}

/// Decision badge. Text that names none of the three known outcomes is kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicantStatus {
    Accepted,
    Rejected,
    Waitlisted,
    Other(String),
}

impl ApplicantStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApplicantStatus::Accepted => "Accepted",
            ApplicantStatus::Rejected => "Rejected",
            ApplicantStatus::Waitlisted => "Waitlisted",
            ApplicantStatus::Other(text) => text,
        }
    }
}

impl From<String> for ApplicantStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Accepted" => ApplicantStatus::Accepted,
            "Rejected" => ApplicantStatus::Rejected,
            "Waitlisted" => ApplicantStatus::Waitlisted,
            _ => ApplicantStatus::Other(value),
        }
    }
}

impl From<ApplicantStatus> for String {
    fn from(value: ApplicantStatus) -> Self {
        match value {
            ApplicantStatus::Other(text) => text,
            known => known.as_str().to_string(),
        }
    }
}

/// Fully typed applicant record. Every field is always present in the
/// serialized form; missing values are written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub program_name: Option<String>,
    pub university: Option<String>,
    pub degree: Option<Degree>,
    pub date_added: Option<String>,
    pub applicant_status: Option<ApplicantStatus>,
    pub acceptance_date: Option<String>,
    pub rejection_date: Option<String>,
    pub start_term: Option<String>,
    pub residency: Option<Residency>,
    pub gpa: Option<String>,
    pub gre_total: Option<String>,
    pub gre_verbal: Option<String>,
    pub gre_analytical_writing: Option<String>,
    pub comments: Option<String>,
    pub source_url: Option<String>,
}
