// src/extractors/listing.rs

// --- Imports ---
use crate::extractors::fields::{self, normalize};
use crate::gradcafe::models::NormalizedRecord;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- Constants ---
// university, program, date added, decision
const MIN_LISTING_CELLS: usize = 4;

// --- CSS Selectors (Lazy Static) ---
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile CELL_SELECTOR")
});

// Comment rows carry the applicant's note in a paragraph
static COMMENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to compile COMMENT_SELECTOR")
});

// --- Data Structures ---

/// Listing-side view of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Everything the listing markup can supply. GRE fields and `source_url`
    /// are left for the assembler.
    pub record: NormalizedRecord,
    /// True while any GRE field is still unset.
    pub needs_detail: bool,
}

impl ListingRow {
    fn new(record: NormalizedRecord) -> Self {
        let needs_detail = record.gre_total.is_none()
            || record.gre_verbal.is_none()
            || record.gre_analytical_writing.is_none();
        Self { record, needs_detail }
    }
}

/// Parser for the listing row plus its trailing tag/comment rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListingRowParser;

impl ListingRowParser {
    pub fn new() -> Self { Self }

    /// Parses one listing fragment.
    ///
    /// Returns `None` when the first row is missing or has fewer than four
    /// cells. Those are ad rows or broken markup and are dropped quietly.
    pub fn parse(&self, html_fragment: &str) -> Option<ListingRow> {
        if html_fragment.trim().is_empty() {
            return None;
        }

        let document = parse_listing_fragment(html_fragment);

        // Only the first row decides; later rows are tags and comments.
        let first_row = document.select(&ROW_SELECTOR).next()?;
        let cells: Vec<ElementRef> = first_row.select(&CELL_SELECTOR).collect();
        if cells.len() < MIN_LISTING_CELLS {
            return None;
        }

        let university = element_text(cells[0]);
        let program_text = element_text(cells[1]).unwrap_or_default();
        let (program_name, degree) = fields::parse_program_and_degree(&program_text);
        let date_added = element_text(cells[2]);
        let decision = fields::parse_decision(element_text(cells[3]).as_deref());

        let comments = document
            .select(&COMMENT_SELECTOR)
            .next()
            .and_then(element_text);

        // Term, residency and GPA live in the tag row, so scan everything.
        let full_text = element_text(document.root_element()).unwrap_or_default();

        let record = NormalizedRecord {
            program_name,
            university,
            degree,
            date_added,
            applicant_status: decision.status,
            acceptance_date: decision.acceptance_date,
            rejection_date: decision.rejection_date,
            start_term: fields::extract_start_term(&full_text),
            residency: fields::extract_residency(&full_text),
            gpa: fields::extract_gpa(&full_text),
            comments,
            ..NormalizedRecord::default()
        };

        Some(ListingRow::new(record))
    }
}

/// Parses listing markup. Bare `<tr>` rows are wrapped in a `<table>` first,
/// otherwise the HTML parser drops row and cell tags outside table context.
fn parse_listing_fragment(html_fragment: &str) -> Html {
    let lower = html_fragment.to_ascii_lowercase();
    if lower.contains("<tr") && !lower.contains("<table") {
        Html::parse_fragment(&format!("<table>{}</table>", html_fragment))
    } else {
        Html::parse_fragment(html_fragment)
    }
}

/// Text of an element with each text node trimmed and joined by a space,
/// then whitespace normalized.
pub(crate) fn element_text(element: ElementRef) -> Option<String> {
    let joined = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}
