// src/extractors/detail.rs

// --- Imports ---
use crate::extractors::fields::normalize;
use crate::extractors::listing::element_text;
use crate::gradcafe::client::DetailFetcher;
use crate::gradcafe::models::Degree;
use crate::utils::error::FetchError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

// --- Constants ---
const DEGREE_TYPE_LABEL: &str = "degree type";
const GRE_TOTAL_LABEL: &str = "gre general";
const GRE_VERBAL_LABEL: &str = "gre verbal";
const GRE_AW_LABEL: &str = "analytical writing";
const SCORE_LABELS: [&str; 3] = [GRE_TOTAL_LABEL, GRE_VERBAL_LABEL, GRE_AW_LABEL];

// How many sibling elements after a label may hold its value
const VALUE_LOOKAHEAD: usize = 3;

// --- CSS Selectors (Lazy Static) ---
static TERM_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("dt").expect("Failed to compile TERM_SELECTOR")
});

static SPAN_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span").expect("Failed to compile SPAN_SELECTOR")
});

// --- Data Structures ---

/// Fields a detail page can contribute to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub degree: Option<Degree>,
    pub gre_total: Option<String>,
    pub gre_verbal: Option<String>,
    pub gre_analytical_writing: Option<String>,
}

/// Outcome of one enrichment. A failed fetch still yields (empty) fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub fields: DetailFields,
    pub fetch_failed: bool,
}

/// Fetches detail pages and reads GRE scores and degree type off them.
pub struct DetailPageEnricher<F> {
    fetcher: F,
}

impl<F: DetailFetcher> DetailPageEnricher<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches and extracts. Never fails: a fetch error yields empty fields
    /// and sets `fetch_failed`. A missing or blank URL is not a failure.
    pub async fn enrich(&self, detail_url: Option<&str>) -> Enrichment {
        match self.try_enrich(detail_url).await {
            Ok(fields) => Enrichment { fields, fetch_failed: false },
            Err(e) => {
                tracing::debug!("Detail page unavailable ({}), continuing without it", e);
                Enrichment { fields: DetailFields::default(), fetch_failed: true }
            }
        }
    }

    async fn try_enrich(&self, detail_url: Option<&str>) -> Result<DetailFields, FetchError> {
        let url = match detail_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => url,
            None => return Ok(DetailFields::default()),
        };

        let body = self.fetcher.fetch_detail(url).await?;
        Ok(extract_detail_fields(&body))
    }
}

/// Extracts degree type and GRE scores from detail page HTML.
pub fn extract_detail_fields(html: &str) -> DetailFields {
    let document = Html::parse_document(html);

    DetailFields {
        degree: extract_degree_type(&document),
        gre_total: extract_score(&document, GRE_TOTAL_LABEL),
        gre_verbal: extract_score(&document, GRE_VERBAL_LABEL),
        gre_analytical_writing: extract_score(&document, GRE_AW_LABEL),
    }
}

/// `<dt>Degree Type</dt><dd>PhD</dd>`. Only PhD and Masters are recognised here.
fn extract_degree_type(document: &Html) -> Option<Degree> {
    let term = document
        .select(&TERM_SELECTOR)
        .find(|dt| own_text(*dt).to_lowercase().contains(DEGREE_TYPE_LABEL))?;

    let value = term
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "dd")
        .and_then(element_text)?
        .to_lowercase();

    if value.contains("phd") {
        Some(Degree::PhD)
    } else if value.contains("master") {
        Some(Degree::Masters)
    } else {
        None
    }
}

/// Finds the label span and reads the value paired with it.
fn extract_score(document: &Html, label: &str) -> Option<String> {
    let label_span = document
        .select(&SPAN_SELECTOR)
        .find(|span| own_text(*span).to_lowercase().contains(label))?;

    paired_value(label_span)
}

/// Value span belonging to a label.
///
/// Looks at the label's next few sibling elements, then at the next few
/// siblings of its parent. The first span found is the value, unless it is
/// itself a score label, in which case the label has no value.
fn paired_value(label: ElementRef) -> Option<String> {
    let scopes = [Some(label), label.parent().and_then(ElementRef::wrap)];

    for anchor in scopes.into_iter().flatten() {
        let siblings = anchor
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take(VALUE_LOOKAHEAD);

        for sibling in siblings {
            let candidate = if sibling.value().name() == "span" {
                Some(sibling)
            } else {
                sibling.select(&SPAN_SELECTOR).next()
            };

            if let Some(span) = candidate {
                return element_text(span).filter(|text| !is_score_label(text));
            }
        }
    }

    None
}

fn is_score_label(text: &str) -> bool {
    let lower = text.to_lowercase();
    SCORE_LABELS.iter().any(|label| lower.contains(label))
}

/// Direct text children, so a wrapper does not match its inner label.
/// An element whose only content is a single child element (`<dt><b>..</b></dt>`)
/// takes that child's text instead.
fn own_text(element: ElementRef) -> String {
    let joined = element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(text) = normalize(&joined) {
        return text;
    }

    let mut children = element.children().filter_map(ElementRef::wrap);
    match (children.next(), children.next()) {
        (Some(only_child), None) => own_text(only_child),
        _ => String::new(),
    }
}
