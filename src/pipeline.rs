// src/pipeline.rs
use crate::extractors::{assemble_record, DetailFields, DetailPageEnricher, ListingRowParser};
use crate::gradcafe::client::DetailFetcher;
use crate::gradcafe::models::{NormalizedRecord, RawEntry};
use serde::Serialize;

/// Counters for one cleaning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub detail_attempts: usize,
    pub detail_failures: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CleanedBatch {
    pub records: Vec<NormalizedRecord>,
    pub stats: RunStats,
}

/// Raw listing entries in, normalized records out.
///
/// Entries are handled one at a time in input order. Rejected entries are
/// left out; a failed detail fetch only blanks the GRE fields of its record.
pub struct CleaningPipeline<F> {
    parser: ListingRowParser,
    enricher: Option<DetailPageEnricher<F>>,
}

impl<F: DetailFetcher> CleaningPipeline<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            parser: ListingRowParser::new(),
            enricher: Some(DetailPageEnricher::new(fetcher)),
        }
    }

    /// Listing-only pipeline; detail pages are never requested.
    pub fn without_details() -> Self {
        Self {
            parser: ListingRowParser::new(),
            enricher: None,
        }
    }

    /// Cleans a single entry, updating `stats`. `None` means the entry was filtered.
    pub async fn clean_entry(&self, entry: &RawEntry, stats: &mut RunStats) -> Option<NormalizedRecord> {
        stats.total += 1;

        let parsed = entry
            .html_fragment
            .as_deref()
            .and_then(|html| self.parser.parse(html));

        let listing = match parsed {
            Some(listing) => listing,
            None => {
                stats.rejected += 1;
                return None;
            }
        };

        let detail_url = entry
            .detail_url
            .as_deref()
            .filter(|url| !url.trim().is_empty());

        let detail = match (&self.enricher, detail_url) {
            (Some(enricher), Some(url)) if listing.needs_detail => {
                stats.detail_attempts += 1;
                let enrichment = enricher.enrich(Some(url)).await;
                if enrichment.fetch_failed {
                    stats.detail_failures += 1;
                }
                enrichment.fields
            }
            _ => DetailFields::default(),
        };

        stats.accepted += 1;
        Some(assemble_record(listing, detail, detail_url))
    }

    /// Cleans a batch, preserving input order.
    pub async fn clean_batch(&self, entries: &[RawEntry]) -> CleanedBatch {
        let mut batch = CleanedBatch::default();

        for (index, entry) in entries.iter().enumerate() {
            if let Some(record) = self.clean_entry(entry, &mut batch.stats).await {
                batch.records.push(record);
            }
            if (index + 1) % 100 == 0 {
                tracing::info!("Cleaned {}/{} entries", index + 1, entries.len());
            }
        }

        tracing::info!(
            "Cleaning finished: {} entries, {} records, {} filtered, {} detail fetches ({} failed)",
            batch.stats.total,
            batch.stats.accepted,
            batch.stats.rejected,
            batch.stats.detail_attempts,
            batch.stats.detail_failures
        );

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradcafe::models::{ApplicantStatus, Degree, Residency};
    use crate::utils::error::FetchError;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MIT_FRAGMENT: &str = "<tr><td>MIT</td><td>Computer Science · Masters</td><td>January 1, 2026</td><td>Accepted 12 Feb</td></tr>\
        <tr><td>Fall 2026 International GPA 3.90</td></tr>\
        <tr><td><p>Great profile</p></td></tr>";

    const DETAIL_PAGE: &str = r#"<dl><dt>Degree Type</dt><dd>PhD</dd></dl>
        <ul><li><span>GRE General:</span><span>331</span></li>
        <li><span>GRE Verbal:</span><span>163</span></li>
        <li><span>Analytical Writing:</span><span>5.5</span></li></ul>"#;

    /// Serves the same page for every URL, or fails every request.
    struct FixedFetcher {
        page: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedFetcher {
        fn serving(page: &'static str) -> Self {
            Self { page: Some(page), calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { page: None, calls: AtomicUsize::new(0) }
        }
    }

    impl DetailFetcher for FixedFetcher {
        fn fetch_detail(&self, _url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = match self.page {
                Some(page) => Ok(page.to_string()),
                None => Err(FetchError::Http(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
            };
            std::future::ready(result)
        }
    }

    #[test]
    fn test_end_to_end_without_detail_url() {
        let pipeline = CleaningPipeline::new(FixedFetcher::serving(DETAIL_PAGE));
        let entries = vec![RawEntry::new(MIT_FRAGMENT, None)];
        let batch = tokio_test::block_on(pipeline.clean_batch(&entries));

        let expected = NormalizedRecord {
            program_name: Some("Computer Science".to_string()),
            university: Some("MIT".to_string()),
            degree: Some(Degree::Masters),
            date_added: Some("January 1, 2026".to_string()),
            applicant_status: Some(ApplicantStatus::Accepted),
            acceptance_date: Some("12 Feb".to_string()),
            rejection_date: None,
            start_term: Some("Fall 2026".to_string()),
            residency: Some(Residency::International),
            gpa: Some("3.90".to_string()),
            gre_total: None,
            gre_verbal: None,
            gre_analytical_writing: None,
            comments: Some("Great profile".to_string()),
            source_url: None,
        };

        assert_eq!(batch.records, vec![expected]);
        assert_eq!(batch.stats.detail_attempts, 0);
    }

    #[test]
    fn test_detail_page_fills_scores() {
        let fetcher = FixedFetcher::serving(DETAIL_PAGE);
        let pipeline = CleaningPipeline::new(fetcher);
        let url = "https://www.thegradcafe.com/result/1".to_string();
        let entries = vec![RawEntry::new(MIT_FRAGMENT, Some(url.clone()))];

        let batch = tokio_test::block_on(pipeline.clean_batch(&entries));
        let record = &batch.records[0];

        // Listing says Masters, the detail page's PhD is only a fallback
        assert_eq!(record.degree, Some(Degree::Masters));
        assert_eq!(record.gre_total.as_deref(), Some("331"));
        assert_eq!(record.gre_verbal.as_deref(), Some("163"));
        assert_eq!(record.gre_analytical_writing.as_deref(), Some("5.5"));
        assert_eq!(record.source_url.as_deref(), Some(url.as_str()));
        assert_eq!(batch.stats.detail_attempts, 1);
        assert_eq!(batch.stats.detail_failures, 0);
    }

    #[test]
    fn test_failed_fetch_keeps_record() {
        let pipeline = CleaningPipeline::new(FixedFetcher::failing());
        let url = "https://www.thegradcafe.com/result/2".to_string();
        let entries = vec![RawEntry::new(MIT_FRAGMENT, Some(url.clone()))];

        let batch = tokio_test::block_on(pipeline.clean_batch(&entries));
        assert_eq!(batch.records.len(), 1);

        let record = &batch.records[0];
        assert_eq!(record.university.as_deref(), Some("MIT"));
        assert_eq!(record.gpa.as_deref(), Some("3.90"));
        assert_eq!(record.comments.as_deref(), Some("Great profile"));
        assert_eq!(record.gre_total, None);
        assert_eq!(record.gre_verbal, None);
        assert_eq!(record.gre_analytical_writing, None);
        assert_eq!(record.source_url.as_deref(), Some(url.as_str()));
        assert_eq!(batch.stats.detail_failures, 1);
    }

    #[test]
    fn test_order_kept_and_bad_rows_dropped() {
        let fetcher = FixedFetcher::serving(DETAIL_PAGE);
        let pipeline = CleaningPipeline::new(fetcher);
        let entries = vec![
            RawEntry::new("<tr><td>A</td><td>Math · PhD</td><td>x</td><td>Rejected 3 Mar</td></tr>", None),
            RawEntry::new("<tr><td>ad</td><td>ad</td><td>ad</td></tr>", Some("https://example.com/ad".to_string())),
            RawEntry::new("", None),
            RawEntry::new("<tr><td>B</td><td>Art · Masters</td><td>y</td><td>Wait listed</td></tr>", None),
        ];

        let batch = tokio_test::block_on(pipeline.clean_batch(&entries));
        let universities: Vec<_> = batch.records.iter().map(|r| r.university.as_deref()).collect();
        assert_eq!(universities, vec![Some("A"), Some("B")]);
        assert_eq!(batch.stats.total, 4);
        assert_eq!(batch.stats.accepted, 2);
        assert_eq!(batch.stats.rejected, 2);
        // Filtered rows never trigger a detail fetch
        assert_eq!(pipeline.enricher_calls(), 0);

        for record in &batch.records {
            assert!(record.acceptance_date.is_none() || record.rejection_date.is_none());
        }
    }

    #[test]
    fn test_missing_fragment_is_filtered() {
        let pipeline = CleaningPipeline::new(FixedFetcher::serving(DETAIL_PAGE));
        let entries = vec![
            RawEntry::new(MIT_FRAGMENT, None),
            RawEntry { html_fragment: None, detail_url: Some("x".to_string()) },
            RawEntry::new("<tr><td>B</td><td>Art · Masters</td><td>y</td><td>Rejected 4 Apr</td></tr>", None),
        ];

        let batch = tokio_test::block_on(pipeline.clean_batch(&entries));
        let universities: Vec<_> = batch.records.iter().map(|r| r.university.as_deref()).collect();
        assert_eq!(universities, vec![Some("MIT"), Some("B")]);
        assert_eq!(batch.stats.rejected, 1);
        assert_eq!(pipeline.enricher_calls(), 0);
    }

    #[test]
    fn test_blank_detail_url_is_not_kept() {
        let pipeline = CleaningPipeline::new(FixedFetcher::serving(DETAIL_PAGE));
        let entries = vec![
            RawEntry::new(MIT_FRAGMENT, Some(String::new())),
            RawEntry::new(MIT_FRAGMENT, Some("   ".to_string())),
        ];

        let batch = tokio_test::block_on(pipeline.clean_batch(&entries));
        assert_eq!(batch.records.len(), 2);
        assert!(batch.records.iter().all(|r| r.source_url.is_none()));
        assert_eq!(batch.stats.detail_attempts, 0);
    }

    #[test]
    fn test_without_details_never_fetches() {
        let pipeline = CleaningPipeline::<FixedFetcher>::without_details();
        let entries = vec![RawEntry::new(MIT_FRAGMENT, Some("https://example.com/r/3".to_string()))];
        let batch = tokio_test::block_on(pipeline.clean_batch(&entries));

        assert_eq!(batch.records[0].gre_total, None);
        assert_eq!(batch.records[0].source_url.as_deref(), Some("https://example.com/r/3"));
        assert_eq!(batch.stats.detail_attempts, 0);
    }

    impl CleaningPipeline<FixedFetcher> {
        fn enricher_calls(&self) -> usize {
            self.enricher
                .as_ref()
                .map(|e| e.fetcher().calls.load(Ordering::SeqCst))
                .unwrap_or(0)
        }
    }
}
