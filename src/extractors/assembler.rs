// src/extractors/assembler.rs
use crate::extractors::detail::DetailFields;
use crate::extractors::listing::ListingRow;
use crate::gradcafe::models::NormalizedRecord;

/// Merges listing output with detail-page output.
///
/// The listing degree wins over the detail degree. GRE scores always come
/// from the detail page. `source_url` is the entry's URL as given, whether or
/// not the detail page could be read.
pub fn assemble_record(
    listing: ListingRow,
    detail: DetailFields,
    source_url: Option<&str>,
) -> NormalizedRecord {
    let ListingRow { record, .. } = listing;

    NormalizedRecord {
        degree: record.degree.or(detail.degree),
        gre_total: detail.gre_total,
        gre_verbal: detail.gre_verbal,
        gre_analytical_writing: detail.gre_analytical_writing,
        source_url: source_url.map(str::to_string),
        ..record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::listing::ListingRowParser;
    use crate::gradcafe::models::Degree;

    fn listing(program: &str) -> ListingRow {
        let html = format!(
            "<tr><td>Yale</td><td>{}</td><td>February 2, 2026</td><td>Accepted 1 Feb</td></tr>",
            program
        );
        ListingRowParser::new().parse(&html).expect("row should be accepted")
    }

    fn phd_detail() -> DetailFields {
        DetailFields {
            degree: Some(Degree::PhD),
            gre_total: Some("330".to_string()),
            gre_verbal: Some("165".to_string()),
            gre_analytical_writing: Some("5.0".to_string()),
        }
    }

    #[test]
    fn test_listing_degree_wins() {
        let record = assemble_record(listing("History · Masters"), phd_detail(), Some("https://example.com/r/1"));
        assert_eq!(record.degree, Some(Degree::Masters));
        assert_eq!(record.gre_total.as_deref(), Some("330"));
        assert_eq!(record.gre_verbal.as_deref(), Some("165"));
        assert_eq!(record.gre_analytical_writing.as_deref(), Some("5.0"));
        assert_eq!(record.source_url.as_deref(), Some("https://example.com/r/1"));
    }

    #[test]
    fn test_detail_degree_fills_gap() {
        let record = assemble_record(listing("History"), phd_detail(), None);
        assert_eq!(record.degree, Some(Degree::PhD));
        assert_eq!(record.program_name.as_deref(), Some("History"));
        assert_eq!(record.source_url, None);
    }

    #[test]
    fn test_failed_detail_keeps_listing_fields() {
        let row = listing("History · Masters");
        let expected_listing = row.record.clone();
        let record = assemble_record(row, DetailFields::default(), Some("https://example.com/r/2"));

        assert_eq!(record.university, expected_listing.university);
        assert_eq!(record.applicant_status, expected_listing.applicant_status);
        assert_eq!(record.acceptance_date.as_deref(), Some("1 Feb"));
        assert_eq!(record.degree, Some(Degree::Masters));
        assert_eq!(record.gre_total, None);
        assert_eq!(record.gre_verbal, None);
        assert_eq!(record.gre_analytical_writing, None);
        assert_eq!(record.source_url.as_deref(), Some("https://example.com/r/2"));
    }
}
