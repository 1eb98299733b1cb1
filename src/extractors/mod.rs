// src/extractors/mod.rs
pub mod assembler;
pub mod detail;
pub mod fields;
pub mod listing;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use self::{
    assembler::assemble_record,
    detail::{DetailFields, DetailPageEnricher, Enrichment},
    listing::{ListingRow, ListingRowParser},
};
