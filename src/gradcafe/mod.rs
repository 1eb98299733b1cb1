// src/gradcafe/mod.rs
pub mod client;
pub mod models;

#[allow(unused_imports)]
pub use client::{DetailFetcher, GradCafeClient};
#[allow(unused_imports)]
pub use models::{ApplicantStatus, Degree, NormalizedRecord, RawEntry, Residency};
