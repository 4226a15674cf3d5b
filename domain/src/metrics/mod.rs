//! Metric and report model
//!
//! The common shapes every metric source normalizes into, and the
//! aggregated report returned to callers. Fetcher-specific payloads live
//! in [`section`]; the status rules that turn a payload into
//! `Ok`/`Degraded` live in [`assess`].

pub mod assess;
pub mod report;
pub mod section;
pub mod series;
pub mod window;
