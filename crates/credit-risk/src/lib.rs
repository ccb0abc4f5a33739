//! Credit-risk batch scoring: CSV intake, rule-based scoring, risk tiers,
//! factor explanations and CSV export.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
