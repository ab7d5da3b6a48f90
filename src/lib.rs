//! Payment-credential tokenization and card payout authorization.
//!
//! Given an opaque encrypted payment credential, the crate exchanges it for
//! a provider token, classifies the recipient card's payout eligibility,
//! checks funding-account balance sufficiency, and produces exactly one
//! accept/reject decision per transaction attempt.

pub mod app;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
