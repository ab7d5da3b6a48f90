//! HTTP clients for the external payout provider.

pub mod balance;
pub mod eligibility;
pub mod tokenizer;
pub mod wire;

pub use balance::FundingBalanceClient;
pub use eligibility::CardMetadataClient;
pub use tokenizer::TokenExchangeClient;
pub use wire::{ServiceEnvelope, decode_envelope};

/// Bounded per-request timeout applied to every provider call.
///
/// The upstream contract defines no timeout policy; this is a hardening
/// deviation so a hung call cannot stall an attempt forever.
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
