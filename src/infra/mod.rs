//! Infrastructure layer implementations.

pub mod provider;

pub use provider::{CardMetadataClient, FundingBalanceClient, TokenExchangeClient};
