//! Application layer containing the payout authorization business logic.

pub mod orchestrator;

pub use orchestrator::{NameCheckPolicy, PayoutOrchestrator};
