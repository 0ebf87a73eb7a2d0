//! Game catalogue, wagers and the bet-flow controller

pub mod catalogue;
pub mod flow;
pub mod payouts;
pub mod types;

pub use catalogue::GameListing;
pub use flow::{BetFlowController, BetOutcome, FlowState};
pub use types::*;
