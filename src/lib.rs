//! GamblePro - client SDK for the GamblePro betting service
//!
//! Session management, bet placement with timed result reveal, wallet
//! flows and account history over the GamblePro HTTP API. The server is
//! authoritative for every outcome and balance; this crate validates
//! input, sequences requests and presents results.

pub mod api;
pub mod common;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod errors;
pub mod games;
pub mod history;
pub mod notify;
pub mod services;
pub mod session;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ClientConfig, ConfigBuilder, ConfigLoader};
pub use errors::{ClientError, ClientResult};
pub use games::{BetFlowController, BetOutcome, FlowState};
pub use services::{ServiceBuilder, ServiceContainer};
pub use session::SessionStore;
