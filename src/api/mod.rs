//! Betting API access
//!
//! HTTP transport, wire models and error-body handling for the remote
//! betting service.

pub mod client;
pub mod errors;
pub mod models;

pub use client::{ApiClient, ApiRequest, Method};
