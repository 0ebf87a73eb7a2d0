//! Shared traits and interfaces
//!
//! Collaborators the client talks to but does not own: the HTTP
//! transport, the credential key-value store, the notification surface
//! and the external checkout widget. Each has a production
//! implementation and can be swapped for a fake in tests.

use crate::api::models::{CheckoutRequest, PaymentConfirmation};
use crate::api::ApiRequest;
use crate::errors::ClientResult;
use crate::notify::Notification;
use async_trait::async_trait;

/// Outbound request transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the decoded JSON body.
    ///
    /// Non-2xx responses and transport failures are errors. No retries.
    async fn send(&self, request: ApiRequest) -> ClientResult<serde_json::Value>;
}

/// Persistent credential storage
pub trait TokenStore: Send + Sync {
    /// Currently persisted token, if any
    fn get(&self) -> ClientResult<Option<String>>;

    /// Persist a token, replacing any previous one
    fn set(&self, token: &str) -> ClientResult<()>;

    /// Remove the token. Idempotent.
    fn clear(&self) -> ClientResult<()>;
}

/// User-facing transient notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Third-party payment checkout
#[async_trait]
pub trait CheckoutWidget: Send + Sync {
    /// Present the checkout for an order and wait for its completion
    /// callback.
    async fn open(&self, checkout: CheckoutRequest) -> ClientResult<PaymentConfirmation>;
}
