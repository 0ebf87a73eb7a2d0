//! User-facing notices
//!
//! Every flow (bets, deposits, withdrawals, session) reports through the
//! same [`Notifier`] contract.

use crate::common::traits::Notifier;
use crate::common::types::format_inr;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// A transient notice (title plus description)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, description)
    }

    pub fn bet_won(payout: f64) -> Self {
        Self::success("You won!", format!("You've won {}!", format_inr(payout)))
    }

    pub fn bet_lost(slots: bool) -> Self {
        if slots {
            Self::error("No win this time", "Try again for a chance to win!")
        } else {
            Self::error("You lost", "Better luck next time!")
        }
    }

    pub fn auth_required() -> Self {
        Self::error("Authentication required", "Please login to place bets")
    }

    pub fn wallet_auth_required() -> Self {
        Self::error("Authentication required", "Please login to access your wallet")
    }

    pub fn insufficient_balance() -> Self {
        Self::error("Insufficient balance", "Please deposit funds to continue playing")
    }
}

/// Writes notices to the log; the CLI default
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                error!(title = %notification.title, "{}", notification.description)
            }
            _ => info!(title = %notification.title, "{}", notification.description),
        }
    }
}

/// Forwards notices to a receiver owned by a view
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Receiver gone means the view was closed
        let _ = self.sender.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_notices() {
        let won = Notification::bet_won(195.0);
        assert_eq!(won.level, NotificationLevel::Success);
        assert_eq!(won.title, "You won!");
        assert_eq!(won.description, "You've won ₹195.00!");

        assert_eq!(Notification::bet_lost(false).description, "Better luck next time!");
        assert_eq!(Notification::bet_lost(true).title, "No win this time");
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        notifier.notify(Notification::auth_required());
        notifier.notify(Notification::insufficient_balance());

        assert_eq!(receiver.recv().await.unwrap().title, "Authentication required");
        assert_eq!(receiver.recv().await.unwrap().title, "Insufficient balance");
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);
        notifier.notify(Notification::info("x", "y"));
    }
}
