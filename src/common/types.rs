//! Shared account and wallet types
//!
//! Canonical shapes of the records the server hands back. Balances are
//! decimal rupee amounts carried as `f64`; the server is authoritative
//! for all of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Authenticated user profile with cached balance
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub balance: f64,
}

/// Wallet transaction kind
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Bet,
    Win,
    Bonus,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Bet => "Bet",
            TransactionType::Win => "Win",
            TransactionType::Bonus => "Bonus",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wire = match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Bet => "bet",
            TransactionType::Win => "win",
            TransactionType::Bonus => "bonus",
        };
        write!(f, "{}", wire)
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" | "withdraw" => Ok(TransactionType::Withdrawal),
            "bet" => Ok(TransactionType::Bet),
            "win" => Ok(TransactionType::Win),
            "bonus" => Ok(TransactionType::Bonus),
            _ => Err(format!("unknown transaction type '{}'", s)),
        }
    }
}

/// Wallet ledger entry (read-only)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Signed: credits positive, debits negative
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// "+₹100.00" for credits, "-₹10.00" for debits
    pub fn signed_amount_label(&self) -> String {
        if self.amount > 0.0 {
            format!("+{}", format_inr(self.amount))
        } else {
            format!("-{}", format_inr(self.amount.abs()))
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BonusStatus {
    Active,
    Used,
    Expired,
}

/// Promotional credit (read-only)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bonus {
    #[serde(default, alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub status: BonusStatus,
    #[serde(default)]
    pub wagering_remaining: f64,
}

impl Bonus {
    /// Status as shown in the wallet view
    pub fn status_label(&self) -> &'static str {
        match self.status {
            BonusStatus::Active if self.wagering_remaining > 0.0 => "Wagering Required",
            BonusStatus::Active => "Active",
            BonusStatus::Used => "Used",
            BonusStatus::Expired => "Expired",
        }
    }
}

/// Format a rupee amount with two decimals
pub fn format_inr(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

/// Accept ids as JSON strings or numbers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
    }
}
