//! API request and response models
//!
//! Wire shapes for every endpoint the client calls. Field names follow
//! the server's camelCase JSON.

use crate::common::types::{Bonus, Transaction, TransactionType, User};
use crate::games::types::{Bet, BetDetails, BetStatus, GameDetails, GameType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login/register response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Catalogue entry from `GET /bets/games`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GameInfo {
    /// Known game type for this entry, if the client supports it
    pub fn game_type(&self) -> Option<GameType> {
        self.id.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesResponse {
    pub games: Vec<GameInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub game_type: GameType,
    pub amount: f64,
    pub bet_details: BetDetails,
}

/// Settled bet plus game-specific outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetResponse {
    pub bet: Bet,
    #[serde(default)]
    pub game_details: GameDetails,
}

/// Bet history filter, 1-based pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetHistoryQuery {
    pub page: u32,
    pub limit: u32,
    pub game_type: Option<GameType>,
    pub status: Option<BetStatus>,
}

impl Default for BetHistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            game_type: None,
            status: None,
        }
    }
}

impl BetHistoryQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = page_query(self.page, self.limit);
        if let Some(game_type) = self.game_type {
            query.push(("gameType".to_string(), game_type.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetHistoryResponse {
    pub bets: Vec<Bet>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositOrderRequest {
    pub amount: f64,
}

/// Payment-provider order created by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepositOrder {
    pub id: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepositResponse {
    pub order: DepositOrder,
}

/// What the checkout widget is opened with
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub key: Option<String>,
    pub order_id: String,
    /// Smallest currency unit (paise)
    pub amount_minor: u64,
    pub currency: String,
    pub merchant_name: String,
    pub description: String,
    pub prefill_email: Option<String>,
}

/// Completion callback payload of the checkout widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentConfirmation {
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepositVerification {
    #[serde(flatten)]
    pub confirmation: PaymentConfirmation,
    pub amount: f64,
}

/// Withdrawal destination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum AccountDetails {
    #[serde(rename_all = "camelCase")]
    Upi { upi_id: String },
    #[serde(rename_all = "camelCase")]
    Bank {
        account_number: String,
        ifsc_code: String,
        account_name: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub amount: f64,
    pub account_details: AccountDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Wallet ledger filter, 1-based pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionsQuery {
    pub page: u32,
    pub limit: u32,
    pub tx_type: Option<TransactionType>,
}

impl Default for TransactionsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            tx_type: None,
        }
    }
}

impl TransactionsQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = page_query(self.page, self.limit);
        if let Some(tx_type) = self.tx_type {
            query.push(("type".to_string(), tx_type.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusesResponse {
    pub bonuses: Vec<Bonus>,
}

/// `offset`/`limit` pair for a 1-based page
fn page_query(page: u32, limit: u32) -> Vec<(String, String)> {
    let offset = u64::from(page.max(1) - 1) * u64::from(limit);
    vec![
        ("offset".to_string(), offset.to_string()),
        ("limit".to_string(), limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::types::{BetSelection, CoinChoice};
    use serde_json::json;

    #[test]
    fn test_place_bet_request_shape() {
        let selection = BetSelection::CoinFlip(CoinChoice::Heads);
        let request = PlaceBetRequest {
            game_type: selection.game_type(),
            amount: 100.0,
            bet_details: selection.bet_details(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"gameType": "coinFlip", "amount": 100.0, "betDetails": {"choice": "heads"}})
        );
    }

    #[test]
    fn test_history_query_offsets() {
        let query = BetHistoryQuery {
            page: 3,
            limit: 10,
            game_type: Some(GameType::DiceRoll),
            status: Some(BetStatus::Won),
        };
        assert_eq!(
            query.to_query(),
            vec![
                ("offset".to_string(), "20".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("gameType".to_string(), "diceRoll".to_string()),
                ("status".to_string(), "won".to_string()),
            ]
        );

        let first = BetHistoryQuery { page: 0, ..Default::default() };
        assert_eq!(first.to_query()[0].1, "0");
    }

    #[test]
    fn test_account_details_shape() {
        let upi = AccountDetails::Upi { upi_id: "me@upi".into() };
        assert_eq!(
            serde_json::to_value(&upi).unwrap(),
            json!({"method": "upi", "upiId": "me@upi"})
        );

        let bank = AccountDetails::Bank {
            account_number: "0001".into(),
            ifsc_code: "HDFC0000001".into(),
            account_name: "A".into(),
        };
        assert_eq!(
            serde_json::to_value(&bank).unwrap(),
            json!({
                "method": "bank",
                "accountNumber": "0001",
                "ifscCode": "HDFC0000001",
                "accountName": "A"
            })
        );
    }

    #[test]
    fn test_deposit_verification_flattens_confirmation() {
        let verification = DepositVerification {
            confirmation: PaymentConfirmation {
                razorpay_payment_id: "pay_1".into(),
                razorpay_order_id: "order_1".into(),
                razorpay_signature: "sig".into(),
            },
            amount: 500.0,
        };
        assert_eq!(
            serde_json::to_value(&verification).unwrap(),
            json!({
                "razorpay_payment_id": "pay_1",
                "razorpay_order_id": "order_1",
                "razorpay_signature": "sig",
                "amount": 500.0
            })
        );
    }

    #[test]
    fn test_place_bet_response_without_details() {
        let response: PlaceBetResponse =
            serde_json::from_value(json!({"bet": {"payout": 195}})).unwrap();
        assert_eq!(response.bet.payout, Some(195.0));
        assert!(!response.game_details.won);
    }

    #[test]
    fn test_catalogue_entry_game_type() {
        let info: GameInfo =
            serde_json::from_value(json!({"id": "diceRoll", "name": "Dice Roll", "active": true}))
                .unwrap();
        assert_eq!(info.game_type(), Some(GameType::DiceRoll));
        assert!(info.extra.contains_key("active"));
    }
}
