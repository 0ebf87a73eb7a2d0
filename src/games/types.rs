use crate::common::types::{deserialize_id, format_inr};
use crate::errors::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum GameType {
    CoinFlip,
    DiceRoll,
    Roulette,
    Slots,
}

impl GameType {
    pub const ALL: [GameType; 4] = [
        GameType::CoinFlip,
        GameType::DiceRoll,
        GameType::Roulette,
        GameType::Slots,
    ];

    /// Wire identifier, also used as the catalogue id
    pub fn id(&self) -> &'static str {
        match self {
            GameType::CoinFlip => "coinFlip",
            GameType::DiceRoll => "diceRoll",
            GameType::Roulette => "roulette",
            GameType::Slots => "slots",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameType::CoinFlip => "Coin Flip",
            GameType::DiceRoll => "Dice Roll",
            GameType::Roulette => "Roulette",
            GameType::Slots => "Slots",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameType::CoinFlip => "A simple game of chance. Bet on heads or tails.",
            GameType::DiceRoll => "Roll the dice and bet on high, low, or exact numbers.",
            GameType::Roulette => "The classic casino game with multiple betting options.",
            GameType::Slots => "Spin the reels and match symbols to win big prizes!",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "coinflip" | "coin" => Ok(GameType::CoinFlip),
            "diceroll" | "dice" => Ok(GameType::DiceRoll),
            "roulette" => Ok(GameType::Roulette),
            "slots" | "slot" => Ok(GameType::Slots),
            _ => Err(format!("unknown game '{}'", s)),
        }
    }
}

/// Coin flip choice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoinChoice {
    Heads,
    Tails,
}

impl fmt::Display for CoinChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinChoice::Heads => write!(f, "heads"),
            CoinChoice::Tails => write!(f, "tails"),
        }
    }
}

impl FromStr for CoinChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heads" | "h" => Ok(CoinChoice::Heads),
            "tails" | "t" => Ok(CoinChoice::Tails),
            _ => Err(format!("expected heads or tails, got '{}'", s)),
        }
    }
}

/// Dice bet: `{"type": "high"}` or `{"type": "exact", "number": 6}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiceBet {
    /// 4-6
    High,
    /// 1-3
    Low,
    Exact { number: u8 },
}

/// Roulette bet: `{"type": "red"}` or `{"type": "straight", "number": 17}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RouletteBet {
    Red,
    Black,
    Green,
    Even,
    Odd,
    /// 1-18
    Low,
    /// 19-36
    High,
    Straight { number: u8 },
}

/// Game-specific `betDetails` payload as sent to the server
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BetDetails {
    CoinFlip { choice: CoinChoice },
    DiceRoll(DiceBet),
    Roulette(RouletteBet),
    Slots {},
}

/// What the player picked, per game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetSelection {
    CoinFlip(CoinChoice),
    DiceRoll(DiceBet),
    Roulette(RouletteBet),
    Slots,
}

impl BetSelection {
    pub fn game_type(&self) -> GameType {
        match self {
            BetSelection::CoinFlip(_) => GameType::CoinFlip,
            BetSelection::DiceRoll(_) => GameType::DiceRoll,
            BetSelection::Roulette(_) => GameType::Roulette,
            BetSelection::Slots => GameType::Slots,
        }
    }

    pub fn bet_details(&self) -> BetDetails {
        match *self {
            BetSelection::CoinFlip(choice) => BetDetails::CoinFlip { choice },
            BetSelection::DiceRoll(bet) => BetDetails::DiceRoll(bet),
            BetSelection::Roulette(bet) => BetDetails::Roulette(bet),
            BetSelection::Slots => BetDetails::Slots {},
        }
    }

    /// Reject selections the server could never settle
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            BetSelection::DiceRoll(DiceBet::Exact { number }) if !(1..=6).contains(&number) => {
                Err(ValidationError::InvalidSelection(format!(
                    "dice number must be between 1 and 6, got {}",
                    number
                )))
            }
            BetSelection::Roulette(RouletteBet::Straight { number }) if number > 36 => {
                Err(ValidationError::InvalidSelection(format!(
                    "roulette number must be between 0 and 36, got {}",
                    number
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for BetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetSelection::CoinFlip(choice) => write!(f, "{}", choice),
            BetSelection::DiceRoll(DiceBet::High) => write!(f, "high (4-6)"),
            BetSelection::DiceRoll(DiceBet::Low) => write!(f, "low (1-3)"),
            BetSelection::DiceRoll(DiceBet::Exact { number }) => write!(f, "exact {}", number),
            BetSelection::Roulette(bet) => match bet {
                RouletteBet::Red => write!(f, "red"),
                RouletteBet::Black => write!(f, "black"),
                RouletteBet::Green => write!(f, "green"),
                RouletteBet::Even => write!(f, "even"),
                RouletteBet::Odd => write!(f, "odd"),
                RouletteBet::Low => write!(f, "low (1-18)"),
                RouletteBet::High => write!(f, "high (19-36)"),
                RouletteBet::Straight { number } => write!(f, "straight {}", number),
            },
            BetSelection::Slots => write!(f, "spin"),
        }
    }
}

/// A wager as entered by the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wager {
    pub amount: f64,
    pub selection: BetSelection,
}

impl Wager {
    pub fn new(amount: f64, selection: BetSelection) -> Self {
        Self { amount, selection }
    }

    pub fn game_type(&self) -> GameType {
        self.selection.game_type()
    }
}

/// Bet status as reported by the server
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    #[default]
    Pending,
    Won,
    Lost,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Pending => write!(f, "pending"),
            BetStatus::Won => write!(f, "won"),
            BetStatus::Lost => write!(f, "lost"),
        }
    }
}

impl FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(BetStatus::Pending),
            "won" | "win" => Ok(BetStatus::Won),
            "lost" | "loss" => Ok(BetStatus::Lost),
            _ => Err(format!("unknown bet status '{}'", s)),
        }
    }
}

/// Bet record created by the server. Immutable on the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Bet {
    #[serde(alias = "_id", deserialize_with = "deserialize_id")]
    pub id: String,
    pub game_type: Option<GameType>,
    pub amount: f64,
    pub bet_details: serde_json::Value,
    pub status: BetStatus,
    pub payout: Option<f64>,
    pub outcome: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Bet {
    pub fn is_won(&self) -> bool {
        self.status == BetStatus::Won
    }

    /// Payout for won bets, zero otherwise
    pub fn won_amount(&self) -> f64 {
        if self.is_won() {
            self.payout.unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

/// Game-specific outcome returned next to the settled bet
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameDetails {
    #[serde(default)]
    pub outcome: Option<serde_json::Value>,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub payout: Option<f64>,
    #[serde(default)]
    pub result_value: Option<serde_json::Value>,
    #[serde(default)]
    pub reels: Option<Vec<String>>,
    #[serde(default)]
    pub result_color: Option<String>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GameDetails {
    /// Outcome rendered as text (strings verbatim, numbers formatted)
    pub fn outcome_text(&self) -> Option<String> {
        self.outcome.as_ref().and_then(value_text)
    }

    /// Numeric result (die face, roulette pocket)
    pub fn result_number(&self) -> Option<i64> {
        match self.result_value.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A bet the server has settled, together with the wager that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SettledBet {
    pub wager: Wager,
    pub bet: Bet,
    pub details: GameDetails,
}

impl SettledBet {
    pub fn game_type(&self) -> GameType {
        self.wager.game_type()
    }

    pub fn won(&self) -> bool {
        self.details.won
    }

    /// Server payout; game details take precedence over the bet record
    pub fn payout(&self) -> f64 {
        self.details.payout.or(self.bet.payout).unwrap_or(0.0)
    }

    /// "+₹195.00" for wins, `None` for losses
    pub fn payout_label(&self) -> Option<String> {
        self.won().then(|| format!("+{}", format_inr(self.payout())))
    }

    pub fn headline(&self) -> &'static str {
        if self.won() {
            "You Won!"
        } else {
            "You Lost!"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_game_type_wire_names() {
        assert_eq!(serde_json::to_value(GameType::CoinFlip).unwrap(), json!("coinFlip"));
        assert_eq!(serde_json::to_value(GameType::DiceRoll).unwrap(), json!("diceRoll"));
        assert_eq!(serde_json::to_value(GameType::Roulette).unwrap(), json!("roulette"));
        assert_eq!(serde_json::to_value(GameType::Slots).unwrap(), json!("slots"));
        for game in GameType::ALL {
            assert_eq!(game.id().parse::<GameType>().unwrap(), game);
        }
        assert_eq!("coin-flip".parse::<GameType>().unwrap(), GameType::CoinFlip);
        assert!("poker".parse::<GameType>().is_err());
    }

    #[test]
    fn test_bet_details_payloads() {
        let coin = BetSelection::CoinFlip(CoinChoice::Heads).bet_details();
        assert_eq!(serde_json::to_value(coin).unwrap(), json!({"choice": "heads"}));

        let dice = BetSelection::DiceRoll(DiceBet::Exact { number: 6 }).bet_details();
        assert_eq!(serde_json::to_value(dice).unwrap(), json!({"type": "exact", "number": 6}));

        let high = BetSelection::DiceRoll(DiceBet::High).bet_details();
        assert_eq!(serde_json::to_value(high).unwrap(), json!({"type": "high"}));

        let straight = BetSelection::Roulette(RouletteBet::Straight { number: 0 }).bet_details();
        assert_eq!(
            serde_json::to_value(straight).unwrap(),
            json!({"type": "straight", "number": 0})
        );

        let slots = BetSelection::Slots.bet_details();
        assert_eq!(serde_json::to_value(slots).unwrap(), json!({}));
    }

    #[test]
    fn test_selection_validation() {
        assert!(BetSelection::DiceRoll(DiceBet::Exact { number: 6 }).validate().is_ok());
        assert!(BetSelection::DiceRoll(DiceBet::Exact { number: 0 }).validate().is_err());
        assert!(BetSelection::DiceRoll(DiceBet::Exact { number: 7 }).validate().is_err());
        assert!(BetSelection::Roulette(RouletteBet::Straight { number: 36 }).validate().is_ok());
        assert!(BetSelection::Roulette(RouletteBet::Straight { number: 37 }).validate().is_err());
        assert!(BetSelection::Slots.validate().is_ok());
    }

    #[test]
    fn test_bet_parses_sparse_and_full_records() {
        let sparse: Bet = serde_json::from_value(json!({"payout": 195})).unwrap();
        assert_eq!(sparse.payout, Some(195.0));
        assert_eq!(sparse.status, BetStatus::Pending);

        let full: Bet = serde_json::from_value(json!({
            "_id": 42,
            "gameType": "roulette",
            "amount": 10.0,
            "betDetails": {"type": "red"},
            "status": "won",
            "payout": 19.5,
            "outcome": "Ball landed on 32 red",
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(full.id, "42");
        assert_eq!(full.game_type, Some(GameType::Roulette));
        assert!(full.is_won());
        assert_eq!(full.won_amount(), 19.5);
    }

    #[test]
    fn test_game_details_extras_and_text() {
        let details: GameDetails = serde_json::from_value(json!({
            "outcome": "Rolled a 2",
            "won": false,
            "payout": 0,
            "resultValue": 2,
            "houseEdge": 0.025
        }))
        .unwrap();
        assert_eq!(details.outcome_text().as_deref(), Some("Rolled a 2"));
        assert_eq!(details.result_number(), Some(2));
        assert!(details.extra.contains_key("houseEdge"));
    }

    #[test]
    fn test_settled_payout_prefers_details() {
        let wager = Wager::new(100.0, BetSelection::CoinFlip(CoinChoice::Heads));
        let settled = SettledBet {
            wager,
            bet: Bet {
                payout: Some(195.0),
                ..Default::default()
            },
            details: GameDetails {
                won: true,
                ..Default::default()
            },
        };
        assert_eq!(settled.payout(), 195.0);
        assert_eq!(settled.payout_label().as_deref(), Some("+₹195.00"));
        assert_eq!(settled.headline(), "You Won!");
    }
}
