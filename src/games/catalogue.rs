//! Game catalogue enrichment
//!
//! The server only lists ids and names; descriptions, minimum bet and
//! maximum payout labels are filled in locally.

use super::payouts::max_payout_label;
use super::types::GameType;
use crate::api::models::GameInfo;

const UNKNOWN_DESCRIPTION: &str = "Try your luck with this exciting game!";
const UNKNOWN_PAYOUT: &str = "??x";

#[derive(Debug, Clone, PartialEq)]
pub struct GameListing {
    pub id: String,
    pub name: String,
    pub game_type: Option<GameType>,
    pub description: String,
    pub min_bet: f64,
    pub max_payout: String,
}

impl GameListing {
    pub fn from_info(info: &GameInfo, min_bet: f64) -> Self {
        let game_type = info.game_type();
        let name = if info.name.is_empty() {
            game_type.map_or_else(|| info.id.clone(), |g| g.title().to_string())
        } else {
            info.name.clone()
        };
        Self {
            id: info.id.clone(),
            name,
            game_type,
            description: game_type
                .map_or(UNKNOWN_DESCRIPTION, |g| g.description())
                .to_string(),
            min_bet,
            max_payout: game_type
                .map_or(UNKNOWN_PAYOUT, max_payout_label)
                .to_string(),
        }
    }

    /// Case-insensitive name match; an empty term matches everything
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.trim().to_lowercase())
    }
}

pub fn enrich(games: &[GameInfo], min_bet: f64) -> Vec<GameListing> {
    games.iter().map(|g| GameListing::from_info(g, min_bet)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(id: &str, name: &str) -> GameInfo {
        serde_json::from_value(json!({"id": id, "name": name})).unwrap()
    }

    #[test]
    fn test_enrich_known_and_unknown() {
        let listings = enrich(&[info("roulette", "Roulette"), info("crash", "Crash")], 10.0);

        assert_eq!(listings[0].game_type, Some(GameType::Roulette));
        assert_eq!(listings[0].max_payout, "35x");
        assert_eq!(listings[0].min_bet, 10.0);
        assert_eq!(listings[0].description, GameType::Roulette.description());

        assert_eq!(listings[1].game_type, None);
        assert_eq!(listings[1].max_payout, "??x");
        assert_eq!(listings[1].description, UNKNOWN_DESCRIPTION);
    }

    #[test]
    fn test_search() {
        let listing = GameListing::from_info(&info("diceRoll", "Dice Roll"), 10.0);
        assert!(listing.matches("dice"));
        assert!(listing.matches(""));
        assert!(!listing.matches("slots"));
    }

    #[test]
    fn test_missing_name_uses_title() {
        let listing = GameListing::from_info(&info("coinFlip", ""), 10.0);
        assert_eq!(listing.name, "Coin Flip");
    }
}
