//! Paged bet history

use crate::{
    api::models::BetHistoryQuery,
    errors::ClientResult,
    games::types::{Bet, BetStatus, GameType},
    services::GamesService,
};

pub const PAGE_SIZE: u32 = 10;

/// Active history filter; changing a criterion returns to page 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryFilter {
    pub game_type: Option<GameType>,
    pub status: Option<BetStatus>,
    pub page: u32,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            game_type: None,
            status: None,
            page: 1,
        }
    }
}

impl HistoryFilter {
    pub fn with_game(self, game_type: Option<GameType>) -> Self {
        Self {
            game_type,
            page: 1,
            ..self
        }
    }

    pub fn with_status(self, status: Option<BetStatus>) -> Self {
        Self {
            status,
            page: 1,
            ..self
        }
    }

    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }

    fn query(&self) -> BetHistoryQuery {
        BetHistoryQuery {
            page: self.page.max(1),
            limit: PAGE_SIZE,
            game_type: self.game_type,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub bets: Vec<Bet>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl HistoryPage {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.limit)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Page to load for a requested page number, kept inside the range
    pub fn clamp(&self, requested: u32) -> u32 {
        requested.clamp(1, self.total_pages().max(1))
    }
}

/// `ceil(total / limit)`
pub fn total_pages(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
}

pub async fn load_history(
    games: &GamesService,
    filter: &HistoryFilter,
) -> ClientResult<HistoryPage> {
    let query = filter.query();
    let response = games.bet_history(&query).await?;
    Ok(HistoryPage {
        bets: response.bets,
        total: response.total,
        page: query.page,
        limit: query.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let filter = HistoryFilter::default().with_page(4);
        assert_eq!(filter.with_game(Some(GameType::Slots)).page, 1);
        assert_eq!(filter.with_status(Some(BetStatus::Won)).page, 1);
        assert_eq!(filter.with_page(2).page, 2);
    }

    #[tokio::test]
    async fn test_load_history_page() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/bets",
            json!({
                "bets": [
                    {"_id": "b1", "gameType": "roulette", "amount": 10, "status": "won", "payout": 350}
                ],
                "total": 23
            }),
        );
        let games = GamesService::new(transport.clone());

        let filter = HistoryFilter::default()
            .with_game(Some(GameType::Roulette))
            .with_page(3);
        let page = load_history(&games, &filter).await.unwrap();

        assert_eq!(page.total_pages(), 3);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.clamp(9), 3);
        assert_eq!(page.clamp(0), 1);
        assert_eq!(page.bets[0].won_amount(), 350.0);

        let query = &transport.requests()[0].query;
        assert!(query.contains(&("offset".to_string(), "20".to_string())));
        assert!(query.contains(&("gameType".to_string(), "roulette".to_string())));
    }
}
