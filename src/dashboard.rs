//! Account dashboard: recent activity, stats and a 7-day chart

use crate::{
    api::models::{BetHistoryQuery, TransactionsQuery},
    common::types::{Bonus, Transaction},
    errors::ClientResult,
    games::types::Bet,
    services::{GamesService, WalletService},
};
use chrono::{Duration, NaiveDate};

const CHART_DAYS: i64 = 7;

/// Aggregates over the loaded bets
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    pub total_wagered: f64,
    /// Payouts of won bets
    pub total_won: f64,
    /// Percentage of bets won, 0-100
    pub win_rate: f64,
    pub biggest_win: f64,
}

impl DashboardStats {
    pub fn from_bets(bets: &[Bet]) -> Self {
        if bets.is_empty() {
            return Self::default();
        }
        let total_wagered = bets.iter().map(|b| b.amount).sum();
        let wins: Vec<f64> = bets.iter().filter(|b| b.is_won()).map(Bet::won_amount).collect();
        Self {
            total_wagered,
            total_won: wins.iter().sum(),
            win_rate: wins.len() as f64 / bets.len() as f64 * 100.0,
            biggest_win: wins.iter().copied().fold(0.0, f64::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub wagered: f64,
    pub won: f64,
}

impl ChartPoint {
    /// Axis label, e.g. "Mar 7"
    pub fn label(&self) -> String {
        self.date.format("%b %-d").to_string()
    }
}

/// Wagered and won per calendar day (UTC), oldest first, ending `today`
pub fn chart_series(bets: &[Bet], today: NaiveDate) -> Vec<ChartPoint> {
    (0..CHART_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let day: Vec<&Bet> = bets
                .iter()
                .filter(|b| b.created_at.map(|t| t.date_naive()) == Some(date))
                .collect();
            ChartPoint {
                date,
                wagered: day.iter().map(|b| b.amount).sum(),
                won: day.iter().map(|b| b.won_amount()).sum(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub bets: Vec<Bet>,
    pub transactions: Vec<Transaction>,
    pub bonuses: Vec<Bonus>,
    pub stats: DashboardStats,
}

impl Dashboard {
    /// Fetch recent bets, transactions and bonuses concurrently
    pub async fn load(games: &GamesService, wallet: &WalletService) -> ClientResult<Self> {
        let bets_query = BetHistoryQuery::default();
        let tx_query = TransactionsQuery::default();
        let (bets, transactions, bonuses) = tokio::try_join!(
            games.bet_history(&bets_query),
            wallet.transactions(&tx_query),
            wallet.bonuses(),
        )?;

        let stats = DashboardStats::from_bets(&bets.bets);
        Ok(Self {
            bets: bets.bets,
            transactions: transactions.transactions,
            bonuses: bonuses.bonuses,
            stats,
        })
    }

    pub fn chart(&self, today: NaiveDate) -> Vec<ChartPoint> {
        chart_series(&self.bets, today)
    }
}
