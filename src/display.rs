//! Terminal rendering helpers

use crate::{
    common::types::{format_inr, Bonus, Transaction},
    dashboard::{ChartPoint, DashboardStats},
    games::{
        catalogue::GameListing,
        payouts::{
            estimate_payout, max_payout_label, multiplier, pocket_color, slots_multiplier,
            SlotSymbol,
        },
        types::{Bet, GameType, SettledBet, Wager},
    },
};
use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, Rng};

/// Random reel faces shown while a spin is pending
pub fn spinner_frame<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..3)
        .map(|_| {
            SlotSymbol::ALL
                .choose(rng)
                .map_or("?", |symbol| symbol.glyph())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Placeholder shown while a non-slots result is pending
pub fn pending_label(game: GameType) -> &'static str {
    match game {
        GameType::CoinFlip => "Flipping...",
        GameType::DiceRoll => "Rolling...",
        GameType::Roulette => "Spinning the wheel...",
        GameType::Slots => "Spinning...",
    }
}

/// Game-specific result line ("Rolled 4", "17 black", reels)
pub fn outcome_line(settled: &SettledBet) -> String {
    let details = &settled.details;
    match settled.game_type() {
        GameType::CoinFlip => format!(
            "Coin landed on {}",
            details.outcome_text().unwrap_or_else(|| "?".to_string())
        ),
        GameType::DiceRoll => match details.result_number() {
            Some(n) => format!("Rolled {}", n),
            None => format!("Rolled {}", details.outcome_text().unwrap_or_default()),
        },
        GameType::Roulette => {
            let number = details.result_number();
            let color = details.result_color.clone().or_else(|| {
                number
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(pocket_color)
                    .map(|c| c.name().to_string())
            });
            match (number, color) {
                (Some(n), Some(color)) => format!("Ball landed on {} {}", n, color),
                (Some(n), None) => format!("Ball landed on {}", n),
                _ => "Ball landed".to_string(),
            }
        }
        GameType::Slots => details
            .reels
            .as_ref()
            .map_or_else(|| "? ? ?".to_string(), |reels| reels_line(reels)),
    }
}

/// Reels as shown, with the paying multiplier when the faces are known
fn reels_line(reels: &[String]) -> String {
    let line = reels.join(" ");
    let symbols: Result<Vec<SlotSymbol>, _> =
        reels.iter().map(|r| r.parse::<SlotSymbol>()).collect();
    match symbols.map(|s| slots_multiplier(&s)) {
        Ok(m) if m > 0.0 => format!("{}  ({}x)", line, m),
        _ => line,
    }
}

/// Stake and potential win, shown before the bet goes out
pub fn stake_line(wager: &Wager) -> String {
    match wager.game_type() {
        GameType::Slots => format!(
            "Spinning for {}, win up to {} your bet",
            format_inr(wager.amount),
            max_payout_label(GameType::Slots)
        ),
        _ => format!(
            "Betting {} on {}, win {} ({}x)",
            format_inr(wager.amount),
            wager.selection,
            format_inr(estimate_payout(wager.amount, &wager.selection)),
            multiplier(&wager.selection)
        ),
    }
}

pub fn quick_amounts_line(amounts: &[f64]) -> String {
    let amounts: Vec<String> = amounts.iter().map(|a| format_inr(*a)).collect();
    format!("Quick amounts: {}", amounts.join(" "))
}

pub fn render_settled(settled: &SettledBet) -> String {
    let mut lines = vec![settled.headline().to_string(), outcome_line(settled)];
    if let Some(payout) = settled.payout_label() {
        lines.push(payout);
    }
    lines.join("\n")
}

fn date_label(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

pub fn bet_line(bet: &Bet) -> String {
    let game = bet.game_type.map_or("unknown", |g| g.title());
    let payout = if bet.is_won() {
        format!("+{}", format_inr(bet.won_amount()))
    } else {
        "-".to_string()
    };
    format!(
        "{:<16} {:<10} {:>10} {:<8} {:>12} {}",
        date_label(bet.created_at),
        game,
        format_inr(bet.amount),
        bet.status.to_string(),
        payout,
        bet.outcome.as_deref().unwrap_or("")
    )
}

pub fn transaction_line(tx: &Transaction) -> String {
    format!(
        "{:<16} {:<10} {:>12} {}",
        date_label(tx.created_at),
        tx.tx_type.label(),
        tx.signed_amount_label(),
        tx.description
    )
}

pub fn bonus_line(bonus: &Bonus) -> String {
    let mut line = format!(
        "{:<30} {:>10} {}",
        bonus.description,
        format_inr(bonus.amount),
        bonus.status_label()
    );
    if bonus.wagering_remaining > 0.0 {
        line.push_str(&format!(" (wagering remaining: {})", format_inr(bonus.wagering_remaining)));
    }
    if let Some(expires) = bonus.expires_at {
        line.push_str(&format!(" expires {}", expires.format("%Y-%m-%d")));
    }
    line
}

pub fn listing_line(listing: &GameListing) -> String {
    format!(
        "{:<10} {:<12} min {} up to {}  {}",
        listing.id,
        listing.name,
        format_inr(listing.min_bet),
        listing.max_payout,
        listing.description
    )
}

pub fn stats_lines(stats: &DashboardStats) -> Vec<String> {
    vec![
        format!("Total wagered: {}", format_inr(stats.total_wagered)),
        format!("Total won:     {}", format_inr(stats.total_won)),
        format!("Win rate:      {:.1}%", stats.win_rate),
        format!("Biggest win:   {}", format_inr(stats.biggest_win)),
    ]
}

/// One text bar per day, scaled to the largest value in the series
pub fn chart_lines(series: &[ChartPoint], width: usize) -> Vec<String> {
    let peak = series
        .iter()
        .flat_map(|p| [p.wagered, p.won])
        .fold(0.0, f64::max);
    let bar = |value: f64| {
        if peak <= 0.0 {
            return String::new();
        }
        "#".repeat(((value / peak) * width as f64).round() as usize)
    };
    series
        .iter()
        .map(|p| {
            format!(
                "{:<6} wagered {:<w$} {:>10}  won {:<w$} {:>10}",
                p.label(),
                bar(p.wagered),
                format_inr(p.wagered),
                bar(p.won),
                format_inr(p.won),
                w = width
            )
        })
        .collect()
}
