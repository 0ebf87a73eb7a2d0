//! Payout tables
//!
//! Display and estimation only. Outcomes and payouts are always decided
//! by the server.

use super::types::{BetSelection, DiceBet, GameType, RouletteBet};
use std::fmt;
use std::str::FromStr;

pub const EVEN_MONEY_MULTIPLIER: f64 = 1.95;
pub const DICE_EXACT_MULTIPLIER: f64 = 5.85;
pub const ROULETTE_STRAIGHT_MULTIPLIER: f64 = 35.0;
pub const SLOTS_PAIR_MULTIPLIER: f64 = 1.5;

/// Multiplier applied to the stake if the selection wins.
///
/// Slots have no pre-spin selection; this returns the pair multiplier,
/// the smallest possible win.
pub fn multiplier(selection: &BetSelection) -> f64 {
    match selection {
        BetSelection::CoinFlip(_) => EVEN_MONEY_MULTIPLIER,
        BetSelection::DiceRoll(DiceBet::Exact { .. }) => DICE_EXACT_MULTIPLIER,
        BetSelection::DiceRoll(_) => EVEN_MONEY_MULTIPLIER,
        BetSelection::Roulette(RouletteBet::Straight { .. } | RouletteBet::Green) => {
            ROULETTE_STRAIGHT_MULTIPLIER
        }
        BetSelection::Roulette(_) => EVEN_MONEY_MULTIPLIER,
        BetSelection::Slots => SLOTS_PAIR_MULTIPLIER,
    }
}

/// Potential payout shown before placing a bet
pub fn estimate_payout(amount: f64, selection: &BetSelection) -> f64 {
    amount * multiplier(selection)
}

/// Catalogue label for the best possible multiplier
pub fn max_payout_label(game: GameType) -> &'static str {
    match game {
        GameType::CoinFlip => "1.95x",
        GameType::DiceRoll => "5.85x",
        GameType::Roulette => "35x",
        GameType::Slots => "100x",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotSymbol {
    Cherry,
    Lemon,
    Orange,
    Grapes,
    Diamond,
    Seven,
}

impl SlotSymbol {
    pub const ALL: [SlotSymbol; 6] = [
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Orange,
        SlotSymbol::Grapes,
        SlotSymbol::Diamond,
        SlotSymbol::Seven,
    ];

    pub fn glyph(&self) -> &'static str {
        match self {
            SlotSymbol::Cherry => "🍒",
            SlotSymbol::Lemon => "🍋",
            SlotSymbol::Orange => "🍊",
            SlotSymbol::Grapes => "🍇",
            SlotSymbol::Diamond => "💎",
            SlotSymbol::Seven => "7️⃣",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SlotSymbol::Cherry => "Cherry",
            SlotSymbol::Lemon => "Lemon",
            SlotSymbol::Orange => "Orange",
            SlotSymbol::Grapes => "Grapes",
            SlotSymbol::Diamond => "Diamond",
            SlotSymbol::Seven => "Seven",
        }
    }

    /// Three-of-a-kind multiplier
    pub fn multiplier(&self) -> f64 {
        match self {
            SlotSymbol::Cherry => 5.0,
            SlotSymbol::Lemon => 10.0,
            SlotSymbol::Orange => 15.0,
            SlotSymbol::Grapes => 25.0,
            SlotSymbol::Diamond => 50.0,
            SlotSymbol::Seven => 100.0,
        }
    }
}

impl fmt::Display for SlotSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

impl FromStr for SlotSymbol {
    type Err = String;

    /// Accepts the glyph or the name; the seven also parses without its
    /// variation selector.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SlotSymbol::ALL
            .into_iter()
            .find(|symbol| {
                symbol.glyph() == s
                    || symbol.name().eq_ignore_ascii_case(s)
                    || (*symbol == SlotSymbol::Seven && (s == "7" || s == "7\u{20e3}"))
            })
            .ok_or_else(|| format!("unknown slot symbol '{}'", s))
    }
}

/// Multiplier a set of reels pays: three of a kind pays the symbol's
/// multiplier, two matching adjacent reels pay the pair multiplier.
pub fn slots_multiplier(reels: &[SlotSymbol]) -> f64 {
    if let [a, b, c] = reels {
        if a == b && b == c {
            return a.multiplier();
        }
    }
    if reels.windows(2).any(|pair| pair[0] == pair[1]) {
        SLOTS_PAIR_MULTIPLIER
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocketColor {
    Green,
    Red,
    Black,
}

impl PocketColor {
    pub fn name(&self) -> &'static str {
        match self {
            PocketColor::Green => "green",
            PocketColor::Red => "red",
            PocketColor::Black => "black",
        }
    }
}

impl fmt::Display for PocketColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use PocketColor::{Black as B, Green as G, Red as R};

/// European wheel, clockwise from zero
pub const ROULETTE_WHEEL: [(u8, PocketColor); 37] = [
    (0, G), (32, R), (15, B), (19, R), (4, B), (21, R), (2, B), (25, R),
    (17, B), (34, R), (6, B), (27, R), (13, B), (36, R), (11, B), (30, R),
    (8, B), (23, R), (10, B), (5, R), (24, B), (16, R), (33, B), (1, R),
    (20, B), (14, R), (31, B), (9, R), (22, B), (18, R), (29, B), (7, R),
    (28, B), (12, R), (35, B), (3, R), (26, B),
];

/// Colour of a pocket, `None` outside 0..=36
pub fn pocket_color(number: u8) -> Option<PocketColor> {
    ROULETTE_WHEEL
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, color)| *color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::types::CoinChoice;

    #[test]
    fn test_multipliers() {
        assert_eq!(multiplier(&BetSelection::CoinFlip(CoinChoice::Tails)), 1.95);
        assert_eq!(multiplier(&BetSelection::DiceRoll(DiceBet::High)), 1.95);
        assert_eq!(multiplier(&BetSelection::DiceRoll(DiceBet::Exact { number: 3 })), 5.85);
        assert_eq!(multiplier(&BetSelection::Roulette(RouletteBet::Odd)), 1.95);
        assert_eq!(multiplier(&BetSelection::Roulette(RouletteBet::Green)), 35.0);
        assert_eq!(
            multiplier(&BetSelection::Roulette(RouletteBet::Straight { number: 17 })),
            35.0
        );
        let estimate = estimate_payout(100.0, &BetSelection::CoinFlip(CoinChoice::Heads));
        assert!((estimate - 195.0).abs() < 1e-9);
    }

    #[test]
    fn test_slots_multiplier() {
        use SlotSymbol::*;
        assert_eq!(slots_multiplier(&[Seven, Seven, Seven]), 100.0);
        assert_eq!(slots_multiplier(&[Cherry, Cherry, Cherry]), 5.0);
        assert_eq!(slots_multiplier(&[Lemon, Lemon, Grapes]), 1.5);
        assert_eq!(slots_multiplier(&[Grapes, Diamond, Diamond]), 1.5);
        // Matching but not adjacent
        assert_eq!(slots_multiplier(&[Lemon, Grapes, Lemon]), 0.0);
        assert_eq!(slots_multiplier(&[Cherry, Lemon, Orange]), 0.0);
    }

    #[test]
    fn test_symbol_parsing() {
        assert_eq!("🍒".parse::<SlotSymbol>().unwrap(), SlotSymbol::Cherry);
        assert_eq!("7️⃣".parse::<SlotSymbol>().unwrap(), SlotSymbol::Seven);
        assert_eq!("diamond".parse::<SlotSymbol>().unwrap(), SlotSymbol::Diamond);
        assert!("?".parse::<SlotSymbol>().is_err());
    }

    #[test]
    fn test_wheel() {
        assert_eq!(ROULETTE_WHEEL.len(), 37);
        let mut numbers: Vec<u8> = ROULETTE_WHEEL.iter().map(|(n, _)| *n).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (0..=36).collect::<Vec<u8>>());

        assert_eq!(pocket_color(0), Some(PocketColor::Green));
        assert_eq!(pocket_color(32), Some(PocketColor::Red));
        assert_eq!(pocket_color(26), Some(PocketColor::Black));
        assert_eq!(pocket_color(37), None);

        let reds = ROULETTE_WHEEL.iter().filter(|(_, c)| *c == PocketColor::Red).count();
        assert_eq!(reds, 18);
    }
}
