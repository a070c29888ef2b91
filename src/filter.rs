use std::collections::HashSet;

use crate::model::{CoinRecord, FilterOptions, MarketSnapshot, Movers};
use crate::parse::parse_numeric;

/// Symbols that never count as movers.
pub const DEFAULT_IGNORE_SYMBOLS: &[&str] = &[
    "USDT", "USDC", "DAI", "TUSD", "FDUSD", "USDE", "BUSD", "PYUSD", "FRAX", "LUSD", "USDP",
    "GUSD", "SUSD", "USDD", "EURT", "EURS", "XAUT", "CMC20",
];

const STABLE_SYMBOL_PREFIXES: &[&str] = &[
    "USD", "USDT", "USDC", "DAI", "TUSD", "FDUSD", "USDE", "PYUSD", "FRAX", "LUSD", "GUSD",
    "USDP", "SUSD", "USDD",
];

pub const DEFAULT_MOVERS_LIMIT: usize = 3;

const MOOD_RATIO: f64 = 1.3;

/// Upper-case symbols to drop, always a fresh set built from the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    symbols: HashSet<String>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_IGNORE_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl IgnoreSet {
    pub fn with_symbols<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for symbol in extra {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() {
                set.symbols.insert(symbol);
            }
        }
        set
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Heuristic: pegged to a fiat currency or to gold. False hits are accepted.
pub fn is_stable_like(coin: &CoinRecord) -> bool {
    let symbol = coin.symbol.trim().to_uppercase();
    let name = coin.name.to_lowercase();

    if DEFAULT_IGNORE_SYMBOLS.contains(&symbol.as_str()) {
        return true;
    }
    if STABLE_SYMBOL_PREFIXES
        .iter()
        .any(|prefix| symbol.starts_with(prefix))
    {
        return true;
    }
    if name.contains("usd")
        && (name.contains("tether") || name.contains("coin") || name.contains("stable"))
    {
        return true;
    }
    if name.contains("stablecoin") {
        return true;
    }
    symbol == "XAUT" || name.contains("tether gold")
}

/// Drop ignored symbols, then stable-like coins if asked. Order is kept.
pub fn filter_coins(
    coins: &[CoinRecord],
    ignore: &IgnoreSet,
    ignore_stables: bool,
) -> Vec<CoinRecord> {
    coins
        .iter()
        .filter(|coin| !ignore.contains(&coin.symbol))
        .filter(|coin| !(ignore_stables && is_stable_like(coin)))
        .cloned()
        .collect()
}

/// Top gainers and losers by 24h change. Coins without a readable change are
/// left out; equal changes keep their table order.
pub fn compute_movers(coins: &[CoinRecord], limit: usize) -> Movers {
    let mut parsed: Vec<(f64, &CoinRecord)> = coins
        .iter()
        .filter_map(|coin| parse_numeric(&coin.change_24h).map(|pct| (pct, coin)))
        .collect();

    parsed.sort_by(|a, b| b.0.total_cmp(&a.0));
    let gainers = parsed
        .iter()
        .take(limit)
        .map(|(_, coin)| (*coin).clone())
        .collect();

    parsed.sort_by(|a, b| a.0.total_cmp(&b.0));
    let losers = parsed
        .iter()
        .take(limit)
        .map(|(_, coin)| (*coin).clone())
        .collect();

    Movers { gainers, losers }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Breadth {
    pub up: usize,
    pub down: usize,
    pub flat: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketMood {
    RiskOn,
    RiskOff,
    Neutral,
}

impl MarketMood {
    pub fn label(self) -> &'static str {
        match self {
            MarketMood::RiskOn => "Risk-On",
            MarketMood::RiskOff => "Risk-Off",
            MarketMood::Neutral => "Neutral",
        }
    }
}

impl Breadth {
    pub fn mood(&self) -> MarketMood {
        let (up, down) = (self.up as f64, self.down as f64);
        if up > down * MOOD_RATIO {
            MarketMood::RiskOn
        } else if down > up * MOOD_RATIO {
            MarketMood::RiskOff
        } else {
            MarketMood::Neutral
        }
    }
}

/// Count of coins up, down and flat over 24h. Unreadable changes count as flat.
pub fn compute_breadth(coins: &[CoinRecord]) -> Breadth {
    coins
        .iter()
        .fold(Breadth::default(), |mut breadth, coin| {
            match parse_numeric(&coin.change_24h) {
                Some(pct) if pct > 0.0 => breadth.up += 1,
                Some(pct) if pct < 0.0 => breadth.down += 1,
                _ => breadth.flat += 1,
            }
            breadth
        })
}

/// Everything a render needs from the filter engine for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketView {
    pub coins: Vec<CoinRecord>,
    pub movers: Movers,
    pub breadth: Breadth,
}

impl MarketView {
    pub fn new(snapshot: &MarketSnapshot, options: &FilterOptions) -> Self {
        let ignore = IgnoreSet::with_symbols(&options.ignore_symbols);
        let coins = filter_coins(snapshot.coins(), &ignore, options.ignore_stables);
        let movers = compute_movers(&coins, DEFAULT_MOVERS_LIMIT);
        let breadth = compute_breadth(&coins);
        Self {
            coins,
            movers,
            breadth,
        }
    }
}
