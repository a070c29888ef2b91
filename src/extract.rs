//! Reads the CoinMarketCap top page.
//!
//! The page is injected as a parsed [`Html`] tree, so everything here runs
//! offline against saved fixtures. Markup drift degrades fields to empty
//! strings; only a missing table is fatal.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::columns::{ColumnMap, HeaderIndex};
use crate::error::ExtractionError;
use crate::filter::{compute_movers, filter_coins, IgnoreSet, DEFAULT_MOVERS_LIMIT};
use crate::model::{CoinRecord, GlobalStats, MarketSnapshot, TableColumnAvailability, TableResult};
use crate::parse::{clean_text, parse_percent, parse_price};

pub const DEFAULT_ROW_LIMIT: usize = 10;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid selector {css:?}: {err}"))
}

pub(crate) static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static HEADER_TH: Lazy<Selector> = Lazy::new(|| selector("thead th"));
static HEADER_TD: Lazy<Selector> = Lazy::new(|| selector("thead td"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static TH: Lazy<Selector> = Lazy::new(|| selector("th"));
static TD: Lazy<Selector> = Lazy::new(|| selector("td"));
static BODY_ROW: Lazy<Selector> = Lazy::new(|| selector("tbody tr"));
static COIN_NAME: Lazy<Selector> = Lazy::new(|| selector(".coin-item-name"));
static COIN_SYMBOL: Lazy<Selector> = Lazy::new(|| selector(".coin-item-symbol, .crypto-symbol"));
static DETAIL_LINK: Lazy<Selector> = Lazy::new(|| selector(r#"a[href*="/currencies/"]"#));
static GLOBAL_STATS: Lazy<Selector> = Lazy::new(|| selector(r#"[data-test="global-stats"]"#));

fn stat_selector(marker: &str) -> Selector {
    selector(&format!(r#"[data-test="{marker}"]"#))
}

static MARKET_CAP: Lazy<Selector> = Lazy::new(|| stat_selector("mkt-cap-num"));
static MARKET_CAP_CHANGE: Lazy<Selector> = Lazy::new(|| stat_selector("mkt-cap-percentage-change"));
static VOLUME_24H: Lazy<Selector> = Lazy::new(|| stat_selector("24h-vol-num"));
static VOLUME_CHANGE: Lazy<Selector> = Lazy::new(|| stat_selector("24h-vol-percentage-change"));
static BTC_DOMINANCE: Lazy<Selector> = Lazy::new(|| stat_selector("btc-dominance-num"));
static ETH_DOMINANCE: Lazy<Selector> = Lazy::new(|| stat_selector("eth-dominance-num"));
static FEAR_GREED: Lazy<Selector> = Lazy::new(|| stat_selector("fear-greed-index-num"));

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> String {
    scope.select(sel).next().map(element_text).unwrap_or_default()
}

fn header_cells(table: ElementRef<'_>) -> Vec<String> {
    let from = |sel: &Selector| table.select(sel).map(element_text).collect::<Vec<_>>();

    let cells = from(&HEADER_TH);
    if !cells.is_empty() {
        return cells;
    }
    let cells = from(&HEADER_TD);
    if !cells.is_empty() {
        return cells;
    }
    table
        .select(&ROW)
        .next()
        .map(|row| row.select(&TH).map(element_text).collect())
        .unwrap_or_default()
}

/// Split `"Bitcoin BTC"` into name and ticker when the last word looks like one.
fn split_name_symbol(text: &str) -> (String, String) {
    let words: Vec<&str> = text.split_whitespace().collect();
    match words.split_last() {
        Some((last, rest)) if is_ticker(last) => {
            let name = if rest.is_empty() {
                last.to_string()
            } else {
                rest.join(" ")
            };
            (name, last.to_string())
        }
        _ => (clean_text(text), String::new()),
    }
}

fn is_ticker(word: &str) -> bool {
    (2..=10).contains(&word.len())
        && word
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && word.chars().any(|c| c.is_ascii_uppercase())
}

fn name_and_symbol(row: ElementRef<'_>, cells: &[ElementRef<'_>], column: Option<usize>) -> (String, String) {
    let mut name = first_text(row, &COIN_NAME);
    let mut symbol = first_text(row, &COIN_SYMBOL);
    if !name.is_empty() && !symbol.is_empty() {
        return (name, symbol);
    }

    let fallback = row
        .select(&DETAIL_LINK)
        .map(element_text)
        .find(|text| !text.is_empty())
        .or_else(|| column.and_then(|i| cells.get(i)).map(|cell| element_text(*cell)))
        .unwrap_or_default();
    let (fallback_name, fallback_symbol) = split_name_symbol(&fallback);

    if name.is_empty() {
        name = fallback_name;
        // the symbol marker text may trail the link text
        if !symbol.is_empty() {
            if let Some(stripped) = name.strip_suffix(symbol.as_str()) {
                name = stripped.trim_end().to_string();
            }
        }
    }
    if symbol.is_empty() {
        symbol = fallback_symbol;
    }
    (name, symbol)
}

fn cell_text(cells: &[ElementRef<'_>], column: Option<usize>) -> String {
    column
        .and_then(|i| cells.get(i))
        .map(|cell| element_text(*cell))
        .unwrap_or_default()
}

/// Pull up to `limit` coin rows from the first table in the document.
pub fn extract_table(document: &Html, limit: usize) -> Result<TableResult, ExtractionError> {
    let table = document
        .select(&TABLE)
        .next()
        .ok_or(ExtractionError::TableNotFound)?;

    let headers = header_cells(table);
    let map = ColumnMap::from_index(&HeaderIndex::build(&headers));
    debug!(headers = ?headers, columns = ?map, "resolved table columns");

    let table_columns = TableColumnAvailability {
        has_1h: map.change_1h.is_some(),
        has_24h: map.change_24h.is_some(),
        has_7d: map.change_7d.is_some(),
        has_30d: map.change_30d.is_some(),
        has_90d: map.change_90d.is_some(),
    };

    let mut coins = Vec::with_capacity(limit);
    for row in table.select(&BODY_ROW) {
        if coins.len() >= limit {
            break;
        }
        let cells: Vec<ElementRef<'_>> = row.select(&TD).collect();
        if cells.is_empty() {
            continue;
        }

        let (name, symbol) = name_and_symbol(row, &cells, map.name);
        coins.push(CoinRecord {
            rank: cell_text(&cells, map.rank),
            name,
            symbol,
            price: parse_price(&cell_text(&cells, map.price)),
            change_1h: parse_percent(&cell_text(&cells, map.change_1h)),
            change_24h: parse_percent(&cell_text(&cells, map.change_24h)),
            change_7d: parse_percent(&cell_text(&cells, map.change_7d)),
            change_30d: parse_percent(&cell_text(&cells, map.change_30d)),
            change_90d: parse_percent(&cell_text(&cells, map.change_90d)),
        });
    }

    Ok(TableResult {
        coins,
        table_columns,
    })
}

/// Read the global stats bar. A missing bar leaves every field empty.
pub fn read_global_stats(document: &Html) -> GlobalStats {
    let Some(container) = document.select(&GLOBAL_STATS).next() else {
        warn!("global stats container not found, stat fields left empty");
        return GlobalStats::default();
    };

    let read = |sel: &Selector| first_text(container, sel);
    GlobalStats {
        market_cap: read(&MARKET_CAP),
        market_cap_change: read(&MARKET_CAP_CHANGE),
        volume_24h: read(&VOLUME_24H),
        volume_change: read(&VOLUME_CHANGE),
        btc_dominance: read(&BTC_DOMINANCE),
        eth_dominance: read(&ETH_DOMINANCE),
        fear_greed: read(&FEAR_GREED),
    }
}

/// Build the snapshot. Movers use the default ignore list with stablecoins
/// excluded.
pub fn assemble(stats: GlobalStats, table: TableResult, captured_at: DateTime<Utc>) -> MarketSnapshot {
    let filtered = filter_coins(&table.coins, &IgnoreSet::default(), true);
    let movers = compute_movers(&filtered, DEFAULT_MOVERS_LIMIT);
    MarketSnapshot::new(captured_at, stats, table, movers)
}

/// Extract table and stats from one document.
pub fn capture_document(
    document: &Html,
    limit: usize,
    captured_at: DateTime<Utc>,
) -> Result<MarketSnapshot, ExtractionError> {
    let table = extract_table(document, limit)?;
    let stats = read_global_stats(document);
    info!(
        coins = table.coins.len(),
        market_cap = %stats.market_cap,
        "captured market snapshot"
    );
    Ok(assemble(stats, table, captured_at))
}

pub(crate) fn has_table(html: &str) -> bool {
    Html::parse_document(html).select(&TABLE).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn split_trailing_ticker() {
        assert_eq!(
            split_name_symbol("Bitcoin BTC"),
            ("Bitcoin".to_string(), "BTC".to_string())
        );
        assert_eq!(
            split_name_symbol("Shiba Inu SHIB"),
            ("Shiba Inu".to_string(), "SHIB".to_string())
        );
        assert_eq!(
            split_name_symbol("Bitcoin"),
            ("Bitcoin".to_string(), String::new())
        );
        assert_eq!(split_name_symbol("ETH"), ("ETH".to_string(), "ETH".to_string()));
    }

    #[test]
    fn structural_markers_win_over_name_column() {
        let html = r#"
            <table>
              <thead><tr><th>#</th><th>Coin</th><th>Price</th></tr></thead>
              <tbody><tr>
                <td>2</td>
                <td><a href="/currencies/ethereum/">
                  <p class="coin-item-name">Ethereum</p>
                  <p class="coin-item-symbol">ETH</p>
                </a></td>
                <td>$3,100.12</td>
              </tr></tbody>
            </table>"#;
        let result = extract_table(&doc(html), 5).unwrap();
        let coin = &result.coins[0];
        assert_eq!(coin.rank, "2");
        assert_eq!(coin.name, "Ethereum");
        assert_eq!(coin.symbol, "ETH");
        assert_eq!(coin.price, "$3,100.12");
    }

    #[test]
    fn detail_link_fallback() {
        let html = r#"
            <table>
              <thead><tr><th>#</th><th>Name</th><th>Price</th></tr></thead>
              <tbody><tr>
                <td>5</td>
                <td><a href="/currencies/solana/">Solana SOL</a></td>
                <td>$150</td>
              </tr></tbody>
            </table>"#;
        let coin = &extract_table(&doc(html), 5).unwrap().coins[0];
        assert_eq!(coin.name, "Solana");
        assert_eq!(coin.symbol, "SOL");
    }

    #[test]
    fn lazy_rows_with_symbol_marker_only() {
        let html = r#"
            <table>
              <thead><tr><th>#</th><th>Name</th><th>Price</th></tr></thead>
              <tbody><tr>
                <td>21</td>
                <td><a href="/currencies/toncoin/"><span>Toncoin</span><span class="crypto-symbol">TON</span></a></td>
                <td>$5.10</td>
              </tr></tbody>
            </table>"#;
        let coin = &extract_table(&doc(html), 5).unwrap().coins[0];
        assert_eq!(coin.name, "Toncoin");
        assert_eq!(coin.symbol, "TON");
    }

    #[test]
    fn global_stats_read_by_marker() {
        let html = r#"
            <div data-test="global-stats">
              <span data-test="mkt-cap-num">$2.31T</span>
              <span data-test="mkt-cap-percentage-change">1.2%</span>
              <span data-test="fear-greed-index-num"> 54 </span>
            </div>"#;
        let stats = read_global_stats(&doc(html));
        assert_eq!(stats.market_cap, "$2.31T");
        assert_eq!(stats.market_cap_change, "1.2%");
        assert_eq!(stats.fear_greed, "54");
        assert_eq!(stats.volume_24h, "");
        assert_eq!(stats.btc_dominance, "");
    }

    #[test]
    fn missing_global_stats_degrade_to_empty() {
        let stats = read_global_stats(&doc("<p data-test=\"mkt-cap-num\">$1T</p>"));
        assert_eq!(stats, GlobalStats::default());
    }

    #[test]
    fn assemble_derives_movers_without_stables() {
        let coins = vec![
            CoinRecord {
                symbol: "USDT".into(),
                name: "Tether USD".into(),
                change_24h: "9.0%".into(),
                ..Default::default()
            },
            CoinRecord {
                symbol: "BTC".into(),
                name: "Bitcoin".into(),
                change_24h: "1.0%".into(),
                ..Default::default()
            },
        ];
        let snapshot = assemble(
            GlobalStats::default(),
            TableResult {
                coins,
                table_columns: TableColumnAvailability::default(),
            },
            Utc::now(),
        );
        assert_eq!(snapshot.coins().len(), 2);
        assert_eq!(snapshot.movers().gainers.len(), 1);
        assert_eq!(snapshot.movers().gainers[0].symbol, "BTC");
        assert_eq!(snapshot.source(), "coinmarketcap.com");
    }
}
