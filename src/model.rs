use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SOURCE_NAME: &str = "coinmarketcap.com";

/// One row of the coin table, already formatted for display.
/// Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRecord {
    pub rank: String,
    pub name: String,
    pub symbol: String,
    pub price: String,
    pub change_1h: String,
    pub change_24h: String,
    pub change_7d: String,
    pub change_30d: String,
    pub change_90d: String,
}

impl CoinRecord {
    pub fn change(&self, column: ChangeColumn) -> &str {
        match column {
            ChangeColumn::OneHour => &self.change_1h,
            ChangeColumn::OneDay => &self.change_24h,
            ChangeColumn::SevenDays => &self.change_7d,
            ChangeColumn::ThirtyDays => &self.change_30d,
            ChangeColumn::NinetyDays => &self.change_90d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeColumn {
    OneHour,
    OneDay,
    SevenDays,
    ThirtyDays,
    NinetyDays,
}

impl ChangeColumn {
    pub const ALL: [ChangeColumn; 5] = [
        ChangeColumn::OneHour,
        ChangeColumn::OneDay,
        ChangeColumn::SevenDays,
        ChangeColumn::ThirtyDays,
        ChangeColumn::NinetyDays,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChangeColumn::OneHour => "1h",
            ChangeColumn::OneDay => "24h",
            ChangeColumn::SevenDays => "7d",
            ChangeColumn::ThirtyDays => "30d",
            ChangeColumn::NinetyDays => "90d",
        }
    }
}

/// Which optional change columns the source table carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumnAvailability {
    pub has_1h: bool,
    pub has_24h: bool,
    pub has_7d: bool,
    pub has_30d: bool,
    pub has_90d: bool,
}

impl TableColumnAvailability {
    pub fn has(&self, column: ChangeColumn) -> bool {
        match column {
            ChangeColumn::OneHour => self.has_1h,
            ChangeColumn::OneDay => self.has_24h,
            ChangeColumn::SevenDays => self.has_7d,
            ChangeColumn::ThirtyDays => self.has_30d,
            ChangeColumn::NinetyDays => self.has_90d,
        }
    }

    /// Available columns, shortest horizon first.
    pub fn available(&self) -> Vec<ChangeColumn> {
        ChangeColumn::ALL
            .into_iter()
            .filter(|column| self.has(*column))
            .collect()
    }
}

/// Global market stats from the page header. Each field is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub market_cap: String,
    pub market_cap_change: String,
    pub volume_24h: String,
    pub volume_change: String,
    pub btc_dominance: String,
    pub eth_dominance: String,
    pub fear_greed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movers {
    pub gainers: Vec<CoinRecord>,
    pub losers: Vec<CoinRecord>,
}

/// Output of the table extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableResult {
    pub coins: Vec<CoinRecord>,
    pub table_columns: TableColumnAvailability,
}

/// One point-in-time capture. Only the assembler builds these and nothing
/// mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    source: String,
    captured_at: DateTime<Utc>,
    #[serde(flatten)]
    stats: GlobalStats,
    coins: Vec<CoinRecord>,
    table_columns: TableColumnAvailability,
    movers: Movers,
}

impl MarketSnapshot {
    pub(crate) fn new(
        captured_at: DateTime<Utc>,
        stats: GlobalStats,
        table: TableResult,
        movers: Movers,
    ) -> Self {
        Self {
            source: SOURCE_NAME.to_string(),
            captured_at,
            stats,
            coins: table.coins,
            table_columns: table.table_columns,
            movers,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn stats(&self) -> &GlobalStats {
        &self.stats
    }

    pub fn coins(&self) -> &[CoinRecord] {
        &self.coins
    }

    pub fn table_columns(&self) -> TableColumnAvailability {
        self.table_columns
    }

    pub fn movers(&self) -> &Movers {
        &self.movers
    }

    /// First coin whose symbol matches, case-insensitively.
    pub fn coin(&self, symbol: &str) -> Option<&CoinRecord> {
        self.coins
            .iter()
            .find(|coin| coin.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Headline fields that came back empty, for partial-data notices.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.stats.market_cap.is_empty() {
            missing.push("Market Cap");
        }
        if self.stats.fear_greed.is_empty() {
            missing.push("Fear & Greed");
        }
        if self.coins.is_empty() {
            missing.push("Coins table");
        }
        missing
    }
}

/// Filter settings a caller may attach to a render without touching the
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub ignore_symbols: Vec<String>,
    pub ignore_stables: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            ignore_symbols: Vec::new(),
            ignore_stables: true,
        }
    }
}

pub const DEFAULT_ACCENT: &str = "#ec6714";
pub const DEFAULT_HEADLINE: &str = "Crypto Market Update";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub watermark: String,
    /// CSS-style color string.
    pub accent: String,
    pub headline: String,
    pub filter: FilterOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            watermark: String::new(),
            accent: DEFAULT_ACCENT.to_string(),
            headline: DEFAULT_HEADLINE.to_string(),
            filter: FilterOptions::default(),
        }
    }
}

/// Reply to a capture request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CaptureResponse {
    Success { ok: bool, data: MarketSnapshot },
    Failure { ok: bool, error: String },
}

impl CaptureResponse {
    pub fn success(data: MarketSnapshot) -> Self {
        CaptureResponse::Success { ok: true, data }
    }

    pub fn failure(error: impl ToString) -> Self {
        CaptureResponse::Failure {
            ok: false,
            error: error.to_string(),
        }
    }
}

impl<E: ToString> From<Result<MarketSnapshot, E>> for CaptureResponse {
    fn from(result: Result<MarketSnapshot, E>) -> Self {
        match result {
            Ok(snapshot) => CaptureResponse::success(snapshot),
            Err(err) => CaptureResponse::failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_columns_keep_horizon_order() {
        let columns = TableColumnAvailability {
            has_7d: true,
            has_1h: true,
            ..Default::default()
        };
        assert_eq!(
            columns.available(),
            vec![ChangeColumn::OneHour, ChangeColumn::SevenDays]
        );
    }

    #[test]
    fn wire_names_are_camel_case() {
        let keys = |value: serde_json::Value| -> Vec<String> {
            value.as_object().unwrap().keys().cloned().collect()
        };

        let mut coin = keys(serde_json::to_value(CoinRecord::default()).unwrap());
        coin.sort();
        assert_eq!(
            coin,
            vec![
                "change1h", "change24h", "change30d", "change7d", "change90d", "name", "price",
                "rank", "symbol",
            ]
        );

        let mut columns = keys(serde_json::to_value(TableColumnAvailability::default()).unwrap());
        columns.sort();
        assert_eq!(columns, vec!["has1h", "has24h", "has30d", "has7d", "has90d"]);

        let mut stats = keys(serde_json::to_value(GlobalStats::default()).unwrap());
        stats.sort();
        assert_eq!(
            stats,
            vec![
                "btcDominance", "ethDominance", "fearGreed", "marketCap", "marketCapChange",
                "volume24h", "volumeChange",
            ]
        );
    }

    #[test]
    fn failure_response_serializes_error_verbatim() {
        let json = serde_json::to_value(CaptureResponse::failure("timeout")).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": false, "error": "timeout" }));
    }
}
