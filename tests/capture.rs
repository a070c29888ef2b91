use std::time::Duration;

use chrono::Utc;
use scraper::Html;

use market_snap::{
    capture, capture_document, extract_table, CaptureConfig, CaptureResponse, ExtractionError,
    FileSource, StaticSource, WaitConfig,
};

const FIXTURE: &str = include_str!("fixtures/cmc_top.html");

fn fixture() -> Html {
    Html::parse_document(FIXTURE)
}

fn fixture_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn symbols(coins: &[market_snap::CoinRecord]) -> Vec<&str> {
    coins.iter().map(|c| c.symbol.as_str()).collect()
}

#[test]
fn extracts_coin_rows_from_top_page() {
    let table = extract_table(&fixture(), 10).unwrap();
    assert_eq!(symbols(&table.coins), vec!["BTC", "ETH", "USDT", "SOL", "USDC", "DOGE"]);

    let btc = &table.coins[0];
    assert_eq!(btc.rank, "1");
    assert_eq!(btc.name, "Bitcoin");
    assert_eq!(btc.price, "$63,201.40");
    assert_eq!(btc.change_1h, "0.44%");
    assert_eq!(btc.change_24h, "+1.20%");
    assert_eq!(btc.change_7d, "-3.40%");
    assert_eq!(btc.change_30d, "");

    let doge = &table.coins[5];
    assert_eq!(doge.rank, "6");
    assert_eq!(doge.name, "Dogecoin");
    assert_eq!(doge.change_24h, "-5.12%");

    let columns = table.table_columns;
    assert!(columns.has_1h && columns.has_24h && columns.has_7d);
    assert!(!columns.has_30d && !columns.has_90d);
}

#[test]
fn row_limit_skips_empty_rows() {
    let table = extract_table(&fixture(), 4).unwrap();
    assert_eq!(symbols(&table.coins), vec!["BTC", "ETH", "USDT", "SOL"]);

    let table = extract_table(&fixture(), 0).unwrap();
    assert!(table.coins.is_empty());
    assert!(table.table_columns.has_24h);
}

#[test]
fn header_with_reordered_and_missing_columns() {
    let html = r#"
        <table>
          <thead><tr><th>#</th><th>Name</th><th>Price</th><th>24h %</th><th>7d %</th></tr></thead>
          <tbody><tr><td>1</td><td>Bitcoin BTC</td><td>$63,201.40</td><td>+1.20%</td><td>-3.40%</td></tr></tbody>
        </table>"#;
    let table = extract_table(&Html::parse_document(html), 10).unwrap();
    let coin = &table.coins[0];
    assert_eq!(coin.name, "Bitcoin");
    assert_eq!(coin.symbol, "BTC");
    assert_eq!(coin.price, "$63,201.40");
    assert_eq!(coin.change_24h, "+1.20%");
    assert_eq!(coin.change_7d, "-3.40%");
    assert_eq!(coin.change_1h, "");
    assert!(table.table_columns.has_24h);
    assert!(!table.table_columns.has_1h);
}

#[test]
fn short_rows_default_missing_cells() {
    let html = r#"
        <table>
          <thead><tr><th>#</th><th>Name</th><th>Price</th><th>1h %</th><th>24h %</th></tr></thead>
          <tbody>
            <tr><td>1</td><td>Bitcoin BTC</td></tr>
            <tr><td>2</td><td>Ethereum ETH</td><td></td><td>n/a</td><td>2%</td></tr>
          </tbody>
        </table>"#;
    let table = extract_table(&Html::parse_document(html), 10).unwrap();
    assert_eq!(table.coins.len(), 2);
    assert_eq!(table.coins[0].price, "");
    assert_eq!(table.coins[0].change_24h, "");
    assert_eq!(table.coins[1].change_1h, "");
    assert_eq!(table.coins[1].change_24h, "2%");
    assert!(table.table_columns.has_1h);
}

#[test]
fn missing_table_fails_without_snapshot() {
    let document = Html::parse_document(include_str!("fixtures/loading.html"));
    let err = extract_table(&document, 10).unwrap_err();
    assert_eq!(err, ExtractionError::TableNotFound);
    assert_eq!(err.to_string(), "table not found");

    let result = capture_document(&document, 10, Utc::now());
    assert!(matches!(result, Err(ExtractionError::TableNotFound)));
}

#[test]
fn snapshot_combines_stats_table_and_movers() {
    let snapshot = capture_document(&fixture(), 10, Utc::now()).unwrap();

    let stats = snapshot.stats();
    assert_eq!(stats.market_cap, "$2.31T");
    assert_eq!(stats.market_cap_change, "1.84%");
    assert_eq!(stats.volume_24h, "$84.2B");
    assert_eq!(stats.volume_change, "-12.01%");
    assert_eq!(stats.btc_dominance, "BTC: 54.1%");
    assert_eq!(stats.eth_dominance, "ETH: 16.9%");
    assert_eq!(stats.fear_greed, "71/100");

    assert_eq!(snapshot.coins().len(), 6);
    assert_eq!(symbols(&snapshot.movers().gainers), vec!["SOL", "BTC", "ETH"]);
    assert_eq!(symbols(&snapshot.movers().losers), vec!["DOGE", "ETH", "BTC"]);
    assert!(snapshot.missing_fields().is_empty());
}

#[test]
fn page_without_stats_bar_still_yields_coins() {
    let html = FIXTURE.replace(r#"data-test="global-stats""#, r#"data-test="other""#);
    let snapshot = capture_document(&Html::parse_document(&html), 10, Utc::now()).unwrap();
    assert_eq!(snapshot.stats().market_cap, "");
    assert_eq!(snapshot.stats().fear_greed, "");
    assert_eq!(snapshot.coins().len(), 6);
    assert_eq!(snapshot.missing_fields(), vec!["Market Cap", "Fear & Greed"]);
}

#[test]
fn response_json_shape() {
    let snapshot = capture_document(&fixture(), 2, Utc::now()).unwrap();
    let json = serde_json::to_value(CaptureResponse::success(snapshot)).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["data"]["source"], "coinmarketcap.com");
    assert_eq!(json["data"]["marketCap"], "$2.31T");
    assert_eq!(json["data"]["fearGreed"], "71/100");
    assert_eq!(json["data"]["btcDominance"], "BTC: 54.1%");
    assert_eq!(json["data"]["coins"][0]["change24h"], "+1.20%");
    assert_eq!(json["data"]["coins"][1]["symbol"], "ETH");
    assert_eq!(json["data"]["tableColumns"]["has7d"], true);
    assert_eq!(json["data"]["tableColumns"]["has30d"], false);
    assert_eq!(json["data"]["movers"]["gainers"][0]["symbol"], "BTC");
    assert!(json["data"]["capturedAt"].is_string());
    assert!(json["data"].get("market_cap").is_none());

    let failed: CaptureResponse = Err::<market_snap::MarketSnapshot, _>(ExtractionError::Timeout).into();
    let json = serde_json::to_value(failed).unwrap();
    assert_eq!(json, serde_json::json!({ "ok": false, "error": "timeout" }));
}

#[tokio::test]
async fn captures_from_saved_page() {
    let source = FileSource::new(fixture_path("cmc_top.html"));
    let snapshot = capture(&source, &CaptureConfig::default()).await.unwrap();
    assert_eq!(snapshot.coins()[0].symbol, "BTC");
    assert_eq!(snapshot.source(), "coinmarketcap.com");
}

#[tokio::test]
async fn page_that_never_loads_times_out() {
    let config = CaptureConfig {
        wait: WaitConfig {
            timeout: Duration::from_millis(120),
            poll_interval: Duration::from_millis(20),
        },
        row_limit: 10,
    };
    let source = FileSource::new(fixture_path("loading.html"));
    let err = capture(&source, &config).await.unwrap_err();
    assert_eq!(err, ExtractionError::Timeout);
}

#[tokio::test]
async fn in_memory_page_respects_row_limit() {
    let config = CaptureConfig {
        row_limit: 3,
        ..CaptureConfig::default()
    };
    let snapshot = capture(&StaticSource(FIXTURE.to_string()), &config).await.unwrap();
    assert_eq!(snapshot.coins().len(), 3);
}
