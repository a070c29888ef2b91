use std::time::Duration;

use chrono::Utc;
use scraper::Html;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{info, trace};

use crate::config::{CaptureConfig, WaitConfig};
use crate::error::ExtractionError;
use crate::extract::{capture_document, has_table};
use crate::fetch::DocumentSource;
use crate::model::MarketSnapshot;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Poll `source` until its HTML holds a table. The first check happens
/// immediately; the pending tick is dropped as soon as the wait settles.
/// A zero poll interval is raised to one millisecond.
pub async fn wait_for_table<S: DocumentSource>(
    source: &S,
    config: WaitConfig,
) -> Result<String, ExtractionError> {
    let poll = async {
        let mut ticker = interval(config.poll_interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts = 0u32;
        loop {
            ticker.tick().await;
            attempts += 1;
            let html = match source.fetch().await {
                Ok(html) => html,
                Err(err) => return Err(ExtractionError::Source(format!("{err:#}"))),
            };
            if has_table(&html) {
                trace!(attempts, "table present");
                return Ok(html);
            }
            trace!(attempts, "table not present yet");
        }
    };

    timeout(config.timeout, poll)
        .await
        .map_err(|_| ExtractionError::Timeout)?
}

/// Wait for the table, then extract one snapshot stamped with the current time.
pub async fn capture<S: DocumentSource>(
    source: &S,
    config: &CaptureConfig,
) -> Result<MarketSnapshot, ExtractionError> {
    let html = wait_for_table(source, config.wait).await?;
    let document = Html::parse_document(&html);
    let snapshot = capture_document(&document, config.row_limit, Utc::now())?;
    info!(
        coins = snapshot.coins().len(),
        gainers = snapshot.movers().gainers.len(),
        losers = snapshot.movers().losers.len(),
        "capture complete"
    );
    Ok(snapshot)
}
