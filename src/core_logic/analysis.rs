use crate::adapters::MarketDataClient;
use crate::core_logic::models::{HistoricalRatioSeries, Ratio, RatioSet, TrendResult};
use crate::core_logic::narrative::{price_interpretation, NarrativeComposer, NarrativeInput};
use crate::core_logic::ratios::{compute_historical_ratios, compute_latest_ratios};
use crate::core_logic::trends::{compute_trends, interpret};
use crate::error::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct StockReport {
    pub ticker: String,
    pub latest_ratios: RatioSet,
    pub historical_ratios: HistoricalRatioSeries,
    pub trends: BTreeMap<Ratio, TrendResult>,
    pub interpretations: BTreeMap<Ratio, String>,
    pub price_interpretation: String,
    pub narrative: String,
}

/// Fetch, compute and narrate in one pass. Any failure aborts the whole report.
pub async fn analyze_stock(
    market: &dyn MarketDataClient,
    composer: &NarrativeComposer,
    ticker: &str,
    period: &str,
) -> Result<StockReport> {
    let snapshot = market.fetch_snapshot(ticker, period).await?;
    info!(
        "Fetched {}: {} annual periods, {} quarterly periods, {} earnings events, {} prices",
        ticker,
        snapshot.annual.income.periods.len(),
        snapshot.quarterly.income.periods.len(),
        snapshot.earnings.len(),
        snapshot.prices.len()
    );

    let latest_ratios = compute_latest_ratios(&snapshot.annual);
    let historical_ratios = compute_historical_ratios(&snapshot.annual);
    if historical_ratios.is_empty() {
        warn!("{}: no reporting period produced any ratio", ticker);
    }
    let trends = compute_trends(&historical_ratios);
    let interpretations = interpret(&trends);
    let price_interpretation = price_interpretation(&snapshot.prices);
    debug!(
        "{}: {} latest ratios, {} dated ratio sets, {} trends",
        ticker,
        latest_ratios.len(),
        historical_ratios.len(),
        trends.len()
    );

    let narrative = composer
        .compose(&NarrativeInput {
            ticker,
            snapshot: &snapshot,
            latest_ratios: &latest_ratios,
            historical_ratios: &historical_ratios,
            trends: &trends,
            interpretations: &interpretations,
            price_interpretation: &price_interpretation,
        })
        .await?;

    Ok(StockReport {
        ticker: ticker.to_string(),
        latest_ratios,
        historical_ratios,
        trends,
        interpretations,
        price_interpretation,
        narrative,
    })
}
