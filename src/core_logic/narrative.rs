use crate::adapters::LanguageModelClient;
use crate::core_logic::models::{
    HistoricalRatioSeries, MarketSnapshot, PriceBar, Ratio, RatioSet, Statement, TrendResult,
};
use crate::core_logic::regression::linear_regression;
use crate::core_logic::trends::interpret_trend;
use crate::error::Result;
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub const ANALYST_PERSONA: &str =
    "You are a financial analyst with expertise in stock analysis and forecasting.";
pub const PRICE_TREND_NAME: &str = "Stock Price";
pub const MAX_SUMMARY_ROWS: usize = 5;

/// Serializes borrowed pairs as a JSON object, keeping their order.
struct OrderedMap<'a, K, V>(&'a [(K, V)]);

impl<K: Serialize, V: Serialize> Serialize for OrderedMap<'_, K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "NaN".to_string(),
    }
}

/// Text table of a statement: line items as rows, report dates as columns.
pub fn summarize_statement(statement: &Statement, max_rows: usize) -> String {
    let items = statement.line_items();
    if statement.is_empty() || items.is_empty() {
        return "No data available.".to_string();
    }

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(items.len().min(max_rows) + 1);
    let mut header = vec![String::new()];
    header.extend(statement.periods.iter().map(|p| {
        p.date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    }));
    rows.push(header);

    for item in items.iter().take(max_rows) {
        let mut row = vec![item.label().to_string()];
        row.extend(statement.periods.iter().map(|p| format_cell(p.get(*item))));
        rows.push(row);
    }

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().map(|r| r[c].len()).max().unwrap_or(0))
        .collect();

    let mut text = rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(c, cell)| {
                    if c == 0 {
                        format!("{:<width$}", cell, width = widths[c])
                    } else {
                        format!("{:>width$}", cell, width = widths[c])
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n");

    if items.len() > max_rows {
        text.push_str(&format!(
            "\n... [truncated, showing {} out of {} rows]",
            max_rows,
            items.len()
        ));
    }
    text
}

/// Pretty JSON of the first `max_items` pairs, with a truncation note.
pub fn summarize_pairs<K: Serialize, V: Serialize>(
    pairs: &[(K, V)],
    max_items: usize,
) -> Result<String> {
    let shown = &pairs[..pairs.len().min(max_items)];
    let mut text = serde_json::to_string_pretty(&OrderedMap(shown))?;
    if pairs.len() > max_items {
        text.push_str(&format!(
            "\n... [truncated, showing {} out of {} items]",
            max_items,
            pairs.len()
        ));
    }
    Ok(text)
}

fn ratio_pairs<V: Clone>(map: &BTreeMap<Ratio, V>) -> Vec<(&'static str, V)> {
    map.iter().map(|(r, v)| (r.name(), v.clone())).collect()
}

/// Trend of the closing prices over row position, interpreted as `Stock Price`.
pub fn price_interpretation(prices: &[PriceBar]) -> String {
    let closes: Vec<f64> = prices.iter().map(|bar| bar.close).collect();
    match linear_regression(&closes) {
        Some(trend) => interpret_trend(PRICE_TREND_NAME, &trend),
        None => "No historical price data available.".to_string(),
    }
}

pub struct NarrativeInput<'a> {
    pub ticker: &'a str,
    pub snapshot: &'a MarketSnapshot,
    pub latest_ratios: &'a RatioSet,
    pub historical_ratios: &'a HistoricalRatioSeries,
    pub trends: &'a BTreeMap<Ratio, TrendResult>,
    pub interpretations: &'a BTreeMap<Ratio, String>,
    pub price_interpretation: &'a str,
}

pub fn build_prompt(input: &NarrativeInput<'_>) -> Result<String> {
    let annual = &input.snapshot.annual;
    let historical: Vec<(String, &RatioSet)> = input
        .historical_ratios
        .entries
        .iter()
        .map(|entry| (entry.date.to_string(), &entry.ratios))
        .collect();
    let earnings: Vec<(String, Option<f64>)> = input
        .snapshot
        .earnings
        .iter()
        .map(|event| (event.date.to_string(), event.reported_eps))
        .collect();
    let price_trend = [(PRICE_TREND_NAME, input.price_interpretation)];

    Ok(format!(
        r#"Given the following financial data and ratios for the company with ticker symbol {ticker}:

Financials:
{financials}

Balance Sheet:
{balance_sheet}

Cashflow:
{cashflow}

Latest Ratios:
{latest}

Historical Ratios:
{historical}

Ratio Trends:
{trends}

Interpretations:
{interpretations}

Stock Price Trend:
{price_trend}

Recent Earnings (reported diluted EPS):
{earnings}

Please provide a detailed analysis including key points and insights, focusing on numerical data to enhance understanding.
Please provide a comprehensive analysis including:

1. Profitability Analysis
2. Liquidity and Solvency Analysis
3. Efficiency Analysis
4. Growth Analysis
5. Earnings Analysis
6. Trend Analysis
7. Financial Health Assessment
8. Historical Price analysis
9. Risk Assessment
10. Future Outlook and Forecasting

Format your response as HTML, with each section as an <h3> heading followed by <p> paragraphs for the analysis points.
Focus on the most recent data and significant trends. Provide detailed explanations and insights, supporting your analysis with specific data points from the provided financial information. Pay special attention to the trend interpretations and incorporate these insights throughout your analysis.
"#,
        ticker = input.ticker,
        financials = summarize_statement(&annual.income, MAX_SUMMARY_ROWS),
        balance_sheet = summarize_statement(&annual.balance_sheet, MAX_SUMMARY_ROWS),
        cashflow = summarize_statement(&annual.cash_flow, MAX_SUMMARY_ROWS),
        latest = summarize_pairs(&ratio_pairs(input.latest_ratios), MAX_SUMMARY_ROWS)?,
        historical = summarize_pairs(&historical, MAX_SUMMARY_ROWS)?,
        trends = summarize_pairs(&ratio_pairs(input.trends), MAX_SUMMARY_ROWS)?,
        interpretations = summarize_pairs(&ratio_pairs(input.interpretations), MAX_SUMMARY_ROWS)?,
        price_trend = summarize_pairs(&price_trend, MAX_SUMMARY_ROWS)?,
        earnings = summarize_pairs(&earnings, MAX_SUMMARY_ROWS)?,
    ))
}

pub struct NarrativeComposer {
    model: Arc<dyn LanguageModelClient>,
}

impl NarrativeComposer {
    pub fn new(model: Arc<dyn LanguageModelClient>) -> Self {
        Self { model }
    }

    /// Returns the model's text as-is. The prompt asks for HTML.
    pub async fn compose(&self, input: &NarrativeInput<'_>) -> Result<String> {
        let prompt = build_prompt(input)?;
        info!(
            "Requesting narrative for {} ({} prompt chars)",
            input.ticker,
            prompt.len()
        );
        self.model.complete(ANALYST_PERSONA, &prompt).await
    }
}
