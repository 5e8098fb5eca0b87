use crate::adapters::MarketDataClient;
use crate::core_logic::models::{
    EarningsEvent, FinancialPeriod, LineItem, MarketSnapshot, PriceBar, Statement,
    StatementKind, Statements,
};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const STATEMENT_LOOKBACK_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Annual,
    Quarterly,
}

impl Frequency {
    fn prefix(self) -> &'static str {
        match self {
            Frequency::Annual => "annual",
            Frequency::Quarterly => "quarterly",
        }
    }
}

#[derive(Deserialize, Debug)]
struct TimeseriesResponse {
    timeseries: TimeseriesBody,
}

#[derive(Deserialize, Debug)]
struct TimeseriesBody {
    #[serde(default)]
    result: Option<Vec<TimeseriesResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct TimeseriesResult {
    meta: TimeseriesMeta,
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

#[derive(Deserialize, Debug)]
struct TimeseriesMeta {
    #[serde(rename = "type", default)]
    types: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Deserialize, Debug)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Deserialize, Debug)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Deserialize, Debug)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Numbers pass through, numeric strings are parsed, anything else is absent.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub struct YahooFinanceClient {
    http: reqwest::Client,
    base_url: Url,
}

fn invalid_base_url(base_url: &str) -> AppError {
    AppError::InvalidConfig {
        key: "YAHOO_BASE_URL",
        value: base_url.to_string(),
    }
}

impl YahooFinanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|_| invalid_base_url(base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid_base_url(base_url.as_str()));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Appends `path` and then the ticker as a single percent-encoded segment,
    /// so `/`, `?` and `#` in a ticker cannot escape the endpoint.
    fn endpoint(&self, path: &[&str], ticker: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| invalid_base_url(self.base_url.as_str()))?
            .pop_if_empty()
            .extend(path)
            .push(ticker);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        debug!("GET {}", url);
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Upstream {
                service: "Yahoo Finance",
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_statements(&self, ticker: &str, frequency: Frequency) -> Result<Statements> {
        let url = self.endpoint(
            &["ws", "fundamentals-timeseries", "v1", "finance", "timeseries"],
            ticker,
        )?;
        let types = LineItem::ALL
            .iter()
            .map(|item| format!("{}{}", frequency.prefix(), item.source_key()))
            .collect::<Vec<_>>()
            .join(",");
        let now = Utc::now();
        let start = now - ChronoDuration::days(STATEMENT_LOOKBACK_DAYS);

        let response: TimeseriesResponse = self
            .get_json(
                url,
                &[
                    ("symbol", ticker.to_string()),
                    ("type", types),
                    ("period1", start.timestamp().to_string()),
                    ("period2", now.timestamp().to_string()),
                ],
            )
            .await?;

        if let Some(error) = response.timeseries.error.filter(|e| !e.is_null()) {
            return Err(AppError::MalformedResponse(format!(
                "timeseries error for {}: {}",
                ticker, error
            )));
        }

        let statements =
            parse_statements(&response.timeseries.result.unwrap_or_default(), frequency);
        debug!(
            "{} {:?}: {} income, {} balance sheet, {} cash flow periods",
            ticker,
            frequency,
            statements.income.periods.len(),
            statements.balance_sheet.periods.len(),
            statements.cash_flow.periods.len()
        );
        Ok(statements)
    }

    pub async fn fetch_prices(&self, ticker: &str, period: &str) -> Result<Vec<PriceBar>> {
        let url = self.endpoint(&["v8", "finance", "chart"], ticker)?;
        let response: ChartResponse = self
            .get_json(
                url,
                &[("range", period.to_string()), ("interval", "1d".to_string())],
            )
            .await?;

        if let Some(error) = response.chart.error {
            return Err(AppError::MalformedResponse(format!(
                "chart error for {}: {} ({})",
                ticker, error.description, error.code
            )));
        }

        let prices = match response.chart.result.and_then(|r| r.into_iter().next()) {
            Some(result) => parse_prices(result),
            None => Vec::new(),
        };
        debug!("{}: {} daily closes", ticker, prices.len());
        Ok(prices)
    }
}

#[async_trait]
impl MarketDataClient for YahooFinanceClient {
    async fn fetch_snapshot(&self, ticker: &str, period: &str) -> Result<MarketSnapshot> {
        let (annual, quarterly, prices) = futures::try_join!(
            self.fetch_statements(ticker, Frequency::Annual),
            self.fetch_statements(ticker, Frequency::Quarterly),
            self.fetch_prices(ticker, period),
        )?;

        if annual.income.is_empty() {
            warn!("{}: no annual income statement returned", ticker);
        }

        let earnings = earnings_events(&quarterly);
        Ok(MarketSnapshot {
            annual,
            quarterly,
            earnings,
            prices,
        })
    }
}

fn parse_statements(results: &[TimeseriesResult], frequency: Frequency) -> Statements {
    let mut by_kind: HashMap<StatementKind, BTreeMap<NaiveDate, FinancialPeriod>> = HashMap::new();

    for result in results {
        for field in &result.meta.types {
            let Some(item) = field
                .strip_prefix(frequency.prefix())
                .and_then(LineItem::from_source_key)
            else {
                continue;
            };
            let Some(Value::Array(points)) = result.fields.get(field) else {
                continue;
            };

            for point in points {
                let Some(date) = point
                    .get("asOfDate")
                    .and_then(Value::as_str)
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                else {
                    continue;
                };
                let value = point
                    .get("reportedValue")
                    .and_then(|v| v.get("raw"))
                    .and_then(numeric);

                by_kind
                    .entry(item.statement())
                    .or_default()
                    .entry(date)
                    .or_insert_with(|| FinancialPeriod::new(date))
                    .set(item, value);
            }
        }
    }

    let mut statement = |kind: StatementKind| {
        let periods: Vec<FinancialPeriod> = by_kind
            .remove(&kind)
            .map(|periods| periods.into_values().rev().collect())
            .unwrap_or_default();
        Statement::new(kind, periods)
    };

    Statements {
        income: statement(StatementKind::Income),
        balance_sheet: statement(StatementKind::BalanceSheet),
        cash_flow: statement(StatementKind::CashFlow),
    }
}

fn parse_prices(result: ChartResult) -> Vec<PriceBar> {
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .unwrap_or_default();

    result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(timestamp, close)| {
            let date = DateTime::<Utc>::from_timestamp(*timestamp, 0)?.date_naive();
            Some(PriceBar {
                date,
                close: close?,
            })
        })
        .collect()
}

fn earnings_events(quarterly: &Statements) -> Vec<EarningsEvent> {
    quarterly
        .income
        .periods
        .iter()
        .filter_map(|period| {
            Some(EarningsEvent {
                date: period.date?,
                reported_eps: period.diluted_eps,
            })
        })
        .collect()
}
