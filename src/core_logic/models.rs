use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Income,
    BalanceSheet,
    CashFlow,
}

/// Statement line items, in the row order used when summarizing a statement.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineItem {
    TotalRevenue,
    GrossProfit,
    OperatingIncome,
    NetIncome,
    DilutedEps,
    TotalAssets,
    TotalLiabilities,
    StockholdersEquity,
    CurrentAssets,
    CurrentLiabilities,
    Inventory,
    OperatingCashFlow,
    CapitalExpenditure,
    FreeCashFlow,
}

impl LineItem {
    pub const ALL: [LineItem; 14] = [
        LineItem::TotalRevenue,
        LineItem::GrossProfit,
        LineItem::OperatingIncome,
        LineItem::NetIncome,
        LineItem::DilutedEps,
        LineItem::TotalAssets,
        LineItem::TotalLiabilities,
        LineItem::StockholdersEquity,
        LineItem::CurrentAssets,
        LineItem::CurrentLiabilities,
        LineItem::Inventory,
        LineItem::OperatingCashFlow,
        LineItem::CapitalExpenditure,
        LineItem::FreeCashFlow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LineItem::TotalRevenue => "Total Revenue",
            LineItem::GrossProfit => "Gross Profit",
            LineItem::OperatingIncome => "Operating Income",
            LineItem::NetIncome => "Net Income",
            LineItem::DilutedEps => "Diluted EPS",
            LineItem::TotalAssets => "Total Assets",
            LineItem::TotalLiabilities => "Total Liabilities Net Minority Interest",
            LineItem::StockholdersEquity => "Stockholders Equity",
            LineItem::CurrentAssets => "Current Assets",
            LineItem::CurrentLiabilities => "Current Liabilities",
            LineItem::Inventory => "Inventory",
            LineItem::OperatingCashFlow => "Operating Cash Flow",
            LineItem::CapitalExpenditure => "Capital Expenditure",
            LineItem::FreeCashFlow => "Free Cash Flow",
        }
    }

    /// Field name used by the fundamentals time-series endpoint, without the
    /// `annual`/`quarterly` prefix.
    pub fn source_key(self) -> &'static str {
        match self {
            LineItem::TotalRevenue => "TotalRevenue",
            LineItem::GrossProfit => "GrossProfit",
            LineItem::OperatingIncome => "OperatingIncome",
            LineItem::NetIncome => "NetIncome",
            LineItem::DilutedEps => "DilutedEPS",
            LineItem::TotalAssets => "TotalAssets",
            LineItem::TotalLiabilities => "TotalLiabilitiesNetMinorityInterest",
            LineItem::StockholdersEquity => "StockholdersEquity",
            LineItem::CurrentAssets => "CurrentAssets",
            LineItem::CurrentLiabilities => "CurrentLiabilities",
            LineItem::Inventory => "Inventory",
            LineItem::OperatingCashFlow => "OperatingCashFlow",
            LineItem::CapitalExpenditure => "CapitalExpenditure",
            LineItem::FreeCashFlow => "FreeCashFlow",
        }
    }

    pub fn from_source_key(key: &str) -> Option<LineItem> {
        LineItem::ALL
            .iter()
            .copied()
            .find(|item| item.source_key() == key)
    }

    pub fn statement(self) -> StatementKind {
        match self {
            LineItem::TotalRevenue
            | LineItem::GrossProfit
            | LineItem::OperatingIncome
            | LineItem::NetIncome
            | LineItem::DilutedEps => StatementKind::Income,
            LineItem::TotalAssets
            | LineItem::TotalLiabilities
            | LineItem::StockholdersEquity
            | LineItem::CurrentAssets
            | LineItem::CurrentLiabilities
            | LineItem::Inventory => StatementKind::BalanceSheet,
            LineItem::OperatingCashFlow
            | LineItem::CapitalExpenditure
            | LineItem::FreeCashFlow => StatementKind::CashFlow,
        }
    }
}

/// One report date of a statement. Line items the source omitted are `None`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct FinancialPeriod {
    pub date: Option<NaiveDate>,
    pub total_revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub diluted_eps: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub stockholders_equity: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub inventory: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

impl FinancialPeriod {
    pub fn new(date: NaiveDate) -> Self {
        FinancialPeriod {
            date: Some(date),
            ..Default::default()
        }
    }

    /// A period with no date and no line items.
    pub fn empty() -> Self {
        FinancialPeriod::default()
    }

    pub fn get(&self, item: LineItem) -> Option<f64> {
        *self.slot(item)
    }

    pub fn set(&mut self, item: LineItem, value: Option<f64>) {
        *self.slot_mut(item) = value;
    }

    #[cfg(test)]
    pub fn with(mut self, item: LineItem, value: f64) -> Self {
        self.set(item, Some(value));
        self
    }

    fn slot(&self, item: LineItem) -> &Option<f64> {
        match item {
            LineItem::TotalRevenue => &self.total_revenue,
            LineItem::GrossProfit => &self.gross_profit,
            LineItem::OperatingIncome => &self.operating_income,
            LineItem::NetIncome => &self.net_income,
            LineItem::DilutedEps => &self.diluted_eps,
            LineItem::TotalAssets => &self.total_assets,
            LineItem::TotalLiabilities => &self.total_liabilities,
            LineItem::StockholdersEquity => &self.stockholders_equity,
            LineItem::CurrentAssets => &self.current_assets,
            LineItem::CurrentLiabilities => &self.current_liabilities,
            LineItem::Inventory => &self.inventory,
            LineItem::OperatingCashFlow => &self.operating_cash_flow,
            LineItem::CapitalExpenditure => &self.capital_expenditure,
            LineItem::FreeCashFlow => &self.free_cash_flow,
        }
    }

    fn slot_mut(&mut self, item: LineItem) -> &mut Option<f64> {
        match item {
            LineItem::TotalRevenue => &mut self.total_revenue,
            LineItem::GrossProfit => &mut self.gross_profit,
            LineItem::OperatingIncome => &mut self.operating_income,
            LineItem::NetIncome => &mut self.net_income,
            LineItem::DilutedEps => &mut self.diluted_eps,
            LineItem::TotalAssets => &mut self.total_assets,
            LineItem::TotalLiabilities => &mut self.total_liabilities,
            LineItem::StockholdersEquity => &mut self.stockholders_equity,
            LineItem::CurrentAssets => &mut self.current_assets,
            LineItem::CurrentLiabilities => &mut self.current_liabilities,
            LineItem::Inventory => &mut self.inventory,
            LineItem::OperatingCashFlow => &mut self.operating_cash_flow,
            LineItem::CapitalExpenditure => &mut self.capital_expenditure,
            LineItem::FreeCashFlow => &mut self.free_cash_flow,
        }
    }
}

/// Periods of one statement, most recent first.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub periods: Vec<FinancialPeriod>,
}

impl Statement {
    pub fn new(kind: StatementKind, periods: Vec<FinancialPeriod>) -> Self {
        Statement { kind, periods }
    }

    pub fn latest(&self) -> Option<&FinancialPeriod> {
        self.periods.first()
    }

    pub fn period_on(&self, date: NaiveDate) -> Option<&FinancialPeriod> {
        self.periods.iter().find(|p| p.date == Some(date))
    }

    /// Line items that belong to this statement and have at least one value.
    pub fn line_items(&self) -> Vec<LineItem> {
        LineItem::ALL
            .iter()
            .copied()
            .filter(|item| item.statement() == self.kind)
            .filter(|item| self.periods.iter().any(|p| p.get(*item).is_some()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Statements {
    pub income: Statement,
    pub balance_sheet: Statement,
    pub cash_flow: Statement,
}

impl Default for Statements {
    fn default() -> Self {
        Statements {
            income: Statement::new(StatementKind::Income, Vec::new()),
            balance_sheet: Statement::new(StatementKind::BalanceSheet, Vec::new()),
            cash_flow: Statement::new(StatementKind::CashFlow, Vec::new()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EarningsEvent {
    pub date: NaiveDate,
    pub reported_eps: Option<f64>,
}

/// Everything fetched for one ticker in a single request.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    pub annual: Statements,
    pub quarterly: Statements,
    pub earnings: Vec<EarningsEvent>,
    pub prices: Vec<PriceBar>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ratio {
    #[serde(rename = "Profit Margin")]
    ProfitMargin,
    #[serde(rename = "ROA")]
    ReturnOnAssets,
    #[serde(rename = "ROE")]
    ReturnOnEquity,
    #[serde(rename = "Debt to Equity")]
    DebtToEquity,
    #[serde(rename = "Current Ratio")]
    CurrentRatio,
    #[serde(rename = "Operating Cash Flow to Net Income")]
    OperatingCashFlowToNetIncome,
    #[serde(rename = "Asset Turnover")]
    AssetTurnover,
    #[serde(rename = "Quick Ratio")]
    QuickRatio,
    #[serde(rename = "Gross Margin")]
    GrossMargin,
}

impl Ratio {
    pub fn name(self) -> &'static str {
        match self {
            Ratio::ProfitMargin => "Profit Margin",
            Ratio::ReturnOnAssets => "ROA",
            Ratio::ReturnOnEquity => "ROE",
            Ratio::DebtToEquity => "Debt to Equity",
            Ratio::CurrentRatio => "Current Ratio",
            Ratio::OperatingCashFlowToNetIncome => "Operating Cash Flow to Net Income",
            Ratio::AssetTurnover => "Asset Turnover",
            Ratio::QuickRatio => "Quick Ratio",
            Ratio::GrossMargin => "Gross Margin",
        }
    }
}

pub type RatioSet = BTreeMap<Ratio, f64>;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DatedRatios {
    pub date: NaiveDate,
    pub ratios: RatioSet,
}

/// Ratio sets per report date, in the order the financials listed them.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct HistoricalRatioSeries {
    pub entries: Vec<DatedRatios>,
}

impl HistoricalRatioSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TrendResult {
    pub slope: f64,
    pub r_squared: f64,
    pub p_value: f64,
}
