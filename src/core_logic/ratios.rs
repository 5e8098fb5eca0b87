use crate::core_logic::models::{
    DatedRatios, FinancialPeriod, HistoricalRatioSeries, Ratio, RatioSet, Statements,
};

// Only missing inputs are guarded. A zero denominator still produces a value
// (inf or NaN) so the caller can see the degenerate period.
fn ratio_of(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    Some(numerator? / denominator?)
}

pub fn compute_ratios(
    financials: &FinancialPeriod,
    balance_sheet: &FinancialPeriod,
    cashflow: &FinancialPeriod,
) -> RatioSet {
    let net_income = financials.net_income;
    let total_revenue = financials.total_revenue;
    let gross_profit = financials.gross_profit;
    let total_assets = balance_sheet.total_assets;
    let total_equity = balance_sheet.stockholders_equity;
    let total_liabilities = balance_sheet.total_liabilities;
    let current_assets = balance_sheet.current_assets;
    let current_liabilities = balance_sheet.current_liabilities;
    let inventory = balance_sheet.inventory;
    let operating_cash_flow = cashflow.operating_cash_flow;

    let quick_assets = match (current_assets, inventory) {
        (Some(assets), Some(inventory)) => Some(assets - inventory),
        _ => None,
    };

    let candidates = [
        (Ratio::ProfitMargin, ratio_of(net_income, total_revenue)),
        (Ratio::ReturnOnAssets, ratio_of(net_income, total_assets)),
        (Ratio::ReturnOnEquity, ratio_of(net_income, total_equity)),
        (Ratio::DebtToEquity, ratio_of(total_liabilities, total_equity)),
        (Ratio::CurrentRatio, ratio_of(current_assets, current_liabilities)),
        (
            Ratio::OperatingCashFlowToNetIncome,
            ratio_of(operating_cash_flow, net_income),
        ),
        (Ratio::AssetTurnover, ratio_of(total_revenue, total_assets)),
        (Ratio::QuickRatio, ratio_of(quick_assets, current_liabilities)),
        (Ratio::GrossMargin, ratio_of(gross_profit, total_revenue)),
    ];

    candidates
        .into_iter()
        .filter_map(|(ratio, value)| value.map(|v| (ratio, v)))
        .collect()
}

/// Ratios from the first (most recent) period of each statement, matched by
/// position rather than by date.
pub fn compute_latest_ratios(statements: &Statements) -> RatioSet {
    let empty = FinancialPeriod::empty();
    compute_ratios(
        statements.income.latest().unwrap_or(&empty),
        statements.balance_sheet.latest().unwrap_or(&empty),
        statements.cash_flow.latest().unwrap_or(&empty),
    )
}

pub fn compute_historical_ratios(statements: &Statements) -> HistoricalRatioSeries {
    let empty = FinancialPeriod::empty();
    let mut entries = Vec::new();

    for period in &statements.income.periods {
        let Some(date) = period.date else {
            continue;
        };
        let balance_sheet = statements.balance_sheet.period_on(date).unwrap_or(&empty);
        let cashflow = statements.cash_flow.period_on(date).unwrap_or(&empty);

        let ratios = compute_ratios(period, balance_sheet, cashflow);
        if !ratios.is_empty() && !entries.iter().any(|e: &DatedRatios| e.date == date) {
            entries.push(DatedRatios { date, ratios });
        }
    }

    HistoricalRatioSeries { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_logic::models::{LineItem, Statement, StatementKind};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn full_period() -> (FinancialPeriod, FinancialPeriod, FinancialPeriod) {
        let financials = FinancialPeriod::empty()
            .with(LineItem::NetIncome, 100.0)
            .with(LineItem::TotalRevenue, 1000.0)
            .with(LineItem::GrossProfit, 400.0);
        let balance_sheet = FinancialPeriod::empty()
            .with(LineItem::TotalAssets, 2000.0)
            .with(LineItem::StockholdersEquity, 500.0)
            .with(LineItem::TotalLiabilities, 1500.0)
            .with(LineItem::CurrentAssets, 600.0)
            .with(LineItem::CurrentLiabilities, 300.0)
            .with(LineItem::Inventory, 150.0);
        let cashflow = FinancialPeriod::empty().with(LineItem::OperatingCashFlow, 120.0);
        (financials, balance_sheet, cashflow)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_compute_ratios_all_present() {
        let (financials, balance_sheet, cashflow) = full_period();
        let ratios = compute_ratios(&financials, &balance_sheet, &cashflow);

        assert_eq!(ratios.len(), 9);
        assert_abs_diff_eq!(ratios[&Ratio::ProfitMargin], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(ratios[&Ratio::ReturnOnAssets], 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(ratios[&Ratio::ReturnOnEquity], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(ratios[&Ratio::DebtToEquity], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ratios[&Ratio::CurrentRatio], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            ratios[&Ratio::OperatingCashFlowToNetIncome],
            1.2,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(ratios[&Ratio::AssetTurnover], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ratios[&Ratio::QuickRatio], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ratios[&Ratio::GrossMargin], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_total_assets_drops_dependent_ratios_only() {
        let (financials, mut balance_sheet, cashflow) = full_period();
        balance_sheet.set(LineItem::TotalAssets, None);

        let ratios = compute_ratios(&financials, &balance_sheet, &cashflow);

        assert!(!ratios.contains_key(&Ratio::ReturnOnAssets));
        assert!(!ratios.contains_key(&Ratio::AssetTurnover));
        assert_eq!(ratios.len(), 7);
        assert!(ratios.contains_key(&Ratio::ProfitMargin));
        assert!(ratios.contains_key(&Ratio::QuickRatio));
    }

    #[test]
    fn test_missing_inventory_drops_quick_ratio() {
        let (financials, mut balance_sheet, cashflow) = full_period();
        balance_sheet.set(LineItem::Inventory, None);

        let ratios = compute_ratios(&financials, &balance_sheet, &cashflow);

        assert!(!ratios.contains_key(&Ratio::QuickRatio));
        assert!(ratios.contains_key(&Ratio::CurrentRatio));
    }

    #[test]
    fn test_operands_read_from_their_own_statement() {
        let (financials, _, _) = full_period();
        let financials = FinancialPeriod {
            total_assets: Some(10.0),
            operating_cash_flow: Some(10.0),
            ..financials
        };
        let empty = FinancialPeriod::empty();

        let ratios = compute_ratios(&financials, &empty, &empty);
        assert!(!ratios.contains_key(&Ratio::ReturnOnAssets));
        assert!(!ratios.contains_key(&Ratio::OperatingCashFlowToNetIncome));
        assert!(ratios.contains_key(&Ratio::ProfitMargin));
    }

    #[test]
    fn test_zero_denominator_kept_as_non_finite() {
        let financials = FinancialPeriod::empty()
            .with(LineItem::NetIncome, 100.0)
            .with(LineItem::TotalRevenue, 0.0)
            .with(LineItem::GrossProfit, 0.0);

        let ratios = compute_ratios(
            &financials,
            &FinancialPeriod::empty(),
            &FinancialPeriod::empty(),
        );

        assert!(ratios[&Ratio::ProfitMargin].is_infinite());
        assert!(ratios[&Ratio::GrossMargin].is_nan());
    }

    #[test]
    fn test_empty_inputs_yield_empty_set() {
        let empty = FinancialPeriod::empty();
        assert!(compute_ratios(&empty, &empty, &empty).is_empty());
    }

    #[test]
    fn test_compute_ratios_is_deterministic() {
        let (financials, balance_sheet, cashflow) = full_period();
        let first = compute_ratios(&financials, &balance_sheet, &cashflow);
        let second = compute_ratios(&financials, &balance_sheet, &cashflow);

        assert_eq!(first.len(), second.len());
        for (ratio, value) in &first {
            assert_eq!(value.to_bits(), second[ratio].to_bits());
        }
    }

    #[test]
    fn test_compute_latest_ratios_uses_first_column() {
        let statements = Statements {
            income: Statement::new(
                StatementKind::Income,
                vec![
                    FinancialPeriod::new(date(2023, 12, 31))
                        .with(LineItem::NetIncome, 30.0)
                        .with(LineItem::TotalRevenue, 100.0),
                    FinancialPeriod::new(date(2022, 12, 31))
                        .with(LineItem::NetIncome, 10.0)
                        .with(LineItem::TotalRevenue, 100.0),
                ],
            ),
            ..Default::default()
        };

        let ratios = compute_latest_ratios(&statements);
        assert_eq!(ratios.len(), 1);
        assert_abs_diff_eq!(ratios[&Ratio::ProfitMargin], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_compute_historical_ratios_filters_empty_periods() {
        let statements = Statements {
            income: Statement::new(
                StatementKind::Income,
                vec![
                    FinancialPeriod::new(date(2023, 12, 31))
                        .with(LineItem::NetIncome, 30.0)
                        .with(LineItem::TotalRevenue, 100.0),
                    FinancialPeriod::new(date(2022, 12, 31)).with(LineItem::NetIncome, 20.0),
                    FinancialPeriod::new(date(2021, 12, 31))
                        .with(LineItem::NetIncome, 10.0)
                        .with(LineItem::TotalRevenue, 100.0),
                ],
            ),
            balance_sheet: Statement::new(
                StatementKind::BalanceSheet,
                vec![FinancialPeriod::new(date(2021, 12, 31)).with(LineItem::TotalAssets, 200.0)],
            ),
            ..Default::default()
        };

        let series = compute_historical_ratios(&statements);

        assert_eq!(series.len(), 2);
        assert_eq!(series.entries[0].date, date(2023, 12, 31));
        assert_eq!(series.entries[1].date, date(2021, 12, 31));
        assert_eq!(series.entries[0].ratios.len(), 1);
        // 2021 picks up its matching balance sheet column.
        assert_abs_diff_eq!(
            series.entries[1].ratios[&Ratio::ReturnOnAssets],
            0.05,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_compute_historical_ratios_empty_when_nothing_computes() {
        let statements = Statements {
            income: Statement::new(
                StatementKind::Income,
                vec![FinancialPeriod::new(date(2023, 12, 31)).with(LineItem::NetIncome, 1.0)],
            ),
            ..Default::default()
        };

        assert!(compute_historical_ratios(&statements).is_empty());
    }
}
