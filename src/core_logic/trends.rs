use crate::core_logic::models::{HistoricalRatioSeries, Ratio, TrendResult};
use crate::core_logic::regression::linear_regression;
use std::collections::BTreeMap;
use tracing::debug;

const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Fits a trend per ratio across the series, oldest date first.
///
/// Only ratios present on the earliest date are considered. Missing and
/// non-finite values are dropped before fitting, so indices stay contiguous.
pub fn compute_trends(series: &HistoricalRatioSeries) -> BTreeMap<Ratio, TrendResult> {
    let mut trends = BTreeMap::new();
    if series.len() < 2 {
        return trends;
    }

    let mut entries: Vec<_> = series.entries.iter().collect();
    entries.sort_by_key(|entry| entry.date);

    for ratio in entries[0].ratios.keys() {
        let values: Vec<f64> = entries
            .iter()
            .filter_map(|entry| entry.ratios.get(ratio).copied())
            .filter(|value| value.is_finite())
            .collect();

        if values.len() < 2 {
            debug!("Skipping trend for {}: {} usable values", ratio.name(), values.len());
            continue;
        }

        if let Some(trend) = linear_regression(&values) {
            trends.insert(*ratio, trend);
        }
    }

    trends
}

pub fn interpret_trend(name: &str, trend: &TrendResult) -> String {
    if trend.p_value < SIGNIFICANCE_LEVEL {
        let direction = if trend.slope > 0.0 {
            "increasing"
        } else {
            "decreasing"
        };
        let strength = if trend.r_squared > 0.7 {
            "strong"
        } else if trend.r_squared > 0.3 {
            "moderate"
        } else {
            "weak"
        };
        format!(
            "{} shows a statistically significant {} {} trend with an R-squared value of {:.2} and a slope of {:.2}.",
            name, strength, direction, trend.r_squared, trend.slope
        )
    } else {
        format!("No significant trend detected for {}.", name)
    }
}

pub fn interpret(trends: &BTreeMap<Ratio, TrendResult>) -> BTreeMap<Ratio, String> {
    trends
        .iter()
        .map(|(ratio, trend)| (*ratio, interpret_trend(ratio.name(), trend)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_logic::models::{DatedRatios, RatioSet};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn entry(year: i32, ratios: &[(Ratio, f64)]) -> DatedRatios {
        DatedRatios {
            date: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            ratios: ratios.iter().copied().collect::<RatioSet>(),
        }
    }

    #[test]
    fn test_linear_series_is_strong_increasing() {
        // Newest first, the way statements arrive.
        let series = HistoricalRatioSeries {
            entries: vec![
                entry(2023, &[(Ratio::ProfitMargin, 3.0)]),
                entry(2022, &[(Ratio::ProfitMargin, 2.0)]),
                entry(2021, &[(Ratio::ProfitMargin, 1.0)]),
            ],
        };

        let trends = compute_trends(&series);
        let trend = trends[&Ratio::ProfitMargin];
        assert!(trend.slope > 0.0);
        assert_abs_diff_eq!(trend.r_squared, 1.0, epsilon = 1e-9);

        let interpretations = interpret(&trends);
        let sentence = &interpretations[&Ratio::ProfitMargin];
        assert!(sentence.contains("strong increasing"));
        assert_eq!(
            sentence,
            "Profit Margin shows a statistically significant strong increasing trend with an R-squared value of 1.00 and a slope of 1.00."
        );
    }

    #[test]
    fn test_fewer_than_two_dates_yields_no_trends() {
        let series = HistoricalRatioSeries {
            entries: vec![entry(2023, &[(Ratio::ProfitMargin, 3.0)])],
        };
        assert!(compute_trends(&series).is_empty());
        assert!(compute_trends(&HistoricalRatioSeries::default()).is_empty());
    }

    #[test]
    fn test_only_earliest_date_ratios_are_analyzed() {
        let series = HistoricalRatioSeries {
            entries: vec![
                entry(2021, &[(Ratio::ProfitMargin, 1.0)]),
                entry(2022, &[(Ratio::ProfitMargin, 2.0), (Ratio::ReturnOnAssets, 0.1)]),
                entry(2023, &[(Ratio::ProfitMargin, 3.0), (Ratio::ReturnOnAssets, 0.2)]),
            ],
        };

        let trends = compute_trends(&series);
        assert!(trends.contains_key(&Ratio::ProfitMargin));
        assert!(!trends.contains_key(&Ratio::ReturnOnAssets));
    }

    #[test]
    fn test_gaps_and_non_finite_values_are_dropped() {
        let series = HistoricalRatioSeries {
            entries: vec![
                entry(2020, &[(Ratio::CurrentRatio, 1.0), (Ratio::GrossMargin, 0.4)]),
                entry(2021, &[(Ratio::GrossMargin, f64::INFINITY)]),
                entry(2022, &[(Ratio::CurrentRatio, 2.0), (Ratio::GrossMargin, f64::NAN)]),
                entry(2023, &[(Ratio::CurrentRatio, 3.0)]),
            ],
        };

        let trends = compute_trends(&series);
        // Current Ratio refits over contiguous indices 0, 1, 2.
        assert_abs_diff_eq!(trends[&Ratio::CurrentRatio].slope, 1.0, epsilon = 1e-12);
        // Gross Margin is left with a single usable value.
        assert!(!trends.contains_key(&Ratio::GrossMargin));
    }

    #[test]
    fn test_interpret_classifications() {
        let weak = TrendResult {
            slope: -0.123,
            r_squared: 0.25,
            p_value: 0.01,
        };
        assert_eq!(
            interpret_trend("ROE", &weak),
            "ROE shows a statistically significant weak decreasing trend with an R-squared value of 0.25 and a slope of -0.12."
        );

        let moderate = TrendResult {
            slope: 2.0,
            r_squared: 0.5,
            p_value: 0.049,
        };
        assert!(interpret_trend("ROA", &moderate).contains("moderate increasing"));

        let insignificant = TrendResult {
            slope: 5.0,
            r_squared: 0.9,
            p_value: 0.05,
        };
        assert_eq!(
            interpret_trend("Quick Ratio", &insignificant),
            "No significant trend detected for Quick Ratio."
        );

        let undefined = TrendResult {
            slope: f64::NAN,
            r_squared: f64::NAN,
            p_value: f64::NAN,
        };
        assert_eq!(
            interpret_trend("ROA", &undefined),
            "No significant trend detected for ROA."
        );
    }

    #[test]
    fn test_interpret_empty() {
        assert!(interpret(&BTreeMap::new()).is_empty());
    }
}
