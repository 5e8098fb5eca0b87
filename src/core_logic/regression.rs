use crate::core_logic::models::TrendResult;
use ndarray::Array2;
use ndarray_stats::CorrelationExt;
use statrs::distribution::{ContinuousCDF, StudentsT};

const TINY: f64 = 1.0e-20;

/// Ordinary least squares of `values` against their position (0, 1, 2, ...).
///
/// Returns `None` for fewer than two points. r is 0 when either series has
/// zero variance. With exactly two points the fit is exact, so the p-value is
/// 1 for a flat line and 0 otherwise.
pub fn linear_regression(values: &[f64]) -> Option<TrendResult> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let observations = Array2::from_shape_vec(
        (2, n),
        (0..n)
            .map(|i| i as f64)
            .chain(values.iter().copied())
            .collect(),
    )
    .ok()?;

    // Population covariance, rows are (x, y).
    let covariance = observations.cov(0.0).ok()?;
    let ssxm = covariance[[0, 0]];
    let ssxym = covariance[[0, 1]];
    let ssym = covariance[[1, 1]];

    let slope = ssxym / ssxm;
    let r = if ssxm == 0.0 || ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let p_value = if n == 2 {
        if values[0] == values[1] {
            1.0
        } else {
            0.0
        }
    } else {
        let df = (n - 2) as f64;
        let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
        two_sided_p_value(t, df)
    };

    Some(TrendResult {
        slope,
        r_squared: r * r,
        p_value,
    })
}

fn two_sided_p_value(t: f64, df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}
