//! Descriptive statistics used by the charts. NaN values are skipped
//! everywhere.

use serde::Serialize;

pub fn finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values.into_iter().filter(|v| !v.is_nan()).collect()
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

pub fn sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut values = finite(values);
    values.sort_by(f64::total_cmp);
    values
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile_sorted(values: &[f64], p: f64) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    if p <= 0.0 || n < 2 {
        return values.first().copied();
    }
    if p >= 1.0 {
        return values.last().copied();
    }
    let i = (n - 1) as f64 * p;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let i0 = i.floor() as usize;
    let v0 = values[i0];
    let v1 = values[(i0 + 1).min(n - 1)];
    Some((v1 - v0).mul_add(i - i0 as f64, v0))
}

pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

/// Five-number summary with whiskers clipped to the 1.5·IQR fences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub min: f64,
    pub max: f64,
}

impl BoxSummary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let values = sorted(values);
        let q1 = quantile_sorted(&values, 0.25)?;
        let median = quantile_sorted(&values, 0.5)?;
        let q3 = quantile_sorted(&values, 0.75)?;
        let min = *values.first()?;
        let max = *values.last()?;
        let iqr = q3 - q1;

        Some(Self {
            q1,
            median,
            q3,
            iqr,
            lower_whisker: min.max(1.5f64.mul_add(-iqr, q1)),
            upper_whisker: max.min(1.5f64.mul_add(iqr, q3)),
            min,
            max,
        })
    }

    pub fn upper_fence(&self) -> f64 {
        1.5f64.mul_add(self.iqr, self.q3)
    }

    /// Only the high side counts: a catalogue far below the box is not
    /// called out.
    pub fn is_outlier(&self, value: f64) -> bool {
        value > self.upper_fence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn mean_skips_nan() {
        assert_eq!(mean([1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(mean(Vec::<f64>::new()), None);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile_sorted(&values, 0.25).unwrap(), 1.75));
        assert!(close(quantile_sorted(&values, 0.5).unwrap(), 2.5));
        assert!(close(quantile_sorted(&values, 0.75).unwrap(), 3.25));
        assert_eq!(quantile_sorted(&[7.0], 0.75), Some(7.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn whiskers_stay_inside_the_data() {
        let summary = BoxSummary::from_values([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(close(summary.q1, 2.0));
        assert!(close(summary.q3, 4.0));
        assert!(close(summary.lower_whisker, 1.0));
        assert!(close(summary.upper_whisker, 5.0));
    }

    #[test]
    fn whiskers_clip_to_fences_with_outliers() {
        let values = [10.0, 11.0, 12.0, 13.0, 14.0, 100.0];
        let summary = BoxSummary::from_values(values).unwrap();
        assert!(close(summary.upper_whisker, summary.upper_fence()));
        assert!(summary.upper_whisker < summary.max);
        assert!(summary.lower_whisker >= summary.min);
        assert!(summary.is_outlier(100.0));
        assert!(!summary.is_outlier(14.0));
    }

    #[test]
    fn values_below_the_box_are_not_outliers() {
        let values = [1.0, 50.0, 51.0, 52.0, 53.0, 54.0];
        let summary = BoxSummary::from_values(values).unwrap();
        assert!(summary.lower_whisker > summary.min);
        assert!(!summary.is_outlier(1.0));
    }

    #[test]
    fn whisker_bounds_hold_for_many_shapes() {
        let shapes: [&[f64]; 4] = [
            &[0.0, 0.0, 0.0],
            &[5.0, 1.0, 9.0, 2.0, 2.0, 40.0, -30.0],
            &[3.5],
            &[1.0, 1000.0],
        ];
        for shape in shapes {
            let s = BoxSummary::from_values(shape.iter().copied()).unwrap();
            assert!(s.lower_whisker >= s.min && s.upper_whisker <= s.max);
            assert!(close(s.lower_whisker, s.min.max(s.q1 - 1.5 * s.iqr)));
            assert!(close(s.upper_whisker, s.max.min(s.q3 + 1.5 * s.iqr)));
        }
    }
}
