//! Descriptive statistics over channel values with missing entries.
//!
//! Every function takes the values that are present and returns `None`
//! when the statistic is undefined, never a placeholder zero.

use crate::model::{Channel, Reading};

/// Present values of `channel` across `rows`.
pub fn channel_values<'a, I>(rows: I, channel: Channel) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Reading>,
{
    rows.into_iter()
        .filter_map(|r| r.value(channel))
        .filter(|v| v.is_finite())
        .collect()
}

/// Values sorted ascending with a total order.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Arithmetic mean, or `None` for no values.
///
/// Summed in sorted order so the result does not depend on input order.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = sorted(values).iter().sum();
    Some(sum / values.len() as f64)
}

/// Median, averaging the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(&sorted(values), 0.5)
}

/// Sample standard deviation (n - 1). Undefined below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let mut squares: Vec<f64> = values.iter().map(|v| (v - mean) * (v - mean)).collect();
    squares.sort_by(f64::total_cmp);
    let variance = squares.iter().sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Quantile `q` in [0, 1] of already sorted values, interpolating linearly
/// between the neighbouring order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_mean_median_std_of_ten_twenty_thirty() {
        let values = [10.0, 20.0, 30.0];
        assert!(close(mean(&values), 20.0));
        assert!(close(median(&values), 20.0));
        assert!(close(sample_std(&values), 10.0));
    }

    #[test]
    fn test_median_of_even_count_averages_middle_values() {
        assert!(close(median(&[4.0, 1.0, 3.0, 2.0]), 2.5));
    }

    #[test]
    fn test_undefined_statistics_are_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(sample_std(&[]), None);
        assert_eq!(sample_std(&[5.0]), None);
    }

    #[test]
    fn test_mean_is_independent_of_order() {
        let a = [0.1, 1e16, 0.2, -1e16, 0.3];
        let b = [-1e16, 0.3, 0.1, 0.2, 1e16];
        assert_eq!(mean(&a), mean(&b));
    }

    #[test]
    fn test_quantile_interpolates_linearly() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile(&s, 0.25), 1.75));
        assert!(close(quantile(&s, 0.75), 3.25));
        assert!(close(quantile(&s, 0.0), 1.0));
        assert!(close(quantile(&s, 1.0), 4.0));
        assert_eq!(quantile(&s, 1.5), None);
    }

    #[test]
    fn test_channel_values_skips_missing() {
        use crate::model::Site;
        use chrono::NaiveDate;
        let t = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rows = [
            Reading::empty(Site::Benin, t).with(Channel::Ghi, 1.0),
            Reading::empty(Site::Benin, t),
            Reading::empty(Site::Benin, t).with(Channel::Ghi, 3.0),
        ];
        assert_eq!(channel_values(&rows, Channel::Ghi), vec![1.0, 3.0]);
    }
}
