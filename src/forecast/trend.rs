//! Ordinary least-squares trend fitting

/// Slope of the least-squares line through `series`, as `(x, y)` points.
///
/// Returns `0.0` when the slope is underdetermined: fewer than two points, or
/// every point sharing the same `x`.
#[must_use]
pub fn fit(series: &[(f64, f64)]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let n = series.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for &(x, y) in series {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }

    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Pair each value with its position, so a fitted slope is per year-step
pub fn indexed(values: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, y)| (i as f64, y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(vec![])]
    #[case::single(vec![(0.0, 17.5)])]
    fn test_underdetermined_series_is_flat(#[case] series: Vec<(f64, f64)>) {
        assert_eq!(fit(&series), 0.0);
    }

    #[test]
    fn test_same_x_is_flat() {
        assert_eq!(fit(&[(1.0, 3.0), (1.0, 9.0), (1.0, 4.0)]), 0.0);
    }

    #[rstest]
    #[case(10.0, 2.0, 3)]
    #[case(-4.5, -0.75, 5)]
    #[case(22.0, 0.0, 4)]
    #[case(0.0, 1.3, 2)]
    fn test_linear_series_recovers_slope(#[case] a: f64, #[case] b: f64, #[case] n: usize) {
        let series = indexed((0..n).map(|x| a + b * x as f64));
        assert!((fit(&series) - b).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_series() {
        // y = 1, 3, 2, 5 → slope 1.1
        let series = indexed([1.0, 3.0, 2.0, 5.0]);
        assert!((fit(&series) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_indexed_positions() {
        assert_eq!(indexed([4.0, 8.0]), vec![(0.0, 4.0), (1.0, 8.0)]);
    }
}
