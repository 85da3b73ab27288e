/// Slope of the degree-1 least-squares fit of `values` against their index.
///
/// Returns 0 when fewer than two points are given.
pub fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n_f;

    let (covariance, variance) = values.iter().enumerate().fold(
        (0.0, 0.0),
        |(cov, var), (i, &y)| {
            let dx = i as f64 - x_mean;
            (cov + dx * (y - y_mean), var + dx * dx)
        },
    );

    covariance / variance
}
