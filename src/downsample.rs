/// Reduces `series` to at most `target_points` values by averaging
/// contiguous windows of `ceil(len / target_points)` samples.
///
/// The output length is `min(target_points, number of non-empty windows)`:
/// when the input length is not a multiple of the window size there are
/// fewer windows than requested points, and iterating past the data would
/// mean averaging an empty window. The output therefore never contains
/// NaN, and two equal-length inputs reduced with the same `target_points`
/// always produce equal-length outputs.
///
/// Deterministic: summation runs in slice order, no other float-order
/// sensitivity.
pub fn downsample(series: &[f64], target_points: usize) -> Vec<f64> {
    if series.is_empty() || target_points == 0 {
        return Vec::new();
    }
    let window = series.len().div_ceil(target_points);
    series
        .chunks(window)
        .map(|w| w.iter().sum::<f64>() / w.len() as f64)
        .collect()
}
