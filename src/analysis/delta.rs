use crate::telemetry::LapRecord;

/// Gap of `compare` to `reference` at each reference sample, as
/// `(distance, seconds)`. Positive means `compare` is behind.
///
/// `compare`'s elapsed time is linearly interpolated at the reference
/// distance, clamped to its own distance range.
pub fn delta_time(reference: &LapRecord, compare: &LapRecord) -> Vec<(f64, f64)> {
    let cmp_dist: Vec<f64> = compare.telemetry.iter().map(|s| s.distance).collect();
    let cmp_time: Vec<f64> = compare.telemetry.iter().map(|s| s.time).collect();

    reference
        .telemetry
        .iter()
        .filter_map(|s| {
            let t = interp(&cmp_dist, &cmp_time, s.distance)?;
            Some((s.distance, t - s.time))
        })
        .collect()
}

/// Linear interpolation of `ys` at `x` over ascending `xs`, clamped to the ends.
fn interp(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return None;
    }
    if x <= xs[0] {
        return Some(ys[0]);
    }
    if x >= xs[n - 1] {
        return Some(ys[n - 1]);
    }

    let hi = xs[..n].partition_point(|v| *v < x);
    let lo = hi - 1;
    let span = xs[hi] - xs[lo];
    if span <= 0.0 {
        return Some(ys[hi]);
    }
    let t = (x - xs[lo]) / span;
    Some(ys[lo] + t * (ys[hi] - ys[lo]))
}
