use tapr::time_series::ReactionPoint;

/// Compute X (seconds) and Y (reaction ms) bounds for the results chart
pub fn compute_chart_params(points: &[ReactionPoint], round_secs: f64) -> (f64, f64) {
    let slowest = points
        .iter()
        .map(|p| p.reaction_ms)
        .fold(0.0_f64, f64::max);

    let overall_duration = points
        .last()
        .map_or(round_secs, |p| p.t.max(round_secs))
        .max(1.0);

    // headroom so the slowest hit is not drawn on the border
    let ceiling = ((slowest * 1.1) / 100.0).ceil() * 100.0;

    (overall_duration, ceiling.max(100.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
