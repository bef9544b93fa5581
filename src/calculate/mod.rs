//! Shared arithmetic for the statistics engines.
//!
//! All rates here are percentages (0-100), matching the stored documents.

/// `count / total * 100`, or `0.0` when `total` is zero.
pub fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Data-volume confidence: `min(100, battles / saturation * 100)`.
pub fn data_confidence(battles: u32, saturation: u32) -> f64 {
    if saturation == 0 {
        return 100.0;
    }
    (battles as f64 / saturation as f64 * 100.0).min(100.0)
}

/// Sort descending by win rate. Equal rates keep their input order.
pub fn sort_by_win_rate_desc<T>(items: &mut [T], win_rate: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| win_rate(b).total_cmp(&win_rate(a)));
}
