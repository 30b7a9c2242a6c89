//! Numeric and formatting helpers shared by the statistics.

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage change from `prior` to `current`, rounded to a whole percent.
///
/// With no prior value the change is 100 when anything is present now and 0
/// otherwise.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn percent_change(current: usize, prior: usize) -> i64 {
    if prior > 0 {
        ((current as f64 - prior as f64) * 100.0 / prior as f64).round() as i64
    } else if current > 0 {
        100
    } else {
        0
    }
}

/// `part` as a whole percentage of `whole`, 0 when `whole` is 0.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn whole_percent(part: usize, whole: usize) -> i64 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as i64
}

/// `part` as a percentage of `whole` with two decimals, 0.0 when `whole` is 0.
#[allow(clippy::cast_precision_loss)]
pub fn share_percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(100.0 * part as f64 / whole as f64)
}

/// Mean of the given per-day counts with two decimals, 0.0 for no days.
#[allow(clippy::cast_precision_loss)]
pub fn mean_of_counts<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let (sum, days) = counts
        .into_iter()
        .fold((0usize, 0usize), |(sum, days), count| (sum + count, days + 1));
    if days == 0 {
        return 0.0;
    }
    round2(sum as f64 / days as f64)
}
