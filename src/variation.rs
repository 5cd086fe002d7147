use crate::models::{SeriesRow, VariationRecord};

/// Percent change between two optional values. `None` whenever either side
/// is missing or the base is zero; never treats a missing value as zero.
pub fn pct_change(current: Option<f64>, base: Option<f64>) -> Option<f64> {
    match (current, base) {
        (Some(c), Some(b)) if b != 0.0 => Some((c - b) / b * 100.0),
        _ => None,
    }
}

/// Computes period-over-period and year-over-year percent changes plus a
/// base-100 index for a series.
///
/// Rows without a normalized date are dropped first (they cannot take part
/// in lag arithmetic); the survivors are ordered ascending by date. The
/// index column is only populated when the first value is non-null and
/// non-zero.
pub fn compute(rows: &[SeriesRow], short_lag: usize, yoy_lag: usize) -> Vec<VariationRecord> {
    let mut dated: Vec<(&SeriesRow, chrono::NaiveDate)> = rows
        .iter()
        .filter_map(|r| r.date.map(|d| (r, d)))
        .collect();
    dated.sort_by_key(|(_, date)| *date);

    let base = dated
        .first()
        .and_then(|(r, _)| r.value)
        .filter(|v| *v != 0.0);

    dated
        .iter()
        .enumerate()
        .map(|(i, (row, date))| {
            let var_short = if short_lag > 0 && i >= short_lag {
                pct_change(row.value, dated[i - short_lag].0.value)
            } else {
                None
            };
            let var_yoy = if yoy_lag > 0 && i >= yoy_lag {
                pct_change(row.value, dated[i - yoy_lag].0.value)
            } else {
                None
            };
            let index_base100 = match (row.value, base) {
                (Some(v), Some(b)) => Some(v / b * 100.0),
                _ => None,
            };

            VariationRecord {
                period_label: row.period_label.clone(),
                date: *date,
                value: row.value,
                var_short,
                var_yoy,
                index_base100,
            }
        })
        .collect()
}
