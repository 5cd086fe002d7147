use chrono::NaiveDate;

use crate::models::{FlowSeries, Series, Snapshot};

/// Representative month for each quarter (mid-quarter), matching the
/// published SIPA convention: 1º Trim -> Feb, 2º -> May, 3º -> Aug, 4º -> Nov.
const QUARTER_MONTH: [u32; 4] = [2, 5, 8, 11];

/// Bare years map to July 1 so annual observations sit mid-year and do not
/// bias comparisons against monthly or quarterly dates.
const ANNUAL_MONTH: u32 = 7;

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Parses a heterogeneous period label into a normalized date.
///
/// Recognized formats: quarterly `"4º Trim 2004"` (ordinal marker optional,
/// trailing provisional-data `*` allowed), monthly `"Enero 2024"` / `"ene
/// 2024"` / `"01/2024"` / `"2024-01"`, and annual `"2024"`. Returns `None`
/// for anything else; never panics.
pub fn parse(label: &str) -> Option<NaiveDate> {
    let cleaned = label.trim().trim_end_matches('*').trim();
    if cleaned.is_empty() {
        return None;
    }
    parse_quarterly(cleaned)
        .or_else(|| parse_month_name(cleaned))
        .or_else(|| parse_numeric(cleaned))
        .or_else(|| parse_annual(cleaned))
}

/// Lowercases and strips the accents that show up in period labels, so
/// "Trim"/"trím" and "Setiembre"/"setiembre" compare equal.
fn fold(s: &str) -> String {
    s.chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn parse_quarterly(s: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.len() != 3 {
        return None;
    }

    let mut chars = tokens[0].chars();
    let quarter = chars.next()?.to_digit(10)?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    // Whatever follows the digit must be an ordinal marker ("º", "°", "o",
    // "er", "do", "to") or nothing at all.
    let marker = fold(chars.as_str());
    if !matches!(marker.as_str(), "" | "º" | "°" | "o" | "ª" | "er" | "do" | "to") {
        return None;
    }

    if !fold(tokens[1]).starts_with("trim") {
        return None;
    }

    let year = parse_year(tokens[2])?;
    NaiveDate::from_ymd_opt(year, QUARTER_MONTH[quarter as usize - 1], 1)
}

fn parse_month_name(s: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    // "Enero 2024" or "Enero de 2024".
    let (month_token, year_token) = match tokens.as_slice() {
        [m, y] => (*m, *y),
        [m, de, y] if fold(de) == "de" => (*m, *y),
        _ => return None,
    };

    let folded = fold(month_token);
    let month = MONTHS.iter().position(|name| {
        *name == folded
            || (folded.len() == 3 && name.starts_with(&folded))
            || (folded == "set" && *name == "septiembre")
            || (folded == "setiembre" && *name == "septiembre")
    })? as u32
        + 1;

    let year = parse_year(year_token)?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_numeric(s: &str) -> Option<NaiveDate> {
    // "MM/YYYY"
    if let Some((m, y)) = s.split_once('/') {
        let month: u32 = m.trim().parse().ok()?;
        let year = parse_year(y.trim())?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    // "YYYY-MM"
    if let Some((y, m)) = s.split_once('-') {
        let year = parse_year(y.trim())?;
        let month: u32 = m.trim().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    None
}

fn parse_annual(s: &str) -> Option<NaiveDate> {
    let year = parse_year(s)?;
    NaiveDate::from_ymd_opt(year, ANNUAL_MONTH, 1)
}

/// Restricts a series to the inclusive window described by two period labels.
/// `None` bounds (or bounds that fail to parse) leave that side open. Rows
/// without a normalized date are dropped whenever a bound is active, since
/// they cannot be compared.
pub fn filter_series(series: &Series, desde: Option<&str>, hasta: Option<&str>) -> Series {
    let from = desde.and_then(parse);
    let to = hasta.and_then(parse);
    if from.is_none() && to.is_none() {
        return series.clone();
    }

    Series {
        name: series.name.clone(),
        frequency: series.frequency,
        rows: series
            .rows
            .iter()
            .filter(|row| in_window(row.date, from, to))
            .cloned()
            .collect(),
    }
}

pub fn filter_flows(series: &FlowSeries, desde: Option<&str>, hasta: Option<&str>) -> FlowSeries {
    let from = desde.and_then(parse);
    let to = hasta.and_then(parse);
    if from.is_none() && to.is_none() {
        return series.clone();
    }

    FlowSeries {
        name: series.name.clone(),
        frequency: series.frequency,
        rows: series
            .rows
            .iter()
            .filter(|row| in_window(row.date, from, to))
            .cloned()
            .collect(),
    }
}

/// Applies the same period window to every dataset of a snapshot.
pub fn filter_snapshot(snapshot: &Snapshot, desde: Option<&str>, hasta: Option<&str>) -> Snapshot {
    Snapshot {
        employment: filter_series(&snapshot.employment, desde, hasta),
        sectors: filter_series(&snapshot.sectors, desde, hasta),
        wages: filter_series(&snapshot.wages, desde, hasta),
        firms: filter_series(&snapshot.firms, desde, hasta),
        flows: filter_flows(&snapshot.flows, desde, hasta),
        gender_gap: filter_series(&snapshot.gender_gap, desde, hasta),
        sector_names: snapshot.sector_names.clone(),
    }
}

fn in_window(date: Option<NaiveDate>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let Some(date) = date else {
        return false;
    };
    if let Some(from) = from {
        if date < from {
            return false;
        }
    }
    if let Some(to) = to {
        if date > to {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, SeriesRow};

    #[test]
    fn quarterly_labels_round_trip() {
        for (quarter, month) in [(1, 2), (2, 5), (3, 8), (4, 11)] {
            let label = format!("{quarter}º Trim 2004");
            let date = parse(&label).unwrap();
            assert_eq!(date, NaiveDate::from_ymd_opt(2004, month, 1).unwrap());
        }
    }

    #[test]
    fn quarterly_marker_variants() {
        assert_eq!(
            parse("4° Trim 2023"),
            NaiveDate::from_ymd_opt(2023, 11, 1)
        );
        assert_eq!(parse("4 Trim 2023"), NaiveDate::from_ymd_opt(2023, 11, 1));
        assert_eq!(parse("4o trim 2023"), NaiveDate::from_ymd_opt(2023, 11, 1));
        assert_eq!(
            parse("1er Trim 2023"),
            NaiveDate::from_ymd_opt(2023, 2, 1)
        );
    }

    #[test]
    fn provisional_marker_is_stripped() {
        assert_eq!(
            parse("2º Trim 2024*"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn month_names_round_trip() {
        assert_eq!(parse("Enero 2024"), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(
            parse("Diciembre 2019"),
            NaiveDate::from_ymd_opt(2019, 12, 1)
        );
        assert_eq!(parse("ene 2024"), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(parse("Ago 2021"), NaiveDate::from_ymd_opt(2021, 8, 1));
        assert_eq!(parse("set 2021"), NaiveDate::from_ymd_opt(2021, 9, 1));
        assert_eq!(
            parse("Marzo de 2020"),
            NaiveDate::from_ymd_opt(2020, 3, 1)
        );
    }

    #[test]
    fn numeric_forms_round_trip() {
        assert_eq!(parse("03/2022"), NaiveDate::from_ymd_opt(2022, 3, 1));
        assert_eq!(parse("2022-03"), NaiveDate::from_ymd_opt(2022, 3, 1));
    }

    #[test]
    fn annual_maps_to_mid_year() {
        assert_eq!(parse("2015"), NaiveDate::from_ymd_opt(2015, 7, 1));
    }

    #[test]
    fn garbage_returns_none() {
        for label in [
            "",
            "   ",
            "Total",
            "5º Trim 2004",
            "0º Trim 2004",
            "Trim 2004",
            "4º Trim 04",
            "13/2022",
            "2022-13",
            "foo bar baz qux",
            "xx/yyyy",
            "Lunes 2024",
        ] {
            assert_eq!(parse(label), None, "label {label:?} should not parse");
        }
    }

    fn row(label: &str) -> SeriesRow {
        SeriesRow {
            period_label: label.to_string(),
            date: parse(label),
            value: Some(1.0),
            sector: None,
        }
    }

    #[test]
    fn filter_keeps_inclusive_window() {
        let series = Series {
            name: "C1.1".to_string(),
            frequency: Frequency::Quarterly,
            rows: vec![
                row("1º Trim 2020"),
                row("2º Trim 2020"),
                row("3º Trim 2020"),
                row("4º Trim 2020"),
            ],
        };

        let filtered = filter_series(&series, Some("2º Trim 2020"), Some("3º Trim 2020"));
        let labels: Vec<&str> = filtered
            .rows
            .iter()
            .map(|r| r.period_label.as_str())
            .collect();
        assert_eq!(labels, vec!["2º Trim 2020", "3º Trim 2020"]);
    }

    #[test]
    fn filter_without_bounds_is_identity() {
        let series = Series {
            name: "C1.1".to_string(),
            frequency: Frequency::Quarterly,
            rows: vec![row("1º Trim 2020"), row("sin fecha")],
        };
        let filtered = filter_series(&series, None, None);
        assert_eq!(filtered.rows.len(), 2);
    }

    #[test]
    fn filter_drops_undated_rows_when_bounded() {
        let series = Series {
            name: "C1.1".to_string(),
            frequency: Frequency::Quarterly,
            rows: vec![row("1º Trim 2020"), row("sin fecha")],
        };
        let filtered = filter_series(&series, Some("1º Trim 2019"), None);
        assert_eq!(filtered.rows.len(), 1);
    }
}
