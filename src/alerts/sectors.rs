use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};

use crate::models::{Alert, Severity, SeriesRow, Snapshot, Source, Thresholds};
use crate::variation::pct_change;

/// Rules over sector-disaggregated employment (C3, quarterly). Each sector is
/// checked against the latest period; a pile-up of critical sectors escalates
/// to one aggregate alert.
pub fn evaluate(snapshot: &Snapshot, thresholds: &Thresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let rows: Vec<&SeriesRow> = snapshot
        .sectors
        .rows
        .iter()
        .filter(|r| r.date.is_some() && r.sector.is_some())
        .collect();

    let Some(latest) = rows.iter().filter_map(|r| r.date).max() else {
        return alerts;
    };
    let previous = rows.iter().filter_map(|r| r.date).filter(|d| *d < latest).max();
    let year_ago = latest.checked_sub_months(Months::new(12));

    // BTreeMap keeps sector iteration deterministic.
    let mut by_sector: BTreeMap<&str, Vec<&SeriesRow>> = BTreeMap::new();
    for row in &rows {
        by_sector
            .entry(row.sector.as_deref().unwrap_or_default())
            .or_default()
            .push(*row);
    }

    let mut critical_sectors = 0usize;

    for (code, sector_rows) in &by_sector {
        if sector_rows.len() <= 1 {
            continue;
        }

        let at = |date: Option<NaiveDate>| {
            date.and_then(|d| sector_rows.iter().find(|r| r.date == Some(d)))
        };

        let Some(current) = at(Some(latest)) else {
            continue;
        };
        let periodo = &current.period_label;
        let desc = snapshot
            .sector_names
            .get(*code)
            .cloned()
            .unwrap_or_else(|| format!("Sector {code}"));

        let var_trim = at(previous).and_then(|prev| pct_change(current.value, prev.value));
        let var_yoy = at(year_ago).and_then(|prev| pct_change(current.value, prev.value));

        if let Some(vy) = var_yoy {
            if vy < -thresholds.sector_crisis_yoy() {
                critical_sectors += 1;
                alerts.push(Alert::new(
                    Severity::Critical,
                    Source::EmploymentSectors,
                    format!("Sector en crisis: {code}"),
                    format!("{desc}: Caida interanual de {vy:.1}% en {periodo}"),
                ));
                continue;
            }
        }

        if let Some(vt) = var_trim {
            let positive_levels = current.value.is_some_and(|v| v > 0.0)
                && at(previous).and_then(|p| p.value).is_some_and(|v| v > 0.0);
            if vt.abs() > thresholds.quarterly_pct && positive_levels {
                let short_desc: String = desc.chars().take(30).collect();
                alerts.push(Alert::new(
                    Severity::Warning,
                    Source::EmploymentSectors,
                    format!("{code}: {short_desc}"),
                    format!("Variacion trimestral de {vt:.2}% en {periodo}"),
                ));
            }
        }
    }

    if critical_sectors > 3 {
        alerts.push(Alert::new(
            Severity::Critical,
            Source::EmploymentSectors,
            "ALERTA: Crisis sectorial generalizada",
            format!("{critical_sectors} sectores con caidas superiores al umbral"),
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Series};
    use crate::period;

    fn sector_rows(code: &str, values: &[f64]) -> Vec<SeriesRow> {
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let label = format!("{}º Trim {}", i % 4 + 1, 2020 + (i / 4) as i32);
                SeriesRow {
                    date: period::parse(&label),
                    period_label: label,
                    value: Some(*value),
                    sector: Some(code.to_string()),
                }
            })
            .collect()
    }

    fn snapshot_with(rows: Vec<SeriesRow>) -> Snapshot {
        Snapshot {
            sectors: Series {
                name: "C3".to_string(),
                frequency: Frequency::Quarterly,
                rows,
            },
            ..Snapshot::empty()
        }
    }

    #[test]
    fn deep_yoy_drop_marks_sector_in_crisis() {
        // Five quarters; the last is down 20% vs. the same quarter a year ago.
        let snapshot = snapshot_with(sector_rows(
            "D",
            &[100_000.0, 100_000.0, 100_000.0, 100_000.0, 80_000.0],
        ));
        let alerts = evaluate(&snapshot, &Thresholds::default());
        let crisis = alerts
            .iter()
            .find(|a| a.title == "Sector en crisis: D")
            .unwrap();
        assert_eq!(crisis.severity, Severity::Critical);
        assert!(crisis.message.contains("-20.0%"));
        assert!(crisis.message.contains("1º Trim 2021"));
    }

    #[test]
    fn quarterly_swing_is_a_warning() {
        let snapshot = snapshot_with(sector_rows("F", &[100_000.0, 90_000.0]));
        let alerts = evaluate(&snapshot, &Thresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert!(alerts[0].message.contains("-10.00%"));
    }

    #[test]
    fn widespread_crisis_adds_aggregate_alert() {
        let mut rows = Vec::new();
        for code in ["A", "B", "C", "D", "E"] {
            rows.extend(sector_rows(
                code,
                &[100_000.0, 100_000.0, 100_000.0, 100_000.0, 70_000.0],
            ));
        }
        let snapshot = snapshot_with(rows);
        let alerts = evaluate(&snapshot, &Thresholds::default());
        let aggregate = alerts
            .iter()
            .find(|a| a.title.contains("generalizada"))
            .unwrap();
        assert!(aggregate.message.contains("5 sectores"));
        // One per sector plus the aggregate.
        assert_eq!(alerts.len(), 6);
    }

    #[test]
    fn known_codes_use_descriptor_names() {
        let mut snapshot = snapshot_with(sector_rows(
            "D",
            &[100_000.0, 100_000.0, 100_000.0, 100_000.0, 80_000.0],
        ));
        snapshot
            .sector_names
            .insert("D".to_string(), "Industria manufacturera".to_string());
        let alerts = evaluate(&snapshot, &Thresholds::default());
        assert!(alerts[0].message.contains("Industria manufacturera"));
    }

    #[test]
    fn single_period_sector_is_skipped() {
        let snapshot = snapshot_with(sector_rows("A", &[100_000.0]));
        let alerts = evaluate(&snapshot, &Thresholds::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn stable_sectors_stay_quiet() {
        let snapshot = snapshot_with(sector_rows("A", &[100_000.0, 101_000.0]));
        let alerts = evaluate(&snapshot, &Thresholds::default());
        assert!(alerts.is_empty());
    }
}
