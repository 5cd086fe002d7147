pub mod aggregate;
mod employment;
mod firms;
mod flows;
mod gender;
mod sectors;
mod wages;

use crate::models::{Alert, Snapshot, Source, Thresholds};

/// A rule evaluator takes the read-only snapshot and the user thresholds and
/// emits zero or more alerts. Evaluators never fail: missing columns, empty
/// datasets, and insufficient history all result in fewer alerts, not errors.
pub type Evaluator = fn(&Snapshot, &Thresholds) -> Vec<Alert>;

/// Registry of per-source evaluators, in emission order.
pub const REGISTRY: &[(Source, Evaluator)] = &[
    (Source::Employment, employment::evaluate),
    (Source::EmploymentSectors, sectors::evaluate),
    (Source::Wages, wages::evaluate),
    (Source::Firms, firms::evaluate),
    (Source::Flows, flows::evaluate),
    (Source::Gender, gender::evaluate),
];

/// Runs every registered evaluator against the snapshot.
pub fn evaluate_all(snapshot: &Snapshot, thresholds: &Thresholds) -> Vec<Vec<Alert>> {
    REGISTRY
        .iter()
        .map(|(_, evaluator)| evaluator(snapshot, thresholds))
        .collect()
}

/// Formats a job count with thousands separators, e.g. `52340.0` -> "52,340".
pub(crate) fn fmt_jobs(n: f64) -> String {
    let rounded = n.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_counts_group_thousands() {
        assert_eq!(fmt_jobs(0.0), "0");
        assert_eq!(fmt_jobs(950.0), "950");
        assert_eq!(fmt_jobs(52_340.0), "52,340");
        assert_eq!(fmt_jobs(1_234_567.4), "1,234,567");
        assert_eq!(fmt_jobs(-60_000.0), "-60,000");
    }

    #[test]
    fn empty_snapshot_produces_no_alerts_from_any_evaluator() {
        let snapshot = Snapshot::empty();
        let thresholds = Thresholds::default();
        for (source, evaluator) in REGISTRY {
            let alerts = evaluator(&snapshot, &thresholds);
            assert!(
                alerts.is_empty(),
                "evaluator {source:?} emitted alerts for an empty snapshot"
            );
        }
    }

    #[test]
    fn correlated_deterioration_triggers_the_cross_source_alert() {
        use crate::models::{Frequency, Series, SeriesRow};
        use crate::period;

        fn series(name: &str, frequency: Frequency, labels: &[&str], values: &[f64]) -> Series {
            let rows = labels
                .iter()
                .zip(values)
                .map(|(label, value)| SeriesRow {
                    period_label: label.to_string(),
                    date: period::parse(label),
                    value: Some(*value),
                    sector: None,
                })
                .collect();
            Series {
                name: name.to_string(),
                frequency,
                rows,
            }
        }

        let mut snapshot = Snapshot::empty();
        // Employment down 6% on the quarter, wages down 8% on the month,
        // firms down 2% on the year; flows and gender stay empty.
        snapshot.employment = series(
            "C1.1",
            Frequency::Quarterly,
            &["1º Trim 2024", "2º Trim 2024"],
            &[1_000_000.0, 940_000.0],
        );
        snapshot.wages = series(
            "R1",
            Frequency::Monthly,
            &["03/2024", "04/2024"],
            &[100_000.0, 92_000.0],
        );
        snapshot.firms = series("E1", Frequency::Annual, &["2023", "2024"], &[500_000.0, 490_000.0]);

        let merged = aggregate::aggregate(evaluate_all(&snapshot, &Thresholds::default()));

        let cross: Vec<&Alert> = merged
            .iter()
            .filter(|a| a.source == Source::MultiSource)
            .collect();
        assert_eq!(cross.len(), 1);
        assert_eq!(cross[0].priority, 0);
        assert_eq!(merged[0].source, Source::MultiSource);
    }
}
