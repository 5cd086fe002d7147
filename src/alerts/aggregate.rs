use crate::models::{Alert, Severity, Source};

/// How many distinct deteriorating sources trigger the cross-source alert.
const CROSS_SOURCE_MIN: usize = 3;

/// Number of critical/warning/positive/informational alerts in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub positive: usize,
    pub info: usize,
}

pub fn summarize(alerts: &[Alert]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for alert in alerts {
        match alert.severity {
            Severity::Critical => counts.critical += 1,
            Severity::Warning => counts.warning += 1,
            Severity::Positive => counts.positive += 1,
            Severity::Info => counts.info += 1,
        }
    }
    counts
}

/// Merges per-evaluator alert lists into one ranked list.
///
/// When three or more distinct source families each contributed at least one
/// critical or warning alert, a single cross-source alert is synthesized at
/// priority 0. The final ordering is a stable ascending sort by priority, so
/// emission order is preserved within each level.
pub fn aggregate(per_source: Vec<Vec<Alert>>) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = per_source.into_iter().flatten().collect();

    let mut troubled: Vec<Source> = Vec::new();
    for alert in &alerts {
        if matches!(alert.severity, Severity::Critical | Severity::Warning) {
            let family = alert.source.parent();
            if !troubled.contains(&family) {
                troubled.push(family);
            }
        }
    }

    if troubled.len() >= CROSS_SOURCE_MIN {
        let listed: Vec<&str> = troubled.iter().map(|s| s.label()).collect();
        let mut cross = Alert::new(
            Severity::Critical,
            Source::MultiSource,
            "ALERTA CRUZADA: Deterioro simultaneo en multiples fuentes",
            format!(
                "Fuentes con alertas criticas o advertencias: {}",
                listed.join(", ")
            ),
        );
        cross.priority = 0;
        alerts.push(cross);
    }

    alerts.sort_by_key(|a| a.priority);
    alerts
}
