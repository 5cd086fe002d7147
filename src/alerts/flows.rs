use crate::alerts::fmt_jobs;
use crate::models::{
    Alert, FlowRow, Severity, Snapshot, Source, Thresholds, NET_FLOW_JOBS, RATE_SPREAD_PP,
    ROTATION_EXCESS_PP,
};

/// Rules over job flows (F1, quarterly): net creation level, sustained
/// destruction, entry/exit rate spread and rotation against its own history.
pub fn evaluate(snapshot: &Snapshot, _thresholds: &Thresholds) -> Vec<Alert> {
    let mut rows: Vec<&FlowRow> = snapshot
        .flows
        .rows
        .iter()
        .filter(|r| r.date.is_some())
        .collect();
    rows.sort_by_key(|r| r.date);

    let mut alerts = Vec::new();
    let Some(last) = rows.last() else {
        return alerts;
    };
    let prev = (rows.len() >= 2).then(|| rows[rows.len() - 2]);
    let periodo = &last.period_label;

    if let Some(net) = last.net_creation() {
        if net < -NET_FLOW_JOBS {
            alerts.push(Alert::new(
                Severity::Critical,
                Source::Flows,
                "ALERTA CRITICA: Destruccion masiva de empleo",
                format!("Creacion neta de {} empleos en {periodo}", fmt_jobs(net)),
            ));
        } else if net < 0.0 {
            // Two straight quarters of net destruction escalate to critical.
            let sustained = prev.and_then(|p| p.net_creation()).is_some_and(|n| n < 0.0);
            if sustained {
                alerts.push(Alert::new(
                    Severity::Critical,
                    Source::Flows,
                    "ALERTA CRITICA: Destruccion neta sostenida",
                    format!("Segundo periodo consecutivo de creacion neta negativa en {periodo}"),
                ));
            } else {
                alerts.push(Alert::new(
                    Severity::Warning,
                    Source::Flows,
                    "Advertencia: Destruccion neta de empleo",
                    format!("Creacion neta de {} empleos en {periodo}", fmt_jobs(net)),
                ));
            }
        } else if net > NET_FLOW_JOBS {
            alerts.push(Alert::new(
                Severity::Positive,
                Source::Flows,
                "Fuerte creacion neta de empleo",
                format!("Creacion neta de {} empleos en {periodo}", fmt_jobs(net)),
            ));
        } else if net > 0.0 {
            alerts.push(Alert::new(
                Severity::Info,
                Source::Flows,
                "Creacion neta moderada de empleo",
                format!("Creacion neta de {} empleos en {periodo}", fmt_jobs(net)),
            ));
        }
    }

    if let (Some(exit), Some(entry)) = (last.exit_rate, last.entry_rate) {
        if exit - entry > RATE_SPREAD_PP {
            alerts.push(Alert::new(
                Severity::Warning,
                Source::Flows,
                "Advertencia: Tasa de salida supera a la de entrada",
                format!(
                    "Salida {exit:.1}% vs entrada {entry:.1}% en {periodo}"
                ),
            ));
        }
    }

    // The baseline excludes the latest observation, so a spike is measured
    // against the history it deviates from rather than diluting its own mean.
    let rotation_history: Vec<f64> = rows[..rows.len() - 1]
        .iter()
        .filter_map(|r| r.rotation_rate)
        .collect();
    if let Some(rotation) = last.rotation_rate {
        if !rotation_history.is_empty() {
            let mean = rotation_history.iter().sum::<f64>() / rotation_history.len() as f64;
            if rotation - mean > ROTATION_EXCESS_PP {
                alerts.push(Alert::new(
                    Severity::Warning,
                    Source::Flows,
                    "Advertencia: Rotacion laboral elevada",
                    format!(
                        "Rotacion de {rotation:.1}% frente a una media historica de {mean:.1}% en {periodo}"
                    ),
                ));
            }
        }
    }

    alerts
}
