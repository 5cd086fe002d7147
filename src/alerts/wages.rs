use crate::models::{Alert, Severity, Snapshot, Source, Thresholds};
use crate::variation;

/// How many consecutive declining periods count as a sustained slide.
const SUSTAINED_DECLINE_PERIODS: usize = 3;

/// Rules over the nominal wage series (R1, monthly).
pub fn evaluate(snapshot: &Snapshot, thresholds: &Thresholds) -> Vec<Alert> {
    let series = &snapshot.wages;
    let records = variation::compute(&series.rows, 1, series.frequency.yoy_lag());

    let mut alerts = Vec::new();
    let Some(last) = records.last() else {
        return alerts;
    };
    let periodo = &last.period_label;

    // Three straight months of decline is critical regardless of magnitude.
    let tail = records
        .iter()
        .rev()
        .take(SUSTAINED_DECLINE_PERIODS)
        .map(|r| r.var_short)
        .collect::<Vec<_>>();
    let sustained = tail.len() == SUSTAINED_DECLINE_PERIODS
        && tail.iter().all(|v| v.is_some_and(|v| v < 0.0));
    if sustained {
        alerts.push(Alert::new(
            Severity::Critical,
            Source::Wages,
            "ALERTA CRITICA: Caida sostenida de remuneraciones",
            format!("{SUSTAINED_DECLINE_PERIODS} meses consecutivos de caida hasta {periodo}"),
        ));
    }

    if let Some(vm) = last.var_short {
        if vm < -thresholds.quarterly_pct {
            alerts.push(Alert::new(
                Severity::Critical,
                Source::Wages,
                "ALERTA CRITICA: Caida mensual severa de remuneraciones",
                format!("Caida de la remuneracion de {vm:.2}% en {periodo}"),
            ));
        } else if vm < -thresholds.quarterly_pct * 0.5 {
            alerts.push(Alert::new(
                Severity::Warning,
                Source::Wages,
                "Advertencia: Caida mensual de remuneraciones",
                format!("Caida de la remuneracion de {vm:.2}% en {periodo}"),
            ));
        } else if vm > thresholds.quarterly_pct {
            alerts.push(Alert::new(
                Severity::Positive,
                Source::Wages,
                "Fuerte crecimiento mensual de remuneraciones",
                format!("Crecimiento de la remuneracion de {vm:.2}% en {periodo}"),
            ));
        }
    }

    let max = records
        .iter()
        .filter_map(|r| r.value)
        .fold(f64::NEG_INFINITY, f64::max);
    if let Some(v) = last.value {
        if max.is_finite() && v >= max {
            alerts.push(Alert::new(
                Severity::Info,
                Source::Wages,
                "Remuneracion en maximo historico",
                format!("La remuneracion promedio alcanzo su maximo en {periodo}"),
            ));
        }
    }

    alerts
}
