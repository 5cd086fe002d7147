use crate::models::{Alert, Severity, Snapshot, Source, Thresholds, GAP_DRIFT_PP, GAP_JUMP_PP};
use crate::variation;

/// Consecutive widening periods that count as a sustained increase.
const SUSTAINED_INCREASE_PERIODS: usize = 3;

/// Rules over the gender wage gap (G2). Gap movements are measured in
/// percentage points, not percent changes, since the series is already a
/// percentage. Always emits one informational record with the current level.
pub fn evaluate(snapshot: &Snapshot, _thresholds: &Thresholds) -> Vec<Alert> {
    let series = &snapshot.gender_gap;
    let records = variation::compute(&series.rows, 1, series.frequency.yoy_lag());

    let mut alerts = Vec::new();
    let Some(last) = records.last() else {
        return alerts;
    };
    let periodo = &last.period_label;

    // A monotonic widening over 3+ adjacent periods is critical and shadows
    // the single-period movement rules. A null observation breaks the streak.
    let sustained = records.len() > SUSTAINED_INCREASE_PERIODS
        && records
            .windows(2)
            .rev()
            .take(SUSTAINED_INCREASE_PERIODS)
            .all(|w| match (w[0].value, w[1].value) {
                (Some(prev), Some(curr)) => curr > prev,
                _ => false,
            });

    let delta = match (last.value, (records.len() >= 2).then(|| &records[records.len() - 2])) {
        (Some(v), Some(prev)) => prev.value.map(|pv| v - pv),
        _ => None,
    };

    if sustained {
        alerts.push(Alert::new(
            Severity::Critical,
            Source::Gender,
            "ALERTA CRITICA: Aumento sostenido de la brecha salarial",
            format!(
                "{SUSTAINED_INCREASE_PERIODS} o mas periodos consecutivos de aumento hasta {periodo}"
            ),
        ));
    } else if let Some(delta) = delta {
        if delta > GAP_JUMP_PP {
            alerts.push(Alert::new(
                Severity::Critical,
                Source::Gender,
                "ALERTA CRITICA: Fuerte aumento de la brecha salarial",
                format!("La brecha aumento {delta:.1} puntos en {periodo}"),
            ));
        } else if delta >= GAP_DRIFT_PP {
            alerts.push(Alert::new(
                Severity::Warning,
                Source::Gender,
                "Advertencia: Aumento de la brecha salarial",
                format!("La brecha aumento {delta:.1} puntos en {periodo}"),
            ));
        } else if delta < -GAP_JUMP_PP {
            alerts.push(Alert::new(
                Severity::Positive,
                Source::Gender,
                "Fuerte reduccion de la brecha salarial",
                format!("La brecha se redujo {:.1} puntos en {periodo}", delta.abs()),
            ));
        } else if delta <= -GAP_DRIFT_PP {
            alerts.push(Alert::new(
                Severity::Positive,
                Source::Gender,
                "Reduccion de la brecha salarial",
                format!("La brecha se redujo {:.1} puntos en {periodo}", delta.abs()),
            ));
        }
    }

    if let Some(v) = last.value {
        alerts.push(Alert::new(
            Severity::Info,
            Source::Gender,
            "Brecha salarial actual",
            format!("La brecha salarial es de {v:.1}% en {periodo}"),
        ));
    }

    alerts
}
