use crate::alerts::fmt_jobs;
use crate::models::{Alert, Severity, Snapshot, Source, Thresholds, MASS_LOSS_JOBS, STRONG_GAIN_JOBS};
use crate::variation;

/// Rules over the total-employment series (C1.1, quarterly).
pub fn evaluate(snapshot: &Snapshot, thresholds: &Thresholds) -> Vec<Alert> {
    let series = &snapshot.employment;
    let records = variation::compute(&series.rows, 1, series.frequency.yoy_lag());

    let mut alerts = Vec::new();
    let Some(last) = records.last() else {
        return alerts;
    };
    let prev = (records.len() >= 2).then(|| &records[records.len() - 2]);
    let periodo = &last.period_label;

    // Criticas
    if let Some(vt) = last.var_short {
        if vt < -thresholds.quarterly_pct {
            alerts.push(Alert::new(
                Severity::Critical,
                Source::Employment,
                "ALERTA CRITICA: Caida trimestral severa",
                format!("Caida del empleo de {vt:.2}% en {periodo}"),
            ));
        }
    }

    if let Some(vy) = last.var_yoy {
        if vy < -thresholds.yoy_pct {
            alerts.push(Alert::new(
                Severity::Critical,
                Source::Employment,
                "ALERTA CRITICA: Caida interanual severa",
                format!("Caida interanual de {vy:.2}% en {periodo}"),
            ));
        }
    }

    let delta = match (last.value, prev.and_then(|p| p.value)) {
        (Some(v), Some(pv)) => Some(v - pv),
        _ => None,
    };
    if let Some(delta) = delta {
        if delta < -MASS_LOSS_JOBS {
            alerts.push(Alert::new(
                Severity::Critical,
                Source::Employment,
                "ALERTA CRITICA: Perdida masiva de empleos",
                format!("Perdida de {} empleos en {periodo}", fmt_jobs(delta.abs())),
            ));
        }
    }

    // Advertencias
    if let Some(vt) = last.var_short {
        if vt >= -thresholds.quarterly_pct && vt <= -thresholds.warning_quarterly() {
            alerts.push(Alert::new(
                Severity::Warning,
                Source::Employment,
                "Advertencia: Variacion trimestral significativa",
                format!("Variacion de {vt:.2}% en {periodo}"),
            ));
        }
    }

    if let Some(vy) = last.var_yoy {
        if vy >= -thresholds.yoy_pct && vy <= -thresholds.warning_yoy() {
            alerts.push(Alert::new(
                Severity::Warning,
                Source::Employment,
                "Advertencia: Variacion interanual notable",
                format!("Variacion interanual de {vy:.2}% en {periodo}"),
            ));
        }
    }

    if let (Some(vt), Some(vt_prev)) = (last.var_short, prev.and_then(|p| p.var_short)) {
        if (vt > 0.0 && vt_prev < 0.0) || (vt < 0.0 && vt_prev > 0.0) {
            alerts.push(Alert::new(
                Severity::Warning,
                Source::Employment,
                "Cambio de tendencia detectado",
                format!("Tendencia cambio de {vt_prev:.1}% a {vt:.1}%"),
            ));
        }
    }

    // Positivas
    if let Some(vt) = last.var_short {
        if vt > thresholds.warning_quarterly() {
            alerts.push(Alert::new(
                Severity::Positive,
                Source::Employment,
                "Crecimiento trimestral robusto",
                format!("Crecimiento de {vt:.2}% en {periodo}"),
            ));
        }
    }

    if let Some(vy) = last.var_yoy {
        if vy > thresholds.warning_yoy() {
            alerts.push(Alert::new(
                Severity::Positive,
                Source::Employment,
                "Crecimiento interanual solido",
                format!("Crecimiento interanual de {vy:.2}% en {periodo}"),
            ));
        }
    }

    if let Some(delta) = delta {
        if delta > STRONG_GAIN_JOBS {
            alerts.push(Alert::new(
                Severity::Positive,
                Source::Employment,
                "Creacion significativa de empleos",
                format!("Creacion de {} nuevos empleos en {periodo}", fmt_jobs(delta)),
            ));
        }
    }

    // Informativas
    let max = records
        .iter()
        .filter_map(|r| r.value)
        .fold(f64::NEG_INFINITY, f64::max);
    if let Some(v) = last.value {
        if max.is_finite() && v >= max {
            alerts.push(Alert::new(
                Severity::Info,
                Source::Employment,
                "Nuevo maximo historico",
                format!("Empleo alcanzo maximo: {} trabajadores", fmt_jobs(v)),
            ));
        }
    }

    alerts
}
