use crate::models::{Alert, Severity, Snapshot, Source, Thresholds, FIRM_STAGNATION_PCT};
use crate::variation;

/// Rules over the employer-firm count (E1, annual). A year-over-year change
/// inside the stagnation band is informational and shadows the
/// growth/decline rules.
pub fn evaluate(snapshot: &Snapshot, thresholds: &Thresholds) -> Vec<Alert> {
    let series = &snapshot.firms;
    let records = variation::compute(&series.rows, 1, series.frequency.yoy_lag());

    let mut alerts = Vec::new();
    let Some(last) = records.last() else {
        return alerts;
    };
    let periodo = &last.period_label;

    let Some(vy) = last.var_yoy else {
        return alerts;
    };

    if vy.abs() < FIRM_STAGNATION_PCT {
        alerts.push(Alert::new(
            Severity::Info,
            Source::Firms,
            "Estancamiento en la cantidad de empresas",
            format!("Variacion interanual de {vy:.2}% en {periodo}"),
        ));
    } else if vy < -thresholds.yoy_pct {
        alerts.push(Alert::new(
            Severity::Critical,
            Source::Firms,
            "ALERTA CRITICA: Caida interanual de empresas",
            format!("Caida de empresas de {vy:.2}% en {periodo}"),
        ));
    } else if vy < 0.0 {
        alerts.push(Alert::new(
            Severity::Warning,
            Source::Firms,
            "Advertencia: Menos empresas que el anio anterior",
            format!("Caida de empresas de {vy:.2}% en {periodo}"),
        ));
    } else {
        alerts.push(Alert::new(
            Severity::Positive,
            Source::Firms,
            "Crecimiento en la cantidad de empresas",
            format!("Crecimiento de empresas de {vy:.2}% en {periodo}"),
        ));
    }

    alerts
}
