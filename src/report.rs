use std::fmt::Write;

use crate::alerts::aggregate;
use crate::models::{Alert, Thresholds};

/// Alerts listed in full before the report truncates with a trailer line.
const MAX_LISTED_ALERTS: usize = 15;

pub fn build_report(
    thresholds: &Thresholds,
    desde: Option<&str>,
    hasta: Option<&str>,
    latest_period: Option<&str>,
    alerts: &[Alert],
) -> String {
    let counts = aggregate::summarize(alerts);
    let mut output = String::new();

    let _ = writeln!(output, "# Informe de alertas SIPA");
    match (desde, hasta) {
        (Some(desde), Some(hasta)) => {
            let _ = writeln!(output, "Periodo analizado: {desde} hasta {hasta}");
        }
        _ => {
            let _ = writeln!(output, "Analizando todos los periodos disponibles");
        }
    }
    if let Some(periodo) = latest_period {
        let _ = writeln!(output, "Ultimo periodo con datos: {periodo}");
    }
    let _ = writeln!(
        output,
        "Umbrales: Trimestral {}% | Interanual {}%",
        thresholds.quarterly_pct, thresholds.yoy_pct
    );
    let _ = writeln!(output);

    if alerts.is_empty() {
        let _ = writeln!(output, "## Estado del sistema");
        let _ = writeln!(
            output,
            "No se detectaron alertas significativas con los umbrales configurados."
        );
        return output;
    }

    let _ = writeln!(output, "## Resumen");
    let _ = writeln!(output, "- Criticas: {}", counts.critical);
    let _ = writeln!(output, "- Advertencias: {}", counts.warning);
    let _ = writeln!(output, "- Positivas: {}", counts.positive);
    let _ = writeln!(output, "- Informativas: {}", counts.info);
    let _ = writeln!(output);

    let _ = writeln!(output, "## Alertas");
    for alert in alerts.iter().take(MAX_LISTED_ALERTS) {
        let _ = writeln!(
            output,
            "- [{}] {} ({}): {}",
            alert.severity.label(),
            alert.title,
            alert.source.label(),
            alert.message
        );
    }
    if alerts.len() > MAX_LISTED_ALERTS {
        let _ = writeln!(
            output,
            "... y {} alertas adicionales",
            alerts.len() - MAX_LISTED_ALERTS
        );
    }

    output
}
