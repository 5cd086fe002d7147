use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod alerts;
mod models;
mod period;
mod report;
mod store;
mod variation;

use models::Thresholds;

#[derive(Parser)]
#[command(name = "sipa-alerts")]
#[command(about = "Deteccion de alertas sobre las series de empleo SIPA", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every alert rule and print the ranked list
    Alerts {
        #[arg(long, default_value = "data/processed")]
        data_dir: PathBuf,
        #[arg(long, default_value_t = 5.0)]
        quarterly_pct: f64,
        #[arg(long, default_value_t = 10.0)]
        yoy_pct: f64,
        /// Start of the analyzed window, as a period label (e.g. "1º Trim 2020")
        #[arg(long)]
        desde: Option<String>,
        /// End of the analyzed window, as a period label
        #[arg(long)]
        hasta: Option<String>,
        #[arg(long, default_value_t = 15)]
        limit: usize,
        /// Emit the alert list as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown alert report
    Report {
        #[arg(long, default_value = "data/processed")]
        data_dir: PathBuf,
        #[arg(long, default_value_t = 5.0)]
        quarterly_pct: f64,
        #[arg(long, default_value_t = 10.0)]
        yoy_pct: f64,
        #[arg(long)]
        desde: Option<String>,
        #[arg(long)]
        hasta: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print the variation table for one single-metric dataset
    Variations {
        #[arg(long, default_value = "data/processed")]
        data_dir: PathBuf,
        /// Dataset key: C1.1, R1, E1 or G2
        #[arg(long)]
        dataset: String,
        #[arg(long, default_value_t = 12)]
        limit: usize,
    },
    /// List loaded datasets with row counts and latest periods
    Datasets {
        #[arg(long, default_value = "data/processed")]
        data_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Alerts {
            data_dir,
            quarterly_pct,
            yoy_pct,
            desde,
            hasta,
            limit,
            json,
        } => {
            let thresholds = Thresholds {
                quarterly_pct,
                yoy_pct,
            };
            let snapshot = store::load_snapshot(&data_dir)?;
            let snapshot = period::filter_snapshot(&snapshot, desde.as_deref(), hasta.as_deref());
            let merged = alerts::aggregate::aggregate(alerts::evaluate_all(&snapshot, &thresholds));

            if json {
                println!("{}", serde_json::to_string_pretty(&merged)?);
                return Ok(());
            }

            if merged.is_empty() {
                println!("No se detectaron alertas significativas con los umbrales configurados.");
                println!(
                    "Umbrales: Trimestral {quarterly_pct}% | Interanual {yoy_pct}%"
                );
                return Ok(());
            }

            let counts = alerts::aggregate::summarize(&merged);
            println!(
                "Criticas: {} | Advertencias: {} | Positivas: {} | Informativas: {}",
                counts.critical, counts.warning, counts.positive, counts.info
            );
            for alert in merged.iter().take(limit) {
                println!(
                    "- [{}] {} ({}): {}",
                    alert.severity.label(),
                    alert.title,
                    alert.source.label(),
                    alert.message
                );
            }
            if merged.len() > limit {
                println!("... y {} alertas adicionales", merged.len() - limit);
            }
        }
        Commands::Report {
            data_dir,
            quarterly_pct,
            yoy_pct,
            desde,
            hasta,
            out,
        } => {
            let thresholds = Thresholds {
                quarterly_pct,
                yoy_pct,
            };
            let snapshot = store::load_snapshot(&data_dir)?;
            let filtered = period::filter_snapshot(&snapshot, desde.as_deref(), hasta.as_deref());
            let merged =
                alerts::aggregate::aggregate(alerts::evaluate_all(&filtered, &thresholds));
            let report = report::build_report(
                &thresholds,
                desde.as_deref(),
                hasta.as_deref(),
                filtered.employment.latest_label(),
                &merged,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("no se pudo escribir {}", out.display()))?;
            println!("Informe escrito en {}.", out.display());
        }
        Commands::Variations {
            data_dir,
            dataset,
            limit,
        } => {
            let snapshot = store::load_snapshot(&data_dir)?;
            let series = match dataset.as_str() {
                "C1.1" => &snapshot.employment,
                "R1" => &snapshot.wages,
                "E1" => &snapshot.firms,
                "G2" => &snapshot.gender_gap,
                other => anyhow::bail!(
                    "dataset desconocido: {other} (disponibles: C1.1, R1, E1, G2)"
                ),
            };

            let records =
                variation::compute(&series.rows, 1, series.frequency.yoy_lag());
            if records.is_empty() {
                println!("Sin datos para {dataset}.");
                return Ok(());
            }

            println!(
                "{:<16} {:>14} {:>10} {:>10} {:>10}",
                "Periodo", "Valor", "Var.", "Var. i.a.", "Indice"
            );
            let skip = records.len().saturating_sub(limit);
            for r in records.iter().skip(skip) {
                println!(
                    "{:<16} {:>14} {:>10} {:>10} {:>10}",
                    r.period_label,
                    fmt_cell(r.value, 0),
                    fmt_cell(r.var_short, 2),
                    fmt_cell(r.var_yoy, 2),
                    fmt_cell(r.index_base100, 1),
                );
            }
        }
        Commands::Datasets { data_dir } => {
            let snapshot = store::load_snapshot(&data_dir)?;
            let series = [
                &snapshot.employment,
                &snapshot.sectors,
                &snapshot.wages,
                &snapshot.firms,
                &snapshot.gender_gap,
            ];
            for s in series {
                println!(
                    "{:<6} {:>6} filas, ultimo periodo: {}",
                    s.name,
                    s.rows.len(),
                    s.latest_label().unwrap_or("N/D")
                );
            }
            println!(
                "{:<6} {:>6} filas, ultimo periodo: {}",
                snapshot.flows.name,
                snapshot.flows.rows.len(),
                snapshot.flows.latest_label().unwrap_or("N/D")
            );
        }
    }

    Ok(())
}

fn fmt_cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/D".to_string(),
    }
}
