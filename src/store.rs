use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{FlowRow, FlowSeries, Frequency, Series, SeriesRow, Snapshot};
use crate::period;

#[derive(Deserialize)]
struct EmploymentCsv {
    #[serde(rename = "Período", alias = "Periodo")]
    period: String,
    #[serde(rename = "Empleo", default)]
    empleo: Option<f64>,
}

#[derive(Deserialize)]
struct SectorCsv {
    #[serde(rename = "Período", alias = "Periodo")]
    period: String,
    #[serde(rename = "Sector")]
    sector: String,
    #[serde(rename = "Empleo", default)]
    empleo: Option<f64>,
}

#[derive(Deserialize)]
struct WageCsv {
    #[serde(rename = "Período", alias = "Periodo")]
    period: String,
    #[serde(rename = "Remuneracion", alias = "Remuneración", default)]
    remuneracion: Option<f64>,
}

#[derive(Deserialize)]
struct FirmCsv {
    #[serde(rename = "Período", alias = "Periodo")]
    period: String,
    #[serde(rename = "Empresas", default)]
    empresas: Option<f64>,
}

#[derive(Deserialize)]
struct FlowCsv {
    #[serde(rename = "Período", alias = "Periodo")]
    period: String,
    #[serde(rename = "Altas", default)]
    altas: Option<f64>,
    #[serde(rename = "Bajas", default)]
    bajas: Option<f64>,
    #[serde(rename = "Tasa_Entrada", default)]
    tasa_entrada: Option<f64>,
    #[serde(rename = "Tasa_Salida", default)]
    tasa_salida: Option<f64>,
    #[serde(rename = "Tasa_Rotacion", default)]
    tasa_rotacion: Option<f64>,
}

#[derive(Deserialize)]
struct GapCsv {
    #[serde(rename = "Período", alias = "Periodo")]
    period: String,
    #[serde(rename = "Brecha", default)]
    brecha: Option<f64>,
}

#[derive(Deserialize)]
struct DescriptorCsv {
    #[serde(rename = "Tabla")]
    tabla: String,
    #[serde(rename = "Código", alias = "Codigo")]
    codigo: String,
    #[serde(rename = "Descripción", alias = "Descripcion")]
    descripcion: String,
}

/// Loads the full snapshot from a directory of preprocessed CSVs. A missing
/// or unreadable file degrades to an empty dataset with a warning on stderr;
/// one bad source must never block the others.
pub fn load_snapshot(dir: &Path) -> anyhow::Result<Snapshot> {
    let mut snapshot = Snapshot::empty();

    snapshot.employment = series_from(
        read_rows::<EmploymentCsv>(&dir.join("C1.1.csv")),
        "C1.1",
        Frequency::Quarterly,
        |row| (row.period, row.empleo, None),
    );
    snapshot.sectors = series_from(
        read_rows::<SectorCsv>(&dir.join("C3.csv")),
        "C3",
        Frequency::Quarterly,
        |row| (row.period, row.empleo, Some(row.sector)),
    );
    snapshot.wages = series_from(
        read_rows::<WageCsv>(&dir.join("R1.csv")),
        "R1",
        Frequency::Monthly,
        |row| (row.period, row.remuneracion, None),
    );
    snapshot.firms = series_from(
        read_rows::<FirmCsv>(&dir.join("E1.csv")),
        "E1",
        Frequency::Annual,
        |row| (row.period, row.empresas, None),
    );
    snapshot.gender_gap = series_from(
        read_rows::<GapCsv>(&dir.join("G2.csv")),
        "G2",
        Frequency::Quarterly,
        |row| (row.period, row.brecha, None),
    );

    let mut flow_rows: Vec<FlowRow> = read_rows::<FlowCsv>(&dir.join("F1.csv"))
        .into_iter()
        .map(|row| FlowRow {
            date: period::parse(&row.period),
            period_label: row.period,
            hires: row.altas,
            seps: row.bajas,
            entry_rate: row.tasa_entrada,
            exit_rate: row.tasa_salida,
            rotation_rate: row.tasa_rotacion,
        })
        .collect();
    flow_rows.sort_by_key(|r| r.date);
    snapshot.flows = FlowSeries {
        name: "F1".to_string(),
        frequency: Frequency::Quarterly,
        rows: flow_rows,
    };

    snapshot.sector_names = sector_descriptors(&dir.join("descriptores_CIIU.csv"));

    Ok(snapshot)
}

fn series_from<T>(
    raw: Vec<T>,
    name: &str,
    frequency: Frequency,
    extract: impl Fn(T) -> (String, Option<f64>, Option<String>),
) -> Series {
    let mut rows: Vec<SeriesRow> = raw
        .into_iter()
        .map(|record| {
            let (period_label, value, sector) = extract(record);
            SeriesRow {
                date: period::parse(&period_label),
                period_label,
                value,
                sector,
            }
        })
        .collect();
    rows.sort_by_key(|r| r.date);
    Series {
        name: name.to_string(),
        frequency,
        rows,
    }
}

/// Reads every deserializable record from a CSV file. Records that fail to
/// deserialize are skipped with a warning; a missing file yields an empty
/// vector.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        eprintln!("aviso: {} no encontrado, dataset vacio", path.display());
        return Vec::new();
    }

    let reader = match csv::Reader::from_path(path)
        .with_context(|| format!("no se pudo abrir {}", path.display()))
    {
        Ok(reader) => reader,
        Err(err) => {
            eprintln!("aviso: {err:#}");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for result in reader.into_deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => eprintln!("aviso: fila invalida en {}: {err}", path.display()),
        }
    }
    rows
}

fn sector_descriptors(path: &Path) -> HashMap<String, String> {
    read_rows::<DescriptorCsv>(path)
        .into_iter()
        .filter(|d| d.tabla == "C3")
        .map(|d| (d.codigo, d.descripcion))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("sipa-alerts-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_employment_rows_sorted_by_date() {
        let dir = temp_dir("empleo");
        write_fixture(
            &dir,
            "C1.1.csv",
            "Período,Empleo\n2º Trim 2020,980000\n1º Trim 2020,1000000\n",
        );

        let snapshot = load_snapshot(&dir).unwrap();
        assert_eq!(snapshot.employment.rows.len(), 2);
        assert_eq!(snapshot.employment.rows[0].period_label, "1º Trim 2020");
        assert_eq!(snapshot.employment.rows[1].value, Some(980_000.0));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_files_degrade_to_empty_datasets() {
        let dir = temp_dir("vacio");
        let snapshot = load_snapshot(&dir).unwrap();
        assert!(snapshot.employment.rows.is_empty());
        assert!(snapshot.flows.rows.is_empty());
        assert!(snapshot.sector_names.is_empty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn blank_metric_cells_become_none() {
        let dir = temp_dir("nulos");
        write_fixture(
            &dir,
            "C1.1.csv",
            "Período,Empleo\n1º Trim 2020,\n2º Trim 2020,990000\n",
        );
        let snapshot = load_snapshot(&dir).unwrap();
        assert_eq!(snapshot.employment.rows[0].value, None);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn descriptors_keep_only_sector_table_entries() {
        let dir = temp_dir("desc");
        write_fixture(
            &dir,
            "descriptores_CIIU.csv",
            "Tabla,Código,Descripción\nC3,D,Industria manufacturera\nC5,X,Otra tabla\n",
        );
        let snapshot = load_snapshot(&dir).unwrap();
        assert_eq!(
            snapshot.sector_names.get("D").map(String::as_str),
            Some("Industria manufacturera")
        );
        assert!(!snapshot.sector_names.contains_key("X"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn flow_rates_are_optional_columns() {
        let dir = temp_dir("flujos");
        write_fixture(
            &dir,
            "F1.csv",
            "Período,Altas,Bajas\n1º Trim 2023,200000,190000\n",
        );
        let snapshot = load_snapshot(&dir).unwrap();
        let row = &snapshot.flows.rows[0];
        assert_eq!(row.net_creation(), Some(10_000.0));
        assert!(row.rotation_rate.is_none());
        fs::remove_dir_all(&dir).ok();
    }
}
