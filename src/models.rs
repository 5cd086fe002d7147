use chrono::NaiveDate;
use serde::Serialize;

/// Cadence of a dataset's periods. Determines the lag used for
/// year-over-year comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub fn yoy_lag(self) -> usize {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Annual => 1,
        }
    }
}

/// One observation of a single-metric series. `date` is `None` when the
/// period label could not be parsed; such rows never participate in lag
/// arithmetic but are kept for raw display.
#[derive(Debug, Clone)]
pub struct SeriesRow {
    pub period_label: String,
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
    pub sector: Option<String>,
}

/// One observation of the job-flows dataset. Flows carry several metrics
/// per period, so they get their own row type instead of a generic lookup.
#[derive(Debug, Clone)]
pub struct FlowRow {
    pub period_label: String,
    pub date: Option<NaiveDate>,
    pub hires: Option<f64>,
    pub seps: Option<f64>,
    pub entry_rate: Option<f64>,
    pub exit_rate: Option<f64>,
    pub rotation_rate: Option<f64>,
}

impl FlowRow {
    /// Net job creation: hires minus separations, `None` if either side is
    /// missing.
    pub fn net_creation(&self) -> Option<f64> {
        match (self.hires, self.seps) {
            (Some(h), Some(s)) => Some(h - s),
            _ => None,
        }
    }
}

/// A named, date-sorted collection of observations sharing one frequency.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub frequency: Frequency,
    pub rows: Vec<SeriesRow>,
}

impl Series {
    pub fn empty(name: &str, frequency: Frequency) -> Self {
        Series {
            name: name.to_string(),
            frequency,
            rows: Vec::new(),
        }
    }

    /// Label of the chronologically latest dated row. Insertion order is not
    /// trusted, since filtering may reorder or drop rows.
    pub fn latest_label(&self) -> Option<&str> {
        self.rows
            .iter()
            .filter(|r| r.date.is_some())
            .max_by_key(|r| r.date)
            .map(|r| r.period_label.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FlowSeries {
    pub name: String,
    pub frequency: Frequency,
    pub rows: Vec<FlowRow>,
}

impl FlowSeries {
    pub fn empty(name: &str, frequency: Frequency) -> Self {
        FlowSeries {
            name: name.to_string(),
            frequency,
            rows: Vec::new(),
        }
    }

    pub fn latest_label(&self) -> Option<&str> {
        self.rows
            .iter()
            .filter(|r| r.date.is_some())
            .max_by_key(|r| r.date)
            .map(|r| r.period_label.as_str())
    }
}

/// A row of a series with its derived percent changes.
#[derive(Debug, Clone)]
pub struct VariationRecord {
    pub period_label: String,
    pub date: NaiveDate,
    pub value: Option<f64>,
    pub var_short: Option<f64>,
    pub var_yoy: Option<f64>,
    pub index_base100: Option<f64>,
}

/// User-supplied alert thresholds. Secondary thresholds are fixed multiples
/// of the two base percentages; the absolute-level constants below are
/// hand-tuned defaults carried over from the source dashboard.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub quarterly_pct: f64,
    pub yoy_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            quarterly_pct: 5.0,
            yoy_pct: 10.0,
        }
    }
}

impl Thresholds {
    pub fn warning_quarterly(&self) -> f64 {
        self.quarterly_pct * 0.6
    }

    pub fn warning_yoy(&self) -> f64 {
        self.yoy_pct * 0.5
    }

    pub fn sector_crisis_yoy(&self) -> f64 {
        self.yoy_pct * 1.5
    }
}

/// Absolute employment loss (jobs) that triggers a critical alert on its own.
pub const MASS_LOSS_JOBS: f64 = 50_000.0;
/// Absolute employment gain (jobs) worth a positive alert.
pub const STRONG_GAIN_JOBS: f64 = 30_000.0;
/// Net job creation magnitude separating informational from critical/positive
/// flow alerts.
pub const NET_FLOW_JOBS: f64 = 50_000.0;
/// Gender gap movement (percentage points) that escalates to critical.
pub const GAP_JUMP_PP: f64 = 2.0;
/// Gender gap movement (percentage points) that is worth a warning.
pub const GAP_DRIFT_PP: f64 = 0.5;
/// Exit rate excess over entry rate (percentage points) worth a warning.
pub const RATE_SPREAD_PP: f64 = 0.5;
/// Rotation rate excess over its historical mean (percentage points).
pub const ROTATION_EXCESS_PP: f64 = 2.0;
/// Year-over-year band treated as stagnation for the firm count.
pub const FIRM_STAGNATION_PCT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Positive,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critica",
            Severity::Warning => "Advertencia",
            Severity::Positive => "Positiva",
            Severity::Info => "Informativa",
        }
    }

    pub fn priority(self) -> u8 {
        match self {
            Severity::Critical => 1,
            Severity::Warning => 2,
            Severity::Positive => 3,
            Severity::Info => 4,
        }
    }
}

/// Which rule evaluator produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    Employment,
    EmploymentSectors,
    Wages,
    Firms,
    Flows,
    Gender,
    MultiSource,
}

impl Source {
    /// Collapses sub-sources to the dataset family they belong to, used when
    /// counting distinct deteriorating sources.
    pub fn parent(self) -> Source {
        match self {
            Source::EmploymentSectors => Source::Employment,
            other => other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Source::Employment => "Empleo",
            Source::EmploymentSectors => "Empleo sectorial",
            Source::Wages => "Remuneraciones",
            Source::Firms => "Empresas",
            Source::Flows => "Flujos",
            Source::Gender => "Genero",
            Source::MultiSource => "Multi-fuente",
        }
    }
}

/// An immutable alert produced by one evaluation pass. Priority 0 is reserved
/// for the synthesized multi-source alert; 1..=4 follow severity order.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub severity: Severity,
    pub source: Source,
    pub title: String,
    pub message: String,
    pub priority: u8,
}

impl Alert {
    pub fn new(
        severity: Severity,
        source: Source,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Alert {
            severity,
            source,
            title: title.into(),
            message: message.into(),
            priority: severity.priority(),
        }
    }
}

/// The read-only data snapshot the alert engine evaluates. Constructed once
/// by the loader and passed by reference; evaluators never mutate it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// C1.1: total registered employment, quarterly.
    pub employment: Series,
    /// C3: employment by CIIU sector, quarterly.
    pub sectors: Series,
    /// R1: average nominal wage, monthly.
    pub wages: Series,
    /// E1: count of employer firms, annual.
    pub firms: Series,
    /// F1: job flows (hires, separations, rates), quarterly.
    pub flows: FlowSeries,
    /// G2: gender wage gap in percent, quarterly.
    pub gender_gap: Series,
    /// CIIU code -> human description, for sector alert titles.
    pub sector_names: std::collections::HashMap<String, String>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Snapshot {
            employment: Series::empty("C1.1", Frequency::Quarterly),
            sectors: Series::empty("C3", Frequency::Quarterly),
            wages: Series::empty("R1", Frequency::Monthly),
            firms: Series::empty("E1", Frequency::Annual),
            flows: FlowSeries::empty("F1", Frequency::Quarterly),
            gender_gap: Series::empty("G2", Frequency::Quarterly),
            sector_names: std::collections::HashMap::new(),
        }
    }
}
