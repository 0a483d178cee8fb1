//! Text, JSON and CSV rendering of classified score data

use crate::category::Category;
use crate::dataset::DatasetStore;
use crate::record::AggregateValue;
use crate::severity::SeverityHistogram;
use crate::threshold::ThresholdPolicy;
use serde::Serialize;

/// Format a microsecond duration with the two most significant units
///
/// `3_725_000_000` -> `1h 02m`, `125_000_000` -> `2m 05s`,
/// `3_120_000` -> `3s 120ms`, `15_400` -> `15ms`, `250` -> `250us`
pub fn format_duration_us(us: u64) -> String {
    let ms = us / 1_000;
    let seconds = ms / 1_000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds % 60)
    } else if seconds > 0 {
        format!("{}s {:03}ms", seconds, ms % 1_000)
    } else if ms > 0 {
        format!("{}ms", ms)
    } else {
        format!("{}us", us)
    }
}

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// One classified aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub name: String,
    pub severity: u32,
    pub max: u32,
    pub min: u32,
    /// Absent for aggregates without samples
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<u64>,
    pub count: u32,
    pub accumulated: u64,
}

impl From<&AggregateValue> for AggregateRow {
    fn from(value: &AggregateValue) -> Self {
        Self {
            name: value.name().to_string(),
            severity: value.severity(),
            max: value.max(),
            min: value.min(),
            mean: value.mean(),
            count: value.count(),
            accumulated: value.accumulated(),
        }
    }
}

/// Classified aggregates of one category
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub category: Category,
    pub thresholds: Vec<u32>,
    pub normalized: bool,
    pub histogram: SeverityHistogram,
    pub rows: Vec<AggregateRow>,
}

impl AggregateReport {
    /// Build from the store; `top` keeps the N entries with the highest max
    pub fn from_store(
        store: &DatasetStore,
        policy: &ThresholdPolicy,
        category: Category,
        top: Option<usize>,
    ) -> Self {
        let mut rows: Vec<AggregateRow> = store
            .dataset(category)
            .map(|d| d.values().iter().map(AggregateRow::from).collect())
            .unwrap_or_default();

        if let Some(limit) = top {
            rows.sort_by(|a, b| b.max.cmp(&a.max).then_with(|| a.name.cmp(&b.name)));
            rows.truncate(limit);
        }

        Self {
            category,
            thresholds: policy.thresholds_for(store, category).to_vec(),
            normalized: policy.is_normalized(),
            histogram: SeverityHistogram::from_store(store, category),
            rows,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} ({} entries, {} thresholds)\n",
            self.category.label(),
            self.histogram.total(),
            if self.normalized { "normalized" } else { "manual" }
        ));

        let bounds: Vec<String> = self
            .thresholds
            .iter()
            .map(|&t| {
                if t == u32::MAX {
                    "max".to_string()
                } else {
                    format_duration_us(u64::from(t))
                }
            })
            .collect();
        out.push_str(&format!("thresholds: [{}]\n", bounds.join(", ")));

        let histogram: Vec<String> = (1..self.histogram.counts.len())
            .map(|rank| format!("{}:{}", rank, self.histogram.count(rank as u32)))
            .collect();
        out.push_str(&format!("severity: {}\n\n", histogram.join(" ")));

        out.push_str(&format!(
            "{:>3}  {:>12}  {:>12}  {:>8}  {}\n",
            "sev", "max", "mean", "count", "name"
        ));
        out.push_str(&format!("{}\n", "-".repeat(60)));
        for row in &self.rows {
            let mean = row
                .mean
                .map(format_duration_us)
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "{:>3}  {:>12}  {:>12}  {:>8}  {}\n",
                row.severity,
                format_duration_us(u64::from(row.max)),
                mean,
                row.count,
                row.name
            ));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from("name,severity,max,min,mean,count,accumulated\n");
        for row in &self.rows {
            out.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                escape_field(&row.name),
                row.severity,
                row.max,
                row.min,
                row.mean.map(|m| m.to_string()).unwrap_or_default(),
                row.count,
                row.accumulated
            ));
        }
        out
    }
}

/// One translation unit's cost in a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRow {
    pub name: String,
    pub value: u32,
    /// Whole compiler execution time of the unit
    pub total: u32,
}

/// Translation units ranked by their cost in one category
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub category: Category,
    pub rows: Vec<UnitRow>,
}

impl UnitReport {
    /// Build from the store; rows sorted by descending value
    pub fn from_store(store: &DatasetStore, category: Category, top: Option<usize>) -> Self {
        let mut rows: Vec<UnitRow> = store
            .units()
            .iter()
            .map(|unit| UnitRow {
                name: unit.name().to_string(),
                value: unit.value(category).unwrap_or(0),
                total: unit.value(Category::ExecuteCompiler).unwrap_or(0),
            })
            .collect();

        rows.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        if let Some(limit) = top {
            rows.truncate(limit);
        }

        Self { category, rows }
    }

    pub fn to_text(&self) -> String {
        let mut out = format!("Units by {} ({} units)\n\n", self.category.label(), self.rows.len());
        out.push_str(&format!("{:>12}  {:>12}  {}\n", "value", "total", "name"));
        out.push_str(&format!("{}\n", "-".repeat(60)));
        for row in &self.rows {
            out.push_str(&format!(
                "{:>12}  {:>12}  {}\n",
                format_duration_us(u64::from(row.value)),
                format_duration_us(u64::from(row.total)),
                row.name
            ));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from("name,value,total\n");
        for row in &self.rows {
            out.push_str(&format!(
                "{},{},{}\n",
                escape_field(&row.name),
                row.value,
                row.total
            ));
        }
        out
    }
}
