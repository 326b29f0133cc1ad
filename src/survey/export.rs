// Writers for the summary and the tables.

use serde::Serialize;

use itn_coverage::tables::{CoverageRow, SummaryRow};

use crate::survey::*;

/// A line of `coverage_by_chiefdom.csv`.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct CoverageCsvRow {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Chiefdom")]
    pub chiefdom: String,
    #[serde(rename = "Total Enrollment")]
    pub enrollment: u64,
    #[serde(rename = "ITNs Distributed")]
    pub distributed: u64,
    #[serde(rename = "Coverage (%)")]
    pub coverage: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl From<&CoverageRow> for CoverageCsvRow {
    fn from(r: &CoverageRow) -> CoverageCsvRow {
        CoverageCsvRow {
            district: r.district.clone(),
            chiefdom: r.chiefdom.clone(),
            enrollment: r.enrollment,
            distributed: r.distributed,
            coverage: format!("{:.1}", r.coverage),
            status: r.status.label().to_string(),
        }
    }
}

/// A line of `distribution_summary.csv`.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct SummaryCsvRow {
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Total Enrollment")]
    pub enrollment: u64,
    #[serde(rename = "ITNs Distributed")]
    pub distributed: u64,
    #[serde(rename = "Coverage (%)")]
    pub coverage: String,
}

impl From<&SummaryRow> for SummaryCsvRow {
    fn from(r: &SummaryRow) -> SummaryCsvRow {
        SummaryCsvRow {
            level: r.level.label(),
            name: r.name.clone(),
            enrollment: r.enrollment,
            distributed: r.distributed,
            coverage: format!("{:.1}%", r.coverage),
        }
    }
}

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> BSurveyResult<()> {
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu { path })?;
    for r in rows {
        wtr.serialize(r).context(WritingCsvSnafu { path })?;
    }
    wtr.flush().context(WritingOutputSnafu { path })?;
    info!("write_csv: {}: {} lines", path, rows.len());
    Ok(())
}

pub fn write_json(path: &str, value: &JSValue) -> BSurveyResult<()> {
    let s = serde_json::to_string_pretty(value).context(ParsingJsonSnafu {})?;
    fs::write(path, s).context(WritingOutputSnafu { path })?;
    info!("write_json: {}", path);
    Ok(())
}
