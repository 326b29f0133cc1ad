//! Flat tables over the report, restricted to the target districts.

use crate::aggregate::CoverageReport;
use crate::classify::CoverageBucket;
use crate::config::*;

/// Whether a summary row describes a district or one of its chiefdoms.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SummaryLevel {
    District,
    /// Holds the district name: the level reads `BO Chiefdom`.
    Chiefdom(String),
}

impl SummaryLevel {
    pub fn label(&self) -> String {
        match self {
            SummaryLevel::District => "District".to_string(),
            SummaryLevel::Chiefdom(d) => format!("{} Chiefdom", d),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SummaryRow {
    pub level: SummaryLevel,
    pub name: String,
    pub enrollment: u64,
    pub distributed: u64,
    pub coverage: f64,
}

impl SummaryRow {
    fn from_statistic(level: SummaryLevel, name: String, stat: &LevelStatistic) -> SummaryRow {
        SummaryRow {
            level,
            name,
            enrollment: stat.enrollment,
            distributed: stat.distributed,
            coverage: stat.coverage,
        }
    }
}

/// The district rows first, in the order of `districts`, then the chiefdoms of
/// each district sorted by name.
///
/// A target district without data still gets a row, with zero counts.
pub fn summary_table(report: &CoverageReport, districts: &[String]) -> Vec<SummaryRow> {
    let mut res: Vec<SummaryRow> = Vec::new();
    for d in districts.iter() {
        let stat = report
            .district(d)
            .unwrap_or_else(|| LevelStatistic::empty(Some(d.clone()), None));
        res.push(SummaryRow::from_statistic(
            SummaryLevel::District,
            d.clone(),
            &stat,
        ));
    }
    for d in districts.iter() {
        for c in report.chiefdoms_sorted(d).iter() {
            res.push(SummaryRow::from_statistic(
                SummaryLevel::Chiefdom(d.clone()),
                c.name(),
                c,
            ));
        }
    }
    res
}

#[derive(PartialEq, Debug, Clone)]
pub struct CoverageRow {
    pub district: String,
    pub chiefdom: String,
    pub enrollment: u64,
    pub distributed: u64,
    pub coverage: f64,
    pub status: CoverageBucket,
}

/// One row per chiefdom of the target districts, sorted by name within each
/// district. The coverage is not capped.
pub fn coverage_table(report: &CoverageReport, districts: &[String]) -> Vec<CoverageRow> {
    districts
        .iter()
        .flat_map(|d| {
            report
                .chiefdoms_sorted(d)
                .into_iter()
                .map(move |c| CoverageRow {
                    district: d.clone(),
                    chiefdom: c.name(),
                    enrollment: c.enrollment,
                    distributed: c.distributed,
                    coverage: c.coverage,
                    status: c.bucket,
                })
        })
        .collect()
}

/// Returns the number of chiefdoms of the target districts with a coverage at
/// or above `threshold`, and the number of chiefdoms considered.
pub fn chiefdoms_meeting(
    report: &CoverageReport,
    threshold: f64,
    districts: &[String],
) -> (usize, usize) {
    let chiefdoms: Vec<LevelStatistic> =
        districts.iter().flat_map(|d| report.chiefdoms(d)).collect();
    let meeting = chiefdoms.iter().filter(|c| c.coverage >= threshold).count();
    (meeting, chiefdoms.len())
}
