/*!
Coverage of school-based insecticide-treated net (ITN) distributions.

The survey has one row per visited school. Each row holds a scanned QR
payload naming the district and the chiefdom of the school, the pupils
enrolled in each class, the nets given to boys and girls of each class, and
the nets left at the school for absent pupils. This crate turns these rows
into coverage statistics per chiefdom, per district and overall:

- [extract] reads the payload and converts the counts,
- [names] reconciles the chiefdom spellings with the boundary dataset,
- [aggregate] rolls the rows up,
- [classify] puts every coverage into a colored bucket.

[run_coverage] runs the whole pipeline. See the [manual] for the formats.
*/

mod config;
use log::{debug, info};

pub use crate::config::*;

pub mod aggregate;
pub mod audit;
pub mod builder;
pub mod classify;
pub mod extract;
pub mod manual;
pub mod names;
pub mod panels;
pub mod tables;

use crate::aggregate::CoverageReport;
use crate::audit::ConsistencyAudit;
use crate::extract::{ExtractionSummary, RecordExtractor};
use crate::names::AliasTable;

/// Everything computed by one run.
#[derive(PartialEq, Debug, Clone)]
pub struct CoverageRun {
    /// One row per input record, in input order.
    pub rows: Vec<NormalizedRow>,
    pub report: CoverageReport,
    pub summary: ExtractionSummary,
    pub audit: ConsistencyAudit,
}

/// Runs the extraction and the aggregation over the survey records.
///
/// Arguments:
/// * `records` the survey rows, in file order
/// * `aliases` the chiefdom spellings to reconcile
/// * `layout` the labels of the payload and the class range
///
/// Missing values, unreadable payloads and unknown chiefdoms do not stop the
/// run: they are counted in the [ExtractionSummary] and logged.
pub fn run_coverage(
    records: &[SurveyRecord],
    aliases: &AliasTable,
    layout: &SurveyLayout,
) -> Result<CoverageRun, CoverageErrors> {
    info!(
        "run_coverage: {} records, {} aliases, districts: {:?}",
        records.len(),
        aliases.len(),
        layout.districts
    );
    if records.is_empty() {
        return Err(CoverageErrors::EmptySurvey);
    }
    if aliases.is_empty() {
        return Err(CoverageErrors::EmptyAliasTable);
    }

    let extractor = RecordExtractor::new(aliases, layout)?;
    let rows = extractor.extract(records);
    let summary = ExtractionSummary::from_rows(&rows);
    debug!("run_coverage: extraction summary: {:?}", summary);
    if summary.rows_without_payload > 0 {
        info!(
            "run_coverage: {} rows without payload",
            summary.rows_without_payload
        );
    }
    for (name, count) in summary.unmapped_chiefdoms.iter() {
        info!(
            "run_coverage: chiefdom {:?} ({} rows) has no alias, kept as written",
            name, count
        );
    }

    let report = aggregate::aggregate(&rows);
    let audit = audit::audit(records, &report);
    Ok(CoverageRun {
        rows,
        report,
        summary,
        audit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::CoverageBucket;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn records() -> Vec<SurveyRecord> {
        vec![
            SurveyRecord::new(Some("School: A\nDistrict: BO\nChiefdom: Bo City"))
                .with_class(1, Some(50.0), Some(20.0), Some(15.0))
                .with_left_at_school(Some(5.0)),
            SurveyRecord::new(Some("School: B\nDistrict: BO\nChiefdom: Bargbo"))
                .with_class(1, Some(30.0), Some(10.0), Some(10.0))
                .with_left_at_school(Some(2.0)),
        ]
    }

    #[test]
    fn end_to_end() {
        init();
        let run = run_coverage(
            &records(),
            &AliasTable::default_chiefdoms(),
            &SurveyLayout::default(),
        )
        .unwrap();
        assert_eq!(run.rows.len(), 2);
        assert_eq!(run.rows[0].chiefdom.as_deref(), Some("BO TOWN"));
        assert_eq!(run.rows[1].chiefdom.as_deref(), Some("BAGBO"));

        let bo = run.report.district("BO").unwrap();
        assert_eq!(bo.enrollment, 80);
        assert_eq!(bo.distributed, 62);
        assert_eq!(bo.coverage, 77.5);
        assert_eq!(bo.bucket, CoverageBucket::Good);
        assert!(run.audit.is_consistent());
        assert_eq!(run.summary.rows_without_payload, 0);
    }

    #[test]
    fn fatal_conditions() {
        init();
        let layout = SurveyLayout::default();
        assert_eq!(
            run_coverage(&[], &AliasTable::default_chiefdoms(), &layout).err(),
            Some(CoverageErrors::EmptySurvey)
        );
        assert_eq!(
            run_coverage(&records(), &AliasTable::new(), &layout).err(),
            Some(CoverageErrors::EmptyAliasTable)
        );
        let bad = SurveyLayout {
            chiefdom_label: " ".to_string(),
            ..SurveyLayout::default()
        };
        assert!(matches!(
            run_coverage(&records(), &AliasTable::default_chiefdoms(), &bad),
            Err(CoverageErrors::InvalidLayout(_))
        ));
    }

    #[test]
    fn invalid_counts_do_not_reach_the_totals() {
        init();
        let recs = vec![
            SurveyRecord::new(Some("District: BO\nChiefdom: Kakua"))
                .with_class(1, Some(10.0), Some(1e20), Some(1e20))
                .with_left_at_school(Some(-3.0)),
            SurveyRecord::new(None).with_class(1, Some(1e25), Some(1e20), Some(2.0)),
        ];
        let run = run_coverage(
            &recs,
            &AliasTable::default_chiefdoms(),
            &SurveyLayout::default(),
        )
        .unwrap();
        assert_eq!(run.report.overall.enrollment, 10);
        assert_eq!(run.report.overall.distributed, 0);
        assert_eq!(run.report.overall.remaining, 10);
        assert_eq!(audit::left_at_school_stats(&run.rows), None);
        assert_eq!(run.audit.dropped.girls, 2);
        assert_eq!(run.audit.distributed_difference(), 2);
    }

    #[test]
    fn rows_without_payload_are_counted_but_empty() {
        init();
        let mut recs = records();
        recs.push(SurveyRecord::new(None).with_class(1, Some(10.0), Some(5.0), Some(5.0)));
        let run = run_coverage(
            &recs,
            &AliasTable::default_chiefdoms(),
            &SurveyLayout::default(),
        )
        .unwrap();
        assert_eq!(run.report.overall.schools, 3);
        assert_eq!(run.report.overall.distributed, 62);
        assert_eq!(run.report.by_district.len(), 1);
        assert_eq!(run.summary.rows_without_payload, 1);
        assert_eq!(run.audit.distributed_difference(), 10);
    }
}
