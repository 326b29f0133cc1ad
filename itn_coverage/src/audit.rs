//! Data quality checks on the raw records and the normalized rows.

use log::{debug, warn};

use std::collections::BTreeMap;

use crate::aggregate::CoverageReport;
use crate::config::*;
use crate::extract::count_value;

/// Nets received per class, over all the rows.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ClassBreakdown {
    pub class: u32,
    pub enrolled: u64,
    pub boys: u64,
    pub girls: u64,
}

impl ClassBreakdown {
    pub fn received(&self) -> u64 {
        self.boys + self.girls
    }
}

/// Per-class totals, ordered by class index.
pub fn class_breakdown(rows: &[NormalizedRow]) -> Vec<ClassBreakdown> {
    let mut by_class: BTreeMap<u32, ClassBreakdown> = BTreeMap::new();
    for c in rows.iter().flat_map(|r| r.classes.iter()) {
        let entry = by_class.entry(c.class).or_insert(ClassBreakdown {
            class: c.class,
            enrolled: 0,
            boys: 0,
            girls: 0,
        });
        entry.enrolled += c.enrolled;
        entry.boys += c.boys;
        entry.girls += c.girls;
    }
    by_class.into_values().collect()
}

/// Statistics of the nets left at the schools for absent pupils.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct LeftAtSchoolStats {
    /// Rows where the value was present.
    pub schools_reporting: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub total: u64,
}

/// `None` when no row reports the value.
pub fn left_at_school_stats(rows: &[NormalizedRow]) -> Option<LeftAtSchoolStats> {
    let values: Vec<u64> = rows.iter().filter_map(|r| r.left_at_school).collect();
    let min = *values.iter().min()?;
    let max = *values.iter().max()?;
    let total: u64 = values.iter().sum();
    Some(LeftAtSchoolStats {
        schools_reporting: values.len(),
        min,
        max,
        mean: total as f64 / values.len() as f64,
        total,
    })
}

/// Compares the totals summed column by column over the raw records with the
/// totals of the normalized rows.
///
/// The two only differ by the records without payload: their counts are read
/// by the column sums but dropped by the extraction.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ConsistencyAudit {
    pub raw: Totals,
    pub normalized: Totals,
    /// Records without payload that carried non-zero counts.
    pub dropped_rows: usize,
    pub dropped: Totals,
}

impl ConsistencyAudit {
    pub fn is_consistent(&self) -> bool {
        self.raw == self.normalized
    }

    /// Distributed nets found in the columns but absent from the report.
    pub fn distributed_difference(&self) -> i64 {
        self.raw.distributed() as i64 - self.normalized.distributed() as i64
    }
}

fn record_totals(record: &SurveyRecord) -> Totals {
    let mut t = Totals {
        left: count_value(record.left_at_school),
        ..Totals::EMPTY
    };
    for c in record.classes.iter() {
        t.enrollment += count_value(c.enrolled);
        t.boys += count_value(c.boys);
        t.girls += count_value(c.girls);
    }
    t
}

pub fn audit(records: &[SurveyRecord], report: &CoverageReport) -> ConsistencyAudit {
    let raw: Totals = records.iter().map(record_totals).sum();
    let mut dropped = Totals::EMPTY;
    let mut dropped_rows = 0;
    for r in records.iter().filter(|r| r.payload.is_none()) {
        let t = record_totals(r);
        if t != Totals::EMPTY {
            dropped_rows += 1;
            dropped += t;
        }
    }
    let res = ConsistencyAudit {
        raw,
        normalized: report.overall.totals(),
        dropped_rows,
        dropped,
    };
    if res.is_consistent() {
        debug!("audit: column totals match the report: {:?}", raw);
    } else {
        warn!(
            "audit: column totals {:?} differ from the report {:?}; {} rows without payload carry {:?}",
            res.raw, res.normalized, res.dropped_rows, res.dropped
        );
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::extract::RecordExtractor;
    use crate::names::AliasTable;

    fn records() -> Vec<SurveyRecord> {
        vec![
            SurveyRecord::new(Some("District: BO\nChiefdom: Bo City"))
                .with_class(1, Some(50.0), Some(20.0), Some(15.0))
                .with_class(2, Some(10.0), Some(4.0), None)
                .with_left_at_school(Some(5.0)),
            SurveyRecord::new(Some("District: BO\nChiefdom: Bargbo"))
                .with_class(1, Some(30.0), Some(10.0), Some(10.0))
                .with_left_at_school(Some(2.0)),
            SurveyRecord::new(Some("District: BOMBALI\nChiefdom: Mara"))
                .with_class(2, Some(8.0), Some(3.0), Some(3.0)),
        ]
    }

    fn rows(records: &[SurveyRecord]) -> Vec<NormalizedRow> {
        let table = AliasTable::default_chiefdoms();
        RecordExtractor::new(&table, &SurveyLayout::default())
            .unwrap()
            .extract(records)
    }

    #[test]
    fn breakdown_by_class() {
        let b = class_breakdown(&rows(&records()));
        assert_eq!(b.len(), 2);
        assert_eq!(b[0].class, 1);
        assert_eq!(b[0].boys, 30);
        assert_eq!(b[0].girls, 25);
        assert_eq!(b[0].enrolled, 80);
        assert_eq!(b[1].class, 2);
        assert_eq!(b[1].received(), 10);
    }

    #[test]
    fn left_stats() {
        let s = left_at_school_stats(&rows(&records())).unwrap();
        assert_eq!(s.schools_reporting, 2);
        assert_eq!(s.min, 2);
        assert_eq!(s.max, 5);
        assert_eq!(s.total, 7);
        assert_eq!(s.mean, 3.5);

        assert_eq!(left_at_school_stats(&[]), None);
    }

    #[test]
    fn audit_is_consistent_with_payloads() {
        let recs = records();
        let report = aggregate(&rows(&recs));
        let a = audit(&recs, &report);
        assert!(a.is_consistent());
        assert_eq!(a.raw.distributed(), 72);
        assert_eq!(a.dropped_rows, 0);
        assert_eq!(a.distributed_difference(), 0);
    }

    #[test]
    fn audit_flags_rows_without_payload() {
        let mut recs = records();
        recs.push(
            SurveyRecord::new(None)
                .with_class(1, Some(12.0), Some(4.0), Some(4.0))
                .with_left_at_school(Some(1.0)),
        );
        recs.push(SurveyRecord::new(None));
        let report = aggregate(&rows(&recs));
        let a = audit(&recs, &report);
        assert!(!a.is_consistent());
        assert_eq!(a.dropped_rows, 1);
        assert_eq!(a.dropped.distributed(), 9);
        assert_eq!(a.distributed_difference(), 9);
    }
}
