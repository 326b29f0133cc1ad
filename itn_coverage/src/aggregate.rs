use log::{debug, info};

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::classify::classify;
use crate::config::*;

/// The statistics of one run, at every level.
#[derive(PartialEq, Debug, Clone)]
pub struct CoverageReport {
    pub overall: LevelStatistic,
    /// In order of first appearance of the district.
    pub by_district: Vec<LevelStatistic>,
    /// Grouped by district (same order as `by_district`), then by first
    /// appearance of the chiefdom within the district.
    pub by_chiefdom: Vec<LevelStatistic>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
struct GroupCounts {
    schools: usize,
    schools_with_distribution: usize,
    chiefdoms: usize,
    districts: usize,
}

// The only place where distributed, coverage, bucket and remaining are derived.
fn build_statistic(
    district: Option<String>,
    chiefdom: Option<String>,
    counts: GroupCounts,
    totals: Totals,
) -> LevelStatistic {
    let coverage = totals.coverage();
    LevelStatistic {
        district,
        chiefdom,
        schools: counts.schools,
        schools_with_distribution: counts.schools_with_distribution,
        chiefdoms: counts.chiefdoms,
        districts: counts.districts,
        enrollment: totals.enrollment,
        boys: totals.boys,
        girls: totals.girls,
        left: totals.left,
        distributed: totals.distributed(),
        coverage,
        bucket: classify(coverage),
        remaining: totals.remaining(),
    }
}

impl LevelStatistic {
    /// The statistic of a group without any row.
    pub fn empty(district: Option<String>, chiefdom: Option<String>) -> LevelStatistic {
        build_statistic(district, chiefdom, GroupCounts::default(), Totals::EMPTY)
    }

    /// Computes the statistic of exactly these rows.
    pub fn from_rows(
        district: Option<String>,
        chiefdom: Option<String>,
        rows: &[&NormalizedRow],
    ) -> LevelStatistic {
        let totals: Totals = rows.iter().map(|r| r.totals()).sum();
        let counts = GroupCounts {
            schools: rows.len(),
            schools_with_distribution: rows.iter().filter(|r| r.total_distributed > 0).count(),
            chiefdoms: distinct(rows.iter().filter_map(|r| r.chiefdom.as_ref())),
            districts: distinct(rows.iter().filter_map(|r| r.district.as_ref())),
        };
        build_statistic(district, chiefdom, counts, totals)
    }
}

fn distinct<T: Eq + Hash>(it: impl Iterator<Item = T>) -> usize {
    it.collect::<HashSet<T>>().len()
}

/// Groups the rows by key, keeping the order in which the keys first appear.
/// Rows without a key are skipped.
fn group_by<'a, K, F>(rows: &[&'a NormalizedRow], key: F) -> Vec<(K, Vec<&'a NormalizedRow>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&NormalizedRow) -> Option<K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a NormalizedRow>)> = Vec::new();
    for r in rows.iter().copied() {
        if let Some(k) = key(r) {
            match positions.get(&k) {
                Some(idx) => groups[*idx].1.push(r),
                None => {
                    positions.insert(k.clone(), groups.len());
                    groups.push((k, vec![r]));
                }
            }
        }
    }
    groups
}

/// Rolls the rows up into overall, district and chiefdom statistics.
///
/// Every statistic sums the fields of the normalized rows of its group and
/// nothing else, so the levels always agree with each other.
pub fn aggregate(rows: &[NormalizedRow]) -> CoverageReport {
    let all: Vec<&NormalizedRow> = rows.iter().collect();
    let overall = LevelStatistic::from_rows(None, None, &all);

    let mut by_district: Vec<LevelStatistic> = Vec::new();
    let mut by_chiefdom: Vec<LevelStatistic> = Vec::new();
    for (district, district_rows) in group_by(&all, |r| r.district.clone()) {
        debug!(
            "aggregate: district {:?}: {} rows",
            district,
            district_rows.len()
        );
        by_district.push(LevelStatistic::from_rows(
            Some(district.clone()),
            None,
            &district_rows,
        ));
        for (chiefdom, chiefdom_rows) in group_by(&district_rows, |r| r.chiefdom.clone()) {
            by_chiefdom.push(LevelStatistic::from_rows(
                Some(district.clone()),
                Some(chiefdom),
                &chiefdom_rows,
            ));
        }
    }

    info!(
        "aggregate: {} rows, {} districts, {} chiefdoms, coverage {:.1}%",
        overall.schools,
        by_district.len(),
        by_chiefdom.len(),
        overall.coverage
    );
    CoverageReport {
        overall,
        by_district,
        by_chiefdom,
    }
}

/// District names are compared without case, the way the survey tables
/// and the boundary dataset disagree on it.
pub fn same_district(a: &str, b: &str) -> bool {
    a.trim().to_uppercase() == b.trim().to_uppercase()
}

// Merges statistics of disjoint row sets. Totals are sums, so merging
// partial statistics gives the statistic of the union.
fn merge(
    district: Option<String>,
    chiefdom: Option<String>,
    parts: &[&LevelStatistic],
    chiefdoms: usize,
) -> LevelStatistic {
    let totals: Totals = parts.iter().map(|s| s.totals()).sum();
    let counts = GroupCounts {
        schools: parts.iter().map(|s| s.schools).sum(),
        schools_with_distribution: parts.iter().map(|s| s.schools_with_distribution).sum(),
        chiefdoms,
        districts: if parts.is_empty() { 0 } else { 1 },
    };
    build_statistic(district, chiefdom, counts, totals)
}

impl CoverageReport {
    /// The statistic of a district, looked up without case. Districts spelled
    /// with different cases in the survey are merged.
    pub fn district(&self, name: &str) -> Option<LevelStatistic> {
        let parts: Vec<&LevelStatistic> = self
            .by_district
            .iter()
            .filter(|s| s.district.as_deref().map(|d| same_district(d, name)) == Some(true))
            .collect();
        let first = parts.first()?;
        let chiefdoms = self.chiefdoms(name).len();
        Some(merge(first.district.clone(), None, &parts, chiefdoms))
    }

    /// The chiefdoms of a district, in order of first appearance.
    pub fn chiefdoms(&self, district: &str) -> Vec<LevelStatistic> {
        let parts: Vec<&LevelStatistic> = self
            .by_chiefdom
            .iter()
            .filter(|s| s.district.as_deref().map(|d| same_district(d, district)) == Some(true))
            .collect();
        let mut order: Vec<&str> = Vec::new();
        for s in parts.iter() {
            if let Some(c) = s.chiefdom.as_deref() {
                if !order.contains(&c) {
                    order.push(c);
                }
            }
        }
        order
            .iter()
            .map(|c| {
                let same: Vec<&LevelStatistic> = parts
                    .iter()
                    .filter(|s| s.chiefdom.as_deref() == Some(*c))
                    .copied()
                    .collect();
                merge(same[0].district.clone(), Some(c.to_string()), &same, 1)
            })
            .collect()
    }

    /// The chiefdoms of a district, sorted by canonical name. This is the
    /// order of the tables.
    pub fn chiefdoms_sorted(&self, district: &str) -> Vec<LevelStatistic> {
        let mut res = self.chiefdoms(district);
        res.sort_by(|a, b| a.chiefdom.cmp(&b.chiefdom));
        res
    }

    /// The statistic of one chiefdom. The chiefdom name must be the canonical one.
    pub fn chiefdom(&self, district: &str, chiefdom: &str) -> Option<LevelStatistic> {
        self.chiefdoms(district)
            .into_iter()
            .find(|s| s.chiefdom.as_deref() == Some(chiefdom))
    }
}
