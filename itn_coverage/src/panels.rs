/*!
The data behind the per-district map grids: one panel per chiefdom of the
boundary dataset, colored by coverage.

Drawing is left to the caller. A panel carries everything a renderer needs:
the fill color, the centre label and the caption under the chiefdom name.
*/

use log::{debug, info};

use std::collections::BTreeSet;

use crate::aggregate::{same_district, CoverageReport};
use crate::classify::{classify, CoverageBucket};
use crate::config::*;

#[derive(PartialEq, Debug, Clone)]
pub struct ChiefdomPanel {
    pub chiefdom: String,
    pub distributed: u64,
    pub enrollment: u64,
    pub coverage: f64,
    /// The coverage shown on the map, capped at 100.
    pub display_coverage: f64,
    pub bucket: CoverageBucket,
    pub row: usize,
    pub col: usize,
}

impl ChiefdomPanel {
    pub fn color(&self) -> &'static str {
        self.bucket.color()
    }

    /// For example `(62, 80)`.
    pub fn caption(&self) -> String {
        format!("({}, {})", self.distributed, self.enrollment)
    }

    /// For example `78%`.
    pub fn label(&self) -> String {
        format!("{:.0}%", self.display_coverage)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct DistrictPanels {
    pub district: String,
    pub columns: usize,
    pub rows: usize,
    pub panels: Vec<ChiefdomPanel>,
}

/// Builds the panels of one district.
///
/// The chiefdoms come from the boundary regions whose district is exactly
/// `district`, sorted by name. Survey rows are matched on the district without
/// case and on the canonical chiefdom name exactly. Returns `None` when the
/// boundary dataset has no region for the district.
pub fn district_panels(
    report: &CoverageReport,
    boundaries: &[BoundaryRegion],
    district: &str,
    columns: usize,
) -> Option<DistrictPanels> {
    let columns = columns.max(1);
    let chiefdoms: BTreeSet<&str> = boundaries
        .iter()
        .filter(|b| b.district == district)
        .map(|b| b.chiefdom.as_str())
        .collect();
    if chiefdoms.is_empty() {
        info!("district_panels: no chiefdom found for district {:?}", district);
        return None;
    }

    let panels: Vec<ChiefdomPanel> = chiefdoms
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let stat = report
                .chiefdom(district, name)
                .unwrap_or_else(|| LevelStatistic::empty(Some(district.to_string()), None));
            if stat.schools == 0 {
                debug!("district_panels: no survey data for {:?}/{:?}", district, name);
            }
            let display_coverage = stat.coverage.min(100.0);
            ChiefdomPanel {
                chiefdom: name.to_string(),
                distributed: stat.distributed,
                enrollment: stat.enrollment,
                coverage: stat.coverage,
                display_coverage,
                bucket: classify(display_coverage),
                row: idx / columns,
                col: idx % columns,
            }
        })
        .collect();

    Some(DistrictPanels {
        district: district.to_string(),
        columns,
        rows: (panels.len() + columns - 1) / columns,
        panels,
    })
}

/// The survey chiefdoms (district, chiefdom) that have no region in the
/// boundary dataset. These rows never show on a map.
pub fn unmatched_chiefdoms(
    report: &CoverageReport,
    boundaries: &[BoundaryRegion],
) -> Vec<(String, String)> {
    report
        .by_chiefdom
        .iter()
        .filter_map(|s| match (s.district.as_ref(), s.chiefdom.as_ref()) {
            (Some(d), Some(c)) => Some((d, c)),
            _ => None,
        })
        .filter(|(d, c)| {
            !boundaries
                .iter()
                .any(|b| same_district(&b.district, d) && b.chiefdom == **c)
        })
        .map(|(d, c)| (d.clone(), c.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::extract::RecordExtractor;
    use crate::names::AliasTable;

    fn region(d: &str, c: &str) -> BoundaryRegion {
        BoundaryRegion {
            district: d.to_string(),
            chiefdom: c.to_string(),
        }
    }

    fn boundaries() -> Vec<BoundaryRegion> {
        vec![
            region("BO", "KAKUA"),
            region("BO", "BO TOWN"),
            region("BO", "BAGBO"),
            region("BO", "BADJIA"),
            region("BO", "BOAMA"),
            region("BOMBALI", "MARA"),
            region("BO", "BAGBO"),
        ]
    }

    fn report() -> CoverageReport {
        let records = vec![
            SurveyRecord::new(Some("District: BO\nChiefdom: Bo City"))
                .with_class(1, Some(50.0), Some(20.0), Some(15.0))
                .with_left_at_school(Some(5.0)),
            SurveyRecord::new(Some("District: Bo\nChiefdom: Bargbo"))
                .with_class(1, Some(30.0), Some(10.0), Some(10.0))
                .with_left_at_school(Some(2.0)),
            SurveyRecord::new(Some("District: BO\nChiefdom: Kakua"))
                .with_class(1, Some(10.0), Some(10.0), Some(10.0)),
            SurveyRecord::new(Some("District: BO\nChiefdom: Somewhere"))
                .with_class(1, Some(10.0), Some(1.0), Some(1.0)),
        ];
        let table = AliasTable::default_chiefdoms();
        let rows = RecordExtractor::new(&table, &SurveyLayout::default())
            .unwrap()
            .extract(&records);
        aggregate(&rows)
    }

    #[test]
    fn grid_and_labels() {
        let p = district_panels(&report(), &boundaries(), "BO", 4).unwrap();
        let names: Vec<&str> = p.panels.iter().map(|x| x.chiefdom.as_str()).collect();
        assert_eq!(names, vec!["BADJIA", "BAGBO", "BO TOWN", "BOAMA", "KAKUA"]);
        assert_eq!(p.rows, 2);
        assert_eq!((p.panels[4].row, p.panels[4].col), (1, 0));
        assert_eq!((p.panels[3].row, p.panels[3].col), (0, 3));

        let bo_town = &p.panels[2];
        assert_eq!(bo_town.caption(), "(40, 50)");
        assert_eq!(bo_town.label(), "80%");
        assert_eq!(bo_town.color(), "#1976d2");

        // Matched through a district spelled differently.
        assert_eq!(p.panels[1].caption(), "(22, 30)");

        // No survey data.
        assert_eq!(p.panels[0].caption(), "(0, 0)");
        assert_eq!(p.panels[0].bucket, CoverageBucket::Critical);
    }

    #[test]
    fn panels_are_capped() {
        let p = district_panels(&report(), &boundaries(), "BO", 4).unwrap();
        let kakua = &p.panels[4];
        assert_eq!(kakua.coverage, 200.0);
        assert_eq!(kakua.display_coverage, 100.0);
        assert_eq!(kakua.label(), "100%");
        assert_eq!(kakua.bucket, CoverageBucket::Outstanding);
    }

    #[test]
    fn grid_sizes() {
        let r = report();
        let b = boundaries();
        assert_eq!(district_panels(&r, &b, "BO", 5).unwrap().rows, 1);
        assert_eq!(district_panels(&r, &b, "BO", 2).unwrap().rows, 3);
        assert_eq!(district_panels(&r, &b, "BO", 0).unwrap().columns, 1);
        assert_eq!(district_panels(&r, &b, "BOMBALI", 4).unwrap().rows, 1);
        // The boundary names are matched exactly.
        assert!(district_panels(&r, &b, "Bo", 4).is_none());
        assert!(district_panels(&r, &b, "KAMBIA", 4).is_none());
    }

    #[test]
    fn unmatched() {
        let u = unmatched_chiefdoms(&report(), &boundaries());
        assert_eq!(u, vec![("BO".to_string(), "Somewhere".to_string())]);
    }
}
