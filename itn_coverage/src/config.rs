// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::classify::CoverageBucket;
use crate::names::MatchKind;

/// The counts reported for one class of a school.
///
/// All the values are optional: a missing column or an empty cell is `None`
/// and contributes nothing. The values are kept as they were read (spreadsheets
/// store numbers as floats); they are truncated during extraction.
#[derive(PartialEq, Debug, Clone)]
pub struct ClassCounts {
    pub class: u32,
    pub enrolled: Option<f64>,
    pub boys: Option<f64>,
    pub girls: Option<f64>,
}

/// One row of the survey, as parsed by the readers.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SurveyRecord {
    /// The text scanned from the school QR code. It holds the `District:` and
    /// `Chiefdom:` lines.
    pub payload: Option<String>,
    pub classes: Vec<ClassCounts>,
    /// Nets kept at the school for absent pupils. This is a school-level value,
    /// not a per-class one.
    pub left_at_school: Option<f64>,
}

impl SurveyRecord {
    pub fn new(payload: Option<&str>) -> SurveyRecord {
        SurveyRecord {
            payload: payload.map(|s| s.to_string()),
            classes: Vec::new(),
            left_at_school: None,
        }
    }

    pub fn with_class(
        mut self,
        class: u32,
        enrolled: Option<f64>,
        boys: Option<f64>,
        girls: Option<f64>,
    ) -> SurveyRecord {
        self.classes.push(ClassCounts {
            class,
            enrolled,
            boys,
            girls,
        });
        self
    }

    pub fn with_left_at_school(mut self, left: Option<f64>) -> SurveyRecord {
        self.left_at_school = left;
        self
    }
}

/// A named region of the boundary dataset. Only the attributes are needed here,
/// the geometry stays with the renderer.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct BoundaryRegion {
    pub district: String,
    pub chiefdom: String,
}

// ******** Derived data structures *********

/// Truncated counts of one class, after extraction.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ClassTotals {
    pub class: u32,
    pub enrolled: u64,
    pub boys: u64,
    pub girls: u64,
}

/// One survey record after extraction and name reconciliation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NormalizedRow {
    pub district: Option<String>,
    /// Canonical chiefdom name, in the naming of the boundary dataset.
    pub chiefdom: Option<String>,
    /// The chiefdom as it was written in the payload, trimmed.
    pub chiefdom_raw: Option<String>,
    pub chiefdom_match: Option<MatchKind>,
    pub has_payload: bool,
    pub classes: Vec<ClassTotals>,
    pub boys: u64,
    pub girls: u64,
    pub left_at_school: Option<u64>,
    pub total_enrollment: u64,
    pub total_distributed: u64,
}

impl NormalizedRow {
    /// The row that stands for a record without payload. It is kept so that
    /// the row counts match the input.
    pub fn empty() -> NormalizedRow {
        NormalizedRow {
            district: None,
            chiefdom: None,
            chiefdom_raw: None,
            chiefdom_match: None,
            has_payload: false,
            classes: Vec::new(),
            boys: 0,
            girls: 0,
            left_at_school: None,
            total_enrollment: 0,
            total_distributed: 0,
        }
    }

    pub fn left(&self) -> u64 {
        self.left_at_school.unwrap_or(0)
    }

    pub fn totals(&self) -> Totals {
        Totals {
            enrollment: self.total_enrollment,
            boys: self.boys,
            girls: self.girls,
            left: self.left(),
        }
    }
}

/// Summed counts of a set of rows.
///
/// The distributed count is never stored: it is always `boys + girls + left`,
/// so summing rows and summing components give the same number.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct Totals {
    pub enrollment: u64,
    pub boys: u64,
    pub girls: u64,
    pub left: u64,
}

impl Totals {
    pub const EMPTY: Totals = Totals {
        enrollment: 0,
        boys: 0,
        girls: 0,
        left: 0,
    };

    pub fn distributed(&self) -> u64 {
        self.boys + self.girls + self.left
    }

    /// Distributed over enrolled, in percent. Zero when nobody is enrolled.
    /// Not capped: values above 100 signal over-distribution or bad data.
    pub fn coverage(&self) -> f64 {
        if self.enrollment > 0 {
            self.distributed() as f64 * 100.0 / self.enrollment as f64
        } else {
            0.0
        }
    }

    /// Pupils still without a net. Negative when more nets were handed out
    /// than pupils enrolled.
    pub fn remaining(&self) -> i64 {
        self.enrollment as i64 - self.distributed() as i64
    }
}

impl Add for Totals {
    type Output = Totals;
    fn add(self, rhs: Totals) -> Totals {
        Totals {
            enrollment: self.enrollment + rhs.enrollment,
            boys: self.boys + rhs.boys,
            girls: self.girls + rhs.girls,
            left: self.left + rhs.left,
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        *self = *self + rhs;
    }
}

impl Sum for Totals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Totals::EMPTY, |acc, t| acc + t)
    }
}

// ******** Output data structures *********

/// Statistics for one grouping level: a chiefdom, a district or the whole survey.
#[derive(PartialEq, Debug, Clone)]
pub struct LevelStatistic {
    /// `None` for the overall statistic.
    pub district: Option<String>,
    /// Only set for chiefdom statistics.
    pub chiefdom: Option<String>,
    pub schools: usize,
    pub schools_with_distribution: usize,
    /// Distinct chiefdoms in the group.
    pub chiefdoms: usize,
    /// Distinct districts in the group.
    pub districts: usize,
    pub enrollment: u64,
    pub boys: u64,
    pub girls: u64,
    pub left: u64,
    pub distributed: u64,
    pub coverage: f64,
    pub bucket: CoverageBucket,
    pub remaining: i64,
}

impl LevelStatistic {
    pub fn totals(&self) -> Totals {
        Totals {
            enrollment: self.enrollment,
            boys: self.boys,
            girls: self.girls,
            left: self.left,
        }
    }

    /// A readable name for logs and tables.
    pub fn name(&self) -> String {
        match (&self.district, &self.chiefdom) {
            (_, Some(c)) => c.clone(),
            (Some(d), None) => d.clone(),
            (None, None) => "ALL".to_string(),
        }
    }
}

/// Errors that prevent the pipeline from running at all.
///
/// Everything else (missing columns, unreadable payloads, empty groups,
/// ambiguous aliases) is tolerated and only logged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CoverageErrors {
    EmptySurvey,
    EmptyAliasTable,
    InvalidLayout(String),
}

impl Error for CoverageErrors {}

impl Display for CoverageErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageErrors::EmptySurvey => write!(f, "the survey contains no record"),
            CoverageErrors::EmptyAliasTable => write!(f, "the chiefdom alias table is empty"),
            CoverageErrors::InvalidLayout(msg) => write!(f, "invalid survey layout: {}", msg),
        }
    }
}

// ********* Configuration **********

/// The placeholder replaced by the class index in the column templates.
pub const CLASS_PLACEHOLDER: &str = "{class}";

/// Where things are in the survey, and which districts to report on.
///
/// The defaults follow the school-based distribution survey of BO and BOMBALI.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyLayout {
    pub payload_column: String,
    pub district_label: String,
    pub chiefdom_label: String,
    pub enrollment_template: String,
    pub boys_template: String,
    pub girls_template: String,
    pub left_at_school_column: String,
    pub first_class: u32,
    pub last_class: u32,
    /// The districts shown in the tables and panels.
    pub districts: Vec<String>,
    /// Coverage at or above which a chiefdom counts as well covered.
    pub good_coverage_threshold: f64,
    pub panel_columns: usize,
}

impl Default for SurveyLayout {
    fn default() -> Self {
        SurveyLayout {
            payload_column: "Scan QR code".to_string(),
            district_label: "District:".to_string(),
            chiefdom_label: "Chiefdom:".to_string(),
            enrollment_template: "How many pupils are enrolled in Class {class}?".to_string(),
            boys_template: "How many boys in Class {class} received ITNs?".to_string(),
            girls_template: "How many girls in Class {class} received ITNs?".to_string(),
            left_at_school_column: "ITNs left at the school for pupils who were absent."
                .to_string(),
            first_class: 1,
            last_class: 5,
            districts: vec!["BO".to_string(), "BOMBALI".to_string()],
            good_coverage_threshold: 60.0,
            panel_columns: 4,
        }
    }
}

impl SurveyLayout {
    pub fn class_indices(&self) -> std::ops::RangeInclusive<u32> {
        self.first_class..=self.last_class
    }

    pub fn enrollment_column(&self, class: u32) -> String {
        fill_template(&self.enrollment_template, class)
    }

    pub fn boys_column(&self, class: u32) -> String {
        fill_template(&self.boys_template, class)
    }

    pub fn girls_column(&self, class: u32) -> String {
        fill_template(&self.girls_template, class)
    }

    pub fn validate(&self) -> Result<(), CoverageErrors> {
        if self.first_class > self.last_class {
            return Err(CoverageErrors::InvalidLayout(format!(
                "empty class range {}..={}",
                self.first_class, self.last_class
            )));
        }
        if self.district_label.trim().is_empty() || self.chiefdom_label.trim().is_empty() {
            return Err(CoverageErrors::InvalidLayout(
                "the payload labels cannot be empty".to_string(),
            ));
        }
        for (name, template) in [
            ("enrollment", &self.enrollment_template),
            ("boys", &self.boys_template),
            ("girls", &self.girls_template),
        ] {
            if !template.contains(CLASS_PLACEHOLDER) {
                return Err(CoverageErrors::InvalidLayout(format!(
                    "the {} column template {:?} has no {} placeholder",
                    name, template, CLASS_PLACEHOLDER
                )));
            }
        }
        if self.panel_columns == 0 {
            return Err(CoverageErrors::InvalidLayout(
                "panel columns must be at least 1".to_string(),
            ));
        }
        if !self.good_coverage_threshold.is_finite() || self.good_coverage_threshold < 0.0 {
            return Err(CoverageErrors::InvalidLayout(format!(
                "invalid good coverage threshold {}",
                self.good_coverage_threshold
            )));
        }
        Ok(())
    }
}

fn fill_template(template: &str, class: u32) -> String {
    template.replace(CLASS_PLACEHOLDER, &class.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns() {
        let layout = SurveyLayout::default();
        assert_eq!(
            layout.enrollment_column(3),
            "How many pupils are enrolled in Class 3?"
        );
        assert_eq!(
            layout.boys_column(1),
            "How many boys in Class 1 received ITNs?"
        );
        assert_eq!(
            layout.girls_column(5),
            "How many girls in Class 5 received ITNs?"
        );
        assert_eq!(layout.class_indices().count(), 5);
        assert_eq!(layout.validate(), Ok(()));
    }

    #[test]
    fn invalid_layouts() {
        let mut layout = SurveyLayout {
            first_class: 3,
            last_class: 2,
            ..SurveyLayout::default()
        };
        assert!(layout.validate().is_err());
        layout.last_class = 4;
        layout.boys_template = "Boys who received ITNs".to_string();
        assert!(layout.validate().is_err());
    }

    #[test]
    fn totals_are_associative() {
        let a = Totals {
            enrollment: 50,
            boys: 20,
            girls: 15,
            left: 5,
        };
        let b = Totals {
            enrollment: 30,
            boys: 10,
            girls: 10,
            left: 2,
        };
        let sum: Totals = vec![a, b].into_iter().sum();
        assert_eq!(sum.distributed(), a.distributed() + b.distributed());
        assert_eq!(sum.distributed(), 62);
        assert_eq!(sum.remaining(), 18);
        assert_eq!(sum.coverage(), 77.5);
    }

    #[test]
    fn zero_enrollment_has_zero_coverage() {
        let t = Totals {
            enrollment: 0,
            boys: 3,
            girls: 0,
            left: 1,
        };
        assert_eq!(t.coverage(), 0.0);
        assert_eq!(t.remaining(), -4);
    }
}
