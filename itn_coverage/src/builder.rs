pub use crate::config::*;
use crate::names::AliasTable;
use crate::CoverageRun;

/// A builder for adding survey records one at a time.
///
/// It is convenient when the records do not come from a file, for example
/// in tests or when another program collects them.
///
/// ```
/// pub use itn_coverage::builder::Builder;
/// pub use itn_coverage::SurveyLayout;
/// # use itn_coverage::CoverageErrors;
///
/// let mut builder = Builder::new(&SurveyLayout::default())?;
///
/// builder.add_record_simple(
///     "District: BO\nChiefdom: Bo City",
///     &[50.0],
///     &[20.0],
///     &[15.0],
///     Some(5.0),
/// )?;
/// builder.add_record_simple("District: BO\nChiefdom: Bargbo", &[30.0], &[10.0], &[10.0], Some(2.0))?;
///
/// let run = builder.build()?;
/// let bo = run.report.district("BO").unwrap();
/// assert_eq!(bo.distributed, 62);
/// assert_eq!(bo.coverage, 77.5);
/// # Ok::<(), CoverageErrors>(())
/// ```
pub struct Builder {
    pub(crate) _layout: SurveyLayout,
    pub(crate) _aliases: AliasTable,
    pub(crate) _records: Vec<SurveyRecord>,
}

impl Builder {
    /// Starts with the default chiefdom aliases.
    pub fn new(layout: &SurveyLayout) -> Result<Builder, CoverageErrors> {
        layout.validate()?;
        Ok(Builder {
            _layout: layout.clone(),
            _aliases: AliasTable::default_chiefdoms(),
            _records: Vec::new(),
        })
    }

    pub fn aliases(self, aliases: AliasTable) -> Result<Builder, CoverageErrors> {
        if aliases.is_empty() {
            return Err(CoverageErrors::EmptyAliasTable);
        }
        Ok(Builder {
            _layout: self._layout,
            _aliases: aliases,
            _records: self._records,
        })
    }

    /// Adds a school.
    ///
    /// The slices hold the values of the consecutive classes of the layout,
    /// starting at the first class. Shorter slices leave the remaining classes
    /// empty.
    pub fn add_record_simple(
        &mut self,
        payload: &str,
        enrolled: &[f64],
        boys: &[f64],
        girls: &[f64],
        left_at_school: Option<f64>,
    ) -> Result<(), CoverageErrors> {
        let mut record = SurveyRecord::new(Some(payload)).with_left_at_school(left_at_school);
        for (idx, class) in self._layout.class_indices().enumerate() {
            let (e, b, g) = (enrolled.get(idx), boys.get(idx), girls.get(idx));
            if e.is_none() && b.is_none() && g.is_none() {
                continue;
            }
            record = record.with_class(class, e.copied(), b.copied(), g.copied());
        }
        self.add_record(&record)
    }

    pub fn add_record(&mut self, record: &SurveyRecord) -> Result<(), CoverageErrors> {
        self._records.push(record.clone());
        Ok(())
    }

    pub fn build(&self) -> Result<CoverageRun, CoverageErrors> {
        crate::run_coverage(&self._records, &self._aliases, &self._layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_fails() {
        let b = Builder::new(&SurveyLayout::default()).unwrap();
        assert_eq!(b.build().err(), Some(CoverageErrors::EmptySurvey));
        let b = Builder::new(&SurveyLayout::default()).unwrap();
        assert_eq!(
            b.aliases(AliasTable::new()).err(),
            Some(CoverageErrors::EmptyAliasTable)
        );
    }

    #[test]
    fn classes_follow_the_layout() {
        let layout = SurveyLayout {
            first_class: 3,
            last_class: 4,
            ..SurveyLayout::default()
        };
        let mut b = Builder::new(&layout).unwrap();
        b.add_record_simple("District: BO\nChiefdom: Kakua", &[10.0, 20.0, 30.0], &[5.0], &[], None)
            .unwrap();
        let run = b.build().unwrap();
        let classes: Vec<u32> = run.rows[0].classes.iter().map(|c| c.class).collect();
        assert_eq!(classes, vec![3, 4]);
        // The third value is beyond the class range.
        assert_eq!(run.rows[0].total_enrollment, 30);
        assert_eq!(run.rows[0].total_distributed, 5);
    }
}
