use log::{debug, info};
use regex::Regex;

use crate::config::*;
use crate::names::{resolve_detailed, AliasTable, MatchKind};

/// The labeled fields found in a QR payload.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PayloadFields {
    pub district: Option<String>,
    pub chiefdom: Option<String>,
}

/// Reads the `District:` and `Chiefdom:` lines of a payload.
///
/// A label must start its line (leading blanks are allowed). The value is the
/// rest of the line, trimmed. A missing label or an empty value gives `None`.
#[derive(Debug, Clone)]
pub struct PayloadParser {
    district: Regex,
    chiefdom: Regex,
}

impl PayloadParser {
    pub fn new(layout: &SurveyLayout) -> Result<PayloadParser, CoverageErrors> {
        Ok(PayloadParser {
            district: label_regex(&layout.district_label)?,
            chiefdom: label_regex(&layout.chiefdom_label)?,
        })
    }

    pub fn parse(&self, payload: &str) -> PayloadFields {
        PayloadFields {
            district: capture_value(&self.district, payload),
            chiefdom: capture_value(&self.chiefdom, payload),
        }
    }
}

fn label_regex(label: &str) -> Result<Regex, CoverageErrors> {
    let pattern = format!(r"(?m)^[ \t]*{}(.*)$", regex::escape(label.trim()));
    Regex::new(&pattern)
        .map_err(|e| CoverageErrors::InvalidLayout(format!("label {:?}: {}", label, e)))
}

fn capture_value(re: &Regex, payload: &str) -> Option<String> {
    let value = re.captures(payload)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The largest value read as a count. Anything above is a data entry error,
/// and summing such values could overflow the totals.
pub const MAX_COUNT: f64 = u32::MAX as f64;

/// Converts a cell value to a count, truncated toward zero.
///
/// Negative, non-finite or implausibly large values are not counts and give
/// `None`, like a missing value.
pub(crate) fn valid_count(x: f64) -> Option<u64> {
    if x.is_finite() && (0.0..=MAX_COUNT).contains(&x) {
        Some(x.trunc() as u64)
    } else {
        debug!("valid_count: dropping invalid count {:?}", x);
        None
    }
}

/// Like [valid_count], with zero for missing or invalid values.
pub(crate) fn count_value(v: Option<f64>) -> u64 {
    v.and_then(valid_count).unwrap_or(0)
}

/// Turns survey records into normalized rows.
pub struct RecordExtractor<'a> {
    parser: PayloadParser,
    aliases: &'a AliasTable,
}

impl<'a> RecordExtractor<'a> {
    pub fn new(
        aliases: &'a AliasTable,
        layout: &SurveyLayout,
    ) -> Result<RecordExtractor<'a>, CoverageErrors> {
        layout.validate()?;
        Ok(RecordExtractor {
            parser: PayloadParser::new(layout)?,
            aliases,
        })
    }

    /// One row per record, in the same order. Records without payload are
    /// kept as empty rows.
    pub fn extract(&self, records: &[SurveyRecord]) -> Vec<NormalizedRow> {
        let rows: Vec<NormalizedRow> = records.iter().map(|r| self.normalize(r)).collect();
        info!("extract: {} records -> {} rows", records.len(), rows.len());
        rows
    }

    pub fn normalize(&self, record: &SurveyRecord) -> NormalizedRow {
        let payload = match record.payload.as_deref() {
            Some(p) => p,
            None => return NormalizedRow::empty(),
        };

        let fields = self.parser.parse(payload);
        let (chiefdom, chiefdom_match) = match fields.chiefdom.as_deref() {
            Some(raw) => {
                let (name, kind) = resolve_detailed(raw, self.aliases);
                if kind == MatchKind::PassThrough {
                    debug!("normalize: no alias for chiefdom {:?}", raw);
                }
                (Some(name), Some(kind))
            }
            None => (None, None),
        };

        let classes: Vec<ClassTotals> = record
            .classes
            .iter()
            .map(|c| ClassTotals {
                class: c.class,
                enrolled: count_value(c.enrolled),
                boys: count_value(c.boys),
                girls: count_value(c.girls),
            })
            .collect();

        let total_enrollment: u64 = classes.iter().map(|c| c.enrolled).sum();
        let boys: u64 = classes.iter().map(|c| c.boys).sum();
        let girls: u64 = classes.iter().map(|c| c.girls).sum();
        // School-level value: added once, outside of the per-class sums.
        let left_at_school = record.left_at_school.and_then(valid_count);
        let total_distributed = boys + girls + left_at_school.unwrap_or(0);

        NormalizedRow {
            district: fields.district,
            chiefdom,
            chiefdom_raw: fields.chiefdom,
            chiefdom_match,
            has_payload: true,
            classes,
            boys,
            girls,
            left_at_school,
            total_enrollment,
            total_distributed,
        }
    }
}

/// Data quality counters for one extraction.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub rows: usize,
    pub rows_without_payload: usize,
    pub rows_without_district: usize,
    pub rows_without_chiefdom: usize,
    /// Chiefdom names that matched no alias, with their number of rows, in
    /// order of appearance.
    pub unmapped_chiefdoms: Vec<(String, usize)>,
    /// Chiefdom names resolved through a substring match, with the name they
    /// were resolved to.
    pub substring_matches: Vec<(String, String)>,
}

impl ExtractionSummary {
    pub fn from_rows(rows: &[NormalizedRow]) -> ExtractionSummary {
        let mut res = ExtractionSummary {
            rows: rows.len(),
            ..ExtractionSummary::default()
        };
        for row in rows.iter() {
            if !row.has_payload {
                res.rows_without_payload += 1;
                continue;
            }
            if row.district.is_none() {
                res.rows_without_district += 1;
            }
            let raw = match row.chiefdom_raw.as_ref() {
                Some(raw) => raw,
                None => {
                    res.rows_without_chiefdom += 1;
                    continue;
                }
            };
            match (row.chiefdom_match, row.chiefdom.as_ref()) {
                (Some(MatchKind::PassThrough), Some(name)) => {
                    match res.unmapped_chiefdoms.iter_mut().find(|(n, _)| n == name) {
                        Some((_, count)) => *count += 1,
                        None => res.unmapped_chiefdoms.push((name.clone(), 1)),
                    }
                }
                (Some(MatchKind::Substring), Some(name)) => {
                    let pair = (raw.trim().to_string(), name.clone());
                    if !res.substring_matches.contains(&pair) {
                        res.substring_matches.push(pair);
                    }
                }
                _ => {}
            }
        }
        res
    }
}
