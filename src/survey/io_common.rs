use crate::survey::*;

use std::path::Path;

/// A cell of a survey table, independent of the file format.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn from_text(s: &str) -> Cell {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(x) => Some(x.to_string()),
            Cell::Empty => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(x) => Some(*x),
            Cell::Text(s) => {
                let res = parse_number(s);
                if res.is_none() {
                    debug!("as_number: not a number: {:?}", s);
                }
                res
            }
            Cell::Empty => None,
        }
    }
}

/// Parses a count written as text. Thousands separators are accepted, words
/// are not.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

// The columns of one class: enrollment, boys, girls.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ClassColumns {
    class: u32,
    enrolled: Option<usize>,
    boys: Option<usize>,
    girls: Option<usize>,
}

/// The position of the survey columns in the header of a table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndex {
    payload: Option<usize>,
    classes: Vec<ClassColumns>,
    left_at_school: Option<usize>,
}

fn find_column(header: &[String], name: &str, path: &str) -> Option<usize> {
    let res = header.iter().position(|h| h.trim() == name.trim());
    if res.is_none() {
        warn!(
            "{}: missing column {:?}, its values are counted as zero",
            simplify_file_name(path),
            name
        );
    }
    res
}

impl ColumnIndex {
    /// Locates the columns of the layout. A missing column is reported once
    /// here and then read as empty.
    pub fn new(header: &[String], layout: &SurveyLayout, path: &str) -> ColumnIndex {
        let classes = layout
            .class_indices()
            .map(|class| ClassColumns {
                class,
                enrolled: find_column(header, &layout.enrollment_column(class), path),
                boys: find_column(header, &layout.boys_column(class), path),
                girls: find_column(header, &layout.girls_column(class), path),
            })
            .collect();
        let res = ColumnIndex {
            payload: find_column(header, &layout.payload_column, path),
            classes,
            left_at_school: find_column(header, &layout.left_at_school_column, path),
        };
        debug!("ColumnIndex::new: {:?}", res);
        res
    }

    pub fn record(&self, row: &[Cell]) -> SurveyRecord {
        let get = |idx: Option<usize>| idx.and_then(|i| row.get(i));
        let mut res = SurveyRecord::new(None);
        res.payload = get(self.payload).and_then(|c| c.as_text());
        for c in self.classes.iter() {
            res = res.with_class(
                c.class,
                get(c.enrolled).and_then(|x| x.as_number()),
                get(c.boys).and_then(|x| x.as_number()),
                get(c.girls).and_then(|x| x.as_number()),
            );
        }
        res.with_left_at_school(get(self.left_at_school).and_then(|x| x.as_number()))
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(layout: &SurveyLayout) -> Vec<String> {
        vec![
            "Start time".to_string(),
            layout.payload_column.clone(),
            layout.enrollment_column(1),
            layout.boys_column(1),
            layout.girls_column(1),
            format!(" {} ", layout.enrollment_column(2)),
            layout.boys_column(2),
            layout.left_at_school_column.clone(),
        ]
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number(" 1,250 "), Some(1250.0));
        assert_eq!(parse_number("12.5"), Some(12.5));
        assert_eq!(parse_number("twelve"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(Cell::from_text("  "), Cell::Empty);
        assert_eq!(Cell::Text("7".to_string()).as_number(), Some(7.0));
        assert_eq!(Cell::Text("n/a".to_string()).as_number(), None);
    }

    #[test]
    fn columns_by_name() {
        let layout = SurveyLayout::default();
        let idx = ColumnIndex::new(&header(&layout), &layout, "survey.csv");
        let row = vec![
            Cell::from_text("2024-05-02"),
            Cell::from_text("District: BO\nChiefdom: Kakua"),
            Cell::Number(40.0),
            Cell::Number(12.0),
            Cell::from_text("13"),
            Cell::Number(20.0),
            Cell::Empty,
            Cell::Number(3.0),
        ];
        let r = idx.record(&row);
        assert_eq!(r.payload.as_deref(), Some("District: BO\nChiefdom: Kakua"));
        assert_eq!(r.classes.len(), 5);
        assert_eq!(r.classes[0].enrolled, Some(40.0));
        assert_eq!(r.classes[0].girls, Some(13.0));
        assert_eq!(r.classes[1].enrolled, Some(20.0));
        assert_eq!(r.classes[1].boys, None);
        assert_eq!(r.classes[1].girls, None);
        assert_eq!(r.classes[4].enrolled, None);
        assert_eq!(r.left_at_school, Some(3.0));
    }

    #[test]
    fn short_rows() {
        let layout = SurveyLayout::default();
        let idx = ColumnIndex::new(&header(&layout), &layout, "survey.csv");
        let r = idx.record(&[Cell::Empty, Cell::Empty, Cell::Number(5.0)]);
        assert_eq!(r.payload, None);
        assert_eq!(r.classes[0].enrolled, Some(5.0));
        assert_eq!(r.left_at_school, None);
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("data/bo/survey.xlsx"), "survey.xlsx");
        assert_eq!(simplify_file_name("survey.csv"), "survey.csv");
    }
}
