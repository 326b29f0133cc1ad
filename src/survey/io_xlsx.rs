use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::survey::{
    io_common::{simplify_file_name, Cell, ColumnIndex},
    *,
};

pub fn read_xlsx_survey(
    path: &str,
    worksheet_name: Option<&str>,
    layout: &SurveyLayout,
) -> BSurveyResult<Vec<SurveyRecord>> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|c| read_cell(c).as_text().unwrap_or_default())
        .collect();
    debug!("read_xlsx_survey: header: {:?}", header);
    let columns = ColumnIndex::new(&header, layout, path);

    let mut res: Vec<SurveyRecord> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let cells: Vec<Cell> = row.iter().map(read_cell).collect();
        let record = columns.record(&cells);
        debug!("read_xlsx_survey: idx: {:?} record: {:?}", idx, record);
        res.push(record);
    }
    info!(
        "read_xlsx_survey: {}: {} records",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) => Cell::from_text(s),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Empty => Cell::Empty,
        _ => {
            debug!("read_cell: ignoring cell {:?}", cell);
            Cell::Empty
        }
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> BSurveyResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }

    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => Err(Box::new(SurveyError::EmptyExcel {
            path: path.to_string(),
        })),
        [(name, wrange)] => {
            debug!("get_range: path: {:?} worksheet: {:?}", &path, &name);
            Ok(wrange.clone())
        }
        [(name, wrange), ..] => {
            warn!(
                "{}: {} worksheets and no worksheet name given, using {:?}",
                simplify_file_name(path),
                all_worksheets.len(),
                name
            );
            Ok(wrange.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::Int(4)), Cell::Number(4.0));
        assert_eq!(read_cell(&DataType::Float(2.5)), Cell::Number(2.5));
        assert_eq!(
            read_cell(&DataType::String("District: BO".to_string())),
            Cell::Text("District: BO".to_string())
        );
        assert_eq!(read_cell(&DataType::String(" ".to_string())), Cell::Empty);
        assert_eq!(read_cell(&DataType::Bool(true)), Cell::Empty);
    }

    const SURVEY_XLSX: &str = "tests/bo_bombali/survey.xlsx";

    #[test]
    fn survey_workbook() {
        let layout = SurveyLayout::default();
        let records = read_xlsx_survey(SURVEY_XLSX, Some("Survey"), &layout).unwrap();
        assert_eq!(records.len(), 6);
        let first = &records[0];
        let payload = first.payload.as_deref().unwrap();
        assert!(payload.contains("District: BO\n"));
        assert!(payload.contains("Chiefdom: Bo City"));
        assert_eq!(first.classes.len(), 5);
        assert_eq!(first.classes[0].enrolled, Some(30.0));
        assert_eq!(first.classes[1].girls, Some(6.0));
        // Only two classes in the workbook.
        assert_eq!(first.classes[2].enrolled, None);
        assert_eq!(first.left_at_school, Some(5.0));
        assert_eq!(records[1].left_at_school, None);
        assert_eq!(records[4].payload, None);
        assert_eq!(records[4].classes[0].boys, Some(5.0));
    }

    #[test]
    fn first_worksheet_by_default() {
        let layout = SurveyLayout::default();
        let named = read_xlsx_survey(SURVEY_XLSX, Some("Survey"), &layout).unwrap();
        let default = read_xlsx_survey(SURVEY_XLSX, None, &layout).unwrap();
        assert_eq!(named, default);
    }

    #[test]
    fn missing_worksheet() {
        let res = read_xlsx_survey(SURVEY_XLSX, Some("Census"), &SurveyLayout::default());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(SurveyError::EmptyExcel { .. })
        ));
    }

    #[test]
    fn missing_workbook() {
        let res = read_xlsx_survey("tests/missing.xlsx", None, &SurveyLayout::default());
        assert!(matches!(
            res.map_err(|e| *e),
            Err(SurveyError::OpeningExcel { .. })
        ));
    }
}
