// Primitives for reading CSV files.

use crate::survey::{
    io_common::{simplify_file_name, Cell, ColumnIndex},
    *,
};

fn open_reader(path: &str) -> SurveyResult<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })
}

fn read_header(rdr: &mut csv::Reader<std::fs::File>, path: &str) -> SurveyResult<Vec<String>> {
    let header = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?;
    Ok(header.iter().map(|s| s.to_string()).collect())
}

/// Reads a survey export. The first line holds the column names; payloads
/// spanning several lines must be quoted.
pub fn read_csv_survey(path: &str, layout: &SurveyLayout) -> BSurveyResult<Vec<SurveyRecord>> {
    let mut rdr = open_reader(path)?;
    let header = read_header(&mut rdr, path)?;
    let columns = ColumnIndex::new(&header, layout, path);

    let mut res: Vec<SurveyRecord> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let cells: Vec<Cell> = line.iter().map(Cell::from_text).collect();
        let record = columns.record(&cells);
        debug!("read_csv_survey: lineno: {:?} record: {:?}", lineno, record);
        res.push(record);
    }
    info!(
        "read_csv_survey: {}: {} records",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

/// Reads the attribute table of the boundary dataset. Both columns are
/// required. Lines with an empty district or chiefdom are skipped.
pub fn read_boundaries(
    path: &str,
    district_column: &str,
    chiefdom_column: &str,
) -> BSurveyResult<Vec<BoundaryRegion>> {
    let mut rdr = open_reader(path)?;
    let header = read_header(&mut rdr, path)?;
    let find = |name: &str| header.iter().position(|h| h.trim() == name);
    let district_idx = find(district_column).context(MissingColumnSnafu {
        column: district_column,
        path,
    })?;
    let chiefdom_idx = find(chiefdom_column).context(MissingColumnSnafu {
        column: chiefdom_column,
        path,
    })?;

    let mut res: Vec<BoundaryRegion> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let district = line.get(district_idx).unwrap_or("").trim();
        let chiefdom = line.get(chiefdom_idx).unwrap_or("").trim();
        if district.is_empty() || chiefdom.is_empty() {
            debug!("read_boundaries: skipping line {}: {:?}", lineno, line);
            continue;
        }
        res.push(BoundaryRegion {
            district: district.to_string(),
            chiefdom: chiefdom.to_string(),
        });
    }
    info!(
        "read_boundaries: {}: {} regions",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}
