use log::{debug, info, warn};

use itn_coverage::aggregate::CoverageReport;
use itn_coverage::audit::{class_breakdown, left_at_school_stats};
use itn_coverage::panels::{district_panels, unmatched_chiefdoms, DistrictPanels};
use itn_coverage::tables::{chiefdoms_meeting, coverage_table, summary_table};
use itn_coverage::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::export::{write_csv, write_json, CoverageCsvRow, SummaryCsvRow};

pub mod config_reader;
pub mod export;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing or empty worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening csv file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Missing column {column} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Error writing csv file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("No survey file: use --input or the surveySources section of the configuration"))]
    MissingSource {},
    #[snafu(display("Unknown input type {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Difference detected between the computed summary and the reference {path}"))]
    ReferenceMismatch { path: String },
    #[snafu(display("{source}"))]
    Coverage { source: CoverageErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;
pub type BSurveyResult<T> = Result<T, Box<SurveyError>>;

/// What to run, after parsing the command line.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub config: Option<String>,
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    pub boundaries: Option<String>,
    pub districts: Vec<String>,
    pub out: Option<String>,
    pub reference: Option<String>,
}

impl From<&Args> for RunOptions {
    fn from(args: &Args) -> RunOptions {
        RunOptions {
            config: args.config.clone(),
            input: args.input.clone(),
            input_type: args.input_type.clone(),
            excel_worksheet_name: args.excel_worksheet_name.clone(),
            boundaries: args.boundaries.clone(),
            districts: args.district.clone(),
            out: args.out.clone(),
            reference: args.reference.clone(),
        }
    }
}

fn resolve_path(root: &Path, file_path: &str) -> String {
    let p: PathBuf = root.join(file_path);
    p.as_path().display().to_string()
}

fn infer_provider(path: &str) -> String {
    match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
    {
        Some(e) if e == "csv" => "csv".to_string(),
        _ => "xlsx".to_string(),
    }
}

fn read_survey_data(cfs: &FileSource, layout: &SurveyLayout) -> BSurveyResult<Vec<SurveyRecord>> {
    info!("Attempting to read survey file {:?}", cfs.file_path);
    match cfs.provider.as_str() {
        "xlsx" => io_xlsx::read_xlsx_survey(
            &cfs.file_path,
            cfs.excel_worksheet_name.as_deref(),
            layout,
        ),
        "csv" => io_csv::read_csv_survey(&cfs.file_path, layout),
        x => Err(Box::new(SurveyError::UnknownProvider {
            provider: x.to_string(),
        })),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn totals_js(t: &Totals) -> JSValue {
    json!({
        "enrollment": t.enrollment,
        "boys": t.boys,
        "girls": t.girls,
        "leftAtSchool": t.left,
        "distributed": t.distributed(),
    })
}

fn statistic_js(s: &LevelStatistic) -> JSValue {
    json!({
        "district": s.district,
        "chiefdom": s.chiefdom,
        "schools": s.schools,
        "schoolsWithDistribution": s.schools_with_distribution,
        "chiefdoms": s.chiefdoms,
        "districts": s.districts,
        "enrollment": s.enrollment,
        "boys": s.boys,
        "girls": s.girls,
        "leftAtSchool": s.left,
        "distributed": s.distributed,
        "coverage": round2(s.coverage),
        "status": s.bucket.label(),
        "color": s.bucket.color(),
        "remaining": s.remaining,
    })
}

fn panels_js(dp: &DistrictPanels) -> JSValue {
    let panels: Vec<JSValue> = dp
        .panels
        .iter()
        .map(|p| {
            json!({
                "chiefdom": p.chiefdom,
                "distributed": p.distributed,
                "enrollment": p.enrollment,
                "coverage": round2(p.coverage),
                "displayCoverage": round2(p.display_coverage),
                "color": p.color(),
                "label": p.label(),
                "caption": p.caption(),
                "row": p.row,
                "col": p.col,
            })
        })
        .collect();
    json!({
        "district": dp.district,
        "rows": dp.rows,
        "columns": dp.columns,
        "panels": panels,
    })
}

fn map_js(report: &CoverageReport, boundaries: &[BoundaryRegion], layout: &SurveyLayout) -> JSValue {
    let districts: Vec<JSValue> = layout
        .districts
        .iter()
        .map(
            |d| match district_panels(report, boundaries, d, layout.panel_columns) {
                Some(dp) => panels_js(&dp),
                None => {
                    warn!("No chiefdom found in the boundaries for district {:?}", d);
                    json!({
                        "district": d,
                        "rows": 0,
                        "columns": layout.panel_columns,
                        "panels": [],
                    })
                }
            },
        )
        .collect();
    let unmatched: Vec<JSValue> = unmatched_chiefdoms(report, boundaries)
        .iter()
        .map(|(d, c)| json!({"district": d, "chiefdom": c}))
        .collect();
    json!({
        "districts": districts,
        "unmatchedChiefdoms": unmatched,
    })
}

fn build_summary_js(
    config: &SurveyConfig,
    layout: &SurveyLayout,
    run: &CoverageRun,
    boundaries: Option<&[BoundaryRegion]>,
) -> JSValue {
    let report = &run.report;

    let districts: Vec<JSValue> = layout
        .districts
        .iter()
        .map(|d| {
            let mut s = report
                .district(d)
                .unwrap_or_else(|| LevelStatistic::empty(Some(d.clone()), None));
            s.district = Some(d.clone());
            statistic_js(&s)
        })
        .collect();
    let chiefdoms: Vec<JSValue> = layout
        .districts
        .iter()
        .flat_map(|d| report.chiefdoms_sorted(d))
        .map(|s| statistic_js(&s))
        .collect();
    let (good, considered) =
        chiefdoms_meeting(report, layout.good_coverage_threshold, &layout.districts);

    let summary = &run.summary;
    let unmapped: Vec<JSValue> = summary
        .unmapped_chiefdoms
        .iter()
        .map(|(name, rows)| json!({"name": name, "rows": rows}))
        .collect();
    let substring_matches: Vec<JSValue> = summary
        .substring_matches
        .iter()
        .map(|(source, canonical)| json!({"source": source, "canonical": canonical}))
        .collect();

    let audit = &run.audit;
    let classes: Vec<JSValue> = class_breakdown(&run.rows)
        .iter()
        .map(|c| {
            json!({
                "class": c.class,
                "enrolled": c.enrolled,
                "boys": c.boys,
                "girls": c.girls,
                "received": c.received(),
            })
        })
        .collect();
    let left = match left_at_school_stats(&run.rows) {
        Some(s) => json!({
            "schoolsReporting": s.schools_reporting,
            "min": s.min,
            "max": s.max,
            "mean": round2(s.mean),
            "total": s.total,
        }),
        None => JSValue::Null,
    };

    let mut js = json!({
        "config": {
            "surveyName": config.output_settings.survey_name,
            "districts": layout.districts,
        },
        "overall": statistic_js(&report.overall),
        "districts": districts,
        "chiefdoms": chiefdoms,
        "goodCoverage": {
            "threshold": layout.good_coverage_threshold,
            "chiefdoms": good,
            "total": considered,
        },
        "quality": {
            "rows": summary.rows,
            "rowsWithoutPayload": summary.rows_without_payload,
            "rowsWithoutDistrict": summary.rows_without_district,
            "rowsWithoutChiefdom": summary.rows_without_chiefdom,
            "unmappedChiefdoms": unmapped,
            "substringMatches": substring_matches,
        },
        "audit": {
            "consistent": audit.is_consistent(),
            "columnTotals": totals_js(&audit.raw),
            "reportTotals": totals_js(&audit.normalized),
            "droppedRows": audit.dropped_rows,
            "distributedDifference": audit.distributed_difference(),
        },
        "classes": classes,
        "leftAtSchool": left,
    });
    if let Some(b) = boundaries {
        js["panels"] = map_js(report, b, layout);
    }
    js
}

fn write_outputs(
    dir: &str,
    summary_js: &JSValue,
    report: &CoverageReport,
    layout: &SurveyLayout,
) -> BSurveyResult<()> {
    fs::create_dir_all(dir).context(WritingOutputSnafu { path: dir })?;
    let p = |name: &str| resolve_path(Path::new(dir), name);

    write_json(&p("summary.json"), summary_js)?;
    let coverage: Vec<CoverageCsvRow> = coverage_table(report, &layout.districts)
        .iter()
        .map(CoverageCsvRow::from)
        .collect();
    write_csv(&p("coverage_by_chiefdom.csv"), &coverage)?;
    let summary: Vec<SummaryCsvRow> = summary_table(report, &layout.districts)
        .iter()
        .map(SummaryCsvRow::from)
        .collect();
    write_csv(&p("distribution_summary.csv"), &summary)?;
    Ok(())
}

fn check_reference(path: &str, summary_js: &JSValue) -> BSurveyResult<()> {
    let summary_ref = read_summary(path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    let pretty_js_stats = serde_json::to_string_pretty(summary_js).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        return Err(Box::new(SurveyError::ReferenceMismatch {
            path: path.to_string(),
        }));
    }
    info!("The summary matches the reference {:?}", path);
    Ok(())
}

pub fn run_survey(opts: &RunOptions) -> BSurveyResult<()> {
    let (config, root) = match opts.config.as_deref() {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => (SurveyConfig::default(), PathBuf::new()),
    };
    info!("config: {:?}", config);

    let mut layout = validate_layout(&config.layout)?;
    if !opts.districts.is_empty() {
        layout.districts = opts.districts.clone();
    }
    let aliases = validate_aliases(&config.aliases)?;

    // The command line input replaces the sources of the configuration.
    let sources: Vec<FileSource> = match opts.input.as_ref() {
        Some(input) => vec![FileSource {
            provider: opts
                .input_type
                .clone()
                .unwrap_or_else(|| infer_provider(input)),
            file_path: input.clone(),
            excel_worksheet_name: opts.excel_worksheet_name.clone(),
        }],
        None => config
            .survey_sources
            .iter()
            .map(|s| FileSource {
                provider: s.provider.clone(),
                file_path: resolve_path(&root, &s.file_path),
                excel_worksheet_name: opts
                    .excel_worksheet_name
                    .clone()
                    .or_else(|| s.excel_worksheet_name.clone()),
            })
            .collect(),
    };
    if sources.is_empty() {
        return Err(Box::new(SurveyError::MissingSource {}));
    }

    let mut records: Vec<SurveyRecord> = Vec::new();
    for cfs in sources.iter() {
        let mut file_data = read_survey_data(cfs, &layout)?;
        records.append(&mut file_data);
    }
    debug!("records: {:?}", records);

    let run = run_coverage(&records, &aliases, &layout).context(CoverageSnafu {})?;

    let boundaries: Option<Vec<BoundaryRegion>> =
        match (opts.boundaries.as_ref(), config.boundary_source.as_ref()) {
            (Some(p), _) => Some(io_csv::read_boundaries(
                p,
                BoundarySource::DEFAULT_DISTRICT_COLUMN,
                BoundarySource::DEFAULT_CHIEFDOM_COLUMN,
            )?),
            (None, Some(b)) => Some(io_csv::read_boundaries(
                &resolve_path(&root, &b.file_path),
                b.district_column(),
                b.chiefdom_column(),
            )?),
            (None, None) => None,
        };
    if let Some(b) = boundaries.as_ref() {
        for (d, c) in unmatched_chiefdoms(&run.report, b) {
            warn!(
                "Chiefdom {:?} of district {:?} is not in the boundary dataset",
                c, d
            );
        }
    }

    let summary_js = build_summary_js(&config, &layout, &run, boundaries.as_deref());

    let out: Option<String> = opts.out.clone().or_else(|| {
        config
            .output_settings
            .output_directory
            .as_ref()
            .map(|d| resolve_path(&root, d))
    });
    match out.as_deref() {
        None | Some("") | Some("stdout") => {
            let pretty_js_stats =
                serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
            println!("{}", pretty_js_stats);
        }
        Some(dir) => write_outputs(dir, &summary_js, &run.report, &layout)?,
    }

    // The reference summary, if provided for comparison
    if let Some(reference) = opts.reference.as_deref() {
        check_reference(reference, &summary_js)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn fixture_options() -> RunOptions {
        RunOptions {
            config: Some("tests/bo_bombali/config.json".to_string()),
            reference: Some("tests/bo_bombali/expected_summary.json".to_string()),
            out: Some("stdout".to_string()),
            ..RunOptions::default()
        }
    }

    #[test]
    fn bo_bombali() {
        init();
        let res = run_survey(&fixture_options());
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn bo_bombali_xlsx() {
        init();
        let opts = RunOptions {
            input: Some("tests/bo_bombali/survey.xlsx".to_string()),
            excel_worksheet_name: Some("Survey".to_string()),
            ..fixture_options()
        };
        let res = run_survey(&opts);
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn command_line_input() {
        init();
        let opts = RunOptions {
            input: Some("tests/bo_bombali/survey.csv".to_string()),
            districts: vec!["BO".to_string()],
            out: Some("stdout".to_string()),
            ..RunOptions::default()
        };
        assert!(run_survey(&opts).is_ok());
    }

    #[test]
    fn reference_mismatch() {
        init();
        let opts = RunOptions {
            districts: vec!["BO".to_string()],
            ..fixture_options()
        };
        let res = run_survey(&opts).map_err(|e| *e);
        assert!(matches!(res, Err(SurveyError::ReferenceMismatch { .. })));
    }

    #[test]
    fn output_files() {
        init();
        let dir = std::env::temp_dir().join("itncov_output_files");
        let opts = RunOptions {
            out: Some(dir.display().to_string()),
            reference: None,
            ..fixture_options()
        };
        run_survey(&opts).unwrap();
        let coverage = fs::read_to_string(dir.join("coverage_by_chiefdom.csv")).unwrap();
        let lines: Vec<&str> = coverage.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "BO,BAGBO,30,24,80.0,Excellent");
        assert_eq!(lines[3], "BO,KAKUA,10,12,120.0,Outstanding");
        let summary = fs::read_to_string(dir.join("distribution_summary.csv")).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Level,Name,Total Enrollment,ITNs Distributed,Coverage (%)");
        assert_eq!(lines[1], "District,BO,90,77,85.6%");
        assert_eq!(lines[3], "BO Chiefdom,BAGBO,30,24,80.0%");
        assert!(dir.join("summary.json").exists());
    }

    #[test]
    fn no_source() {
        init();
        let res = run_survey(&RunOptions::default()).map_err(|e| *e);
        assert!(matches!(res, Err(SurveyError::MissingSource {})));
    }

    #[test]
    fn providers() {
        assert_eq!(infer_provider("data/survey.CSV"), "csv");
        assert_eq!(infer_provider("data/survey.xlsx"), "xlsx");
        assert_eq!(infer_provider("survey"), "xlsx");
    }
}
