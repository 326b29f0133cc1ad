use crate::survey::*;

use itn_coverage::names::{AliasTable, SubstringTieBreak};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BoundarySource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "districtColumn")]
    pub district_column: Option<String>,
    #[serde(rename = "chiefdomColumn")]
    pub chiefdom_column: Option<String>,
}

impl BoundarySource {
    pub const DEFAULT_DISTRICT_COLUMN: &'static str = "FIRST_DNAM";
    pub const DEFAULT_CHIEFDOM_COLUMN: &'static str = "FIRST_CHIE";

    pub fn district_column(&self) -> &str {
        self.district_column
            .as_deref()
            .unwrap_or(BoundarySource::DEFAULT_DISTRICT_COLUMN)
    }

    pub fn chiefdom_column(&self) -> &str {
        self.chiefdom_column
            .as_deref()
            .unwrap_or(BoundarySource::DEFAULT_CHIEFDOM_COLUMN)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct LayoutSettings {
    #[serde(rename = "payloadColumn")]
    pub payload_column: Option<String>,
    #[serde(rename = "districtLabel")]
    pub district_label: Option<String>,
    #[serde(rename = "chiefdomLabel")]
    pub chiefdom_label: Option<String>,
    #[serde(rename = "enrollmentColumn")]
    pub enrollment_column: Option<String>,
    #[serde(rename = "boysColumn")]
    pub boys_column: Option<String>,
    #[serde(rename = "girlsColumn")]
    pub girls_column: Option<String>,
    #[serde(rename = "leftAtSchoolColumn")]
    pub left_at_school_column: Option<String>,
    #[serde(rename = "firstClass")]
    pub first_class: Option<u32>,
    #[serde(rename = "lastClass")]
    pub last_class: Option<u32>,
    pub districts: Option<Vec<String>>,
    #[serde(rename = "goodCoverageThreshold")]
    pub good_coverage_threshold: Option<f64>,
    #[serde(rename = "panelColumns")]
    pub panel_columns: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntrySettings {
    pub source: String,
    pub canonical: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct AliasSettings {
    #[serde(rename = "replaceDefaults")]
    pub replace_defaults: Option<bool>,
    #[serde(rename = "substringTieBreak")]
    pub substring_tie_break: Option<String>,
    pub entries: Option<Vec<AliasEntrySettings>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "surveySources", default)]
    pub survey_sources: Vec<FileSource>,
    #[serde(rename = "boundarySource")]
    pub boundary_source: Option<BoundarySource>,
    pub layout: Option<LayoutSettings>,
    pub aliases: Option<AliasSettings>,
}

pub fn read_config(path: &str) -> BSurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Fills the missing settings with the defaults and checks the result.
pub fn validate_layout(settings: &Option<LayoutSettings>) -> SurveyResult<SurveyLayout> {
    let d = SurveyLayout::default();
    let s = settings.clone().unwrap_or_default();
    let layout = SurveyLayout {
        payload_column: s.payload_column.unwrap_or(d.payload_column),
        district_label: s.district_label.unwrap_or(d.district_label),
        chiefdom_label: s.chiefdom_label.unwrap_or(d.chiefdom_label),
        enrollment_template: s.enrollment_column.unwrap_or(d.enrollment_template),
        boys_template: s.boys_column.unwrap_or(d.boys_template),
        girls_template: s.girls_column.unwrap_or(d.girls_template),
        left_at_school_column: s.left_at_school_column.unwrap_or(d.left_at_school_column),
        first_class: s.first_class.unwrap_or(d.first_class),
        last_class: s.last_class.unwrap_or(d.last_class),
        districts: match s.districts {
            Some(x) if !x.is_empty() => x,
            Some(_) => {
                whatever!("the list of districts cannot be empty")
            }
            None => d.districts,
        },
        good_coverage_threshold: s.good_coverage_threshold.unwrap_or(d.good_coverage_threshold),
        panel_columns: s.panel_columns.unwrap_or(d.panel_columns),
    };
    layout.validate().context(CoverageSnafu {})?;
    Ok(layout)
}

pub fn validate_aliases(settings: &Option<AliasSettings>) -> SurveyResult<AliasTable> {
    let s = settings.clone().unwrap_or_default();
    let tie_break = match s.substring_tie_break.as_deref() {
        None | Some("tableOrder") => SubstringTieBreak::TableOrder,
        Some("longestKey") => SubstringTieBreak::LongestKey,
        Some(x) => {
            whatever!("unknown substring tie break: {}", x)
        }
    };
    let mut table = if s.replace_defaults.unwrap_or(false) {
        AliasTable::new()
    } else {
        AliasTable::default_chiefdoms()
    };
    for e in s.entries.unwrap_or_default().iter() {
        if e.source.trim().is_empty() {
            whatever!("alias with an empty source for {:?}", e.canonical);
        }
        table.insert(e.source.trim(), e.canonical.trim());
    }
    debug!("validate_aliases: {} aliases, {:?}", table.len(), tie_break);
    Ok(table.with_tie_break(tie_break))
}

/// Reads a reference summary, as written by this program.
pub fn read_summary(path: &str) -> BSurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
