use clap::Parser;

/// This is a coverage program for school-based ITN distributions.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the survey sources, the layout of the survey and the
    /// chiefdom aliases, in JSON format. The paths inside are relative to this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected JSON summary. If provided, itncov will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (directory, 'stdout' or empty) If specified, the JSON summary and the csv tables are written
    /// to the given directory. Setting this option overrides the directory that may be specified
    /// with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The survey file. Setting this option overrides the sources that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. By default, it is inferred from the extension of the file.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (file path, optional) The attribute table of the chiefdom boundaries, in csv format. When
    /// provided, the summary includes the map panels of each district.
    #[clap(short, long, value_parser)]
    pub boundaries: Option<String>,

    /// (repeatable) The districts to report on. Defaults to BO and BOMBALI.
    #[clap(short, long, value_parser)]
    pub district: Vec<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
