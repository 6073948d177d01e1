use clap::Parser;

/// A command-line client for a software effort estimation service.
///
/// Exactly one input must be given: --text, --text-file, --upload, --param, --tasks or --response.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A configuration file in JSON. The options given on the command line
    /// take precedence over the values of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (default http://localhost:8000) The base URL of the estimation service.
    #[clap(long, value_parser)]
    pub api_url: Option<String>,

    /// (default weighted_average) The method used by the service to integrate the estimates of the models.
    #[clap(short, long, value_parser)]
    pub method: Option<String>,

    /// (seconds, default 60) The timeout of the requests to the service.
    #[clap(long, value_parser)]
    pub timeout: Option<u64>,

    /// (text) The requirements of the project.
    #[clap(short, long, value_parser)]
    pub text: Option<String>,

    /// (file path) A text file containing the requirements of the project.
    #[clap(long, value_parser)]
    pub text_file: Option<String>,

    /// (file path) A requirements document to upload (txt, doc, docx, pdf or md, at most 10MB).
    #[clap(short, long, value_parser)]
    pub upload: Option<String>,

    /// (key=value, repeatable) A project parameter for a manual estimation. Numeric values are
    /// sent as numbers.
    #[clap(short, long, value_parser)]
    pub param: Vec<String>,

    /// (file path) A list of tasks in JSON, CSV or Excel (.xlsx) format.
    #[clap(long, value_parser)]
    pub tasks: Option<String>,

    /// (file path) A response of the service, or a normalized result written with --out. It is
    /// rendered without contacting the service.
    #[clap(long, value_parser)]
    pub response: Option<String>,

    /// If passed as an argument, the requirements given with --text, --text-file or --upload (or the
    /// saved response given with --response) are broken into tasks instead of being estimated.
    #[clap(long, takes_value = false)]
    pub generate_tasks: bool,

    /// (default 50) With --generate-tasks, the maximum number of tasks to generate.
    #[clap(long, value_parser)]
    pub max_tasks: Option<u32>,

    /// (between 0 and 1, default 0.5) With --generate-tasks, the score above which a sentence of
    /// free text counts as a requirement.
    #[clap(long, value_parser)]
    pub threshold: Option<f64>,

    /// With --generate-tasks, only the tasks of this type are printed (for example functional).
    #[clap(long, value_parser)]
    pub task_type: Option<String>,

    /// (file path, .json or .csv) With --generate-tasks, writes the generated tasks to this file. The
    /// file can be given back with --tasks to estimate them.
    #[clap(long, value_parser)]
    pub export_tasks: Option<String>,

    /// When using an Excel file for the tasks, indicates the name of the worksheet to use.
    /// By default, the only worksheet of the file.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (linear or log, default log) The scale of the axis of the chart.
    #[clap(long, value_parser)]
    pub scale: Option<String>,

    /// If passed as an argument, the chart is drawn with both scales.
    #[clap(long, takes_value = false)]
    pub compare_scales: bool,

    /// (default 40) The width of the longest bar of the chart, in characters.
    #[clap(long, value_parser)]
    pub chart_width: Option<usize>,

    /// If passed as an argument, the output is not colored.
    #[clap(long, takes_value = false)]
    pub no_color: bool,

    /// (file path or 'stdout') If specified, the normalized result will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a normalized result in JSON format. If provided, effortview will
    /// check that the normalized result matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
