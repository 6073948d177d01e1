mod config_reader;
mod http_backend;
mod io_common;
mod io_csv;
mod io_excel;
mod io_tasks;

use log::{debug, info, warn};

use effort_report::task_gen::{DEFAULT_MAX_TASKS, DEFAULT_REQUIREMENT_THRESHOLD};
use effort_report::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::estimate::config_reader::*;
use crate::estimate::http_backend::HttpBackend;
use crate::estimate::io_common::*;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing JSON"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error building the HTTP client"))]
    HttpClient { source: reqwest::Error },
    #[snafu(display("{source}"))]
    InvalidTask { source: ValidationError },
    #[snafu(display("{source}"))]
    Submission { source: SubmitError },
    #[snafu(display("The response cannot be displayed: {source}"))]
    Rendering { source: ResponseError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CliResult<T> = Result<T, CliError>;

/// The single source of the estimation.
#[derive(Eq, PartialEq, Debug, Clone)]
enum Input {
    Text(String),
    TextFile(String),
    Upload(String),
    Parameters(Vec<String>),
    Tasks(String),
    Response(String),
}

fn select_input(args: &Args) -> CliResult<Input> {
    let mut inputs: Vec<Input> = Vec::new();
    if let Some(t) = &args.text {
        inputs.push(Input::Text(t.clone()));
    }
    if let Some(p) = &args.text_file {
        inputs.push(Input::TextFile(p.clone()));
    }
    if let Some(p) = &args.upload {
        inputs.push(Input::Upload(p.clone()));
    }
    if !args.param.is_empty() {
        inputs.push(Input::Parameters(args.param.clone()));
    }
    if let Some(p) = &args.tasks {
        inputs.push(Input::Tasks(p.clone()));
    }
    if let Some(p) = &args.response {
        inputs.push(Input::Response(p.clone()));
    }
    match inputs.as_slice() {
        [x] => Ok(x.clone()),
        [] => whatever!(
            "No input given: use one of --text, --text-file, --upload, --param, --tasks or --response"
        ),
        _ => whatever!("Only one input can be given, found {}", inputs.len()),
    }
}

/// Parses `key=value`. Values that look like numbers or booleans are sent as such.
fn parse_param(s: &str) -> CliResult<(String, JSValue)> {
    let (k, v) = match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => (k.trim(), v.trim()),
        _ => whatever!("Invalid parameter {:?}: expected key=value", s),
    };
    let value = match serde_json::from_str::<JSValue>(v) {
        Ok(x @ JSValue::Number(_)) | Ok(x @ JSValue::Bool(_)) => x,
        _ => JSValue::String(v.to_string()),
    };
    Ok((k.to_string(), value))
}

fn read_response_file(path: &str) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu { path })
}

/// Displays a saved body. Normalized results are recognized by their `models` list.
fn offline_dashboard(path: &str, scale: AxisScale) -> CliResult<Dashboard> {
    let body = read_response_file(path)?;
    let mut dashboard = Dashboard::new(scale);
    if matches!(body.get("models"), Some(JSValue::Array(_))) {
        info!("offline_dashboard: {} holds a normalized result", path);
        let result: EstimationResult =
            serde_json::from_value(body).context(ParsingJsonSnafu { path })?;
        dashboard.show_result(result);
    } else {
        dashboard.show_response(&body).context(RenderingSnafu {})?;
    }
    Ok(dashboard)
}

fn online_dashboard(input: Input, settings: &Settings, args: &Args) -> CliResult<Dashboard> {
    let backend = HttpBackend::new(&settings.api_url, settings.timeout)?;
    let mut session = Session::new(backend, &settings.method, settings.options.scale);
    let submitted = match input {
        Input::Text(t) => session.submit_text(&t),
        Input::TextFile(p) => {
            let t = fs::read_to_string(&p).context(OpeningFileSnafu { path: p.clone() })?;
            session.submit_text(&t)
        }
        Input::Upload(p) => {
            let file = file_candidate(&p)?;
            session.submit_upload(Some(&file), || fs::read(&p).map_err(|e| e.to_string()))
        }
        Input::Parameters(ps) => {
            let mut parameters: JSMap<String, JSValue> = JSMap::new();
            for p in ps.iter() {
                let (k, v) = parse_param(p)?;
                parameters.insert(k, v);
            }
            session.submit_parameters(parameters)
        }
        Input::Tasks(p) => {
            let tasks = io_tasks::read_tasks(&p, args.excel_worksheet_name.as_deref())?;
            session.submit_tasks(tasks)
        }
        Input::Response(_) => whatever!("A saved response is not sent to the service"),
    };
    submitted.context(SubmissionSnafu {})?;
    Ok(session.dashboard().clone())
}

/// Generates tasks from the requirements of `input` and prints them.
fn run_generation(input: Input, settings: &Settings, args: &Args) -> CliResult<String> {
    if args.out.is_some() || args.reference.is_some() {
        whatever!("--out and --reference only apply to estimations, use --export-tasks");
    }
    let max_tasks = args.max_tasks.unwrap_or(DEFAULT_MAX_TASKS);
    let threshold = args.threshold.unwrap_or(DEFAULT_REQUIREMENT_THRESHOLD);
    if max_tasks == 0 {
        whatever!("--max-tasks must be at least 1");
    }
    if !(0.0..=1.0).contains(&threshold) {
        whatever!("--threshold must be between 0 and 1, found {}", threshold);
    }

    let dashboard = match input {
        Input::Response(p) => {
            let body = read_response_file(&p)?;
            let mut dashboard = Dashboard::new(settings.options.scale);
            dashboard.show_tasks(&body).context(RenderingSnafu {})?;
            dashboard
        }
        x => online_generation(x, settings, max_tasks, threshold)?,
    };
    let tasks = match dashboard.tasks() {
        Some(t) => t,
        None => whatever!("No tasks to display"),
    };
    let mut text = tasks.to_lines(args.task_type.as_deref()).join("\n");
    text.push('\n');
    print!("{}", text);

    if let Some(path) = &args.export_tasks {
        io_tasks::export_tasks(&tasks.tasks, path)?;
    }
    Ok(text)
}

fn online_generation(
    input: Input,
    settings: &Settings,
    max_tasks: u32,
    threshold: f64,
) -> CliResult<Dashboard> {
    let backend = HttpBackend::new(&settings.api_url, settings.timeout)?;
    let mut session = Session::new(backend, &settings.method, settings.options.scale);
    let submitted = match input {
        Input::Text(t) => session.submit_generate(&t, max_tasks, threshold),
        Input::TextFile(p) => {
            let t = fs::read_to_string(&p).context(OpeningFileSnafu { path: p.clone() })?;
            session.submit_generate(&t, max_tasks, threshold)
        }
        Input::Upload(p) => {
            let file = file_candidate(&p)?;
            session.submit_generate_file(
                Some(&file),
                || fs::read(&p).map_err(|e| e.to_string()),
                max_tasks,
            )
        }
        _ => whatever!("--generate-tasks needs --text, --text-file, --upload or --response"),
    };
    submitted.context(SubmissionSnafu {})?;
    Ok(session.dashboard().clone())
}

/// The text of the report. With `compare_scales`, the chart is drawn a second
/// time with the other scale.
fn report(dashboard: &mut Dashboard, options: &DisplayOptions, compare_scales: bool) -> String {
    let mut text = dashboard.report(options).unwrap_or_default();
    if compare_scales {
        dashboard.toggle_scale();
        if let Some(chart) = dashboard.chart().filter(|c| !c.bars.is_empty()) {
            text.push('\n');
            for l in chart.draw(options.chart_width, options.colored) {
                text.push_str(&l);
                text.push('\n');
            }
        }
    }
    text
}

fn write_result(result: &EstimationResult, out: &str) -> CliResult<String> {
    let pretty = serde_json::to_string_pretty(result).context(WritingJsonSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty);
    } else if !out.is_empty() {
        info!("write_result: writing the result to {}", out);
        fs::write(out, &pretty).context(OpeningFileSnafu { path: out })?;
    }
    Ok(pretty)
}

/// Compares the result with a reference result, and prints the differences.
fn check_reference(result: &EstimationResult, reference_path: &str) -> CliResult<()> {
    let result_js = serde_json::to_value(result).context(WritingJsonSnafu {})?;
    let pretty_result = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;
    let reference = read_response_file(reference_path)?;
    debug!("check_reference: reference: {:?}", reference);
    let pretty_reference =
        serde_json::to_string_pretty(&reference).context(WritingJsonSnafu {})?;
    if pretty_reference != pretty_result {
        warn!("Found differences with the reference result");
        print_diff(pretty_reference.as_str(), pretty_result.as_str(), "\n");
        whatever!("Difference detected between the normalized result and the reference result")
    }
    Ok(())
}

/// Runs one estimation and prints the report. Returns the report.
pub fn run(args: &Args) -> CliResult<String> {
    let settings = Settings::resolve(args)?;
    info!("settings: {:?}", settings);
    let input = select_input(args)?;
    if args.generate_tasks {
        return run_generation(input, &settings, args);
    }
    let mut dashboard = match input {
        Input::Response(p) => offline_dashboard(&p, settings.options.scale)?,
        x => online_dashboard(x, &settings, args)?,
    };

    let text = report(&mut dashboard, &settings.options, args.compare_scales);
    print!("{}", text);

    let result = match dashboard.result() {
        Some(r) => r,
        None => whatever!("No result to display"),
    };
    if let Some(out) = &args.out {
        write_result(result, out)?;
    }
    if let Some(reference) = &args.reference {
        check_reference(result, reference)?;
    }
    Ok(text)
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> String {
    use clap::Parser;

    let test_dir = format!("{}/testdata/{}", env!("CARGO_MANIFEST_DIR"), test_name);
    let response = format!("{}/{}_response.json", test_dir, test_name);
    let reference = format!("{}/{}_expected.json", test_dir, test_name);
    let args = Args::parse_from([
        "effortview",
        "--response",
        response.as_str(),
        "--reference",
        reference.as_str(),
        "--no-color",
    ]);
    match run(&args) {
        Ok(text) => text,
        Err(e) => panic!("test {} failed: {}", test_name, e),
    }
}
