// ********* Session: the view model and the backend seam ***********

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use std::error::Error;
use std::fmt::Display;

use crate::chart::BarChart;
use crate::config::*;
use crate::form::*;
use crate::render::*;
use crate::task_gen::*;

pub const DEFAULT_METHOD: &str = "weighted_average";

pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// Body of `POST /estimate`: either some free text or manual parameters.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<JSMap<String, JSValue>>,
    pub method: String,
}

/// A requirements document for `POST /upload-requirements`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub contents: Vec<u8>,
    pub method: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Case-insensitive. The priorities of generated tasks (critical, major,
    /// minor, ...) are mapped onto the three levels.
    pub fn parse(s: &str) -> Option<Level> {
        match s.trim().to_lowercase().as_str() {
            "low" | "minor" | "trivial" => Some(Level::Low),
            "medium" | "major" => Some(Level::Medium),
            "high" | "critical" | "blocker" => Some(Level::High),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

impl Default for Level {
    fn default() -> Level {
        Level::Medium
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub title: String,
    pub description: String,
    pub priority: Level,
    pub complexity: Level,
}

/// Body of `POST /estimate-from-tasks`.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TasksRequest {
    pub tasks: Vec<TaskSpec>,
    pub method: String,
}

/// The ways a call to the estimation service can fail.
#[derive(PartialEq, Debug, Clone)]
pub enum BackendError {
    /// The request did not complete.
    Network(String),
    /// The server answered with a failure status.
    Server { status: u16, detail: Option<String> },
    /// The server answered with something that is not JSON.
    InvalidBody(String),
}

impl Error for BackendError {}

impl Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Network(m) => write!(f, "network failure: {}", m),
            BackendError::Server {
                status,
                detail: Some(d),
            } => write!(f, "server error {}: {}", status, d),
            BackendError::Server {
                status,
                detail: None,
            } => write!(f, "server error {}", status),
            BackendError::InvalidBody(m) => write!(f, "invalid response body: {}", m),
        }
    }
}

/// The `detail` field of an error body. Structured details are kept as JSON text.
pub fn extract_detail(body: &JSValue) -> Option<String> {
    match body.get("detail")? {
        JSValue::Null => None,
        JSValue::String(s) if s.is_empty() => None,
        JSValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The estimation service, as seen by a session.
pub trait EstimationBackend {
    fn estimate(&self, request: &EstimateRequest) -> Result<JSValue, BackendError>;

    fn upload_requirements(&self, request: &UploadRequest) -> Result<JSValue, BackendError>;

    fn estimate_from_tasks(&self, request: &TasksRequest) -> Result<JSValue, BackendError>;

    fn generate_tasks(&self, request: &GenerateRequest) -> Result<JSValue, BackendError>;

    fn generate_tasks_from_file(
        &self,
        request: &GenerateFileRequest,
    ) -> Result<JSValue, BackendError>;
}

/// How a successful body is displayed.
type ShowFn = fn(&mut Dashboard, &JSValue) -> Result<(), ResponseError>;

/// Why a submission did not end with a rendered result.
#[derive(PartialEq, Debug, Clone)]
pub enum SubmitError {
    /// Rejected before any request was made.
    Validation(ValidationError),
    Form(FormErrors),
    /// The selected file could not be read.
    Unreadable(String),
    Network(String),
    Server { status: u16, message: String },
    /// The response could not be displayed.
    Render(String),
}

impl Error for SubmitError {}

impl Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Validation(e) => write!(f, "{}", e),
            SubmitError::Form(e) => write!(f, "{}", e),
            SubmitError::Unreadable(m) => write!(f, "Could not read the file: {}", m),
            SubmitError::Network(_) => write!(f, "{}", NETWORK_ERROR_MESSAGE),
            SubmitError::Server { message, .. } => write!(f, "{}", message),
            SubmitError::Render(m) => write!(f, "{}", m),
        }
    }
}

/// The display regions shared by all the forms.
///
/// The last completed render wins. A response that cannot be displayed only
/// fills the error panel and leaves the rest untouched.
#[derive(PartialEq, Debug, Clone)]
pub struct Dashboard {
    result: Option<EstimationResult>,
    view: Option<ReportView>,
    chart: Option<BarChart>,
    generation: u64,
    scale: AxisScale,
    tasks: Option<GeneratedTasks>,
    error_panel: Option<String>,
}

impl Dashboard {
    pub fn new(scale: AxisScale) -> Dashboard {
        Dashboard {
            result: None,
            view: None,
            chart: None,
            generation: 0,
            scale,
            tasks: None,
            error_panel: None,
        }
    }

    pub fn result(&self) -> Option<&EstimationResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> Option<&ReportView> {
        self.view.as_ref()
    }

    pub fn chart(&self) -> Option<&BarChart> {
        self.chart.as_ref()
    }

    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    pub fn error_panel(&self) -> Option<&str> {
        self.error_panel.as_deref()
    }

    /// The last generated task list.
    pub fn tasks(&self) -> Option<&GeneratedTasks> {
        self.tasks.as_ref()
    }

    /// Reads and displays a task generation body. The estimation regions are
    /// left untouched.
    pub fn show_tasks(&mut self, body: &JSValue) -> Result<(), ResponseError> {
        match GeneratedTasks::from_response(body) {
            Ok(tasks) => {
                info!("show_tasks: {} tasks", tasks.tasks.len());
                self.tasks = Some(tasks);
                self.error_panel = None;
                Ok(())
            }
            Err(e) => {
                warn!("show_tasks: {}", e);
                self.show_error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Normalizes and displays a response body.
    pub fn show_response(&mut self, body: &JSValue) -> Result<(), ResponseError> {
        match EstimationResult::from_response(body) {
            Ok(result) => {
                self.show_result(result);
                Ok(())
            }
            Err(e) => {
                warn!("show_response: {}", e);
                self.show_error(&e.to_string());
                Err(e)
            }
        }
    }

    pub fn show_result(&mut self, result: EstimationResult) {
        self.view = Some(render(&result));
        self.result = Some(result);
        self.error_panel = None;
        self.redraw_chart();
    }

    pub fn show_error(&mut self, message: &str) {
        self.error_panel = Some(message.to_string());
    }

    /// Switches the axis scale and redraws the chart from the current result.
    pub fn toggle_scale(&mut self) -> AxisScale {
        self.scale = self.scale.toggled();
        info!("toggle_scale: now {:?}", self.scale);
        self.redraw_chart();
        self.scale
    }

    fn redraw_chart(&mut self) {
        if let Some(result) = &self.result {
            self.generation += 1;
            let models = partition_models(&result.models).ordered();
            // The previous chart is dropped here.
            self.chart = Some(BarChart::new(self.generation, &models, self.scale));
            debug!("redraw_chart: generation {}", self.generation);
        }
    }

    /// The whole dashboard as text: the estimation, then the generated tasks,
    /// then the error panel. `None` if there is nothing at all.
    pub fn report(&self, options: &DisplayOptions) -> Option<String> {
        let mut sections: Vec<String> = Vec::new();
        if let Some(view) = &self.view {
            sections.push(report_text(view, self.chart.as_ref(), options));
        }
        if let Some(tasks) = &self.tasks {
            let mut text = tasks.to_lines(None).join("\n");
            text.push('\n');
            sections.push(text);
        }
        if let Some(e) = &self.error_panel {
            sections.push(format!("Error: {}\n", e));
        }
        if sections.is_empty() {
            None
        } else {
            Some(sections.join("\n"))
        }
    }
}

/// Drives the forms against a backend and owns the dashboard.
pub struct Session<B: EstimationBackend> {
    backend: B,
    method: String,
    forms: Vec<FormMachine>,
    dashboard: Dashboard,
}

impl<B: EstimationBackend> Session<B> {
    pub fn new(backend: B, method: &str, scale: AxisScale) -> Session<B> {
        Session {
            backend,
            method: method.to_string(),
            forms: FormKind::ALL.iter().map(|k| FormMachine::new(*k)).collect(),
            dashboard: Dashboard::new(scale),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn form(&self, kind: FormKind) -> &FormMachine {
        &self.forms[Session::<B>::slot(kind)]
    }

    fn slot(kind: FormKind) -> usize {
        match kind {
            FormKind::Text => 0,
            FormKind::Manual => 1,
            FormKind::Upload => 2,
            FormKind::Tasks => 3,
            FormKind::Generate => 4,
            FormKind::GenerateFromFile => 5,
        }
    }

    fn form_mut(&mut self, kind: FormKind) -> &mut FormMachine {
        &mut self.forms[Session::<B>::slot(kind)]
    }

    fn rejected(&mut self, kind: FormKind, error: ValidationError) -> SubmitError {
        info!("{:?} form: rejected: {}", kind, error);
        match self.form_mut(kind).reject(&error) {
            Ok(()) => SubmitError::Validation(error),
            Err(e) => SubmitError::Form(e),
        }
    }

    pub fn submit_text(&mut self, text: &str) -> Result<(), SubmitError> {
        let text = match check_requirements(text) {
            Ok(t) => t.to_string(),
            Err(e) => return Err(self.rejected(FormKind::Text, e)),
        };
        let request = EstimateRequest {
            text: Some(text),
            parameters: None,
            method: self.method.clone(),
        };
        self.submit(FormKind::Text, Dashboard::show_response, |b| {
            b.estimate(&request)
        })
    }

    pub fn submit_parameters(
        &mut self,
        parameters: JSMap<String, JSValue>,
    ) -> Result<(), SubmitError> {
        if parameters.is_empty() {
            return Err(self.rejected(FormKind::Manual, ValidationError::NoParameters));
        }
        let request = EstimateRequest {
            text: None,
            parameters: Some(parameters),
            method: self.method.clone(),
        };
        self.submit(FormKind::Manual, Dashboard::show_response, |b| {
            b.estimate(&request)
        })
    }

    /// Checks the file against the acceptance policy, and only then reads it
    /// with `read` and uploads it.
    pub fn submit_upload<R>(&mut self, file: Option<&FileCandidate>, read: R) -> Result<(), SubmitError>
    where
        R: FnOnce() -> Result<Vec<u8>, String>,
    {
        let method = self.method.clone();
        self.submit_file(
            FormKind::Upload,
            file,
            read,
            Dashboard::show_response,
            |b, file_name, contents| {
                b.upload_requirements(&UploadRequest {
                    file_name,
                    contents,
                    method,
                })
            },
        )
    }

    /// Asks the service to break some requirements text into tasks.
    pub fn submit_generate(
        &mut self,
        text: &str,
        max_tasks: u32,
        requirement_threshold: f64,
    ) -> Result<(), SubmitError> {
        let text = match check_requirements(text) {
            Ok(t) => t.to_string(),
            Err(e) => return Err(self.rejected(FormKind::Generate, e)),
        };
        let request = GenerateRequest {
            text,
            max_tasks,
            requirement_threshold,
        };
        self.submit(FormKind::Generate, Dashboard::show_tasks, |b| {
            b.generate_tasks(&request)
        })
    }

    /// Same as [Session::submit_upload], for task generation.
    pub fn submit_generate_file<R>(
        &mut self,
        file: Option<&FileCandidate>,
        read: R,
        max_tasks: u32,
    ) -> Result<(), SubmitError>
    where
        R: FnOnce() -> Result<Vec<u8>, String>,
    {
        self.submit_file(
            FormKind::GenerateFromFile,
            file,
            read,
            Dashboard::show_tasks,
            |b, file_name, contents| {
                b.generate_tasks_from_file(&GenerateFileRequest {
                    file_name,
                    contents,
                    max_tasks,
                })
            },
        )
    }

    fn submit_file<R, F>(
        &mut self,
        kind: FormKind,
        file: Option<&FileCandidate>,
        read: R,
        show: ShowFn,
        call: F,
    ) -> Result<(), SubmitError>
    where
        R: FnOnce() -> Result<Vec<u8>, String>,
        F: FnOnce(&B, String, Vec<u8>) -> Result<JSValue, BackendError>,
    {
        let file = match file {
            Some(f) => f,
            None => return Err(self.rejected(kind, ValidationError::MissingFile)),
        };
        if let Err(e) = check_upload(file) {
            return Err(self.rejected(kind, e));
        }
        self.form_mut(kind).begin_submit().map_err(SubmitError::Form)?;
        let contents = match read() {
            Ok(c) => c,
            Err(m) => {
                let err = SubmitError::Unreadable(m);
                self.form_mut(kind)
                    .fail(&err.to_string())
                    .map_err(SubmitError::Form)?;
                return Err(err);
            }
        };
        let outcome = call(&self.backend, file.name.clone(), contents);
        self.complete(kind, show, outcome)
    }

    pub fn submit_tasks(&mut self, tasks: Vec<TaskSpec>) -> Result<(), SubmitError> {
        if tasks.is_empty() {
            return Err(self.rejected(FormKind::Tasks, ValidationError::NoTasks));
        }
        let request = TasksRequest {
            tasks,
            method: self.method.clone(),
        };
        self.submit(FormKind::Tasks, Dashboard::show_response, |b| {
            b.estimate_from_tasks(&request)
        })
    }

    /// Re-renders the chart with the other axis scale, without any request.
    pub fn toggle_scale(&mut self) -> AxisScale {
        self.dashboard.toggle_scale()
    }

    fn submit<F>(&mut self, kind: FormKind, show: ShowFn, call: F) -> Result<(), SubmitError>
    where
        F: FnOnce(&B) -> Result<JSValue, BackendError>,
    {
        self.form_mut(kind).begin_submit().map_err(SubmitError::Form)?;
        let outcome = call(&self.backend);
        self.complete(kind, show, outcome)
    }

    fn complete(
        &mut self,
        kind: FormKind,
        show: ShowFn,
        outcome: Result<JSValue, BackendError>,
    ) -> Result<(), SubmitError> {
        let err = match outcome {
            Ok(body) => match show(&mut self.dashboard, &body) {
                Ok(()) => {
                    return self.form_mut(kind).succeed().map_err(SubmitError::Form);
                }
                Err(e) => SubmitError::Render(e.to_string()),
            },
            Err(BackendError::Network(m)) => SubmitError::Network(m),
            Err(BackendError::Server { status, detail }) => SubmitError::Server {
                status,
                message: detail.unwrap_or_else(|| kind.fallback_error().to_string()),
            },
            Err(BackendError::InvalidBody(m)) => {
                let err = SubmitError::Render(m);
                self.dashboard.show_error(&err.to_string());
                err
            }
        };
        warn!("{:?} form: {:?}", kind, err);
        self.form_mut(kind)
            .fail(&err.to_string())
            .map_err(SubmitError::Form)?;
        Err(err)
    }
}
