/*!
Normalization and display of software effort estimates.

The estimation service answers with the estimates of several models, in
shapes that changed over time. This crate turns a response into one
[EstimationResult], and projects it into display regions: a summary, one
table for the traditional models and one for the machine learning models,
and a bar chart.

```
use effort_report::*;
use serde_json::json;

let body = json!({"estimation": {
    "total_effort": 12.3,
    "model_estimates": {
        "cocomo": {"effort": 11.8, "confidence": 75},
        "ml_linear": {"estimate": 12.9, "confidence": 68}
    }
}});
let result = EstimationResult::from_response(&body)?;
let view = render(&result);
assert_eq!(view.summary.total_effort, "12.30 person-months");
assert_eq!(view.table_titles(), vec!["Traditional Models", "Machine Learning Models"]);
# Ok::<(), ResponseError>(())
```

The requests themselves go through a [Session], which checks the inputs,
tracks the state of each form and owns the [Dashboard]. The same session
also asks the service to break requirements into tasks ([GeneratedTasks]),
which can then be estimated. See the [manual] for the accepted formats.
*/

mod config;
mod normalize;

pub mod builder;
pub mod chart;
pub mod form;
pub mod manual;
pub mod quick_start;
pub mod render;
pub mod session;
pub mod task_gen;

pub use crate::chart::BarChart;
pub use crate::config::*;
pub use crate::form::{FileCandidate, FormKind, FormState, ValidationError};
pub use crate::normalize::{normalize_model_estimates, normalize_model_section};
pub use crate::render::{render, report_text, ReportView};
pub use crate::session::{
    BackendError, Dashboard, EstimationBackend, Session, SubmitError, DEFAULT_METHOD,
};
pub use crate::task_gen::{GeneratedTask, GeneratedTasks};
