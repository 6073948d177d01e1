// ********* Task generation: requirements into a list of tasks ***********

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use crate::config::ResponseError;
use crate::normalize::{as_number, as_text, json_kind};
use crate::session::{Level, TaskSpec};

pub const DEFAULT_MAX_TASKS: u32 = 50;

/// The score above which a sentence counts as a requirement.
pub const DEFAULT_REQUIREMENT_THRESHOLD: f64 = 0.5;

/// Columns of the CSV export, in order.
pub const CSV_HEADERS: [&str; 8] = [
    "Title",
    "Type",
    "Priority",
    "Domain",
    "Story Points",
    "Role",
    "Description",
    "Acceptance Criteria",
];

/// Body of `POST /api/task-generation/generate`.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    pub max_tasks: u32,
    pub requirement_threshold: f64,
}

/// A requirements document for `POST /api/task-generation/generate-from-file`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GenerateFileRequest {
    pub file_name: String,
    pub contents: Vec<u8>,
    pub max_tasks: u32,
}

/// One task proposed by the generator.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub priority: String,
    pub domain: String,
    pub story_points: Option<u32>,
    pub role: String,
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

/// Complexity of a task with the given story points.
pub fn complexity_from_story_points(points: f64) -> Level {
    if points > 8.0 {
        Level::High
    } else if points > 3.0 {
        Level::Medium
    } else {
        Level::Low
    }
}

impl GeneratedTask {
    /// Reads the task at `position` (starting at 1). Missing fields are
    /// empty, except the title which is numbered.
    pub fn from_value(position: usize, v: &JSValue) -> GeneratedTask {
        let text = |name: &str| v.get(name).and_then(as_text);
        let acceptance_criteria = match v.get("acceptance_criteria") {
            Some(JSValue::Array(l)) => l.iter().filter_map(as_text).collect(),
            _ => vec![],
        };
        GeneratedTask {
            title: text("title").unwrap_or_else(|| format!("Task {}", position)),
            task_type: text("type").unwrap_or_default(),
            priority: text("priority").unwrap_or_default(),
            domain: text("domain").unwrap_or_default(),
            story_points: v
                .get("story_points")
                .and_then(as_number)
                .filter(|p| *p >= 0.0)
                .map(|p| p.round() as u32),
            role: text("role").unwrap_or_default(),
            description: text("description").unwrap_or_default(),
            acceptance_criteria,
        }
    }

    /// The task as sent to `/estimate-from-tasks`. Unknown priorities are
    /// medium.
    pub fn to_task_spec(&self) -> TaskSpec {
        TaskSpec {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: Level::parse(&self.priority).unwrap_or_default(),
            complexity: self
                .story_points
                .map(|p| complexity_from_story_points(p as f64))
                .unwrap_or_default(),
        }
    }

    /// One CSV row, following [CSV_HEADERS].
    pub fn csv_record(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.task_type.clone(),
            self.priority.clone(),
            self.domain.clone(),
            self.story_points.map(|p| p.to_string()).unwrap_or_default(),
            self.role.clone(),
            self.description.clone(),
            self.acceptance_criteria.join(" | "),
        ]
    }

    fn to_lines(&self, number: usize) -> Vec<String> {
        let points = match self.story_points {
            Some(p) => format!("{} SP", p),
            None => "- SP".to_string(),
        };
        let mut lines = vec![
            format!("{}. {}", number, self.title),
            format!(
                "   {} | {} | {} | {} | {}",
                self.task_type, self.priority, self.domain, points, self.role
            ),
        ];
        if !self.description.is_empty() {
            lines.push(format!("   {}", self.description));
        }
        for c in self.acceptance_criteria.iter() {
            lines.push(format!("   - {}", c));
        }
        lines
    }
}

pub const NO_TASKS_MESSAGE: &str = "No tasks were generated.";

pub const NO_MATCHING_TASKS_MESSAGE: &str = "No tasks match the current filter";

/// The answer of the task generator.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct GeneratedTasks {
    pub tasks: Vec<GeneratedTask>,
    /// Number of candidate tasks before the limit, when the server says.
    pub total_tasks: Option<u64>,
}

impl GeneratedTasks {
    /// Reads a generation response. Only a body that is not an object is an
    /// error; a missing task list means no tasks.
    pub fn from_response(body: &JSValue) -> Result<GeneratedTasks, ResponseError> {
        let top = match body {
            JSValue::Object(m) => m,
            x => return Err(ResponseError::NotAnObject(json_kind(x).to_string())),
        };
        let tasks: Vec<GeneratedTask> = match top.get("tasks") {
            Some(JSValue::Array(l)) => l
                .iter()
                .enumerate()
                .map(|(idx, v)| GeneratedTask::from_value(idx + 1, v))
                .collect(),
            Some(x) => {
                warn!("GeneratedTasks::from_response: tasks is not a list: {:?}", x);
                vec![]
            }
            None => vec![],
        };
        let total_tasks = top
            .get("total_tasks")
            .and_then(as_number)
            .filter(|x| *x >= 0.0)
            .map(|x| x as u64);
        debug!(
            "GeneratedTasks::from_response: {} tasks, total {:?}",
            tasks.len(),
            total_tasks
        );
        Ok(GeneratedTasks { tasks, total_tasks })
    }

    /// The tasks of one type, or all of them. Types match exactly.
    pub fn filtered(&self, task_type: Option<&str>) -> Vec<&GeneratedTask> {
        self.tasks
            .iter()
            .filter(|t| task_type.map_or(true, |x| t.task_type == x))
            .collect()
    }

    pub fn task_specs(&self) -> Vec<TaskSpec> {
        self.tasks.iter().map(GeneratedTask::to_task_spec).collect()
    }

    pub fn to_lines(&self, task_type: Option<&str>) -> Vec<String> {
        let total = self.total_tasks.unwrap_or(self.tasks.len() as u64);
        let mut lines = vec![
            "Generated Tasks".to_string(),
            "===============".to_string(),
            format!("Generated: {} of {}", self.tasks.len(), total),
        ];
        if self.tasks.is_empty() {
            lines.push(NO_TASKS_MESSAGE.to_string());
            return lines;
        }
        let shown = self.filtered(task_type);
        if shown.is_empty() {
            lines.push(NO_MATCHING_TASKS_MESSAGE.to_string());
            return lines;
        }
        for (idx, t) in shown.iter().enumerate() {
            lines.push(String::new());
            lines.extend(t.to_lines(idx + 1));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response() -> JSValue {
        json!({
            "tasks": [
                {
                    "title": "Implement login form",
                    "type": "functional",
                    "priority": "High",
                    "domain": "web",
                    "story_points": 5,
                    "role": "user",
                    "description": "Users sign in with email and password.",
                    "acceptance_criteria": ["Wrong passwords are refused", "Sessions expire"]
                },
                {
                    "type": "non-functional",
                    "priority": "Critical",
                    "story_points": "13",
                    "acceptance_criteria": "not a list"
                }
            ],
            "total_tasks": 7
        })
    }

    #[test]
    fn lenient_reading() {
        let g = GeneratedTasks::from_response(&response()).unwrap();
        assert_eq!(g.total_tasks, Some(7));
        assert_eq!(g.tasks.len(), 2);
        assert_eq!(g.tasks[0].acceptance_criteria.len(), 2);
        let second = &g.tasks[1];
        assert_eq!(second.title, "Task 2");
        assert_eq!(second.story_points, Some(13));
        assert_eq!(second.domain, "");
        assert!(second.acceptance_criteria.is_empty());
    }

    #[test]
    fn missing_task_list_is_empty() {
        let g = GeneratedTasks::from_response(&json!({"detail": null})).unwrap();
        assert!(g.tasks.is_empty());
        assert_eq!(g.to_lines(None).last().unwrap(), NO_TASKS_MESSAGE);
        assert!(GeneratedTasks::from_response(&json!({"tasks": 3}))
            .unwrap()
            .tasks
            .is_empty());
        assert!(GeneratedTasks::from_response(&json!([])).is_err());
    }

    #[test]
    fn task_specs_follow_priority_and_story_points() {
        let g = GeneratedTasks::from_response(&response()).unwrap();
        let specs = g.task_specs();
        assert_eq!(specs[0].priority, Level::High);
        assert_eq!(specs[0].complexity, Level::Medium);
        assert_eq!(specs[1].priority, Level::High);
        assert_eq!(specs[1].complexity, Level::High);
        assert_eq!(complexity_from_story_points(3.0), Level::Low);
        assert_eq!(complexity_from_story_points(8.0), Level::Medium);
    }

    #[test]
    fn csv_record_joins_criteria() {
        let g = GeneratedTasks::from_response(&response()).unwrap();
        let record = g.tasks[0].csv_record();
        assert_eq!(record.len(), CSV_HEADERS.len());
        assert_eq!(record[4], "5");
        assert_eq!(record[7], "Wrong passwords are refused | Sessions expire");
        assert_eq!(g.tasks[1].csv_record()[7], "");
    }

    #[test]
    fn type_filter() {
        let g = GeneratedTasks::from_response(&response()).unwrap();
        assert_eq!(g.filtered(None).len(), 2);
        assert_eq!(g.filtered(Some("functional")).len(), 1);
        let lines = g.to_lines(Some("security"));
        assert_eq!(lines.last().unwrap(), NO_MATCHING_TASKS_MESSAGE);
        let lines = g.to_lines(Some("functional"));
        assert_eq!(lines[2], "Generated: 2 of 7");
        assert_eq!(lines[4], "1. Implement login form");
        assert_eq!(lines[5], "   functional | High | web | 5 SP | user");
        assert_eq!(lines[7], "   - Wrong passwords are refused");
    }

    #[test]
    fn request_body() {
        let r = GenerateRequest {
            text: "Users can sign in.".to_string(),
            max_tasks: DEFAULT_MAX_TASKS,
            requirement_threshold: DEFAULT_REQUIREMENT_THRESHOLD,
        };
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"text":"Users can sign in.","max_tasks":50,"requirement_threshold":0.5}"#
        );
    }
}
