use serde::Deserialize;

use effort_report::builder::TaskListBuilder;
use effort_report::session::TaskSpec;
use effort_report::task_gen::{complexity_from_story_points, GeneratedTask, CSV_HEADERS};

use crate::estimate::io_common::simplify_file_name;
use crate::estimate::*;

/// A task as written in a JSON task list. Exported generated tasks have story
/// points instead of a complexity.
#[derive(PartialEq, Debug, Clone, Deserialize)]
struct JsonTask {
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    complexity: Option<String>,
    story_points: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
#[serde(untagged)]
enum JsonTaskList {
    Bare(Vec<JsonTask>),
    Wrapped { tasks: Vec<JsonTask> },
}

fn read_json_tasks(path: &str) -> CliResult<TaskListBuilder> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let list: JsonTaskList = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    let tasks = match list {
        JsonTaskList::Bare(l) => l,
        JsonTaskList::Wrapped { tasks } => tasks,
    };
    let mut builder = TaskListBuilder::new();
    for t in tasks.iter() {
        let complexity = t.complexity.as_deref().or_else(|| {
            t.story_points
                .map(|p| complexity_from_story_points(p).name())
        });
        builder
            .add_task(
                t.title.as_deref(),
                t.description.as_deref(),
                t.priority.as_deref(),
                complexity,
            )
            .context(InvalidTaskSnafu {})?;
    }
    Ok(builder)
}

/// Reads a task list. The format follows the extension of the file.
pub fn read_tasks(path: &str, excel_worksheet_name: Option<&str>) -> CliResult<Vec<TaskSpec>> {
    let name = simplify_file_name(path).to_lowercase();
    let extension = name.rsplit('.').next().unwrap_or("");
    let builder = match extension {
        "json" => read_json_tasks(path)?,
        "csv" => io_csv::read_csv_tasks(path)?,
        "xlsx" | "xlsm" => io_excel::read_excel_tasks(path, excel_worksheet_name)?,
        x => whatever!(
            "Unsupported task list format {:?}: expected json, csv or xlsx",
            x
        ),
    };
    info!("read_tasks: {} tasks in {}", builder.len(), path);
    builder.build().context(InvalidTaskSnafu {})
}

/// Writes generated tasks in JSON or CSV, following the extension of the file.
pub fn export_tasks(tasks: &[GeneratedTask], path: &str) -> CliResult<()> {
    let name = simplify_file_name(path).to_lowercase();
    match name.rsplit('.').next().unwrap_or("") {
        "json" => {
            let pretty = serde_json::to_string_pretty(tasks).context(WritingJsonSnafu {})?;
            fs::write(path, pretty).context(OpeningFileSnafu { path })?;
        }
        "csv" => {
            let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path })?;
            wtr.write_record(&CSV_HEADERS)
                .context(CsvWriteSnafu { path })?;
            for t in tasks.iter() {
                wtr.write_record(t.csv_record())
                    .context(CsvWriteSnafu { path })?;
            }
            wtr.flush().context(OpeningFileSnafu { path })?;
        }
        x => whatever!(
            "Unsupported export format {:?}: expected json or csv",
            x
        ),
    }
    info!("export_tasks: {} tasks written to {}", tasks.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use effort_report::session::Level;

    fn testdata(name: &str) -> String {
        format!("{}/testdata/tasks/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn wrapped_json() {
        let tasks = read_tasks(&testdata("tasks.json"), None).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Login page");
        assert_eq!(tasks[0].complexity, Level::Low);
        assert_eq!(tasks[1].title, "Task 2");
        assert_eq!(tasks[1].priority, Level::Medium);
    }

    #[test]
    fn bare_json_and_bad_level() {
        let err = read_tasks(&testdata("bad_level.json"), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Task 1: unknown priority 'Urgent' (expected Low, Medium or High)"
        );
    }

    #[test]
    fn empty_list() {
        let err = read_tasks(&testdata("empty.json"), None).unwrap_err();
        assert_eq!(err.to_string(), "Please add at least one task");
    }

    #[test]
    fn unknown_format() {
        assert!(read_tasks("tasks.yaml", None).is_err());
        assert!(export_tasks(&[], "tasks.yaml").is_err());
    }

    #[test]
    fn story_points_give_the_complexity() {
        let tasks = read_tasks(&testdata("generated.json"), None).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].complexity, Level::High);
        // An explicit complexity wins over the story points.
        assert_eq!(tasks[1].complexity, Level::Low);
        assert_eq!(tasks[2].priority, Level::Low);
        assert_eq!(tasks[2].complexity, Level::Medium);
    }
}
