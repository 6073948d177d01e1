use std::fs;
use std::path::Path;

use effort_report::builder::TaskListBuilder;
use effort_report::task_gen::complexity_from_story_points;
use effort_report::FileCandidate;

use crate::estimate::*;

/// The last component of a path, or the path itself.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Describes a file before reading it.
pub fn file_candidate(path: &str) -> CliResult<FileCandidate> {
    let metadata = fs::metadata(path).context(OpeningFileSnafu { path })?;
    if !metadata.is_file() {
        whatever!("{} is not a file", path);
    }
    Ok(FileCandidate {
        name: simplify_file_name(path),
        size_bytes: metadata.len(),
    })
}

/// The position of the task fields in a header row. Names are matched
/// case-insensitively and every column is optional. Without a complexity
/// column, the story points of exported generated tasks are used.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TaskColumns {
    pub title: Option<usize>,
    pub description: Option<usize>,
    pub priority: Option<usize>,
    pub complexity: Option<usize>,
    pub story_points: Option<usize>,
}

impl TaskColumns {
    pub fn from_header(header: &[String]) -> TaskColumns {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let columns = TaskColumns {
            title: find("title"),
            description: find("description"),
            priority: find("priority"),
            complexity: find("complexity"),
            story_points: find("story points").or_else(|| find("story_points")),
        };
        debug!("TaskColumns::from_header: {:?} -> {:?}", header, columns);
        columns
    }

    pub fn is_empty(&self) -> bool {
        self == &TaskColumns::default()
    }

    /// Adds the task of one row. Cells beyond the end of the row are missing.
    pub fn add_row(&self, builder: &mut TaskListBuilder, row: &[String]) -> CliResult<()> {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(|s| s.as_str());
        let complexity = cell(self.complexity).or_else(|| {
            cell(self.story_points)
                .and_then(|p| p.trim().parse::<f64>().ok())
                .map(|p| complexity_from_story_points(p).name())
        });
        builder
            .add_task(
                cell(self.title),
                cell(self.description),
                cell(self.priority),
                complexity,
            )
            .context(InvalidTaskSnafu {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("/tmp/specs/login.md"), "login.md");
        assert_eq!(simplify_file_name("login.md"), "login.md");
    }

    #[test]
    fn columns() {
        let header: Vec<String> = ["Priority", "Title", "notes"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = TaskColumns::from_header(&header);
        assert_eq!(columns.priority, Some(0));
        assert_eq!(columns.title, Some(1));
        assert_eq!(columns.complexity, None);

        let mut builder = TaskListBuilder::new();
        columns
            .add_row(&mut builder, &["high".to_string()])
            .unwrap();
        let tasks = builder.build().unwrap();
        assert_eq!(tasks[0].title, "Task 1");
    }

    #[test]
    fn story_points_column() {
        let header: Vec<String> = ["Title", "Type", "Priority", "Story Points"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = TaskColumns::from_header(&header);
        assert_eq!(columns.story_points, Some(3));

        let mut builder = TaskListBuilder::new();
        for row in [["Checkout", "functional", "Critical", "13"], ["Logo", "ui", "Minor", "?"]] {
            let row: Vec<String> = row.iter().map(|s| s.to_string()).collect();
            columns.add_row(&mut builder, &row).unwrap();
        }
        let tasks = builder.build().unwrap();
        assert_eq!(tasks[0].priority, effort_report::session::Level::High);
        assert_eq!(tasks[0].complexity, effort_report::session::Level::High);
        assert_eq!(tasks[1].complexity, effort_report::session::Level::Medium);
    }
}
