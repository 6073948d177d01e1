pub use crate::form::ValidationError;
pub use crate::session::{Level, TaskSpec};

/// A builder for task lists.
///
/// The fields are given as entered by the user. Missing titles are numbered
/// from the position of the task, and missing levels default to medium.
///
/// ```
/// use effort_report::builder::TaskListBuilder;
/// use effort_report::ValidationError;
///
/// let mut builder = TaskListBuilder::new();
/// builder.add_task(Some("Login form"), None, Some("high"), None)?;
/// builder.add_task(None, Some("Password reset by email"), None, Some("Low"))?;
/// let tasks = builder.build()?;
///
/// assert_eq!(tasks[1].title, "Task 2");
/// # Ok::<(), ValidationError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TaskListBuilder {
    _tasks: Vec<TaskSpec>,
}

impl TaskListBuilder {
    pub fn new() -> TaskListBuilder {
        TaskListBuilder { _tasks: Vec::new() }
    }

    /// Adds a task. Fails if a level is given but is not one of Low, Medium
    /// or High.
    pub fn add_task(
        &mut self,
        title: Option<&str>,
        description: Option<&str>,
        priority: Option<&str>,
        complexity: Option<&str>,
    ) -> Result<(), ValidationError> {
        let position = self._tasks.len() + 1;
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Task {}", position),
        };
        let task = TaskSpec {
            title,
            description: description.unwrap_or("").trim().to_string(),
            priority: level(position, "priority", priority)?,
            complexity: level(position, "complexity", complexity)?,
        };
        self._tasks.push(task);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self._tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self._tasks.is_empty()
    }

    pub fn build(self) -> Result<Vec<TaskSpec>, ValidationError> {
        if self._tasks.is_empty() {
            return Err(ValidationError::NoTasks);
        }
        Ok(self._tasks)
    }
}

fn level(
    task: usize,
    field: &'static str,
    value: Option<&str>,
) -> Result<Level, ValidationError> {
    match value.map(str::trim) {
        None => Ok(Level::default()),
        Some("") => Ok(Level::default()),
        Some(v) => Level::parse(v).ok_or_else(|| ValidationError::UnknownLevel {
            task,
            field,
            value: v.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let mut b = TaskListBuilder::new();
        b.add_task(Some("  "), None, None, Some("")).unwrap();
        b.add_task(Some("API"), Some(" REST endpoints "), Some("LOW"), Some("high"))
            .unwrap();
        let tasks = b.build().unwrap();
        assert_eq!(tasks[0].title, "Task 1");
        assert_eq!(tasks[0].priority, Level::Medium);
        assert_eq!(tasks[0].complexity, Level::Medium);
        assert_eq!(tasks[1].description, "REST endpoints");
        assert_eq!(tasks[1].priority, Level::Low);
        assert_eq!(tasks[1].complexity, Level::High);
    }

    #[test]
    fn unknown_level() {
        let mut b = TaskListBuilder::new();
        let err = b.add_task(Some("a"), None, Some("urgent"), None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownLevel {
                task: 1,
                field: "priority",
                value: "urgent".to_string()
            }
        );
        assert!(b.is_empty());
    }

    #[test]
    fn empty_list() {
        assert_eq!(
            TaskListBuilder::new().build(),
            Err(ValidationError::NoTasks)
        );
    }
}
