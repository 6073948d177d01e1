// Primitives for reading task lists in CSV files.

use effort_report::builder::TaskListBuilder;

use crate::estimate::{io_common::TaskColumns, *};

pub fn read_csv_tasks(path: &str) -> CliResult<TaskListBuilder> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvOpenSnafu { path })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let columns = TaskColumns::from_header(&header);
    if columns.is_empty() {
        whatever!(
            "No task column found in {}: expected some of title, description, priority, complexity",
            path
        );
    }

    let mut builder = TaskListBuilder::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_tasks: lineno: {:?} row: {:?}", lineno, row);
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        columns.add_row(&mut builder, &row)?;
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_csv() {
        let path = format!("{}/testdata/tasks/tasks.csv", env!("CARGO_MANIFEST_DIR"));
        let tasks = read_csv_tasks(&path).unwrap().build().unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].title, "Login page");
        assert_eq!(tasks[0].priority, effort_report::session::Level::High);
        assert_eq!(tasks[1].title, "Task 2");
        assert_eq!(tasks[2].description, "Send a reset link by email");
        assert_eq!(tasks[2].complexity, effort_report::session::Level::Medium);
    }
}
