use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use effort_report::builder::TaskListBuilder;

use crate::estimate::{io_common::TaskColumns, *};

pub fn read_excel_tasks(path: &str, worksheet_name: Option<&str>) -> CliResult<TaskListBuilder> {
    let wrange = get_range(path, worksheet_name)?;
    let mut rows = wrange.rows();
    let header: Vec<String> = match rows.next() {
        Some(r) => r.iter().map(cell_text).collect(),
        None => whatever!("The worksheet of {} is empty", path),
    };
    let columns = TaskColumns::from_header(&header);
    if columns.is_empty() {
        whatever!(
            "No task column found in {}: expected some of title, description, priority, complexity",
            path
        );
    }

    let mut builder = TaskListBuilder::new();
    for (idx, row) in rows.enumerate() {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        debug!("read_excel_tasks: idx: {:?} row: {:?}", idx, cells);
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        columns.add_row(&mut builder, &cells)?;
    }
    Ok(builder)
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> CliResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }
    let mut all_worksheets = workbook.worksheets();
    match all_worksheets.len() {
        0 => EmptyExcelSnafu { path }.fail(),
        1 => {
            let (name, wrange) = all_worksheets.remove(0);
            debug!("get_range: using the only worksheet {:?}", name);
            Ok(wrange)
        }
        n => whatever!(
            "{} has {} worksheets: choose one with --excel-worksheet-name",
            path,
            n
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_text(&DataType::String(" High ".to_string())), "High");
        assert_eq!(cell_text(&DataType::Float(3.0)), "3");
        assert_eq!(cell_text(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_text(&DataType::Empty), "");
    }

    #[test]
    fn missing_workbook() {
        let err = read_excel_tasks("/nonexistent/tasks.xlsx", None).unwrap_err();
        assert!(matches!(err, CliError::OpeningExcel { .. }));
    }
}
