use log::debug;

use crate::chart::BarChart;
use crate::config::*;

pub const TRADITIONAL_TITLE: &str = "Traditional Models";
pub const MACHINE_LEARNING_TITLE: &str = "Machine Learning Models";
pub const NO_DETAILS_MESSAGE: &str = "No detailed model estimates available.";
pub const TABLE_HEADERS: [&str; 4] = ["Model", "Effort (PM)", "Confidence", "Type"];

const MISSING: &str = "-";

/// The models split into the two groups that are displayed.
/// Within each group, the original order is kept.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ModelPartition {
    pub traditional: Vec<ModelEstimate>,
    pub machine_learning: Vec<ModelEstimate>,
}

impl ModelPartition {
    pub fn is_empty(&self) -> bool {
        self.traditional.is_empty() && self.machine_learning.is_empty()
    }

    /// Traditional models first, then machine learning models.
    pub fn ordered(&self) -> Vec<ModelEstimate> {
        let mut res = self.traditional.clone();
        res.extend(self.machine_learning.iter().cloned());
        res
    }
}

pub fn partition_models(models: &[ModelEstimate]) -> ModelPartition {
    let (machine_learning, traditional): (Vec<ModelEstimate>, Vec<ModelEstimate>) =
        models.iter().cloned().partition(|m| m.is_machine_learning());
    ModelPartition {
        traditional,
        machine_learning,
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableRow {
    pub model: String,
    pub effort: String,
    pub confidence: String,
    pub model_type: String,
    pub color: Color,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ModelTable {
    pub title: &'static str,
    pub rows: Vec<TableRow>,
}

/// The content of the model details region.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ModelDetails {
    Tables(Vec<ModelTable>),
    NoDetails,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryFields {
    pub total_effort: String,
    pub duration: String,
    pub team_size: String,
    pub confidence_level: String,
    pub confidence_tone: BadgeTone,
    pub method: Option<String>,
    pub project_size: Option<String>,
}

/// All the display regions for one result.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportView {
    pub summary: SummaryFields,
    pub document: Vec<(String, String)>,
    pub details: ModelDetails,
    pub recommendations: Vec<String>,
}

fn model_row(m: &ModelEstimate) -> TableRow {
    TableRow {
        model: m.name.clone(),
        effort: format!("{:.2}", m.effort),
        confidence: match m.confidence_percent() {
            Some(p) => format!("{}%", p),
            None => MISSING.to_string(),
        },
        model_type: m.model_type.clone(),
        color: m.color(),
    }
}

pub fn render_details(models: &[ModelEstimate]) -> ModelDetails {
    let partition = partition_models(models);
    if partition.is_empty() {
        return ModelDetails::NoDetails;
    }
    let mut tables: Vec<ModelTable> = Vec::new();
    for (title, group) in [
        (TRADITIONAL_TITLE, &partition.traditional),
        (MACHINE_LEARNING_TITLE, &partition.machine_learning),
    ] {
        if !group.is_empty() {
            tables.push(ModelTable {
                title,
                rows: group.iter().map(model_row).collect(),
            });
        }
    }
    ModelDetails::Tables(tables)
}

pub fn render_summary(result: &EstimationResult) -> SummaryFields {
    let (confidence_level, confidence_tone) = match &result.confidence_level {
        Some(c) => (c.to_string(), c.tone()),
        None => (MISSING.to_string(), BadgeTone::Secondary),
    };
    SummaryFields {
        total_effort: match result.total_effort {
            Some(x) => format!("{:.2} person-months", x),
            None => MISSING.to_string(),
        },
        duration: match result.duration {
            Some(x) => format!("{:.1} months", x),
            None => MISSING.to_string(),
        },
        team_size: match result.team_size {
            Some(x) => format!("{}", x.ceil().max(0.0) as u64),
            None => MISSING.to_string(),
        },
        confidence_level,
        confidence_tone,
        method: result.method.clone(),
        project_size: result.project_size.map(|s| format!("{:.1} KLOC", s)),
    }
}

/// Formats a number of bytes with binary units.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let units = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut idx = 0;
    while value >= 1024.0 && idx < units.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{} {}", bytes, units[0])
    } else {
        format!("{:.2} {}", value, units[idx])
    }
}

fn render_document(document: &Option<DocumentInfo>) -> Vec<(String, String)> {
    let mut res: Vec<(String, String)> = Vec::new();
    if let Some(d) = document {
        if let Some(x) = &d.filename {
            res.push(("File".to_string(), x.clone()));
        }
        if let Some(x) = &d.file_type {
            res.push(("Type".to_string(), x.clone()));
        }
        if let Some(x) = d.size_bytes {
            res.push(("Size".to_string(), format_file_size(x)));
        }
        if let Some(x) = d.text_length {
            res.push(("Extracted text".to_string(), format!("{} characters", x)));
        }
    }
    res
}

pub fn render(result: &EstimationResult) -> ReportView {
    debug!("render: {} models", result.models.len());
    ReportView {
        summary: render_summary(result),
        document: render_document(&result.document),
        details: render_details(&result.models),
        recommendations: result.recommendations.clone(),
    }
}

fn table_lines(table: &ModelTable, colored: bool) -> Vec<String> {
    let mut widths: Vec<usize> = TABLE_HEADERS.iter().map(|h| h.chars().count()).collect();
    for r in table.rows.iter() {
        let cells = [&r.model, &r.effort, &r.confidence, &r.model_type];
        for (idx, c) in cells.iter().enumerate() {
            widths[idx] = widths[idx].max(c.chars().count());
        }
    }
    let format_cells = |cells: [&str; 4]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        padded.join(" | ").trim_end().to_string()
    };

    let mut lines = vec![table.title.to_string()];
    lines.push(format_cells(TABLE_HEADERS));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<String>>()
            .join("-+-"),
    );
    for r in table.rows.iter() {
        let line = format_cells([
            r.model.as_str(),
            r.effort.as_str(),
            r.confidence.as_str(),
            r.model_type.as_str(),
        ]);
        // Only the type badge is painted, the padding is already done.
        let badge = r.model_type.trim_end();
        let painted = match line.strip_suffix(badge) {
            Some(head) if colored && !badge.is_empty() => {
                Some(format!("{}{}", head, r.color.paint(badge)))
            }
            _ => None,
        };
        lines.push(painted.unwrap_or(line));
    }
    lines
}

impl ReportView {
    /// The text of all the regions, without the chart.
    pub fn to_lines(&self, colored: bool) -> Vec<String> {
        let s = &self.summary;
        let confidence = match (colored, s.confidence_tone.color()) {
            (true, Some(c)) => c.paint(&s.confidence_level),
            _ => s.confidence_level.clone(),
        };
        let mut lines = vec![
            "Estimation Results".to_string(),
            "==================".to_string(),
            format!("Total effort:     {}", s.total_effort),
            format!("Duration:         {}", s.duration),
            format!("Team size:        {}", s.team_size),
            format!("Confidence level: {}", confidence),
        ];
        if let Some(m) = &s.method {
            lines.push(format!("Method:           {}", m));
        }
        if let Some(p) = &s.project_size {
            lines.push(format!("Project size:     {}", p));
        }

        if !self.document.is_empty() {
            lines.push(String::new());
            lines.push("Document".to_string());
            for (k, v) in self.document.iter() {
                lines.push(format!("  {}: {}", k, v));
            }
        }

        match &self.details {
            ModelDetails::NoDetails => {
                lines.push(String::new());
                lines.push(NO_DETAILS_MESSAGE.to_string());
            }
            ModelDetails::Tables(tables) => {
                for t in tables.iter() {
                    lines.push(String::new());
                    lines.extend(table_lines(t, colored));
                }
            }
        }

        if !self.recommendations.is_empty() {
            lines.push(String::new());
            lines.push("Recommendations".to_string());
            for r in self.recommendations.iter() {
                lines.push(format!("  - {}", r));
            }
        }
        lines
    }

    pub fn table_titles(&self) -> Vec<&'static str> {
        match &self.details {
            ModelDetails::Tables(tables) => tables.iter().map(|t| t.title).collect(),
            ModelDetails::NoDetails => vec![],
        }
    }
}

/// Draws a full report: the regions of the view followed by the chart.
pub fn report_text(view: &ReportView, chart: Option<&BarChart>, options: &DisplayOptions) -> String {
    let mut lines = view.to_lines(options.colored);
    if let Some(c) = chart {
        if !c.bars.is_empty() {
            lines.push(String::new());
            lines.extend(c.draw(options.chart_width, options.colored));
        }
    }
    let mut s = lines.join("\n");
    s.push('\n');
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_model_section;
    use serde_json::{json, Map as JSMap, Value as JSValue};

    fn login_page_result() -> EstimationResult {
        let body = json!({"estimation": {
            "total_effort": 12.3,
            "model_estimates": {
                "cocomo": {"effort": 11.8, "confidence": 75},
                "ml_linear": {"estimate": 12.9, "confidence": 68}
            }
        }});
        EstimationResult::from_response(&body).unwrap()
    }

    #[test]
    fn partition_keeps_relative_order() {
        let models = normalize_model_section(&json!({
            "ml_b": 1, "cocomo": 2, "ml_a": 3, "loc": 4, "ML_upper": 5
        }));
        let p = partition_models(&models);
        let trad: Vec<&str> = p.traditional.iter().map(|m| m.key.as_str()).collect();
        let ml: Vec<&str> = p.machine_learning.iter().map(|m| m.key.as_str()).collect();
        // The prefix test is case-sensitive.
        assert_eq!(trad, vec!["cocomo", "loc", "ML_upper"]);
        assert_eq!(ml, vec!["ml_b", "ml_a"]);
    }

    #[test]
    fn partition_of_normalized_output_is_stable() {
        let models = normalize_model_section(&json!({
            "ml_ensemble": {"estimate": 8, "confidence": 250},
            "cocomo": 12.5,
            "loc": 5, "loc_name": "LOC Model", "loc_confidence": 80,
            "ml_linear": {"effort_pm": 3.5, "description": "linear regression"}
        }));
        let first = partition_models(&models);

        // Feed the normalized output back as a nested-object section.
        let mut section: JSMap<String, JSValue> = JSMap::new();
        for m in first.ordered() {
            section.insert(m.key.clone(), serde_json::to_value(&m).unwrap());
        }
        let again = normalize_model_section(&JSValue::Object(section));
        assert_eq!(again, first.ordered());
        assert_eq!(partition_models(&again), first);
        assert_eq!(partition_models(&first.ordered()), first);
    }

    #[test]
    fn login_page_scenario() {
        let view = render(&login_page_result());
        assert_eq!(view.summary.total_effort, "12.30 person-months");
        assert_eq!(view.summary.duration, "-");
        assert_eq!(
            view.table_titles(),
            vec![TRADITIONAL_TITLE, MACHINE_LEARNING_TITLE]
        );
        match &view.details {
            ModelDetails::Tables(tables) => {
                assert_eq!(tables[0].rows.len(), 1);
                assert_eq!(tables[0].rows[0].model, "cocomo");
                assert_eq!(tables[0].rows[0].confidence, "75%");
                assert_eq!(tables[1].rows.len(), 1);
                assert_eq!(tables[1].rows[0].model, "ml_linear");
                assert_eq!(tables[1].rows[0].effort, "12.90");
                assert_eq!(tables[1].rows[0].color, Color::Red);
            }
            x => panic!("unexpected details {:?}", x),
        }
    }

    #[test]
    fn login_page_text() {
        let view = render(&login_page_result());
        let lines = view.to_lines(false);
        assert_eq!(
            lines,
            vec![
                "Estimation Results",
                "==================",
                "Total effort:     12.30 person-months",
                "Duration:         -",
                "Team size:        -",
                "Confidence level: -",
                "",
                "Traditional Models",
                "Model  | Effort (PM) | Confidence | Type",
                "-------+-------------+------------+-------",
                "cocomo | 11.80       | 75%        | COCOMO",
                "",
                "Machine Learning Models",
                "Model     | Effort (PM) | Confidence | Type",
                "----------+-------------+------------+-----",
                "ml_linear | 12.90       | 68%        | ML",
            ]
        );
    }

    #[test]
    fn empty_models_render_placeholder() {
        let body = json!({"estimation": {"total_effort": 4, "model_estimates": {}}});
        let view = render(&EstimationResult::from_response(&body).unwrap());
        assert_eq!(view.details, ModelDetails::NoDetails);
        let text = view.to_lines(false).join("\n");
        assert!(text.contains(NO_DETAILS_MESSAGE));
        assert!(!text.contains("Effort (PM)"));
    }

    #[test]
    fn summary_formats() {
        let r = EstimationResult {
            total_effort: Some(7.0),
            duration: Some(4.44),
            team_size: Some(2.1),
            confidence_level: Some(ConfidenceLevel::Percent(81.0)),
            project_size: Some(3.26),
            ..Default::default()
        };
        let s = render_summary(&r);
        assert_eq!(s.total_effort, "7.00 person-months");
        assert_eq!(s.duration, "4.4 months");
        assert_eq!(s.team_size, "3");
        assert_eq!(s.confidence_level, "81%");
        assert_eq!(s.confidence_tone, BadgeTone::Success);
        assert_eq!(s.project_size.as_deref(), Some("3.3 KLOC"));
    }

    #[test]
    fn document_region() {
        let r = EstimationResult {
            document: Some(DocumentInfo {
                filename: Some("spec.docx".to_string()),
                file_type: Some("docx".to_string()),
                size_bytes: Some(1536),
                text_length: Some(420),
            }),
            ..Default::default()
        };
        let view = render(&r);
        assert_eq!(
            view.document,
            vec![
                ("File".to_string(), "spec.docx".to_string()),
                ("Type".to_string(), "docx".to_string()),
                ("Size".to_string(), "1.50 KB".to_string()),
                ("Extracted text".to_string(), "420 characters".to_string()),
            ]
        );
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(11 * 1024 * 1024), "11.00 MB");
    }
}
