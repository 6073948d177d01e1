// ********* Normalized data structures ***********

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// The family of an estimation model, as inferred from its key.
///
/// The rules are evaluated in declaration order and the first match wins:
/// a key such as `ml_loc` belongs to [ModelFamily::Loc], not to
/// [ModelFamily::MachineLearning].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    Cocomo,
    FunctionPoints,
    UseCase,
    Loc,
    MachineLearning,
    Other,
}

impl ModelFamily {
    /// Infers the family from a model key. Matching is case-insensitive.
    pub fn infer(key: &str) -> ModelFamily {
        let k = key.to_lowercase();
        if k.contains("cocomo") {
            ModelFamily::Cocomo
        } else if k.contains("function_points") {
            ModelFamily::FunctionPoints
        } else if k.contains("use_case") {
            ModelFamily::UseCase
        } else if k.contains("loc") {
            ModelFamily::Loc
        } else if k.starts_with(ML_PREFIX) {
            ModelFamily::MachineLearning
        } else {
            ModelFamily::Other
        }
    }

    /// The type label displayed when the server does not provide one.
    pub fn label(&self) -> &'static str {
        match self {
            ModelFamily::Cocomo => "COCOMO",
            ModelFamily::FunctionPoints => "Function Points",
            ModelFamily::UseCase => "Use Case",
            ModelFamily::Loc => "LOC",
            ModelFamily::MachineLearning => "ML",
            ModelFamily::Other => "Other",
        }
    }

    /// The color shared by the table badges and the chart bars.
    pub fn color(&self) -> Color {
        match self {
            ModelFamily::Cocomo => Color::Blue,
            ModelFamily::FunctionPoints => Color::Green,
            ModelFamily::UseCase => Color::Purple,
            ModelFamily::Loc => Color::Orange,
            ModelFamily::MachineLearning => Color::Red,
            // Unmatched keys fall back to the default blue.
            ModelFamily::Other => Color::Blue,
        }
    }
}

/// Keys starting with this literal prefix are machine learning models.
pub const ML_PREFIX: &str = "ml_";

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Color {
    Blue,
    Green,
    Purple,
    Orange,
    Red,
}

impl Color {
    /// ANSI SGR parameters for terminal output.
    pub fn ansi(&self) -> &'static str {
        match self {
            Color::Blue => "34",
            Color::Green => "32",
            Color::Purple => "35",
            Color::Orange => "38;5;208",
            Color::Red => "31",
        }
    }

    /// Wraps some text in the escape sequences for this color.
    pub fn paint(&self, text: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", self.ansi(), text)
    }
}

/// One model's estimate, with every field resolved.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub key: String,
    pub name: String,
    /// Person-months.
    pub effort: f64,
    /// Percentage, always within [0, 100].
    pub confidence: Option<f64>,
    #[serde(rename = "type")]
    pub model_type: String,
    pub description: Option<String>,
}

impl ModelEstimate {
    /// Machine learning models are the ones whose key starts with `ml_`.
    pub fn is_machine_learning(&self) -> bool {
        self.key.starts_with(ML_PREFIX)
    }

    pub fn family(&self) -> ModelFamily {
        ModelFamily::infer(&self.key)
    }

    pub fn color(&self) -> Color {
        self.family().color()
    }

    /// The confidence rounded for display.
    pub fn confidence_percent(&self) -> Option<u8> {
        self.confidence.map(|c| c.clamp(0.0, 100.0).round() as u8)
    }
}

/// The overall confidence, which the server reports either as a label
/// ("High", "Medium", "Low") or as a percentage.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfidenceLevel {
    Percent(f64),
    Label(String),
}

impl ConfidenceLevel {
    pub fn tone(&self) -> BadgeTone {
        match self {
            ConfidenceLevel::Label(s) => match s.to_lowercase().as_str() {
                "high" => BadgeTone::Success,
                "medium" => BadgeTone::Warning,
                "low" => BadgeTone::Danger,
                _ => BadgeTone::Secondary,
            },
            ConfidenceLevel::Percent(p) if *p >= 80.0 => BadgeTone::Success,
            ConfidenceLevel::Percent(p) if *p >= 60.0 => BadgeTone::Warning,
            ConfidenceLevel::Percent(_) => BadgeTone::Danger,
        }
    }
}

impl Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::Label(s) => write!(f, "{}", s),
            ConfidenceLevel::Percent(p) => write!(f, "{}%", p.round()),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BadgeTone {
    Success,
    Warning,
    Danger,
    Secondary,
}

impl BadgeTone {
    pub fn color(&self) -> Option<Color> {
        match self {
            BadgeTone::Success => Some(Color::Green),
            BadgeTone::Warning => Some(Color::Orange),
            BadgeTone::Danger => Some(Color::Red),
            BadgeTone::Secondary => None,
        }
    }
}

/// Metadata about an uploaded requirements document, echoed by the server.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub filename: Option<String>,
    pub file_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub text_length: Option<u64>,
}

/// The normalized content of one estimation response.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    pub total_effort: Option<f64>,
    pub duration: Option<f64>,
    pub team_size: Option<f64>,
    pub confidence_level: Option<ConfidenceLevel>,
    pub method: Option<String>,
    pub project_size: Option<f64>,
    pub document: Option<DocumentInfo>,
    pub recommendations: Vec<String>,
    pub models: Vec<ModelEstimate>,
}

/// Errors that prevent a response from being displayed at all.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ResponseError {
    /// The body is valid JSON but not an object.
    NotAnObject(String),
}

impl Error for ResponseError {}

impl Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseError::NotAnObject(kind) => {
                write!(f, "expected a JSON object in the response, found {}", kind)
            }
        }
    }
}

// ********* Display configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    Linear,
    #[serde(alias = "log")]
    Logarithmic,
}

impl AxisScale {
    pub fn toggled(&self) -> AxisScale {
        match self {
            AxisScale::Linear => AxisScale::Logarithmic,
            AxisScale::Logarithmic => AxisScale::Linear,
        }
    }

    pub fn parse(s: &str) -> Option<AxisScale> {
        match s.to_lowercase().as_str() {
            "linear" | "lin" => Some(AxisScale::Linear),
            "log" | "logarithmic" => Some(AxisScale::Logarithmic),
            _ => None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DisplayOptions {
    pub scale: AxisScale,
    /// Width of the longest bar, in characters.
    pub chart_width: usize,
    pub colored: bool,
}

impl DisplayOptions {
    pub const DEFAULT_OPTIONS: DisplayOptions = DisplayOptions {
        scale: AxisScale::Logarithmic,
        chart_width: 40,
        colored: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_rules_first_match_wins() {
        assert_eq!(ModelFamily::infer("cocomo"), ModelFamily::Cocomo);
        assert_eq!(ModelFamily::infer("COCOMO_II"), ModelFamily::Cocomo);
        assert_eq!(
            ModelFamily::infer("function_points"),
            ModelFamily::FunctionPoints
        );
        assert_eq!(ModelFamily::infer("use_case_points"), ModelFamily::UseCase);
        assert_eq!(ModelFamily::infer("loc_linear"), ModelFamily::Loc);
        assert_eq!(ModelFamily::infer("ml_ensemble"), ModelFamily::MachineLearning);
        // "loc" is checked before the ml_ prefix.
        assert_eq!(ModelFamily::infer("ml_loc_forest"), ModelFamily::Loc);
        assert_eq!(ModelFamily::infer("expert"), ModelFamily::Other);
        assert_eq!(ModelFamily::infer("xml_model"), ModelFamily::Other);
    }

    #[test]
    fn unmatched_keys_use_default_blue() {
        assert_eq!(ModelFamily::Other.color(), Color::Blue);
        assert_eq!(ModelFamily::Cocomo.color(), Color::Blue);
        assert_eq!(ModelFamily::MachineLearning.color(), Color::Red);
    }

    #[test]
    fn confidence_level_tones() {
        let high = ConfidenceLevel::Label("High".to_string());
        assert_eq!(high.tone(), BadgeTone::Success);
        assert_eq!(
            ConfidenceLevel::Label("unknown".to_string()).tone(),
            BadgeTone::Secondary
        );
        assert_eq!(ConfidenceLevel::Percent(80.0).tone(), BadgeTone::Success);
        assert_eq!(ConfidenceLevel::Percent(65.0).tone(), BadgeTone::Warning);
        assert_eq!(ConfidenceLevel::Percent(10.0).tone(), BadgeTone::Danger);
        assert_eq!(ConfidenceLevel::Percent(72.4).to_string(), "72%");
    }

    #[test]
    fn scale_toggles_and_parses() {
        assert_eq!(AxisScale::Linear.toggled(), AxisScale::Logarithmic);
        assert_eq!(AxisScale::Logarithmic.toggled(), AxisScale::Linear);
        assert_eq!(AxisScale::parse("LOG"), Some(AxisScale::Logarithmic));
        assert_eq!(AxisScale::parse("linear"), Some(AxisScale::Linear));
        assert_eq!(AxisScale::parse("cubic"), None);
    }
}
