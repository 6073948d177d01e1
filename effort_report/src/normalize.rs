use log::{debug, warn};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::config::*;

/// Suffixes of the keys that annotate another model instead of describing one.
pub const METADATA_SUFFIXES: [&str; 4] = ["_name", "_confidence", "_type", "_description"];

/// Fields holding the effort in a nested estimate, by order of preference.
const EFFORT_FIELDS: [&str; 3] = ["effort", "estimate", "effort_pm"];

pub fn is_metadata_key(key: &str) -> bool {
    METADATA_SUFFIXES.iter().any(|s| key.ends_with(s))
}

/// Metadata for a model that the server sent as sibling keys
/// (`cocomo_name`, `cocomo_confidence`, ...).
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SiblingMetadata<'a> {
    pub name: Option<&'a JSValue>,
    pub confidence: Option<&'a JSValue>,
    pub model_type: Option<&'a JSValue>,
    pub description: Option<&'a JSValue>,
}

impl<'a> SiblingMetadata<'a> {
    pub fn collect(key: &str, estimates: &'a JSMap<String, JSValue>) -> SiblingMetadata<'a> {
        SiblingMetadata {
            name: estimates.get(&format!("{}_name", key)),
            confidence: estimates.get(&format!("{}_confidence", key)),
            model_type: estimates.get(&format!("{}_type", key)),
            description: estimates.get(&format!("{}_description", key)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.confidence.is_none()
            && self.model_type.is_none()
            && self.description.is_none()
    }
}

/// The shape in which the server sent one model estimate.
///
/// Everything downstream of [RawEstimate::into_estimate] only sees
/// [ModelEstimate] values.
#[derive(PartialEq, Debug, Clone)]
pub enum RawEstimate<'a> {
    /// A bare number of person-months.
    LegacyNumeric(f64),
    /// An object with some of `effort`/`estimate`/`effort_pm`, `confidence`,
    /// `type`, `name` and `description`.
    NestedObject(&'a JSMap<String, JSValue>),
    /// A value annotated by sibling metadata keys.
    SplitMetadata {
        value: Box<RawEstimate<'a>>,
        metadata: SiblingMetadata<'a>,
    },
    /// Anything else. All the fields take their default value.
    Unrecognized,
}

impl<'a> RawEstimate<'a> {
    /// Classifies the entry `key` of a `model_estimates` section.
    pub fn classify(key: &str, estimates: &'a JSMap<String, JSValue>) -> RawEstimate<'a> {
        let value = match estimates.get(key) {
            Some(v) => RawEstimate::classify_value(v),
            None => RawEstimate::Unrecognized,
        };
        let metadata = SiblingMetadata::collect(key, estimates);
        if metadata.is_empty() {
            value
        } else {
            RawEstimate::SplitMetadata {
                value: Box::new(value),
                metadata,
            }
        }
    }

    fn classify_value(value: &'a JSValue) -> RawEstimate<'a> {
        match value {
            JSValue::Object(m) => RawEstimate::NestedObject(m),
            v => match as_number(v) {
                Some(x) => RawEstimate::LegacyNumeric(x),
                None => RawEstimate::Unrecognized,
            },
        }
    }

    /// Builds the canonical estimate. This never fails: a field that cannot
    /// be read takes its default value.
    pub fn into_estimate(self, key: &str) -> ModelEstimate {
        let (value, metadata) = match self {
            RawEstimate::SplitMetadata { value, metadata } => (*value, metadata),
            v => (v, SiblingMetadata::default()),
        };

        let nested: Option<&JSMap<String, JSValue>> = match &value {
            RawEstimate::NestedObject(m) => Some(*m),
            _ => None,
        };
        let nested_field = |field: &str| nested.and_then(|m| m.get(field));

        let effort = match &value {
            RawEstimate::LegacyNumeric(x) => *x,
            RawEstimate::NestedObject(m) => EFFORT_FIELDS
                .iter()
                .find_map(|f| m.get(*f).and_then(as_number))
                .unwrap_or(0.0),
            _ => 0.0,
        };

        let name = nested_field("name")
            .and_then(as_text)
            .or_else(|| metadata.name.and_then(as_text))
            .unwrap_or_else(|| key.to_string());

        let model_type = nested_field("type")
            .and_then(as_text)
            .or_else(|| metadata.model_type.and_then(as_text))
            .unwrap_or_else(|| ModelFamily::infer(key).label().to_string());

        let confidence = nested_field("confidence")
            .and_then(as_number)
            .or_else(|| metadata.confidence.and_then(as_number))
            .map(|c| normalize_confidence(key, c));

        let description = nested_field("description")
            .and_then(as_text)
            .or_else(|| metadata.description.and_then(as_text));

        ModelEstimate {
            key: key.to_string(),
            name,
            effort,
            confidence,
            model_type,
            description,
        }
    }
}

/// Brings a confidence value within [0, 100].
///
/// Machine learning models sometimes report their confidence multiplied by
/// 100 a second time; such values are divided by 100 once before clamping.
pub fn normalize_confidence(key: &str, raw: f64) -> f64 {
    let mut c = raw;
    if c > 100.0 && key.starts_with(ML_PREFIX) {
        debug!(
            "normalize_confidence: rescaling confidence {:?} of {:?}",
            raw, key
        );
        c /= 100.0;
    }
    c.clamp(0.0, 100.0)
}

/// Normalizes a `model_estimates` section. The order of the keys is preserved.
pub fn normalize_model_estimates(estimates: &JSMap<String, JSValue>) -> Vec<ModelEstimate> {
    let mut res: Vec<ModelEstimate> = Vec::new();
    for key in estimates.keys() {
        if is_metadata_key(key) {
            continue;
        }
        let raw = RawEstimate::classify(key, estimates);
        debug!("normalize_model_estimates: {:?}: {:?}", key, raw);
        if raw == RawEstimate::Unrecognized {
            warn!(
                "normalize_model_estimates: could not read estimate for {:?}, using defaults",
                key
            );
        }
        res.push(raw.into_estimate(key));
    }
    res
}

/// Same as [normalize_model_estimates], for a section of unknown type.
/// Anything other than an object yields no models.
pub fn normalize_model_section(section: &JSValue) -> Vec<ModelEstimate> {
    match section {
        JSValue::Object(m) => normalize_model_estimates(m),
        JSValue::Null => vec![],
        x => {
            warn!(
                "normalize_model_section: ignoring model estimates of type {}",
                json_kind(x)
            );
            vec![]
        }
    }
}

impl EstimationResult {
    /// Reads a full response body.
    ///
    /// The estimation fields are read from the `estimation` object when there is
    /// one, and from the top level otherwise (older servers).
    pub fn from_response(body: &JSValue) -> Result<EstimationResult, ResponseError> {
        let top = match body {
            JSValue::Object(m) => m,
            x => return Err(ResponseError::NotAnObject(json_kind(x).to_string())),
        };
        let estimation: &JSMap<String, JSValue> = match top.get("estimation") {
            Some(JSValue::Object(m)) => m,
            _ => top,
        };
        // A null value counts as missing so the older locations are still read.
        let present = |v: &&JSValue| !v.is_null();
        let field = |name: &str| {
            estimation
                .get(name)
                .filter(present)
                .or_else(|| top.get(name).filter(present))
        };

        let total_effort = ["total_effort", "integrated_estimate", "estimated_effort"]
            .iter()
            .find_map(|f| field(*f).and_then(as_number));

        let read_level = |v: &JSValue| match v {
            JSValue::String(s) if !s.trim().is_empty() => Some(ConfidenceLevel::Label(s.clone())),
            v => as_number(v).map(ConfidenceLevel::Percent),
        };
        let confidence_level = field("confidence_level").and_then(read_level).or_else(|| {
            top.get("confidence")
                .and_then(|c| c.get("confidence_level"))
                .and_then(read_level)
        });

        let models = match field("model_estimates").or_else(|| field("individual_estimates")) {
            Some(section) => normalize_model_section(section),
            None => vec![],
        };

        let project_size = top
            .get("ml_features")
            .and_then(|f| f.get("size"))
            .and_then(as_number)
            .or_else(|| {
                top.get("analysis")
                    .and_then(|a| a.get("size"))
                    .and_then(as_number)
            })
            .or_else(|| field("project_size").and_then(as_number));

        let document = match top.get("document") {
            Some(JSValue::Object(d)) => Some(DocumentInfo {
                filename: d.get("filename").and_then(as_text),
                file_type: d.get("file_type").and_then(as_text),
                size_bytes: d.get("size_bytes").and_then(as_count),
                text_length: d.get("text_length").and_then(as_count),
            }),
            _ => None,
        };

        let recommendations = match field("recommendations") {
            Some(JSValue::Array(l)) => l.iter().filter_map(as_text).collect(),
            _ => vec![],
        };

        Ok(EstimationResult {
            total_effort,
            duration: field("duration").and_then(as_number),
            team_size: field("team_size").and_then(as_number),
            confidence_level,
            method: field("method").and_then(as_text),
            project_size,
            document,
            recommendations,
            models,
        })
    }
}

/// Reads a finite number. Numeric strings are accepted.
pub fn as_number(v: &JSValue) -> Option<f64> {
    let x = match v {
        JSValue::Number(n) => n.as_f64(),
        JSValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if x.is_finite() {
        Some(x)
    } else {
        None
    }
}

fn as_count(v: &JSValue) -> Option<u64> {
    as_number(v).filter(|x| *x >= 0.0).map(|x| x as u64)
}

/// Reads a non-empty piece of text. Numbers are printed.
pub fn as_text(v: &JSValue) -> Option<String> {
    match v {
        JSValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JSValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn json_kind(v: &JSValue) -> &'static str {
    match v {
        JSValue::Null => "null",
        JSValue::Bool(_) => "a boolean",
        JSValue::Number(_) => "a number",
        JSValue::String(_) => "a string",
        JSValue::Array(_) => "an array",
        JSValue::Object(_) => "an object",
    }
}
