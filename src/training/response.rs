use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::SubmitError;
use crate::results::{ConfusionMatrix, MetricReport, TrainingResult};

/// Path the service serves its latest learning curve on.
pub const LEARNING_CURVE_PATH: &str = "/learning-curve";

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// One report as sent by the service.
///
/// `f1_score` and `confusion_matrix` are the canonical names; `f1-score` and
/// `confusion_matriex` are what some service versions emit.
#[derive(Debug, Deserialize)]
struct WireReport {
    accuracy: f64,
    precision: f64,
    #[serde(alias = "f1-score")]
    f1_score: f64,
    #[serde(alias = "confusion_matriex")]
    confusion_matrix: Vec<Vec<u64>>,
}

impl TryFrom<WireReport> for MetricReport {
    type Error = String;

    fn try_from(wire: WireReport) -> Result<Self, Self::Error> {
        Ok(MetricReport {
            accuracy: wire.accuracy,
            precision: wire.precision,
            f1_score: wire.f1_score,
            confusion_matrix: ConfusionMatrix::new(wire.confusion_matrix)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a `/generate` response body.
///
/// Both `train` and `test` must be present and well formed; nothing is
/// returned otherwise. A missing or empty `graph` falls back to the
/// service's learning-curve endpoint under `base_url`.
pub fn decode(body: &[u8], base_url: &str) -> Result<TrainingResult, SubmitError> {
    let root: JsonValue = serde_json::from_slice(body)
        .map_err(|e| SubmitError::invalid_response(format!("body is not JSON: {e}")))?;

    let JsonValue::Object(mut obj) = root else {
        return Err(SubmitError::invalid_response("body is not a JSON object"));
    };

    let train = take_report(&mut obj, "train")?;
    let test = take_report(&mut obj, "test")?;

    let graph = match obj.remove("graph") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) if s.trim().is_empty() => None,
        Some(JsonValue::String(s)) => Some(s),
        Some(other) => {
            return Err(SubmitError::invalid_response(format!(
                "`graph` must be a string, got {other}"
            )))
        }
    };
    let graph = graph.unwrap_or_else(|| {
        format!("{}{LEARNING_CURVE_PATH}", base_url.trim_end_matches('/'))
    });

    Ok(TrainingResult { train, test, graph })
}

fn take_report(
    obj: &mut serde_json::Map<String, JsonValue>,
    key: &str,
) -> Result<MetricReport, SubmitError> {
    let value = match obj.remove(key) {
        None | Some(JsonValue::Null) => {
            return Err(SubmitError::invalid_response(format!("missing `{key}` report")))
        }
        Some(value) => value,
    };

    let wire: WireReport = serde_json::from_value(value)
        .map_err(|e| SubmitError::invalid_response(format!("`{key}` report: {e}")))?;

    MetricReport::try_from(wire)
        .map_err(|e| SubmitError::invalid_response(format!("`{key}` report: {e}")))
}
