use std::fmt;
use std::sync::Arc;

use base64::Engine;

// ---------------------------------------------------------------------------
// Confusion matrix
// ---------------------------------------------------------------------------

/// A square matrix of prediction counts: row = true class, column = predicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    cells: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    /// Wrap `cells`, rejecting anything that is not square.
    pub fn new(cells: Vec<Vec<u64>>) -> Result<Self, String> {
        let n = cells.len();
        if let Some((i, row)) = cells.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(format!(
                "confusion matrix is not square: row {i} has {} entries, expected {n}",
                row.len()
            ));
        }
        Ok(Self { cells })
    }

    /// Number of classes.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.cells
    }

    pub fn get(&self, actual: usize, predicted: usize) -> Option<u64> {
        self.cells.get(actual)?.get(predicted).copied()
    }

    /// Largest count, used to scale cell shading.
    pub fn max(&self) -> u64 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }
}

/// Right-aligned grid, one matrix row per line:
///
/// ```text
/// [ 5  1]
/// [ 2 17]
/// ```
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max().to_string().len();
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v:>width$}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Metric reports and the training result
// ---------------------------------------------------------------------------

/// Evaluation numbers for one data split.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    pub accuracy: f64,
    pub precision: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
}

/// Both metric reports plus the rendered graph returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingResult {
    pub train: MetricReport,
    pub test: MetricReport,
    /// Opaque image reference (URL or data URI), displayed as-is.
    pub graph: String,
}

/// Which split's metrics are on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Train,
    Test,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Train => "Training set",
            ViewMode::Test => "Test set",
        }
    }
}

// ---------------------------------------------------------------------------
// Graph reference
// ---------------------------------------------------------------------------

/// How the `graph` reference of a result is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphImage {
    /// Fetched by an image loader (http(s), file).
    Url(String),
    /// A `data:` URI decoded to image bytes. `uri` is the `bytes://` key the
    /// image is cached under.
    Inline { uri: String, bytes: Arc<[u8]> },
    /// A `data:` URI that could not be decoded.
    Invalid(String),
}

impl GraphImage {
    /// Interpret a graph reference. `serial` keeps inline images from
    /// different results apart in the texture cache.
    pub fn from_reference(reference: &str, serial: u64) -> Self {
        let Some(rest) = reference.strip_prefix("data:") else {
            return GraphImage::Url(reference.to_string());
        };
        let Some((header, payload)) = rest.split_once(',') else {
            return GraphImage::Invalid("data URI has no payload".into());
        };

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or("").trim().to_ascii_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return GraphImage::Invalid("only base64 data URIs are supported".into());
        }

        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        match base64::engine::general_purpose::STANDARD.decode(compact) {
            Ok(bytes) if !bytes.is_empty() => GraphImage::Inline {
                uri: format!("bytes://learning-curve-{serial}.{}", extension_for(&media_type)),
                bytes: bytes.into(),
            },
            Ok(_) => GraphImage::Invalid("data URI is empty".into()),
            Err(e) => GraphImage::Invalid(format!("bad base64 payload: {e}")),
        }
    }
}

fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/svg+xml" => "svg",
        "image/gif" => "gif",
        _ => "png",
    }
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Holds the latest training result and the train/test toggle.
#[derive(Debug, Default)]
pub struct ResultPresenter {
    result: Option<TrainingResult>,
    graph: Option<GraphImage>,
    serial: u64,
    mode: ViewMode,
}

impl ResultPresenter {
    /// Replace the displayed result wholesale.
    pub fn set_result(&mut self, result: TrainingResult) {
        self.serial += 1;
        self.graph = Some(GraphImage::from_reference(&result.graph, self.serial));
        self.result = Some(result);
    }

    /// The decoded graph of the current result.
    pub fn graph(&self) -> Option<&GraphImage> {
        self.graph.as_ref()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub fn result(&self) -> Option<&TrainingResult> {
        self.result.as_ref()
    }

    /// Metrics for the current view mode, `None` until a result arrives.
    pub fn current_metrics(&self) -> Option<&MetricReport> {
        let result = self.result.as_ref()?;
        Some(match self.mode {
            ViewMode::Train => &result.train,
            ViewMode::Test => &result.test,
        })
    }
}
