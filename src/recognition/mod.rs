//! Recognition collaborator abstraction.
//!
//! Defines the [`RecognitionProvider`] trait and the normalized annotation
//! types (page → block → paragraph → word → symbol, each with a bounding
//! polygon) so the field pipelines never see a provider's wire format.
//! The host constructs one provider and injects it into the engine entry
//! point; tests substitute a fake.

pub mod vision;

use thiserror::Error;

/// Errors raised by a recognition provider.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("recognition credentials error: {0}")]
    Credentials(String),
    #[error("recognition request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("recognition service error: {0}")]
    Service(String),
    #[error("malformed recognition response: {0}")]
    Malformed(String),
}

/// A single (x, y) vertex in page-pixel coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// Four-vertex bounding polygon of a recognized fragment.
#[derive(Debug, Clone, Default)]
pub struct BoundingPoly {
    pub vertices: Vec<Vertex>,
}

impl BoundingPoly {
    /// Arithmetic mean of the polygon vertices. Empty polygon → origin.
    pub fn center(&self) -> (f64, f64) {
        if self.vertices.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.vertices.len() as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));
        (sx / n, sy / n)
    }
}

#[derive(Debug, Clone)]
pub struct AnnotatedSymbol {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct AnnotatedWord {
    pub symbols: Vec<AnnotatedSymbol>,
}

#[derive(Debug, Clone)]
pub struct AnnotatedParagraph {
    pub words: Vec<AnnotatedWord>,
}

#[derive(Debug, Clone)]
pub struct AnnotatedBlock {
    pub bounding_box: BoundingPoly,
    pub paragraphs: Vec<AnnotatedParagraph>,
}

/// One recognized page: an ordered sequence of blocks in the provider's
/// traversal order. No further ordering is guaranteed.
#[derive(Debug, Clone)]
pub struct AnnotatedPage {
    pub blocks: Vec<AnnotatedBlock>,
}

/// Unified recognition result returned by every provider.
#[derive(Debug, Clone)]
pub struct DocumentAnnotation {
    /// Per-page recognized text, concatenated with newlines.
    pub full_text: String,
    pub pages: Vec<AnnotatedPage>,
}

/// Async trait implemented by each recognition backend.
#[async_trait::async_trait]
pub trait RecognitionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Recognize text and geometry in the given document bytes.
    async fn annotate(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<DocumentAnnotation, RecognitionError>;
}
