//! Result assembler: the engine entry point and its error boundary.
//!
//! One recognition call, then pure local computation. Any failure —
//! reading the file, the collaborator call, a pipeline panic-free error —
//! is logged and folded into a single-key error result so one bad
//! document never takes down the host.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::awb;
use crate::bol;
use crate::fields::{classify, DocumentType, ExtractOutcome, FieldMap};
use crate::layout::DocumentLayout;
use crate::recognition::RecognitionProvider;
use crate::strategy::FieldContext;

/// Extract shipment fields from the document at `path`.
///
/// Always returns a complete outcome: either all ten fields or a single
/// error message, never a mix.
pub async fn extract_fields(provider: &dyn RecognitionProvider, path: &Path) -> ExtractOutcome {
    match run(provider, path).await {
        Ok(fields) => ExtractOutcome::Fields(fields),
        Err(e) => {
            error!("field extraction failed for {}: {:#}", path.display(), e);
            ExtractOutcome::error(format!("{:#}", e))
        }
    }
}

async fn run(provider: &dyn RecognitionProvider, path: &Path) -> Result<FieldMap> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let annotation = provider
        .annotate(&filename, &data)
        .await
        .with_context(|| format!("recognition failed ({})", provider.name()))?;

    let layout = DocumentLayout::from_annotation(&annotation);
    let lines = layout.lines();
    let ctx = FieldContext {
        full_text: &layout.full_text,
        lines: &lines,
        blocks: &layout.blocks,
    };

    let doc_type = classify(&layout.full_text);
    debug!("classified {} as {}", filename, doc_type.as_str());

    let fields = match doc_type {
        DocumentType::Awb => awb::parse_fields(&ctx),
        DocumentType::Bol => bol::parse_fields(&ctx),
    };

    info!(
        "extracted {}: type={} bl_number={:?} containers={:?}",
        filename, fields.document_type, fields.bl_number, fields.container_numbers
    );
    Ok(fields)
}
