//! Layout model: normalizes the recognition hierarchy into text blocks
//! with centers plus a flattened line sequence.
//!
//! Block text is assembled the way the collaborator segments it: symbols
//! concatenate into a word with no separator, words join with single
//! spaces, and each paragraph ends with a line break. Line-based
//! strategies key off those breaks; geometry-based strategies use the
//! block centers.

use crate::recognition::{AnnotatedBlock, DocumentAnnotation};

/// A recognized block flattened to text + center point.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub text: String,
    pub cx: f64,
    pub cy: f64,
}

/// Per-invocation view of one recognized document.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub full_text: String,
    pub blocks: Vec<TextBlock>,
}

impl DocumentLayout {
    /// Build from a recognition annotation. Blocks keep the collaborator's
    /// traversal order across pages.
    pub fn from_annotation(annotation: &DocumentAnnotation) -> Self {
        let blocks = annotation
            .pages
            .iter()
            .flat_map(|page| page.blocks.iter())
            .map(|block| {
                let (cx, cy) = block.bounding_box.center();
                TextBlock {
                    text: block_text(block),
                    cx,
                    cy,
                }
            })
            .collect();

        Self {
            full_text: annotation.full_text.clone(),
            blocks,
        }
    }

    /// Trimmed, non-blank lines of the full recognized text.
    pub fn lines(&self) -> Vec<String> {
        self.full_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn block_text(block: &AnnotatedBlock) -> String {
    let mut text = String::new();
    for paragraph in &block.paragraphs {
        let para: Vec<String> = paragraph
            .words
            .iter()
            .map(|word| {
                word.symbols
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<String>()
            })
            .collect();
        text.push_str(&para.join(" "));
        text.push('\n');
    }
    text.trim().to_string()
}
