//! Model schema patching

use super::anchor::{strip_doc_blocks, Anchor};
use super::{PatchOptions, PatchOutcome, PatchTarget};
use crate::conventions::SCHEMA_MARKER;
use crate::error::Result;

const CLASS_DECLARATION: &str = r"(?m)^(?:(?:abstract|final|readonly)\s+)*class\s";

/// Insert `schema` above the model's class declaration
///
/// An already annotated model is [`PatchOutcome::Skipped`] unless
/// `options.force` is set, in which case every existing schema block is
/// removed first. Only the in-memory text is edited.
///
/// # Errors
///
/// Returns [`MkApiError::AnchorNotFound`](crate::MkApiError::AnchorNotFound)
/// if the file has no class declaration
pub fn apply_model_schema(
    target: &mut PatchTarget,
    schema: &str,
    options: PatchOptions,
) -> Result<PatchOutcome> {
    if !options.force && target.content().contains(SCHEMA_MARKER) {
        tracing::debug!(path = %target.path().display(), "Model already annotated");
        return Ok(PatchOutcome::Skipped);
    }

    let class = Anchor::new("class declaration", CLASS_DECLARATION)?;
    let mut content = target.content().to_string();

    let removed = strip_doc_blocks(&mut content, SCHEMA_MARKER, true);
    if removed > 0 {
        tracing::debug!(removed, "Removed existing schema blocks");
    }

    let insert_at = class
        .find(&content)
        .ok_or_else(|| target.anchor_missing(&class))?
        .start;
    content.insert_str(insert_at, &format!("{schema}\n"));

    *target.content_mut() = content;
    Ok(PatchOutcome::Written {
        changed: target.is_changed(),
    })
}
