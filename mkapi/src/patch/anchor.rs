//! Named text anchors
//!
//! An anchor is a pattern that identifies one insertion point in a source
//! file. Lookups return the matched byte span, or `None` when the anchor is
//! absent, so callers decide whether a miss is fine (already patched) or an
//! error. Replacement text is spliced literally; `$` in generated PHP is never
//! treated as a capture reference.

use crate::conventions::STUB_MARKER;
use crate::error::Result;
use crate::scaffold::CrudOperation;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::ops::Range;

static DOC_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*\*.*?\*/").expect("Invalid regex"));

static DOC_BLOCK_WITH_TRAILING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*\*.*?\*/\s*").expect("Invalid regex"));

/// A named pattern locating one region of a file
#[derive(Debug, Clone)]
pub struct Anchor {
    name: String,
    pattern: Regex,
}

impl Anchor {
    /// Compile an anchor
    ///
    /// # Errors
    ///
    /// Returns [`MkApiError::Anchor`](crate::MkApiError::Anchor) if `pattern`
    /// is not a valid regular expression
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Doc comment plus empty body left by `make:controller --resource`
    ///
    /// ```php
    ///     /**
    ///      * Display a listing of the resource.
    ///      */
    ///     public function index()
    ///     {
    ///         //
    ///     }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile
    pub fn legacy_stub(operation: CrudOperation) -> Result<Self> {
        Self::new(
            format!("{operation} resource stub"),
            &format!(
                r"(?s)\s{{4}}/\*\*\s*\*\s+{lead}(?:[^*]|\*[^/])*\*/\s*public function {method}\([^)]*\)[^{{]*\{{\n\s*?//\n\s*?\}}",
                lead = regex::escape(operation.legacy_lead()),
                method = operation.method(),
            ),
        )
    }

    /// Generated method whose body is still the stub marker
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile
    pub fn implementation_stub(operation: CrudOperation) -> Result<Self> {
        Self::new(
            format!("{operation} stub body"),
            &format!(
                r"public function {method}\([^)]*\): JsonResponse\s*\{{\s*{marker}\s*\}}",
                method = operation.method(),
                marker = regex::escape(STUB_MARKER),
            ),
        )
    }

    /// Start of the method signature, up to and including the method name
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern fails to compile
    pub fn method_signature(operation: CrudOperation) -> Result<Self> {
        Self::new(
            format!("{operation} signature"),
            &format!(r"public function {}\b", operation.method()),
        )
    }

    /// Human-readable name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Span of the first match
    #[must_use]
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        self.pattern.find(text).map(|m| m.range())
    }

    /// Replace the first match, returning whether one was found
    pub fn replace_first(&self, text: &mut String, replacement: &str) -> bool {
        match self.find(text) {
            Some(span) => {
                text.replace_range(span, replacement);
                true
            }
            None => false,
        }
    }

    /// Replace every match, returning how many were replaced
    pub fn replace_all(&self, text: &mut String, replacement: &str) -> usize {
        let count = self.pattern.find_iter(text).count();
        if count > 0 {
            *text = self.pattern.replace_all(text, NoExpand(replacement)).into_owned();
        }
        count
    }
}

/// Remove every doc block containing `marker`, returning how many were removed
///
/// Each block is judged on its own text, so removal never spans from one
/// block into the next. With `trailing_space`, whitespace following a removed
/// block goes with it.
pub fn strip_doc_blocks(text: &mut String, marker: &str, trailing_space: bool) -> usize {
    let pattern = if trailing_space {
        &*DOC_BLOCK_WITH_TRAILING_SPACE
    } else {
        &*DOC_BLOCK
    };

    let spans: Vec<Range<usize>> = pattern
        .find_iter(text)
        .filter(|m| m.as_str().contains(marker))
        .map(|m| m.range())
        .collect();

    for span in spans.iter().rev() {
        text.replace_range(span.clone(), "");
    }

    spans.len()
}
