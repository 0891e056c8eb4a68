//! Controller patching
//!
//! Three passes run in order over the same text:
//! 1. resource stubs are replaced with documented stubs;
//! 2. with `force`, all existing annotations are stripped and each method
//!    signature is re-prefixed with its fresh doc comment;
//! 3. with `code`, the middleware hook is injected and stub bodies are
//!    replaced with implementations.
//!
//! Controllers are always written back, even when nothing changed.

use super::anchor::{strip_doc_blocks, Anchor};
use super::{PatchOptions, PatchOutcome, PatchTarget};
use crate::conventions::{DOC_MARKER, MIDDLEWARE_CAPABILITY};
use crate::error::Result;
use crate::scaffold::{ArtifactSet, CrudOperation};
use once_cell::sync::Lazy;
use regex::Regex;

static EXTENDS_CONTROLLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)extends Controller.*?\{").expect("Invalid regex"));

static MODEL_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"use App\\Models").expect("Invalid regex"));

static NAMESPACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^namespace\s+[^;]+;[^\n]*\n").expect("Invalid regex"));

static BLANK_INDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{4}\n").expect("Invalid regex"));

const MIDDLEWARE_HOOK: &str = "extends Controller implements HasMiddleware
{
    public static function middleware(): array
    {
        return [
            new Middleware('auth')
        ];
    }
";

const MIDDLEWARE_IMPORTS: &[&str] = &[
    "Exception",
    "Illuminate\\Http\\JsonResponse",
    "Illuminate\\Http\\Request",
    "Illuminate\\Routing\\Controllers\\HasMiddleware",
    "Illuminate\\Routing\\Controllers\\Middleware",
    "Illuminate\\Support\\Facades\\Log",
];

/// Splice `artifacts` into a controller
///
/// Only the in-memory text is edited. The outcome is always
/// [`PatchOutcome::Written`]; controllers are never skipped.
///
/// # Errors
///
/// Returns an error if an anchor pattern fails to compile
pub fn apply_controller(
    target: &mut PatchTarget,
    artifacts: &ArtifactSet,
    options: PatchOptions,
) -> Result<PatchOutcome> {
    let mut content = target.content().to_string();

    for artifact in artifacts.iter() {
        let anchor = Anchor::legacy_stub(artifact.operation)?;
        if !anchor.replace_first(&mut content, &artifact.documentation) {
            tracing::debug!(anchor = anchor.name(), "Anchor not present");
        }
    }

    if options.force {
        redocument(&mut content, artifacts)?;
    }

    if options.code {
        inject_middleware(&mut content);
        for artifact in artifacts.iter() {
            let Some(implementation) = &artifact.implementation else {
                continue;
            };
            let anchor = Anchor::implementation_stub(artifact.operation)?;
            if !anchor.replace_first(&mut content, implementation) {
                tracing::debug!(anchor = anchor.name(), "Anchor not present");
            }
        }
    }

    *target.content_mut() = content;
    Ok(PatchOutcome::Written {
        changed: target.is_changed(),
    })
}

/// Strip every annotation and re-attach fresh doc comments to the signatures
fn redocument(content: &mut String, artifacts: &ArtifactSet) -> Result<()> {
    let removed = strip_doc_blocks(content, DOC_MARKER, false);
    tracing::debug!(removed, "Stripped existing annotations");

    for artifact in artifacts.iter() {
        let prefix = doc_prefix(artifact.operation, &artifact.documentation)?;
        let signature = Anchor::method_signature(artifact.operation)?;
        signature.replace_all(content, &prefix);
    }

    *content = BLANK_INDENT.replace_all(content, "").into_owned();
    Ok(())
}

/// Doc comment of a rendered stub followed by `public function <method>`
fn doc_prefix(operation: CrudOperation, documentation: &str) -> Result<String> {
    let method = operation.method();
    let rest = Regex::new(&format!(r"(?s){method}\(.*?\): JsonResponse.*"))?;
    let head = rest.replace(documentation, "");
    Ok(format!("{} {method}", head.trim()))
}

/// Make the controller implement the middleware hook
///
/// Does nothing when the capability is already declared. Imports are added
/// before the first `use App\Models` line, or after the namespace line when
/// there is none, skipping any that are already imported. Returns whether the
/// text changed.
pub fn inject_middleware(content: &mut String) -> bool {
    if content.contains(MIDDLEWARE_CAPABILITY) {
        return false;
    }

    let before = content.len();

    if let Some(span) = EXTENDS_CONTROLLER.find(content).map(|m| m.range()) {
        content.replace_range(span, MIDDLEWARE_HOOK);
    } else {
        tracing::warn!("No `extends Controller` clause; middleware hook not added");
    }

    let imports: String = MIDDLEWARE_IMPORTS
        .iter()
        .map(|class| format!("use {class};\n"))
        .filter(|line| !content.contains(line.as_str()))
        .collect();

    if !imports.is_empty() {
        if let Some(at) = MODEL_IMPORT.find(content).map(|m| m.start()) {
            content.insert_str(at, &imports);
        } else if let Some(at) = NAMESPACE_LINE.find(content).map(|m| m.end()) {
            content.insert_str(at, &format!("\n{imports}"));
        } else {
            tracing::warn!("No import position found; middleware imports not added");
        }
    }

    content.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::{ArtifactRenderer, RuleSet};
    use crate::schema::{ColumnMetadata, TableMetadata};
    use chrono::NaiveDate;

    const RESOURCE_CONTROLLER: &str = "<?php

namespace App\\Http\\Controllers;

use App\\Models\\Post;
use Illuminate\\Http\\Request;

class PostController extends Controller
{
    /**
     * Display a listing of the resource.
     */
    public function index()
    {
        //
    }

    /**
     * Store a newly created resource in storage.
     */
    public function store(Request $request)
    {
        //
    }

    /**
     * Display the specified resource.
     */
    public function show(Post $post)
    {
        //
    }

    /**
     * Update the specified resource in storage.
     */
    public function update(Request $request, Post $post)
    {
        //
    }

    /**
     * Remove the specified resource from storage.
     */
    public function destroy(Post $post)
    {
        //
    }
}
";

    fn posts() -> TableMetadata {
        TableMetadata::with_columns(
            "posts",
            vec![
                ColumnMetadata::new("id", "int"),
                ColumnMetadata::new("title", "varchar(120)").not_null(),
                ColumnMetadata::new("created_at", "timestamp"),
            ],
        )
    }

    fn renderer() -> ArtifactRenderer {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ArtifactRenderer::new(now).unwrap()
    }

    fn target() -> PatchTarget {
        PatchTarget::from_text("PostController.php", RESOURCE_CONTROLLER)
    }

    #[test]
    fn test_resource_stubs_are_documented() {
        let artifacts = renderer().render(&posts()).unwrap();
        let mut target = target();

        let outcome = apply_controller(&mut target, &artifacts, PatchOptions::default()).unwrap();
        assert_eq!(outcome, PatchOutcome::Written { changed: true });

        let content = target.content();
        assert_eq!(content.matches("// Your code here").count(), 5);
        assert!(!content.contains("        //\n"));
        assert!(content.contains("public function update(Request $request, int $id): JsonResponse"));
        assert!(content.contains("operationId=\"deletePost\""));
        assert!(content.ends_with("        // Your code here\n    }\n}\n"));
    }

    #[test]
    fn test_second_run_is_written_but_unchanged() {
        let artifacts = renderer().render(&posts()).unwrap();
        let mut target = target();
        apply_controller(&mut target, &artifacts, PatchOptions::default()).unwrap();

        let mut again = PatchTarget::from_text("PostController.php", target.content());
        let outcome = apply_controller(&mut again, &artifacts, PatchOptions::default()).unwrap();

        assert_eq!(outcome, PatchOutcome::Written { changed: false });
        assert_eq!(again.content(), target.content());
    }

    #[test]
    fn test_force_rewrites_annotations_once() {
        let artifacts = renderer().render(&posts()).unwrap();
        let force = PatchOptions {
            force: true,
            ..PatchOptions::default()
        };

        let mut target = target();
        apply_controller(&mut target, &artifacts, force).unwrap();
        apply_controller(&mut target, &artifacts, force).unwrap();

        let content = target.content();
        assert_eq!(content.matches("@OA\\Get(").count(), 2);
        assert_eq!(content.matches("@OA\\Post(").count(), 1);
        assert_eq!(content.matches("public function store(").count(), 1);
        assert!(content.contains("     */\n    public function store(Request $request): JsonResponse"));
    }

    #[test]
    fn test_code_mode_injects_bodies_and_middleware() {
        let renderer = renderer();
        let rules = RuleSet::for_table(&posts());
        let artifacts = renderer.render_with_code(&posts(), &rules).unwrap();
        let code = PatchOptions {
            code: true,
            ..PatchOptions::default()
        };

        let mut target = target();
        apply_controller(&mut target, &artifacts, code).unwrap();
        let content = target.content();

        assert!(!content.contains("// Your code here"));
        assert!(content.contains("return $this->success((new Post())->latest()->paginate(20));"));
        assert!(content.contains("'title' => 'required|string|max:120',"));
        assert!(content.contains("class PostController extends Controller implements HasMiddleware\n{\n    public static function middleware(): array"));
        assert!(content.contains("use Illuminate\\Support\\Facades\\Log;\nuse App\\Models\\Post;"));
        assert_eq!(content.matches("use Illuminate\\Http\\Request;").count(), 1);
    }

    #[test]
    fn test_middleware_injected_once() {
        let mut content = RESOURCE_CONTROLLER.to_string();
        assert!(inject_middleware(&mut content));
        let once = content.clone();

        assert!(!inject_middleware(&mut content));
        assert_eq!(content, once);
    }

    #[test]
    fn test_imports_fall_back_to_namespace() {
        let mut content =
            "<?php\n\nnamespace App\\Http\\Controllers;\n\nclass TagController extends Controller\n{\n}\n"
                .to_string();
        inject_middleware(&mut content);

        assert!(content.starts_with(
            "<?php\n\nnamespace App\\Http\\Controllers;\n\nuse Exception;\nuse Illuminate\\Http\\JsonResponse;"
        ));
        assert!(content.contains("use Illuminate\\Support\\Facades\\Log;\n\nclass TagController"));
    }

    #[test]
    fn test_doc_prefix() {
        let artifacts = renderer().render(&posts()).unwrap();
        let show = artifacts.get(CrudOperation::Read).unwrap();
        let prefix = doc_prefix(CrudOperation::Read, &show.documentation).unwrap();

        assert!(prefix.starts_with("/**\n     * @OA\\Get("));
        assert!(prefix.ends_with("     */\n    public function show"));
    }
}
