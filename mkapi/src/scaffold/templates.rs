//! Embedded templates for generated annotations and method bodies
//!
//! Templates are rendered with HTML escaping disabled. The literal
//! `security={{"api_key": {}}}` clashes with mustache delimiters, so it is
//! passed in as the `security` variable.

use crate::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// Model schema block, inserted above the class declaration
pub const MODEL_SCHEMA: &str = r#"/**
 * @OA\Schema(
 *     schema="{{entity_model}}",
 *     type="object",
 *     required={"id"},
{{properties}}
 * )
 */"#;

/// One property of the model schema block
pub const MODEL_PROPERTY: &str = r#" *     @OA\Property(
 *       property="{{name}}",
 *       description="{{name}}",
 *       type="{{type}}",
 *       format="{{format}}",
 *       example="{{example}}"
 *     ),"#;

/// One property of a controller request body
pub const REQUEST_PROPERTY: &str = r#"
     *            @OA\Property(
     *              property="{{name}}",
     *              description="{{name}}",
     *              type="{{type}}",
     *              format="{{format}}",
     *              example="{{example}}",
     *            ),"#;

/// `index` documentation with its stub
pub const INDEX_DOC: &str = r##"    /**
     * @OA\Get(
     *   path="/{{route}}",
     *   tags={"{{entity}}"},
     *   summary="get all {{class_name}}",
     *   description="list of all {{class_name}}",
     *   operationId="getAll{{class_name}}",
     *   deprecated=false,
     *   @OA\Parameter(
     *     name="page",
     *     in="query",
     *     required=false,
     *     example=1,
     *     @OA\Schema(
     *     type="string"
     *      )
     *   ),
     *   @OA\Response(
     *     response=200,
     *     description="Success",
     *     @OA\JsonContent(ref="#/components/schemas/{{entity_model}}"),
     *   ),
     *   @OA\Response(
     *     response=400,
     *     description="an unexpected error",
     *     @OA\JsonContent(ref="#/components/schemas/{{error_model}}"),
     *   ),security={{security}}
     * )
     *
     * Display a listing of the resource.
     *
     * @return JsonResponse
     */
    public function index(): JsonResponse
    {
        {{stub_marker}}
    }"##;

/// `store` documentation with its stub
pub const STORE_DOC: &str = r##"    /**
     * @OA\Post(
     *   path="/{{route}}",
     *   tags={"{{entity}}"},
     *   summary="create {{entity}}",
     *   description="create {{entity}}",
     *   operationId="Create{{entity}}",
     *   deprecated=false,
     *   @OA\Response(
     *     response="200",
     *     description="Success",
     *     @OA\JsonContent(ref="#/components/schemas/{{entity_model}}"),
     *   ),
     *   @OA\Response(
     *     response=400,
     *     description="an unexpected error",
     *     @OA\JsonContent(ref="#/components/schemas/{{error_model}}"),
     *   ),
     *   @OA\RequestBody(
     *         description="tasks input",
     *         required=true,
     *         @OA\JsonContent({{properties}}
     *      )
     *   ),security={{security}}
     * )
     *
     * Store a newly created resource in storage.
     *
     * @param Request $request
     * @return JsonResponse
     * @throws ValidationException
     */
    public function store(Request $request): JsonResponse
    {
        {{stub_marker}}
    }"##;

/// `show` documentation with its stub
pub const SHOW_DOC: &str = r##"    /**
     * @OA\Get(
     *   path="/{{route}}/{id}",
     *   tags={"{{entity}}"},
     *   summary="get one {{entity}}",
     *   description="one {{entity}}",
     *   operationId="getOne{{entity}}",
     *   deprecated=false,
     *   @OA\Parameter(
     *     name="id",
     *     in="path",
     *     required=true,
     *     @OA\Schema(
     *     type="string"
     *      )
     *   ),
     *   @OA\Response(
     *     response="200",
     *     description="success",
     *     @OA\JsonContent(ref="#/components/schemas/{{entity_model}}"),
     *   ),
     *   @OA\Response(
     *     response=400,
     *     description="an unexpected error",
     *     @OA\JsonContent(ref="#/components/schemas/{{error_model}}"),
     *   ),security={{security}}
     * )
     *
     * Display the specified resource.
     *
     * @param int $id
     * @return JsonResponse
     */
    public function show(int $id): JsonResponse
    {
        {{stub_marker}}
    }"##;

/// `update` documentation with its stub
pub const UPDATE_DOC: &str = r##"    /**
     * @OA\Put(
     *   path="/{{route}}/{id}",
     *   tags={"{{entity}}"},
     *   summary="update {{entity}}",
     *   description="update {{entity}}",
     *   operationId="Update{{entity}}",
     *   deprecated=false,
     *   @OA\Response(
     *     response="200",
     *     description="Success",
     *     @OA\JsonContent(ref="#/components/schemas/{{entity_model}}"),
     *   ),
     *   @OA\Response(
     *     response=400,
     *     description="an unexpected error",
     *     @OA\JsonContent(ref="#/components/schemas/{{error_model}}"),
     *   ),
     *   @OA\Parameter(
     *     name="id",
     *     in="path",
     *     required=true,
     *     @OA\Schema(
     *     type="string"
     *      )
     *   ),
     *   @OA\RequestBody(
     *         description="tasks input",
     *         required=true,
     *         @OA\JsonContent({{properties}}
     *      )
     *   ),security={{security}}
     * )
     *
     * Update the specified resource in storage.
     *
     * @param Request $request
     * @param int     $id
     * @return JsonResponse
     * @throws ValidationException
     */
    public function update(Request $request, int $id): JsonResponse
    {
        {{stub_marker}}
    }"##;

/// `destroy` documentation with its stub
pub const DESTROY_DOC: &str = r##"    /**
     * @OA\Delete(
     *   path="/{{route}}/{id}",
     *   tags={"{{entity}}"},
     *   summary="delete {{entity}}",
     *   description="delete {{entity}}",
     *   operationId="delete{{entity}}",
     *   deprecated=false,
     *   @OA\Parameter(
     *     name="id",
     *     in="path",
     *     required=true,
     *     @OA\Schema(
     *     type="string"
     *      )
     *   ),
     *   @OA\Response(
     *     response="200",
     *     description="Success Message",
     *     @OA\JsonContent(ref="#/components/schemas/{{success_model}}"),
     *   ),
     *   @OA\Response(
     *     response=400,
     *     description="an unexpected error",
     *     @OA\JsonContent(ref="#/components/schemas/{{error_model}}"),
     *   ),security={{security}}
     * )
     *
     * Remove the specified resource from storage.
     *
     * @param int $id
     * @return JsonResponse
     */
    public function destroy(int $id): JsonResponse
    {
        {{stub_marker}}
    }"##;

/// `index` implementation
pub const INDEX_CODE: &str = r"public function index(): JsonResponse
    {
        return $this->success((new {{entity}}())->latest()->paginate(20));
    }";

/// `store` implementation
pub const STORE_CODE: &str = r"public function store(Request $request): JsonResponse
    {
        $request->validate({{rules}});
        try {
            return $this->success((new {{entity}}())->create($request->all()));
        } catch (Exception $e) {
            Log::error($e->getMessage());
            return $this->error('create error');
        }
    }";

/// `show` implementation
pub const SHOW_CODE: &str = r"public function show(int $id): JsonResponse
    {
        try {
            $result = (new {{entity}}())->findOrFail($id);
            return $this->success($result);
        } catch (Exception $e) {
            Log::error($e->getMessage());
            return $this->error('nothing to show');
        }
    }";

/// `update` implementation
pub const UPDATE_CODE: &str = r"public function update(Request $request, int $id): JsonResponse
    {
        $request->validate({{rules}});
        try {
            $result = (new {{entity}}())->findOrFail($id);
            $result->update($request->all());
            return $this->success($result);
        } catch (Exception $e) {
            Log::error($e->getMessage());
            return $this->error('update error');
        }
    }";

/// `destroy` implementation
pub const DESTROY_CODE: &str = r#"public function destroy(int $id): JsonResponse
    {
        try {
            $result = (new {{entity}}())->findOrFail($id);
            $result->delete();
            $id = $result->id;
            return $this->success("{{entity_snake}} $id deleted");
        } catch (Exception $e) {
            Log::error($e->getMessage());
            return $this->error('delete error');
        }
    }"#;

/// Named templates known to the registry
const TEMPLATES: &[(&str, &str)] = &[
    ("model_schema", MODEL_SCHEMA),
    ("model_property", MODEL_PROPERTY),
    ("request_property", REQUEST_PROPERTY),
    ("index_doc", INDEX_DOC),
    ("store_doc", STORE_DOC),
    ("show_doc", SHOW_DOC),
    ("update_doc", UPDATE_DOC),
    ("destroy_doc", DESTROY_DOC),
    ("index_code", INDEX_CODE),
    ("store_code", STORE_CODE),
    ("show_code", SHOW_CODE),
    ("update_code", UPDATE_CODE),
    ("destroy_code", DESTROY_CODE),
];

/// Compiled template set
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
}

impl TemplateRegistry {
    /// Compile every embedded template
    ///
    /// # Errors
    ///
    /// Returns [`MkApiError::Template`](crate::MkApiError::Template) if a
    /// template fails to compile
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Generated text is PHP, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, source) in TEMPLATES {
            handlebars.register_template_string(name, *source)?;
        }

        Ok(Self { handlebars })
    }

    /// Render a registered template
    ///
    /// # Errors
    ///
    /// Returns [`MkApiError::Template`](crate::MkApiError::Template) if the
    /// template is unknown or rendering fails
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        Ok(self.handlebars.render(name, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_templates_compile() {
        let registry = TemplateRegistry::new().unwrap();
        for (name, _) in TEMPLATES {
            assert!(registry.handlebars.has_template(name), "{name}");
        }
    }

    #[test]
    fn test_security_literal_survives() {
        let registry = TemplateRegistry::new().unwrap();
        let rendered = registry
            .render(
                "index_doc",
                &json!({
                    "route": "post",
                    "entity": "Post",
                    "class_name": "Posts",
                    "entity_model": "PostModel",
                    "error_model": "ErrorModel",
                    "security": r#"{{"api_key": {}}}"#,
                    "stub_marker": "// Your code here",
                }),
            )
            .unwrap();

        assert!(rendered.contains(r#"),security={{"api_key": {}}}"#));
        assert!(rendered.contains(r#"tags={"Post"},"#));
        assert!(rendered.contains(r##"ref="#/components/schemas/PostModel""##));
        assert!(rendered.ends_with("        // Your code here\n    }"));
    }

    #[test]
    fn test_no_html_escaping() {
        let registry = TemplateRegistry::new().unwrap();
        let rendered = registry
            .render(
                "store_code",
                &json!({ "entity": "Post", "rules": "['title' => 'string|max:120']" }),
            )
            .unwrap();

        assert!(rendered.contains("$request->validate(['title' => 'string|max:120']);"));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let registry = TemplateRegistry::new().unwrap();
        assert!(registry.render("missing", &json!({})).is_err());
    }
}
