//! Specializes the generic create/update tool operations per service.

use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::layout::GeneratedLayout;
use crate::schema::SynthesizedSchema;

const JSON_MEDIA_TYPE: &str = "application/json";
const MERGE_PATCH_MEDIA_TYPE: &str = "application/merge-patch+json";

/// Rewrites an API description so every service gets its own create and
/// update operation, and the generic ones disappear.
#[derive(Debug)]
pub struct ApiDescriptionMutator {
    document: Value,
    create_template: Value,
    update_template: Value,
    layout: GeneratedLayout,
    services: usize,
}

impl ApiDescriptionMutator {
    /// Capture the generic templates; fails if either is missing
    pub fn new(document: Value, layout: &GeneratedLayout) -> Result<Self> {
        let create_template = operation(&document, &layout.tools_path, "post")?.clone();
        let update_template = operation(&document, &layout.tools_by_id_path(), "patch")?.clone();

        Ok(Self {
            document,
            create_template,
            update_template,
            layout: layout.clone(),
            services: 0,
        })
    }

    /// Register the create and update operations of one service
    pub fn add_service(&mut self, schema: &SynthesizedSchema) -> Result<()> {
        let create = self.create_operation(schema)?;
        let update = self.update_operation(schema)?;

        let paths = paths_mut(&mut self.document)?;
        paths.insert(
            self.layout.service_path(&schema.service_id),
            json!({ "post": create }),
        );
        paths.insert(
            self.layout.service_by_id_path(&schema.service_id),
            json!({ "patch": update }),
        );
        self.services += 1;
        Ok(())
    }

    /// Drop the generic operations and return the finished document
    pub fn finish(mut self) -> Result<Value> {
        let tools_by_id = self.layout.tools_by_id_path();
        let paths = paths_mut(&mut self.document)?;
        for (path, method) in [(self.layout.tools_path.as_str(), "post"), (tools_by_id.as_str(), "patch")] {
            if let Some(item) = paths.get_mut(path).and_then(Value::as_object_mut) {
                item.remove(method);
            }
        }

        log::debug!("Specialized tool operations for {} services", self.services);
        Ok(self.document)
    }

    fn create_operation(&self, schema: &SynthesizedSchema) -> Result<Value> {
        let display = &schema.display_name;
        let mut op = self.create_template.clone();
        op["summary"] = json!(format!("Create a {display} tool"));
        op["description"] = json!(format!(
            "Provisions a new {display} tool based off the provided parameters in the body and binds it to the specified toolchain"
        ));
        op["operationId"] = json!(format!("create_{}", schema.service_id));

        if schema.has_properties() {
            let media = op
                .pointer_mut("/requestBody/content/application~1json")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    Error::Template(format!(
                        "POST {} has no '{JSON_MEDIA_TYPE}' request body",
                        self.layout.tools_path
                    ))
                })?;
            media.insert("schema".into(), schema.body_schema(true));
        } else {
            remove_request_body(&mut op);
        }
        Ok(op)
    }

    fn update_operation(&self, schema: &SynthesizedSchema) -> Result<Value> {
        let display = &schema.display_name;
        let mut op = self.update_template.clone();
        op["summary"] = json!(format!("Update a {display} tool"));
        op["description"] = json!(format!("Update the {display} tool with the specified ID"));
        op["operationId"] = json!(format!("update_{}", schema.service_id));

        if schema.has_properties() {
            let content = op
                .pointer_mut("/requestBody/content")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    Error::Template(format!(
                        "PATCH {} has no request body content",
                        self.layout.tools_by_id_path()
                    ))
                })?;
            content.remove(MERGE_PATCH_MEDIA_TYPE);
            // Partial updates: no required list on PATCH bodies
            content.insert(
                JSON_MEDIA_TYPE.into(),
                json!({ "schema": schema.body_schema(false) }),
            );
        } else {
            remove_request_body(&mut op);
        }
        Ok(op)
    }
}

fn operation<'a>(document: &'a Value, path: &str, method: &str) -> Result<&'a Value> {
    document
        .get("paths")
        .and_then(|paths| paths.get(path))
        .and_then(|item| item.get(method))
        .filter(|op| op.is_object())
        .ok_or_else(|| {
            Error::Template(format!(
                "generic operation {} {path} is missing",
                method.to_uppercase()
            ))
        })
}

fn paths_mut(document: &mut Value) -> Result<&mut serde_json::Map<String, Value>> {
    document
        .get_mut("paths")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::Template("document has no 'paths' object".into()))
}

fn remove_request_body(op: &mut Value) {
    if let Some(map) = op.as_object_mut() {
        map.remove("requestBody");
    }
}
