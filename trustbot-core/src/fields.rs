//! Field Renderer - Pure Projection of a Document Type
//!
//! Produces `(field, initial value)` pairs; the surrounding UI turns them
//! into concrete controls. Nothing here mutates the registry.

use serde::Serialize;

use crate::answers::AnswerSet;
use crate::markup::escape_html;
use crate::schema::{DocumentTypeSpec, FieldKind, FieldSpec};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub field: FieldSpec,
    pub initial_value: String,
}

impl RenderedField {
    /// Label plus input control markup for this field.
    pub fn control_html(&self) -> String {
        let f = &self.field;
        let name = escape_html(&f.id);
        let value = escape_html(&self.initial_value);
        let placeholder = escape_html(f.placeholder.as_deref().unwrap_or(""));
        let req = if f.required { " required" } else { "" };

        let input = match f.kind {
            FieldKind::ShortText => format!(
                r#"<input type="text" name="{}" value="{}"{} placeholder="{}" />"#,
                name, value, req, placeholder
            ),
            FieldKind::Date => format!(
                r#"<input type="date" name="{}" value="{}"{} placeholder="{}" />"#,
                name, value, req, placeholder
            ),
            FieldKind::MultilineText => format!(
                r#"<textarea name="{}"{} placeholder="{}">{}</textarea>"#,
                name, req, placeholder, value
            ),
        };

        let marker = if f.required { " *" } else { "" };
        format!("<div><label>{}{}</label>{}</div>", escape_html(&f.label), marker, input)
    }
}

pub fn render_fields(spec: &DocumentTypeSpec) -> Vec<RenderedField> {
    spec.fields
        .iter()
        .map(|f| RenderedField {
            field: f.clone(),
            initial_value: f.default.clone().unwrap_or_default(),
        })
        .collect()
}

/// Answer set seeded with every field's initial value, in field order.
pub fn initial_answers(fields: &[RenderedField]) -> AnswerSet {
    fields
        .iter()
        .map(|r| (r.field.id.clone(), r.initial_value.clone()))
        .collect()
}
