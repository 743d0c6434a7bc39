//! Template Engine - Header, Body, Stamp
//!
//! One template per `TemplateSelector`. The engine refuses to start when a
//! registered document type has no template, and refuses to render an
//! unknown type id rather than falling back to a default.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::answers::AnswerSet;
use crate::config::GeneratorConfig;
use crate::markup::{escape_html, escape_multiline};
use crate::schema::{DocumentTypeSpec, FieldKind, FieldSpec, SchemaRegistry, TemplateSelector};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Document type not found: {0}")]
    TypeNotFound(String),

    #[error("No template registered for '{type_id}' (selector {selector:?})")]
    TemplateMissing {
        type_id: String,
        selector: TemplateSelector,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub identifier: String,
    pub owner: String,
    pub confidentiality: String,
    pub disclaimer: String,
    /// Hex SHA-256 of the answers. Provenance only.
    pub fingerprint: String,
}

/// Fixed boilerplate article emitted after the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub heading: String,
    pub text: String,
}

pub trait DocumentTemplate: Send + Sync {
    fn selector(&self) -> TemplateSelector;

    fn title(&self) -> &str;

    fn clause(&self, config: &GeneratorConfig) -> Clause;

    fn header(&self, meta: &DocumentMetadata) -> String {
        format!(
            r#"<header style="font-family: ui-monospace, SFMono-Regular, Menlo, monospace; color:#333;">
  <div>Identifier: <strong>{}</strong></div>
  <div>Owner: {}</div>
  <div>{}</div>
</header>
"#,
            escape_html(&meta.identifier),
            escape_html(&meta.owner),
            escape_html(&meta.confidentiality),
        )
    }

    /// One line per field. Optional fields without a value produce no line;
    /// required fields always do, empty if unanswered.
    fn body(&self, spec: &DocumentTypeSpec, answers: &AnswerSet) -> String {
        let mut out = String::from(
            "<div style=\"border:1px solid #222; padding:1rem; border-radius:8px;\">\n",
        );
        for field in &spec.fields {
            let value = answers.value(&field.id);
            if !field.required && value.trim().is_empty() {
                continue;
            }
            out.push_str(&field_line(field, value));
        }
        out.push_str("</div>\n");
        out
    }

    fn footer(&self, meta: &DocumentMetadata, generated_at: DateTime<Utc>) -> String {
        format!(
            r#"<hr>
<div class="stamp">
  <div>Generated: {}</div>
  <div>Fingerprint (SHA256): {}</div>
  <div>Stamp: {}</div>
</div>
"#,
            generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            escape_html(&meta.fingerprint),
            escape_html(&meta.identifier),
        )
    }

    fn render(
        &self,
        spec: &DocumentTypeSpec,
        answers: &AnswerSet,
        meta: &DocumentMetadata,
        config: &GeneratorConfig,
        generated_at: DateTime<Utc>,
    ) -> String {
        let clause = self.clause(config);
        let mut out = self.header(meta);
        out.push_str(&format!(
            "\n<h2 style=\"text-align:center; text-transform:uppercase; letter-spacing:.08em;\">{}</h2>\n",
            escape_html(self.title())
        ));
        out.push_str(&format!("<p><em>{}</em></p>\n\n", escape_html(&meta.disclaimer)));
        out.push_str(&self.body(spec, answers));
        out.push_str(&format!(
            "\n<h3>{}</h3>\n<p>{}</p>\n\n",
            escape_html(&clause.heading),
            escape_html(&clause.text)
        ));
        out.push_str(&self.footer(meta, generated_at));
        out
    }
}

fn field_line(field: &FieldSpec, value: &str) -> String {
    let rendered = match field.kind {
        FieldKind::ShortText | FieldKind::Date => escape_html(value),
        FieldKind::MultilineText => escape_multiline(value),
    };
    format!(
        "  <p><strong>{}:</strong> {}</p>\n",
        escape_html(field.caption()),
        rendered
    )
}

// --- Concrete Templates ---

pub struct RevocableTemplate;

impl DocumentTemplate for RevocableTemplate {
    fn selector(&self) -> TemplateSelector { TemplateSelector::Revocable }

    fn title(&self) -> &str { "Revocable Living Trust (Draft)" }

    fn clause(&self, _config: &GeneratorConfig) -> Clause {
        Clause {
            heading: "Article I — Declaration".to_string(),
            text: "The Grantor declares the creation of this Trust as a private arrangement \
                   for the benefit of the named Beneficiary(ies)."
                .to_string(),
        }
    }
}

pub struct CommonLawTemplate;

impl DocumentTemplate for CommonLawTemplate {
    fn selector(&self) -> TemplateSelector { TemplateSelector::CommonLaw }

    fn title(&self) -> &str { "Private Trust (Common Law) — Draft" }

    fn clause(&self, config: &GeneratorConfig) -> Clause {
        Clause {
            heading: "Article I — Governance".to_string(),
            text: config.default_jurisdiction_text.clone(),
        }
    }
}

pub fn standard_templates() -> Vec<Box<dyn DocumentTemplate>> {
    vec![Box::new(RevocableTemplate), Box::new(CommonLawTemplate)]
}

/// Rendered markup, held until exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedDocument(pub String);

impl RenderedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub struct TemplateEngine {
    registry: Arc<SchemaRegistry>,
    config: Arc<GeneratorConfig>,
    templates: HashMap<TemplateSelector, Box<dyn DocumentTemplate>>,
}

impl TemplateEngine {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        config: Arc<GeneratorConfig>,
    ) -> Result<Self, RenderError> {
        Self::with_templates(registry, config, standard_templates())
    }

    /// CRITICAL: every document type must resolve to a template here.
    pub fn with_templates(
        registry: Arc<SchemaRegistry>,
        config: Arc<GeneratorConfig>,
        templates: Vec<Box<dyn DocumentTemplate>>,
    ) -> Result<Self, RenderError> {
        let templates: HashMap<_, _> = templates.into_iter().map(|t| (t.selector(), t)).collect();

        for doc_type in registry.list_document_types() {
            if !templates.contains_key(&doc_type.selector) {
                return Err(RenderError::TemplateMissing {
                    type_id: doc_type.id.clone(),
                    selector: doc_type.selector,
                });
            }
        }

        Ok(Self { registry, config, templates })
    }

    pub fn render(
        &self,
        type_id: &str,
        answers: &AnswerSet,
        meta: &DocumentMetadata,
    ) -> Result<RenderedDocument, RenderError> {
        self.render_at(type_id, answers, meta, Utc::now())
    }

    pub fn render_at(
        &self,
        type_id: &str,
        answers: &AnswerSet,
        meta: &DocumentMetadata,
        generated_at: DateTime<Utc>,
    ) -> Result<RenderedDocument, RenderError> {
        let spec = self
            .registry
            .get(type_id)
            .map_err(|_| RenderError::TypeNotFound(type_id.to_string()))?;
        let template = self
            .templates
            .get(&spec.selector)
            .ok_or_else(|| RenderError::TemplateMissing {
                type_id: type_id.to_string(),
                selector: spec.selector,
            })?;

        Ok(RenderedDocument(template.render(
            spec,
            answers,
            meta,
            &self.config,
            generated_at,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn engine() -> TemplateEngine {
        let config = Arc::new(GeneratorConfig::default());
        let registry = Arc::new(SchemaRegistry::builtin(&config).unwrap());
        TemplateEngine::new(registry, config).unwrap()
    }

    fn meta() -> DocumentMetadata {
        DocumentMetadata {
            identifier: "DRR-TEST-2024-03-04".to_string(),
            owner: "Example Owner".to_string(),
            confidentiality: "Confidential".to_string(),
            disclaimer: "Draft only.".to_string(),
            fingerprint: "ab".repeat(32),
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 4, 0, 0).unwrap()
    }

    #[test]
    fn test_header_body_stamp_present() {
        let answers = AnswerSet::new().with("settlor", "A. Settlor");
        let doc = engine().render_at("private_common_law", &answers, &meta(), at()).unwrap();
        let html = doc.as_str();
        assert!(html.contains("Identifier: <strong>DRR-TEST-2024-03-04</strong>"));
        assert!(html.contains("Owner: Example Owner"));
        assert!(html.contains("<div>Confidential</div>"));
        assert!(html.contains("<p><strong>Settlor:</strong> A. Settlor</p>"));
        assert!(html.contains("Generated: 2024-03-05T04:00:00.000Z"));
        assert!(html.contains(&format!("Fingerprint (SHA256): {}", "ab".repeat(32))));
        assert!(html.contains("Stamp: DRR-TEST-2024-03-04"));
    }

    #[test]
    fn test_required_fields_render_empty_lines() {
        let doc = engine()
            .render_at("private_common_law", &AnswerSet::new(), &meta(), at())
            .unwrap();
        assert!(doc.as_str().contains("<p><strong>Trust Name:</strong> </p>"));
        assert!(!doc.as_str().contains("Mailing Address"));
    }

    #[test]
    fn test_governance_clause_uses_configured_text() {
        let doc = engine()
            .render_at("private_common_law", &AnswerSet::new(), &meta(), at())
            .unwrap();
        assert!(doc.as_str().contains("<h3>Article I — Governance</h3>"));
        assert!(doc.as_str().contains("organized and administered under common law"));
    }

    #[test]
    fn test_successor_lines_conditional() {
        let answers = AnswerSet::new()
            .with("grantorName", "John Roe")
            .with("successorTrustee", "")
            .with("successorBeneficiary", "Jane Doe");
        let doc = engine().render_at("revocable", &answers, &meta(), at()).unwrap();
        let html = doc.as_str();
        assert!(html.contains("<p><strong>Successor Beneficiary:</strong> Jane Doe</p>"));
        assert!(!html.contains("Successor Trustee"));
        assert!(html.contains("<h3>Article I — Declaration</h3>"));
    }

    #[test]
    fn test_user_values_escaped() {
        let answers = AnswerSet::new().with("grantorName", "<script>alert(1)</script>");
        let doc = engine().render_at("revocable", &answers, &meta(), at()).unwrap();
        assert!(!doc.as_str().contains("<script>"));
        assert!(doc.as_str().contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_multiline_answer_keeps_breaks() {
        let answers = AnswerSet::new().with("jurisdiction", "Line one\nLine two");
        let doc = engine()
            .render_at("private_common_law", &answers, &meta(), at())
            .unwrap();
        assert!(doc.as_str().contains("Line one<br>\nLine two"));
    }

    #[test]
    fn test_unknown_type_not_found() {
        let err = engine().render("living_will", &AnswerSet::new(), &meta()).unwrap_err();
        assert!(matches!(err, RenderError::TypeNotFound(id) if id == "living_will"));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let config = Arc::new(GeneratorConfig::default());
        let registry = Arc::new(SchemaRegistry::builtin(&config).unwrap());
        let result =
            TemplateEngine::with_templates(registry, config, vec![Box::new(RevocableTemplate)]);
        assert!(matches!(
            result,
            Err(RenderError::TemplateMissing { selector: TemplateSelector::CommonLaw, .. })
        ));
    }
}
