//! Schema Registry - Declarative Document Types
//!
//! Static, ordered, read-only after construction. Adding a document type
//! means adding a `DocumentTypeSpec` here and a template for its selector.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::GeneratorConfig;

pub type DocumentTypeId = String;

pub const SCHEMA_VERSION: &str = "0.2.0";
pub const SUPPORTED_SCHEMA: &str = "^0.2";

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Document type not found: {0}")]
    TypeNotFound(String),

    #[error("Duplicate document type: {0}")]
    DuplicateType(String),

    #[error("Duplicate field '{field}' in document type '{type_id}'")]
    DuplicateField { type_id: String, field: String },

    #[error("Invalid field id '{field}' in document type '{type_id}'")]
    InvalidFieldId { type_id: String, field: String },

    #[error("Schema version {0} is not supported (expected {1})")]
    UnsupportedVersion(String, String),

    #[error("Failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid schema: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Input control kind. One rendering rule per variant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FieldKind {
    #[default]
    #[serde(rename = "text")]
    ShortText,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "textarea")]
    MultilineText,
}

/// Which template branch renders a document type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSelector {
    Revocable,
    CommonLaw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    /// Label used inside the generated document. Falls back to `label`.
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FieldSpec {
    pub fn new(id: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            default: None,
            caption: None,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_string());
        self
    }

    pub fn caption(&self) -> &str {
        self.caption.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeSpec {
    pub id: DocumentTypeId,
    pub label: String,
    #[serde(rename = "template")]
    pub selector: TemplateSelector,
    pub fields: Vec<FieldSpec>,
}

impl DocumentTypeSpec {
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub version: semver::Version,
    #[serde(default = "default_jurisdiction_mode")]
    pub default_jurisdiction_mode: String,
    pub disclaimer: String,
    pub document_types: Vec<DocumentTypeSpec>,
}

fn default_jurisdiction_mode() -> String {
    "common-law".to_string()
}

impl SchemaDocument {
    /// The two trust types shipped with the generator.
    pub fn builtin(config: &GeneratorConfig) -> Self {
        use FieldKind::{Date, MultilineText, ShortText};

        let revocable = DocumentTypeSpec {
            id: "revocable".to_string(),
            label: "Revocable Living Trust".to_string(),
            selector: TemplateSelector::Revocable,
            fields: vec![
                FieldSpec::new("grantorName", "Grantor Full Name", ShortText)
                    .required()
                    .with_caption("Grantor"),
                FieldSpec::new("trusteeName", "Trustee Full Name", ShortText)
                    .required()
                    .with_caption("Trustee"),
                FieldSpec::new("beneficiaryName", "Primary Beneficiary", ShortText).required(),
                FieldSpec::new("establishedDate", "Date Established", Date).required(),
                FieldSpec::new("governingLaw", "Governing Law", ShortText)
                    .with_default("Common Law"),
                FieldSpec::new("successorTrustee", "Successor Trustee", ShortText),
                FieldSpec::new("successorBeneficiary", "Successor Beneficiary", ShortText),
            ],
        };

        let common_law = DocumentTypeSpec {
            id: "private_common_law".to_string(),
            label: "Private Trust (Common Law)".to_string(),
            selector: TemplateSelector::CommonLaw,
            fields: vec![
                FieldSpec::new("settlor", "Settlor", ShortText).required(),
                FieldSpec::new("trustee", "Trustee", ShortText).required(),
                FieldSpec::new("beneficiaries", "Beneficiaries (comma-separated)", ShortText)
                    .required()
                    .with_caption("Beneficiaries"),
                FieldSpec::new("trustName", "Trust Name", ShortText).required(),
                FieldSpec::new("date", "Effective Date", Date).required(),
                FieldSpec::new("mailingAddress", "Mailing Address", ShortText)
                    .with_default(config.default_mailing_address.clone()),
                FieldSpec::new("jurisdiction", "Jurisdiction Statement", MultilineText)
                    .with_default(config.default_jurisdiction_text.clone()),
            ],
        };

        Self {
            version: semver::Version::new(0, 2, 0),
            default_jurisdiction_mode: default_jurisdiction_mode(),
            disclaimer: config.disclaimer.clone(),
            document_types: vec![revocable, common_law],
        }
    }
}

/// Ordered registry of document types
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schema: SchemaDocument,
}

impl SchemaRegistry {
    /// Checks version, unique type ids, unique and well-formed field ids.
    pub fn new(schema: SchemaDocument) -> Result<Self, SchemaError> {
        let supported = semver::VersionReq::parse(SUPPORTED_SCHEMA).map_err(|_| {
            SchemaError::UnsupportedVersion(schema.version.to_string(), SUPPORTED_SCHEMA.into())
        })?;
        if !supported.matches(&schema.version) {
            return Err(SchemaError::UnsupportedVersion(
                schema.version.to_string(),
                SUPPORTED_SCHEMA.to_string(),
            ));
        }

        for (i, doc_type) in schema.document_types.iter().enumerate() {
            if schema.document_types[..i].iter().any(|t| t.id == doc_type.id) {
                return Err(SchemaError::DuplicateType(doc_type.id.clone()));
            }
            for (j, field) in doc_type.fields.iter().enumerate() {
                if !is_valid_field_id(&field.id) {
                    return Err(SchemaError::InvalidFieldId {
                        type_id: doc_type.id.clone(),
                        field: field.id.clone(),
                    });
                }
                if doc_type.fields[..j].iter().any(|f| f.id == field.id) {
                    return Err(SchemaError::DuplicateField {
                        type_id: doc_type.id.clone(),
                        field: field.id.clone(),
                    });
                }
            }
        }

        Ok(Self { schema })
    }

    pub fn builtin(config: &GeneratorConfig) -> Result<Self, SchemaError> {
        Self::new(SchemaDocument::builtin(config))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        let schema: SchemaDocument = serde_json::from_str(&content)?;
        Self::new(schema)
    }

    pub fn list_document_types(&self) -> &[DocumentTypeSpec] {
        &self.schema.document_types
    }

    pub fn get(&self, type_id: &str) -> Result<&DocumentTypeSpec, SchemaError> {
        self.schema
            .document_types
            .iter()
            .find(|t| t.id == type_id)
            .ok_or_else(|| SchemaError::TypeNotFound(type_id.to_string()))
    }

    pub fn fields_for(&self, type_id: &str) -> Result<&[FieldSpec], SchemaError> {
        self.get(type_id).map(|t| t.fields.as_slice())
    }

    pub fn disclaimer(&self) -> &str {
        &self.schema.disclaimer
    }

    pub fn version(&self) -> &semver::Version {
        &self.schema.version
    }
}

fn is_valid_field_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
