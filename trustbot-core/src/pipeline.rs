//! Generation Pipeline - Single Entry Point
//!
//! CRITICAL: generate MUST validate, fingerprint and stamp before rendering.
//! Any failure yields an error and no document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::answers::AnswerSet;
use crate::config::{ConfigError, GeneratorConfig};
use crate::fields::{render_fields, RenderedField};
use crate::hashing::fingerprint;
use crate::identifier::{current_identifier, IdentifierError};
use crate::render::{DocumentMetadata, RenderError, RenderedDocument, TemplateEngine};
use crate::schema::{DocumentTypeSpec, SchemaError, SchemaRegistry};
use crate::validation::{FailureMode, ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Fingerprint unavailable: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub type_id: String,
    #[serde(default)]
    pub answers: AnswerSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub id: String,
    pub type_id: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub metadata: DocumentMetadata,
    pub validation: ValidationResult,
    pub html: RenderedDocument,
}

/// The generation pipeline - one instance per process
pub struct GenerationPipeline {
    config: Arc<GeneratorConfig>,
    registry: Arc<SchemaRegistry>,
    engine: TemplateEngine,
    validator: Validator,
}

impl GenerationPipeline {
    /// Fails on an invalid config or a schema/template mismatch.
    pub fn new(config: GeneratorConfig, registry: SchemaRegistry) -> Result<Self, PipelineError> {
        config.validate()?;
        let config = Arc::new(config);
        let registry = Arc::new(registry);
        let engine = TemplateEngine::new(Arc::clone(&registry), Arc::clone(&config))?;

        debug!(
            types = registry.list_document_types().len(),
            schema_version = %registry.version(),
            "generation pipeline ready"
        );

        Ok(Self {
            config,
            registry,
            engine,
            validator: Validator::default(),
        })
    }

    pub fn builtin(config: GeneratorConfig) -> Result<Self, PipelineError> {
        let registry = SchemaRegistry::builtin(&config)?;
        Self::new(config, registry)
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.validator = Validator::new(mode);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn list_document_types(&self) -> &[DocumentTypeSpec] {
        self.registry.list_document_types()
    }

    pub fn get_document_type(&self, type_id: &str) -> Result<&DocumentTypeSpec, PipelineError> {
        Ok(self.registry.get(type_id)?)
    }

    /// Fresh controls with defaults for a document type
    pub fn render_fields(&self, type_id: &str) -> Result<Vec<RenderedField>, PipelineError> {
        Ok(render_fields(self.registry.get(type_id)?))
    }

    pub fn current_identifier(&self, now: DateTime<Utc>) -> Result<String, PipelineError> {
        Ok(current_identifier(&self.config.id_prefix, now, &self.config.time_zone)?)
    }

    /// This is the ONLY validation entry point.
    pub fn validate_answers(
        &self,
        type_id: &str,
        answers: &AnswerSet,
    ) -> Result<ValidationResult, PipelineError> {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let spec = self.registry.get(type_id)?;
        Ok(self.validator.validate(answers, spec))
    }

    pub fn generate(&self, request: &GenerateRequest) -> Result<GeneratedDocument, PipelineError> {
        self.generate_at(request, Utc::now())
    }

    pub fn generate_at(
        &self,
        request: &GenerateRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedDocument, PipelineError> {
        // MANDATORY: unknown types stop here, before anything is rendered.
        let validation = self.validate_answers(&request.type_id, &request.answers)?;

        if !validation.valid {
            let messages: Vec<_> = validation
                .violations
                .iter()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            warn!(type_id = %request.type_id, "generation blocked by validation");
            return Err(PipelineError::ValidationFailed(messages.join("; ")));
        }
        if !validation.violations.is_empty() {
            debug!(
                type_id = %request.type_id,
                violations = validation.violations.len(),
                "rendering with validation warnings"
            );
        }

        let fingerprint = fingerprint(&request.type_id, &request.answers)?;

        let metadata = DocumentMetadata {
            identifier: self.current_identifier(now)?,
            owner: self.config.owner.clone(),
            confidentiality: self.config.confidentiality.clone(),
            disclaimer: self.registry.disclaimer().to_string(),
            fingerprint,
        };

        let html = self
            .engine
            .render_at(&request.type_id, &request.answers, &metadata, now)?;

        info!(
            type_id = %request.type_id,
            identifier = %metadata.identifier,
            fingerprint = %metadata.fingerprint,
            "draft generated"
        );

        Ok(GeneratedDocument {
            id: Uuid::new_v4().to_string(),
            type_id: request.type_id.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: now,
            metadata,
            validation,
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pipeline() -> GenerationPipeline {
        GenerationPipeline::builtin(GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn test_identifier_from_config() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 4, 0, 0).unwrap();
        assert_eq!(
            pipeline().current_identifier(now).unwrap(),
            "DRR-TRUSTBOT-ALPHA-CEC1-SENTINEL-FCPS1.0-2024-03-04"
        );
    }

    #[test]
    fn test_metadata_from_config() {
        let request = GenerateRequest {
            type_id: "revocable".to_string(),
            answers: AnswerSet::new().with("grantorName", "John Roe"),
        };
        let doc = pipeline().generate(&request).unwrap();
        assert_eq!(doc.engine_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(doc.metadata.owner, "Devon R. Robinson Private Trust");
        assert_eq!(doc.metadata.fingerprint.len(), 64);
        assert!(doc.html.as_str().contains(&doc.metadata.fingerprint));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            time_zone: "Invalid/Zone".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            GenerationPipeline::builtin(config),
            Err(PipelineError::Config(_))
        ));
    }
}
