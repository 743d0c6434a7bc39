//! TrustBot Core - Schema-Driven Trust Draft Generator
//!
//! # Guarantees
//! 1. Schema and templates agree at startup, or nothing starts
//! 2. Unknown document types fail, never fall back
//! 3. Every interpolated value is escaped
//! 4. Fingerprints are deterministic (provenance, not security)
//! 5. Identifiers carry the local calendar date of the configured zone

pub mod answers;
pub mod config;
pub mod fields;
pub mod hashing;
pub mod identifier;
pub mod markup;
pub mod pipeline;
pub mod print;
pub mod render;
pub mod schema;
pub mod session;
pub mod store;
pub mod validation;

pub use answers::AnswerSet;
pub use config::GeneratorConfig;
pub use fields::{render_fields, RenderedField};
pub use hashing::{fingerprint, sha256_hex};
pub use identifier::current_identifier;
pub use pipeline::{GenerateRequest, GeneratedDocument, GenerationPipeline, PipelineError};
pub use print::{wrap_for_print, PrintStyle, RenderingSurface};
pub use render::{DocumentMetadata, RenderedDocument, TemplateEngine};
pub use schema::{DocumentTypeSpec, FieldKind, FieldSpec, SchemaRegistry, TemplateSelector};
pub use session::DraftSession;
pub use store::{KeyValueStore, UserProfile};
pub use validation::{FailureMode, ValidationResult, ValidationViolation, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
