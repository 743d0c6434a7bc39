//! Draft Session - Selection, Values, Last Draft
//!
//! Export stays unavailable until a generation succeeds. Switching the
//! document type discards entered values and the previous draft.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::answers::AnswerSet;
use crate::fields::{initial_answers, RenderedField};
use crate::pipeline::{GenerateRequest, GeneratedDocument, GenerationPipeline, PipelineError};
use crate::print::{wrap_for_print, PrintStyle, RenderingSurface, SurfaceError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No document type selected")]
    NoTypeSelected,

    #[error("Nothing to export: generate a draft first")]
    ExportUnavailable,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Default)]
pub struct DraftSession {
    type_id: Option<String>,
    fields: Vec<RenderedField>,
    values: AnswerSet,
    draft: Option<GeneratedDocument>,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_type(
        &mut self,
        pipeline: &GenerationPipeline,
        type_id: &str,
    ) -> Result<&[RenderedField], SessionError> {
        let fields = pipeline.render_fields(type_id)?;
        self.values = initial_answers(&fields);
        self.fields = fields;
        self.type_id = Some(type_id.to_string());
        self.draft = None;
        Ok(&self.fields)
    }

    /// Selects `type_id` and overlays `submitted` on the field defaults, so
    /// the answer set keeps field order whatever order the values came in.
    pub fn prefilled(
        pipeline: &GenerationPipeline,
        type_id: &str,
        submitted: &AnswerSet,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new();
        session.select_type(pipeline, type_id)?;
        for (field, value) in submitted.iter() {
            session.set_value(field, value);
        }
        Ok(session)
    }

    pub fn selected_type(&self) -> Option<&str> {
        self.type_id.as_deref()
    }

    pub fn fields(&self) -> &[RenderedField] {
        &self.fields
    }

    pub fn values(&self) -> &AnswerSet {
        &self.values
    }

    pub fn set_value(&mut self, field_id: &str, value: &str) {
        self.values.insert(field_id, value);
    }

    pub fn draft(&self) -> Option<&GeneratedDocument> {
        self.draft.as_ref()
    }

    pub fn can_export(&self) -> bool {
        self.draft.is_some()
    }

    pub fn generate(
        &mut self,
        pipeline: &GenerationPipeline,
    ) -> Result<&GeneratedDocument, SessionError> {
        self.generate_at(pipeline, Utc::now())
    }

    /// A failed attempt clears the previous draft.
    pub fn generate_at(
        &mut self,
        pipeline: &GenerationPipeline,
        now: DateTime<Utc>,
    ) -> Result<&GeneratedDocument, SessionError> {
        self.draft = None;
        let type_id = self.type_id.clone().ok_or(SessionError::NoTypeSelected)?;
        let request = GenerateRequest {
            type_id,
            answers: self.values.clone(),
        };
        let doc = pipeline.generate_at(&request, now)?;
        Ok(self.draft.insert(doc))
    }

    pub fn export(
        &self,
        surface: &mut dyn RenderingSurface,
        style: &PrintStyle,
    ) -> Result<(), SessionError> {
        let draft = self.draft.as_ref().ok_or(SessionError::ExportUnavailable)?;
        let page = wrap_for_print(&draft.html, &draft.metadata, style, draft.created_at);
        surface.present(&page)?;
        Ok(())
    }
}
