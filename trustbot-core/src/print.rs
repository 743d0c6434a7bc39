//! Print Authority System
//!
//! Wraps a rendered fragment into a printable page and hands it to a surface.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::markup::escape_html;
use crate::render::{DocumentMetadata, RenderedDocument};

/// PrintAuthority determines where print styling comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintAuthority {
    /// System defaults (fallback)
    #[default]
    System,
    /// User-provided overrides (with validation)
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    fn css(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "letter",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintStyle {
    pub authority: PrintAuthority,
    pub page_size: PageSize,
    pub margin_mm: u32,
    pub body_font: String,
}

impl Default for PrintStyle {
    fn default() -> Self {
        Self {
            authority: PrintAuthority::System,
            page_size: PageSize::A4,
            margin_mm: 20,
            body_font: "Georgia, serif".to_string(),
        }
    }
}

impl PrintStyle {
    /// Create from user with validation
    pub fn from_user(page_size: PageSize, margin_mm: u32) -> Result<Self, &'static str> {
        if margin_mm > 50 {
            return Err("Margin must be between 0 and 50 mm");
        }
        Ok(Self {
            authority: PrintAuthority::User,
            page_size,
            margin_mm,
            ..Self::default()
        })
    }
}

/// Full printable page: print CSS, provenance meta tags, auto-print on load.
pub fn wrap_for_print(
    fragment: &RenderedDocument,
    meta: &DocumentMetadata,
    style: &PrintStyle,
    generated_at: DateTime<Utc>,
) -> String {
    let timestamp = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>Trust Draft — {timestamp}</title>
  <meta name="trustbot-identifier" content="{identifier}">
  <meta name="owner" content="{owner}">
  <meta name="confidentiality" content="{confidentiality}">
  <style>
    body {{ font-family: {font}; color:#000; }}
    h1,h2,h3 {{ text-align:center; letter-spacing:.03em; }}
    .stamp {{ font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size:.9rem; color:#444; }}
    @page {{ size: {size}; margin: {margin}mm; }}
  </style>
</head>
<body>
{body}
<script>window.onload = () => {{ window.print(); }}</script>
</body>
</html>
"#,
        timestamp = timestamp,
        identifier = escape_html(&meta.identifier),
        owner = escape_html(&meta.owner),
        confidentiality = escape_html(&meta.confidentiality),
        font = escape_html(&style.body_font),
        size = style.page_size.css(),
        margin = style.margin_mm,
        body = fragment.as_str(),
    )
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to write printable page: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives the printable page and triggers the platform print/export.
pub trait RenderingSurface {
    fn present(&mut self, page: &str) -> Result<(), SurfaceError>;
}

/// Writes the page to disk; opening it in a browser prints it.
pub struct FileSurface {
    path: PathBuf,
}

impl FileSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RenderingSurface for FileSurface {
    fn present(&mut self, page: &str) -> Result<(), SurfaceError> {
        fs::write(&self.path, page)?;
        tracing::info!(path = %self.path.display(), "printable page written");
        Ok(())
    }
}
