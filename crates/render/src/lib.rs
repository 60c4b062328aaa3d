//! Renders generated specification text into a styled `.docx` document.

pub mod docx;
pub mod error;
pub mod markdown;

pub use docx::{DocxRenderer, RenderStyle, TextStyle};
pub use error::RenderError;
pub use markdown::{Block, TableBlock, parse_markdown};

use std::path::{Path, PathBuf};

/// Render markdown to `output_path` with the default styling.
pub fn render(markdown_text: &str, output_path: &Path) -> Result<PathBuf, RenderError> {
    DocxRenderer::default().render(markdown_text, output_path)
}
