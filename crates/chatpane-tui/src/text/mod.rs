//! Text rendering utilities.
//!
//! - [`render_markdown`] - markdown to styled lines
//! - [`MarkdownStyles`] - styles for markdown elements
//! - [`wrap_text`], [`wrap_lines`] - wrapping
//! - [`truncate_to_width`] - single-line truncation

mod markdown;
mod styles;
mod width;
mod wrap;

pub use markdown::render_markdown;
pub use styles::MarkdownStyles;
pub use width::{truncate_to_width, visual_width};
pub use wrap::{wrap_lines, wrap_text};
