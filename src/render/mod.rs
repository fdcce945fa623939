//! HTML produced for or fetched from the repository.

pub mod html;
pub mod markdown;

pub use html::resolve_html_paths;
pub use markdown::render_markdown;
