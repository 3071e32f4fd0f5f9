//! Output formatters for JSON and Markdown.

mod json;
mod markdown;

pub use self::json::*;
pub use markdown::*;
