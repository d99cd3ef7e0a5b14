mod block;
mod docx;
mod inline;
mod parser;

pub mod anythingllm;
pub mod config;
pub mod server;
pub mod upload;

pub use block::{Block, Span};
pub use config::Config;
pub use docx::DOCX_MIME;

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to the bytes of a .docx document.
pub fn markdown_to_docx(markdown: &str) -> anyhow::Result<Vec<u8>> {
    docx::render(&parse(markdown))
}
