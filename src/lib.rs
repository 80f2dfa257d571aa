mod block;
mod config;
pub mod content;
mod html;
mod inline;
mod parser;
pub mod store;

pub use block::{Block, SourcedBlock, Span};
pub use config::{Config, ConfigError, LinksConfig, ListingConfig, ReadingConfig};
pub use parser::paragraphs;

/// Parse a content body into a vector of blocks.
pub fn parse(document: &str) -> Vec<Block> {
    parser::parse(document)
}

/// Parse a content field that may be unset. `None` yields no blocks.
pub fn parse_field(document: Option<&str>) -> Vec<Block> {
    parser::parse_field(document)
}

/// Parse a content body, keeping the byte range each block came from.
pub fn parse_sourced(document: &str) -> Vec<SourcedBlock> {
    parser::parse_sourced(document)
}

/// Convert blocks to an HTML fragment.
pub fn blocks_to_html(blocks: &[Block], config: &Config) -> String {
    html::blocks_to_html(blocks, config)
}

/// Convert a content body to HTML using the bundled config.
pub fn markdown_to_html(document: &str) -> String {
    markdown_to_html_with_config(document, &Config::compiled_default())
}

/// Convert a content body to HTML with custom config.
pub fn markdown_to_html_with_config(document: &str, config: &Config) -> String {
    let blocks = parse(document);
    html::blocks_to_html(&blocks, config)
}
