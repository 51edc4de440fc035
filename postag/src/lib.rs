pub mod corpus;
pub mod error;
pub mod features;
pub mod frequency;
pub mod model;
pub mod pipeline;
pub mod tagger;
pub mod tokenizer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn get_version() -> &'static str {
    VERSION
}
