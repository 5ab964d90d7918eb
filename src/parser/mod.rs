pub mod clean;
pub mod index;
pub mod scope;
pub mod transcript;
pub mod types;

pub use clean::derive_id;
pub use index::parse_index;
pub use transcript::{article_selector, extract, find_article};
pub use types::DialogueLine;
