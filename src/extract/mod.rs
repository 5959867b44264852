//! Extraction engine: structured data out of free-text AI responses.
//!
//! Every function here is pure and total: given text that *should* contain
//! a delimited block, an embedded JSON payload, markdown sections, or
//! `@mention` tokens, each returns either the extracted structure or a
//! well-defined fallback. Nothing in this module raises; callers degrade
//! gracefully when an extraction misses.

pub mod blocks;
pub mod json;
pub mod mentions;
pub mod sections;

pub use blocks::{extract_block, BlockSplit, JSON_BLOCK_END, JSON_BLOCK_START};
pub use json::{normalize_json_payload, parse_json_payload};
pub use mentions::resolve_mentions;
pub use sections::{split_sections, split_swot, KeywordGroup, Section, DOMAIN_CARD_GROUPS};
