// * The Refinery: turns raw provider output into clean, budgeted text fields
// * Markup stripping, truncation and strict/heuristic response parsing

pub mod markup;
pub mod response_parser;

// * Re-exports for convenient access
pub use markup::{clean_field, clean_list, grapheme_len, strip_markup, truncate_with_ellipsis};
pub use response_parser::{
    extract_bullets, extract_json_object, extract_labeled_field, list_field, prose_paragraphs,
    str_field, u32_field,
};
