// src/html/mod.rs
// =============================================================================
// HTML handling for archived pages.
//
// Submodules:
// - rewrite: points links, stylesheets and images at their local copies
// - stylesheets: lists the stylesheets of a page (for the CSS prefetch)
// =============================================================================

mod rewrite;
mod stylesheets;

pub use rewrite::{is_stylesheet_rel, rewrite_page, RewrittenPage};
pub use stylesheets::extract_stylesheet_urls;
