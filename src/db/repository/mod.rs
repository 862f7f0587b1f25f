//! Database repositories
//!
//! Repository pattern for database access, separating data access logic
//! from business logic.

pub mod items;
pub mod meta;
pub mod series;

pub use items::ItemTable;

/// Rows per multi-row INSERT statement
pub const INSERT_BATCH_SIZE: usize = 500;

/// Build a LIKE pattern matching `term` as a literal substring
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
