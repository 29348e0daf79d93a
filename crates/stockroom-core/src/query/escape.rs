//! # Literal Escaping
//!
//! The single injection defence for interpolated filter literals. Every
//! literal the operator mapper emits, numeric ones included, passes through
//! a [`LiteralEscaper`] first.

/// String-escaping primitive supplied by the database side.
pub trait LiteralEscaper {
    /// Returns `raw` made safe for placement between single quotes.
    fn escape(&self, raw: &str) -> String;
}

/// Escaper for SQLite string literals.
///
/// SQLite has no backslash escapes: a quote is escaped by doubling it.
/// NUL bytes terminate C strings inside the driver and are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEscaper;

impl LiteralEscaper for SqliteEscaper {
    fn escape(&self, raw: &str) -> String {
        let mut escaped = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '\'' => escaped.push_str("''"),
                '\0' => {}
                other => escaped.push(other),
            }
        }
        escaped
    }
}

impl<T: LiteralEscaper + ?Sized> LiteralEscaper for &T {
    fn escape(&self, raw: &str) -> String {
        (**self).escape(raw)
    }
}

/// Returns true if `name` can be interpolated as a bare column identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
