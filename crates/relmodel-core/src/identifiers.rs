//! SQL identifier quoting.
//!
//! Relationship descriptors come from a validated schema, so their table and
//! column names are trusted. They are still quoted when rendered into SQL so
//! that reserved words and mixed-case names survive.

/// Quote an identifier with ANSI double quotes, doubling embedded quotes.
///
/// ```
/// use relmodel_core::quote_ident;
///
/// assert_eq!(quote_ident("authors"), "\"authors\"");
/// assert_eq!(quote_ident("user\"roles"), "\"user\"\"roles\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote an identifier with MySQL backticks, doubling embedded backticks.
///
/// ```
/// use relmodel_core::quote_ident_mysql;
///
/// assert_eq!(quote_ident_mysql("user_roles"), "`user_roles`");
/// ```
#[inline]
pub fn quote_ident_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
