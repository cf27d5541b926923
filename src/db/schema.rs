//! Bundled schema changes. Every statement is guarded so re-applying it to an
//! already-migrated database is a no-op (PostgreSQL `IF NOT EXISTS` forms).

use std::path::{Path, PathBuf};

use crate::error::RefriError;

/// One named, idempotent schema-altering statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatement {
    pub name: String,
    pub sql: String,
}

impl MigrationStatement {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// Where a plan's statements come from.
#[derive(Debug, Clone)]
pub enum StatementSource {
    Inline(Vec<MigrationStatement>),
    /// SQL script on disk, split on `;`.
    File(PathBuf),
}

impl StatementSource {
    pub fn load(&self) -> Result<Vec<MigrationStatement>, RefriError> {
        match self {
            StatementSource::Inline(stmts) => Ok(stmts.clone()),
            StatementSource::File(path) => {
                let text = std::fs::read_to_string(path)?;
                Ok(parse_script(&script_name(path), &text))
            }
        }
    }
}

fn script_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("script")
        .to_string()
}

/// Split a multi-statement script into single statements (sqlx executes one
/// statement per query). A `;` ends a statement only outside quoted strings,
/// quoted identifiers, `--` and `/* */` comments, and `$tag$` bodies.
/// Chunks holding only whitespace or comments are skipped. Statements are
/// named `<name>#<n>`, counting from 1.
pub fn parse_script(name: &str, text: &str) -> Vec<MigrationStatement> {
    split_statements(text)
        .into_iter()
        .enumerate()
        .map(|(i, sql)| MigrationStatement::new(format!("{name}#{}", i + 1), sql))
        .collect()
}

fn split_statements(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_sql = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                // A doubled quote closes and reopens, which is the SQL escape.
                i = find_from(bytes, i + 1, &[quote]).map_or(bytes.len(), |p| p + 1);
                has_sql = true;
                continue;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = find_from(bytes, i + 2, b"\n").map_or(bytes.len(), |p| p + 1);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = find_from(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2);
                continue;
            }
            b'$' => {
                if let Some(tag_len) = dollar_tag_len(&bytes[i..]) {
                    let tag = &bytes[i..i + tag_len];
                    i = find_from(bytes, i + tag_len, tag).map_or(bytes.len(), |p| p + tag_len);
                    has_sql = true;
                    continue;
                }
                has_sql = true;
            }
            b';' => {
                if has_sql {
                    statements.push(text[start..i].trim());
                }
                start = i + 1;
                has_sql = false;
            }
            b if !b.is_ascii_whitespace() => has_sql = true,
            _ => {}
        }
        i += 1;
    }

    if has_sql {
        statements.push(text[start..].trim());
    }
    statements
}

/// Length of a dollar-quote opener (`$$` or `$tag$`) at the start of `s`.
fn dollar_tag_len(s: &[u8]) -> Option<usize> {
    let body = s.get(1..)?;
    if body.first().is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let ident = body
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    (body.get(ident) == Some(&b'$')).then_some(ident + 2)
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Default script for the `bookings` plan, relative to the working directory.
pub const BOOKINGS_SCRIPT: &str = "sql/bookings_columns.sql";

/// `users.role` backs the admin gate; existing rows become plain customers.
pub const ADD_USER_ROLE: &str =
    "ALTER TABLE users ADD COLUMN IF NOT EXISTS role VARCHAR(20) NOT NULL DEFAULT 'user'";

pub const INDEX_USER_ROLE: &str = "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)";

pub fn user_roles_statements() -> Vec<MigrationStatement> {
    vec![
        MigrationStatement::new("add_user_role", ADD_USER_ROLE),
        MigrationStatement::new("index_user_role", INDEX_USER_ROLE),
    ]
}
