//! String helpers for column references and SQL fragments.

/// Qualifies a column with a table alias. An empty alias leaves the column
/// unqualified, which is how DML statements reference their target table.
pub fn qualify(alias: &str, column: &str) -> String {
    if alias.is_empty() {
        column.to_string()
    } else {
        format!("{}.{}", alias, column)
    }
}

pub fn qualify_all(alias: &str, columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| qualify(alias, c)).collect()
}

/// Joins column references with the separator used throughout SQL rendering.
pub fn join_columns(columns: &[String]) -> String {
    columns.join(", ")
}

/// Splits a rendered column list on the rendering separator. Inverse of
/// [`join_columns`] for texts produced by this crate.
pub fn split_columns(text: &str) -> Vec<String> {
    text.split(", ").map(|s| s.to_string()).collect()
}

/// Removes one layer of surrounding parentheses, if present.
pub fn strip_outer_parens(text: &str) -> &str {
    let mut out = text;
    if let Some(rest) = out.strip_prefix('(') {
        out = rest;
    }
    if let Some(rest) = out.strip_suffix(')') {
        out = rest;
    }
    out
}

/// Strips the leading `where ` keyword from a rendered where-clause
/// fragment, leaving the bare restriction.
pub fn strip_where_prefix(text: &str) -> &str {
    let trimmed = text.trim_start();
    if trimmed.len() >= 6 && trimmed[..6].eq_ignore_ascii_case("where ") {
        &trimmed[6..]
    } else {
        trimmed
    }
}

/// Returns the last segment of a dotted path.
pub fn unqualify(path: &str) -> &str {
    match path.rfind('.') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}
