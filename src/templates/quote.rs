//! Literal encoders for values embedded in generated code and markup.
//!
//! Names are arbitrary single-line strings, so every place a name lands inside a quoted
//! context of a generated file goes through one of these instead of raw substitution.

/// Double-quoted string literal valid in Python 3 (JSON string syntax is a subset).
pub fn python_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Single-line YAML scalar that reads back as exactly `s`.
pub fn yaml_scalar(s: &str) -> String {
    match serde_yaml::to_string(s) {
        Ok(out) if !out.trim_end_matches('\n').contains('\n') => {
            out.trim_end_matches('\n').to_string()
        }
        // Folded or failed output: a JSON string is also a YAML double-quoted scalar.
        _ => python_str(s),
    }
}

/// Snakemake formats rule strings with `str.format`; braces must be doubled to stay literal.
pub fn snakemake_braces(s: &str) -> String {
    s.replace('{', "{{").replace('}', "}}")
}

/// POSIX shell word; unquoted when it contains only safe characters.
pub fn shell_word(s: &str) -> String {
    let safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | '+'));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
