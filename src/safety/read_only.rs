use std::iter::Peekable;
use std::str::Chars;

use anyhow::{Result, anyhow};

const BLOCKED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "MERGE", "ALTER", "DROP", "CREATE", "TRUNCATE", "GRANT",
    "REVOKE", "BACKUP", "RESTORE",
];

/// Every statement sent to a server must be a plain SELECT (or CTE).
/// Bracket-quoted identifiers and string literals are skipped when scanning
/// for write keywords, so a column named `[Update]` does not trip the guard.
pub fn validate_read_only(sql: &str) -> Result<()> {
    let tokens = bare_tokens(strip_leading_comments(sql));
    let first = tokens.first().ok_or_else(|| anyhow!("Empty SQL input"))?;

    if !first.eq_ignore_ascii_case("SELECT") && !first.eq_ignore_ascii_case("WITH") {
        return Err(anyhow!("Only read-only queries (SELECT/CTE) are permitted"));
    }
    if let Some(keyword) = tokens.iter().find(|token| is_blocked(token)) {
        return Err(anyhow!("Blocked keyword detected: {}", keyword.to_uppercase()));
    }
    Ok(())
}

fn strip_leading_comments(input: &str) -> &str {
    let mut remaining = input;
    loop {
        let trimmed = remaining.trim_start();
        if let Some(rest) = trimmed.strip_prefix("--") {
            match rest.find('\n') {
                Some(pos) => remaining = &rest[pos + 1..],
                None => return "",
            }
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            match rest.find("*/") {
                Some(pos) => remaining = &rest[pos + 2..],
                None => return "",
            }
        } else {
            return trimmed;
        }
    }
}

/// Word tokens found outside bracket-quoted identifiers and string
/// literals, in order of appearance.
fn bare_tokens(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_alphanumeric() || c == '_' => current.push(c),
            '[' => {
                flush(&mut tokens, &mut current);
                skip_quoted(&mut chars, ']');
            }
            '\'' => {
                flush(&mut tokens, &mut current);
                skip_quoted(&mut chars, '\'');
            }
            _ => flush(&mut tokens, &mut current),
        }
    }
    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Consume up to the closing delimiter; a doubled delimiter is an escape.
fn skip_quoted(chars: &mut Peekable<Chars<'_>>, closer: char) {
    while let Some(ch) = chars.next() {
        if ch == closer {
            if chars.peek() == Some(&closer) {
                chars.next();
            } else {
                return;
            }
        }
    }
}

fn is_blocked(token: &str) -> bool {
    BLOCKED_KEYWORDS
        .iter()
        .any(|keyword| token.eq_ignore_ascii_case(keyword))
}
