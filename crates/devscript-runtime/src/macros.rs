//! Field-macro helpers for record scripts
//!
//! Record scripts name record fields in upper case (`VAL`, `A`, `INPA`) or
//! delimited (`%VAL%`). Hosts use these helpers to find the fields a script
//! refers to and to substitute their current values before compiling.

use std::collections::{BTreeMap, BTreeSet};

/// Longest token treated as a field name.
pub const MAX_FIELD_LEN: usize = 4;

/// Find upper-case field tokens in `text`.
///
/// A token is a run of upper-case letters no longer than [`MAX_FIELD_LEN`]
/// that does not continue a word: `VAL + A` yields `VAL` and `A`, while
/// `aVAL` and `Val` yield nothing. Tokens are returned in order of
/// appearance and may repeat.
pub fn get_macros(text: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut token = String::new();
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if c.is_ascii_uppercase() {
            if !prev.is_some_and(|p| p.is_ascii_alphabetic()) || !token.is_empty() {
                token.push(c);
            }
        } else if c.is_ascii_lowercase() {
            token.clear();
        } else if !token.is_empty() {
            if token.len() <= MAX_FIELD_LEN {
                fields.push(std::mem::take(&mut token));
            } else {
                token.clear();
            }
        }
        prev = Some(c);
    }
    if !token.is_empty() && token.len() <= MAX_FIELD_LEN {
        fields.push(token);
    }

    fields
}

/// Replace occurrences of the field `search` in `text`.
///
/// A bare occurrence is replaced only when it has no alphanumeric neighbour;
/// text that was itself just substituted counts as a boundary. The delimited
/// form `%search%` is replaced wherever it appears.
pub fn replace_macro(text: &str, search: &str, replacement: &str) -> String {
    let mut out = text.to_string();
    if search.is_empty() {
        return out;
    }
    let delimited = format!("%{search}%");

    let mut pos = 0;
    let mut replaced = false;
    while pos < out.len() {
        if !out.is_char_boundary(pos) {
            replaced = false;
            pos += 1;
            continue;
        }

        if out[pos..].starts_with(search) {
            let before = if pos == 0 || replaced {
                None
            } else {
                out[..pos].chars().next_back()
            };
            let after = out[pos + search.len()..].chars().next();
            if !is_alnum(before) && !is_alnum(after) {
                out.replace_range(pos..pos + search.len(), replacement);
                pos += replacement.len();
                replaced = true;
                continue;
            }
        }

        if out[pos..].starts_with(delimited.as_str()) {
            out.replace_range(pos..pos + delimited.len(), replacement);
            pos += replacement.len();
            replaced = true;
            continue;
        }

        replaced = false;
        pos += 1;
    }

    out
}

fn is_alnum(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphanumeric())
}

/// Substitute every key of `fields` found in `text` with its value.
///
/// At each position the first matching key in map order wins; substituted
/// text is not scanned again.
pub fn replace(text: &str, fields: &BTreeMap<String, String>) -> String {
    let mut out = text.to_string();

    let mut pos = 0;
    while pos < out.len() {
        if out.is_char_boundary(pos) {
            let found = fields
                .iter()
                .find(|(from, _)| !from.is_empty() && out[pos..].starts_with(from.as_str()));
            if let Some((from, to)) = found {
                out.replace_range(pos..pos + from.len(), to);
                pos += to.len();
                continue;
            }
        }
        pos += 1;
    }

    out
}

/// Escape newlines and single quotes for embedding `text` in a quoted literal.
pub fn escape(text: &str) -> String {
    let escapes: BTreeMap<String, String> = [("\n", "\\n"), ("\r", "\\r"), ("'", "\\'")]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
    replace(text, &escapes)
}

/// Expand every field macro in `code` that has a value in `fields`.
///
/// Fields without a value are left untouched.
pub fn expand_fields(code: &str, fields: &BTreeMap<String, String>) -> String {
    let names: BTreeSet<String> = get_macros(code).into_iter().collect();
    names.iter().fold(code.to_string(), |text, name| match fields.get(name) {
        Some(value) => replace_macro(&text, name, value),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_macros() {
        assert_eq!(get_macros("VAL + A*2"), vec!["VAL", "A"]);
        assert_eq!(get_macros("Val + aVAL"), Vec::<String>::new());
        assert_eq!(get_macros("INPAB + B"), vec!["B"]);
        assert_eq!(get_macros("%VAL%"), vec!["VAL"]);
        assert_eq!(get_macros("A+A"), vec!["A", "A"]);
    }

    #[test]
    fn test_replace_macro_word_boundaries() {
        assert_eq!(replace_macro("VAL + 1", "VAL", "5"), "5 + 1");
        assert_eq!(replace_macro("VALUE + VAL", "VAL", "5"), "VALUE + 5");
        assert_eq!(replace_macro("xVAL", "VAL", "5"), "xVAL");
        assert_eq!(replace_macro("A+A", "A", "1"), "1+1");
    }

    #[test]
    fn test_replace_macro_delimited() {
        assert_eq!(replace_macro("x%VAL%y", "VAL", "5"), "x5y");
        assert_eq!(replace_macro("%A%%A%", "A", "ab"), "abab");
    }

    #[test]
    fn test_replaced_text_is_a_boundary() {
        // The bare A follows a substitution, so its left neighbour does not count
        assert_eq!(replace_macro("%A%A", "A", "x"), "xx");
        assert_eq!(replace_macro("AA", "A", "x"), "AA");
    }

    #[test]
    fn test_replace_first_key_wins() {
        let fields = map(&[("ab", "1"), ("abc", "2"), ("c", "3")]);
        assert_eq!(replace("abc", &fields), "13");
        assert_eq!(replace("", &fields), "");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("it's\na\rb"), "it\\'s\\na\\rb");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_expand_fields() {
        let fields = map(&[("VAL", "3"), ("B", "'x'")]);
        assert_eq!(expand_fields("VAL * 2 + B + C", &fields), "3 * 2 + 'x' + C");
    }

    #[test]
    fn test_non_ascii_text() {
        assert_eq!(replace_macro("é VAL é", "VAL", "1"), "é 1 é");
        assert_eq!(get_macros("é VAL"), vec!["VAL"]);
    }
}
