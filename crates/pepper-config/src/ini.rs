//! Minimal ini reader for `.pepperrc`.
//!
//! Understands `[section]` headers, `key = value` / `key: value` pairs,
//! full-line `#` and `;` comments, and indented continuation lines.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct IniError {
    pub line: usize,
    pub reason: String,
}

/// Return the key/value pairs of `section`, or `None` if it never appears.
///
/// Keys are returned as written; callers compare them case-insensitively.
/// A section that appears twice contributes the pairs of both.
pub fn read_section(contents: &str, section: &str) -> Result<Option<Vec<(String, String)>>, IniError> {
    let mut current: Option<String> = None;
    let mut found = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    // Whether the last pair pushed may absorb continuation lines.
    let mut open_value = false;

    for (idx, raw) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            open_value = false;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = raw.starts_with(' ') || raw.starts_with('\t');
        if indented && open_value {
            if let Some((_, value)) = pairs.last_mut() {
                value.push('\n');
                value.push_str(trimmed);
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest.strip_suffix(']').ok_or_else(|| IniError {
                line: line_no,
                reason: format!("unterminated section header: {trimmed}"),
            })?;
            let name = name.trim().to_owned();
            if name == section {
                found = true;
            }
            current = Some(name);
            open_value = false;
            continue;
        }

        let Some(current_section) = current.as_deref() else {
            return Err(IniError {
                line: line_no,
                reason: "entry appears before any section header".into(),
            });
        };

        let split = trimmed.find(['=', ':']).ok_or_else(|| IniError {
            line: line_no,
            reason: format!("expected `key = value`, got: {trimmed}"),
        })?;
        let key = trimmed[..split].trim();
        let value = trimmed[split + 1..].trim();
        if key.is_empty() {
            return Err(IniError {
                line: line_no,
                reason: "empty key".into(),
            });
        }

        if current_section == section {
            pairs.push((key.to_owned(), value.to_owned()));
            open_value = true;
        } else {
            open_value = false;
        }
    }

    Ok(found.then_some(pairs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reads_only_requested_section() {
        let contents = "\
[other]
SALTAPI_URL = http://elsewhere/

[main]
SALTAPI_URL = https://salt.example.com:8000/
saltapi_user: admin
";
        let pairs = read_section(contents, "main").unwrap().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("SALTAPI_URL".to_owned(), "https://salt.example.com:8000/".to_owned()),
                ("saltapi_user".to_owned(), "admin".to_owned()),
            ]
        );
    }

    #[test]
    fn missing_section_is_none() {
        let pairs = read_section("[other]\nkey = value\n", "main").unwrap();
        assert!(pairs.is_none());
    }

    #[test]
    fn empty_file_is_none() {
        assert!(read_section("", "main").unwrap().is_none());
    }

    #[test]
    fn empty_section_is_some() {
        let pairs = read_section("[main]\n# nothing here\n", "main").unwrap();
        assert_eq!(pairs, Some(Vec::new()));
    }

    #[test]
    fn comments_are_skipped() {
        let contents = "; leading comment\n[main]\n# SALTAPI_USER = nope\nSALTAPI_USER = yes\n";
        let pairs = read_section(contents, "main").unwrap().unwrap();
        assert_eq!(pairs, vec![("SALTAPI_USER".to_owned(), "yes".to_owned())]);
    }

    #[test]
    fn value_may_contain_separators() {
        let pairs = read_section("[main]\nSALTAPI_PASS = a=b:c\n", "main").unwrap().unwrap();
        assert_eq!(pairs[0].1, "a=b:c");
    }

    #[test]
    fn continuation_lines_join_with_newline() {
        let pairs = read_section("[main]\nkey = first\n  second\n", "main").unwrap().unwrap();
        assert_eq!(pairs[0].1, "first\nsecond");
    }

    #[test]
    fn entry_before_section_is_error() {
        let err = read_section("SALTAPI_URL = x\n[main]\n", "main").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn line_without_separator_is_error() {
        let err = read_section("[main]\njust some words\n", "main").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn unterminated_header_is_error() {
        let err = read_section("[main\n", "main").unwrap_err();
        assert!(err.reason.contains("unterminated"));
    }
}
