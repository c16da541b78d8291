//! `Key: value` scanners for show/info output
//!
//! winget, chocolatey and pip print details as labelled lines, sometimes
//! indented under a section (`Installer:`), with free text continuing on
//! indented lines below a label (`Description:`, `Tags:`).

use super::delimited::clean_lines;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub value: String,
    /// Indented lines that followed the label, trimmed
    pub continuation: Vec<String>,
}

impl Field {
    /// Value and continuation lines joined with newlines, skipping blanks.
    pub fn full_text(&self) -> String {
        std::iter::once(self.value.as_str())
            .chain(self.continuation.iter().map(String::as_str))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scan `output` for the labels in `keys` (matched as `<key>:` at the start of a trimmed line).
///
/// Longer keys should come first when one key is a prefix of another
/// (`License Url` before `License`).
pub fn scan_fields(output: &str, keys: &[&'static str]) -> Vec<Field> {
    let mut fields: Vec<Field> = Vec::new();
    let mut open = false;

    for line in clean_lines(output) {
        let trimmed = line.trim();
        let matched = keys.iter().find_map(|key| {
            trimmed
                .strip_prefix(key)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|value| (*key, value.trim().to_string()))
        });

        if let Some((key, value)) = matched {
            fields.push(Field {
                key,
                value,
                continuation: Vec::new(),
            });
            open = true;
        } else if open && line.starts_with([' ', '\t']) {
            if let Some(last) = fields.last_mut() {
                last.continuation.push(trimmed.to_string());
            }
        } else {
            open = false;
        }
    }

    fields
}

/// First field with `key`, if present.
pub fn field<'a>(fields: &'a [Field], key: &str) -> Option<&'a Field> {
    fields.iter().find(|f| f.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW: &str = r#"Found Visual Studio Code [Microsoft.VisualStudioCode]
Version: 1.84.2
Publisher: Microsoft Corporation
Description: Code editing.
  Redefined.
License: Microsoft Software License
License Url: https://code.visualstudio.com/License/
Tags:
  developer-tools
  editor
Installer:
  Installer Type: inno
  Installer Url: https://update.code.visualstudio.com/1.84.2/win32-x64/stable
"#;

    const KEYS: &[&str] = &[
        "Publisher",
        "Description",
        "License Url",
        "License",
        "Tags",
        "Installer Type",
        "Installer Url",
    ];

    #[test]
    fn test_scans_labels_and_continuations() {
        let fields = scan_fields(SHOW, KEYS);
        assert_eq!(field(&fields, "Publisher").unwrap().value, "Microsoft Corporation");
        assert_eq!(field(&fields, "Description").unwrap().full_text(), "Code editing.\nRedefined.");
        assert_eq!(field(&fields, "License").unwrap().value, "Microsoft Software License");
        assert_eq!(
            field(&fields, "License Url").unwrap().value,
            "https://code.visualstudio.com/License/"
        );
        assert_eq!(field(&fields, "Tags").unwrap().continuation, vec!["developer-tools", "editor"]);
        assert_eq!(field(&fields, "Installer Type").unwrap().value, "inno");
    }

    #[test]
    fn test_unknown_section_closes_continuation() {
        let fields = scan_fields(SHOW, KEYS);
        // "Installer:" is not a key, so its children are not appended to Tags
        assert_eq!(field(&fields, "Tags").unwrap().continuation.len(), 2);
    }
}
