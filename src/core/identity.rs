//! Package identity helpers
//!
//! Identity of a package is `(id, source, backend)` (see `PackageKey`).
//! Names are cosmetic: some backends only print ids, so a display name is
//! derived from the id here, and winget may truncate names with `…`.

/// Turn a backend id such as `visual-studio-code.install` into a display name
/// (`Visual Studio Code (Install)`).
pub fn format_id_as_name(id: &str) -> String {
    let spaced: String = id
        .chars()
        .map(|c| if matches!(c, '-' | '_' | '.') { ' ' } else { c })
        .collect();

    let words: Vec<String> = spaced
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();

    let mut name = words.join(" ");
    for (suffix, replacement) in [(" Install", " (Install)"), (" Portable", " (Portable)")] {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = format!("{}{}", stripped, replacement);
        }
    }
    name
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// winget cuts long ids and names with `…`; a cut id cannot be used on a command line.
pub fn is_truncated(text: &str) -> bool {
    text.ends_with('…')
}

/// The visible part of a possibly truncated name, for use as a query.
pub fn untruncated(text: &str) -> &str {
    text.trim_end_matches('…').trim_end()
}
