//! Column-position parsing for fixed-width console tables
//!
//! Some backends print tables like
//!
//! ```text
//! Name               Id                     Version   Available Source
//! ---------------------------------------------------------------------
//! Visual Studio Code Microsoft.VisualStudioCode 1.84.2  1.85.0   winget
//! ```
//!
//! with no separator other than alignment, and with spinner frames
//! (`\r - \r \ \r |`) and backspaces in front of the header. The header is
//! cleaned, character offsets are taken from its column titles, and each data
//! row is cut at those offsets. Offsets count `char`s, not bytes, so names
//! with non-ASCII characters do not shift later columns.

use crate::utils::sanitize::strip_control;

/// One header column: its title and the char offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub title: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<Column>,
}

/// Why a row could not be cut cleanly; the caller falls back to [`ColumnLayout::slice_raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceError {
    /// Row ends before the id column starts
    TooShort,
    /// No id/version tokens after the name column
    MissingTokens,
}

/// Strip spinner residue and control characters from a header line.
///
/// Only the text after the last carriage return is kept, because spinner
/// frames are redrawn with `\r` on the same line.
pub fn clean_header(line: &str) -> String {
    let cleaned = strip_control(line);
    let last_frame = cleaned
        .trim_end_matches(['\r', '\n'])
        .rsplit('\r')
        .next()
        .unwrap_or("");
    last_frame
        .trim_start_matches(|c: char| matches!(c, '-' | '\\' | '|' | '/') || c.is_whitespace())
        .trim_end()
        .to_string()
}

/// A horizontal rule such as `-----------`.
pub fn is_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-' || c == '─')
}

impl ColumnLayout {
    /// Build a layout from a (cleaned) header line. Titles are whitespace-separated words.
    pub fn from_header(header: &str) -> Option<Self> {
        let mut columns = Vec::new();
        let mut in_word = false;
        let mut start = 0;
        let mut title = String::new();

        for (pos, ch) in header.chars().enumerate() {
            if ch.is_whitespace() {
                if in_word {
                    columns.push(Column {
                        title: std::mem::take(&mut title),
                        offset: start,
                    });
                    in_word = false;
                }
            } else {
                if !in_word {
                    in_word = true;
                    start = pos;
                }
                title.push(ch);
            }
        }
        if in_word {
            columns.push(Column { title, offset: start });
        }

        // A table needs at least a name and an id column
        if columns.len() < 2 {
            return None;
        }
        Some(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of a column by title, falling back to a position for localized headers.
    pub fn index_of(&self, title: &str, fallback: usize) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.title.eq_ignore_ascii_case(title))
            .or_else(|| (fallback < self.columns.len()).then_some(fallback))
    }

    /// Cut a row into one cell per column.
    ///
    /// The name is everything before the id column. Id and version are taken
    /// as the first whitespace tokens after it, so an id that overflows its
    /// column does not corrupt the version. A version rendered as `< 1.2`
    /// stays one cell. Later columns are cut at their raw offsets.
    pub fn slice(&self, line: &str) -> Result<Vec<String>, SliceError> {
        let chars: Vec<char> = line.chars().collect();
        let id_pos = self.columns[1].offset;
        if chars.len() <= id_pos {
            return Err(SliceError::TooShort);
        }

        let name: String = chars[..id_pos].iter().collect();
        let rest: String = chars[id_pos..].iter().collect();
        let mut tokens = rest.split_whitespace();

        let id = tokens.next().ok_or(SliceError::MissingTokens)?.to_string();
        let mut cells = vec![name.trim().to_string(), id];

        if self.columns.len() > 2 {
            let mut version = tokens.next().ok_or(SliceError::MissingTokens)?.to_string();
            if matches!(version.as_str(), "<" | ">" | "-")
                && let Some(next) = tokens.next()
            {
                version = format!("{} {}", version, next);
            }
            cells.push(version);
        }

        for idx in 3..self.columns.len() {
            cells.push(self.raw_cell(&chars, idx));
        }
        Ok(cells)
    }

    /// Best-guess cut at the raw header offsets; never fails.
    pub fn slice_raw(&self, line: &str) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        (0..self.columns.len())
            .map(|idx| self.raw_cell(&chars, idx))
            .collect()
    }

    fn raw_cell(&self, chars: &[char], idx: usize) -> String {
        let start = self.columns[idx].offset.min(chars.len());
        let end = self
            .columns
            .get(idx + 1)
            .map(|c| c.offset)
            .unwrap_or(chars.len())
            .min(chars.len());
        if start >= end {
            return String::new();
        }
        chars[start..end].iter().collect::<String>().trim().to_string()
    }
}

/// Rules for walking a console table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec<'a> {
    /// Substring identifying a header line (e.g. `" Id "`)
    pub header_marker: &'a str,
    /// Substring that ends the current table (the next header starts a new one)
    pub end_marker: Option<&'a str>,
}

/// Walk `output` and cut every data row of every table in it.
///
/// The header is detected once per table; only the end marker reopens
/// detection, so a row whose name contains the marker stays a row. Rows that fail [`ColumnLayout::slice`] are logged and cut at raw offsets
/// instead, so a garbled row still yields a best-guess record.
pub fn parse_table(output: &str, spec: TableSpec<'_>) -> Vec<(ColumnLayout, Vec<String>)> {
    let mut rows = Vec::new();
    let mut layout: Option<ColumnLayout> = None;

    for raw in output.split('\n') {
        if layout.is_none() && raw.contains(spec.header_marker) {
            let header = clean_header(raw);
            if let Some(found) = ColumnLayout::from_header(&header) {
                layout = Some(found);
                continue;
            }
        }

        if let Some(end) = spec.end_marker
            && raw.contains(end)
        {
            layout = None;
            continue;
        }

        let Some(current) = layout.as_ref() else {
            continue;
        };

        let line = strip_control(raw);
        let line = line
            .trim_end_matches(['\r', '\n'])
            .rsplit('\r')
            .next()
            .unwrap_or("")
            .trim_end();
        if line.trim().is_empty() || is_rule(line) {
            continue;
        }

        let cells = match current.slice(line) {
            Ok(cells) => cells,
            Err(e) => {
                tracing::debug!(?e, line, "row did not slice cleanly, using raw offsets");
                current.slice_raw(line)
            }
        };
        rows.push((current.clone(), cells));
    }

    rows
}

#[cfg(test)]
mod tests;
