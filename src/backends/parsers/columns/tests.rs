use super::*;
use crate::backends::parsers::delimited::split_delimited;
use proptest::prelude::*;

const WINGET_UPGRADE: &str = "\r   - \r   \\ \r   | \r\
Name                         Id                           Version      Available    Source\r\n\
-------------------------------------------------------------------------------------------\r\n\
Microsoft Edge               Microsoft.Edge               119.0.2151.9 120.0.2210.6 winget\r\n\
Python 3.11.4 (64-bit)       Python.Python.3.11           3.11.4       3.11.6       winget\r\n\
Visual C++ 2015-2022 Redist… Microsoft.VCRedist.2015+.x64 < 14.36      14.38.33130  winget\r\n\
3 upgrades available.\r\n";

#[test]
fn test_header_and_row() {
    let layout = ColumnLayout::from_header("Name   Id      Version").unwrap();
    let cells = layout.slice("Foo.Bar  foo.bar  1.2.3").unwrap();
    assert_eq!(cells, vec!["Foo.Bar", "foo.bar", "1.2.3"]);
}

#[test]
fn test_clean_header_drops_spinner() {
    let header = clean_header("\r   - \r   \\ \r   | \rName  Id  Version");
    assert_eq!(header, "Name  Id  Version");
    let header = clean_header("\x08-\x08\\\x08|\x08 Name  Id");
    assert_eq!(header, "Name  Id");
}

#[test]
fn test_parse_winget_upgrade_table() {
    let rows = parse_table(
        WINGET_UPGRADE,
        TableSpec {
            header_marker: " Id ",
            end_marker: Some(" upgrades available."),
        },
    );
    assert_eq!(rows.len(), 3);

    let (layout, cells) = &rows[0];
    assert_eq!(layout.len(), 5);
    assert_eq!(cells[0], "Microsoft Edge");
    assert_eq!(cells[1], "Microsoft.Edge");
    assert_eq!(cells[2], "119.0.2151.9");
    assert_eq!(cells[3], "120.0.2210.6");
    assert_eq!(cells[4], "winget");

    let (_, cells) = &rows[2];
    assert_eq!(cells[0], "Visual C++ 2015-2022 Redist…");
    assert_eq!(cells[2], "< 14.36");
    assert_eq!(cells[3], "14.38.33130");
}

#[test]
fn test_header_marker_inside_a_row_keeps_the_layout() {
    let output = "Name                 Id                   Version\n\
-----------------------------------------------------\n\
Contoso Id Manager   Contoso.IdManager    1.0.0\n\
Visual Studio Code   Microsoft.VSCode     1.85.0\n\
2 upgrades available.\n\
Name        Id          Version\n\
Pinned App  Pinned.App  2.0\n";
    let rows = parse_table(
        output,
        TableSpec {
            header_marker: " Id ",
            end_marker: Some(" upgrades available."),
        },
    );
    let cells: Vec<Vec<String>> = rows.into_iter().map(|(_, cells)| cells).collect();
    assert_eq!(
        cells,
        vec![
            vec!["Contoso Id Manager", "Contoso.IdManager", "1.0.0"],
            vec!["Visual Studio Code", "Microsoft.VSCode", "1.85.0"],
            vec!["Pinned App", "Pinned.App", "2.0"],
        ]
    );
}

#[test]
fn test_short_row_falls_back_to_raw_offsets() {
    let layout = ColumnLayout::from_header("Name   Id      Version").unwrap();
    assert_eq!(layout.slice("Foo"), Err(SliceError::TooShort));
    assert_eq!(layout.slice_raw("Foo"), vec!["Foo", "", ""]);

    let rows = parse_table(
        "Name   Id      Version\nFoo.Bar foo.bar\n",
        TableSpec {
            header_marker: " Id ",
            end_marker: None,
        },
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1, vec!["Foo.Bar", "foo.bar", ""]);
}

#[test]
fn test_non_ascii_names_keep_offsets() {
    let layout = ColumnLayout::from_header("Name      Id         Version").unwrap();
    let cells = layout.slice("Käse Übel Käse.Übel  2.0").unwrap();
    assert_eq!(cells, vec!["Käse Übel", "Käse.Übel", "2.0"]);
}

#[test]
fn test_index_of_prefers_title_then_position() {
    let layout = ColumnLayout::from_header("Nombre  Id  Versión  Disponible  Origen").unwrap();
    assert_eq!(layout.index_of("Source", 4), Some(4));
    assert_eq!(layout.index_of("Id", 9), Some(1));
    assert_eq!(layout.index_of("Available", 7), None);
}

#[test]
fn test_rule_detection() {
    assert!(is_rule("---------------"));
    assert!(is_rule("  ─────  "));
    assert!(!is_rule("-"));
    assert!(!is_rule("foo-bar"));
}

fn name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][A-Za-z0-9+.()]{0,7}", 1..4).prop_map(|words| words.join(" "))
}

fn token_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][A-Za-z0-9._+-]{0,15}"
}

fn pad(value: &str, width: usize) -> String {
    format!("{:<width$}", value, width = width)
}

proptest! {
    // An aligned table and its pipe-delimited twin yield the same records.
    #[test]
    fn column_slicing_matches_delimited(rows in prop::collection::vec((name_strategy(), token_strategy(), token_strategy()), 1..8)) {
        let name_w = rows.iter().map(|r| r.0.chars().count()).max().unwrap_or(0).max(4) + 2;
        let id_w = rows.iter().map(|r| r.1.chars().count()).max().unwrap_or(0).max(2) + 2;

        let mut table = format!("{}{}{}\n", pad("Name", name_w), pad("Id", id_w), "Version");
        table.push_str(&"-".repeat(name_w + id_w + 7));
        table.push('\n');
        let mut delimited = String::new();
        for (name, id, version) in &rows {
            table.push_str(&format!("{}{}{}\n", pad(name, name_w), pad(id, id_w), version));
            delimited.push_str(&format!("{}|{}|{}\n", name, id, version));
        }

        let sliced: Vec<Vec<String>> = parse_table(&table, TableSpec { header_marker: " Id ", end_marker: None })
            .into_iter()
            .map(|(_, cells)| cells)
            .collect();
        let split: Vec<Vec<String>> = delimited.lines().map(|l| split_delimited(l, '|')).collect();

        prop_assert_eq!(sliced, split);
    }
}
