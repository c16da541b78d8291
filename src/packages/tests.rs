use super::*;
use crate::core::types::Backend;
use crate::error::Result;
use proptest::prelude::*;

/// Answers every command with the same console text.
struct Echo(String);

impl CommandRunner for Echo {
    fn run(&self, _program: &str, _args: &[String]) -> Result<String> {
        Ok(self.0.clone())
    }
}

fn blacklisted_token() -> impl Strategy<Value = String> {
    let tokens: Vec<&'static str> = Backend::ALL
        .iter()
        .filter_map(|b| create_manager(*b).ok())
        .flat_map(|m| {
            let list = m.blacklist();
            list.names.iter().chain(list.ids).chain(list.versions).copied().collect::<Vec<_>>()
        })
        .filter(|t| !t.is_empty())
        .collect();
    prop::sample::select(tokens).prop_map(str::to_string)
}

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => blacklisted_token(),
        3 => "[a-z][a-z0-9.]{0,8}",
        1 => "[a-z]{1,6}@[0-9]\\.[0-9]{1,2}",
        1 => "\\([0-9]\\.[0-9]\\)",
        1 => Just("├──".to_string()),
    ]
}

fn line() -> impl Strategy<Value = String> {
    let row = (
        prop::collection::vec(token(), 1..6),
        prop::sample::select(vec![" ", "   ", "|", " | "]),
        any::<bool>(),
    )
        .prop_map(|(tokens, sep, indent)| {
            let joined = tokens.join(sep);
            if indent { format!("    {}", joined) } else { joined }
        });
    prop_oneof![
        1 => Just("Name                Id                Version     Available   Source".to_string()),
        1 => Just("Package    Version Latest Type".to_string()),
        1 => Just("NAME | DESCRIPTION | AUTHOR | DATE | VERSION | KEYWORDS".to_string()),
        1 => Just("-------------------------------------------".to_string()),
        1 => Just("'main' bucket:".to_string()),
        8 => row,
    ]
}

proptest! {
    // Whatever a backend prints, no listed record carries a blacklisted token.
    #[test]
    fn blacklisted_tokens_never_survive_listing(lines in prop::collection::vec(line(), 0..24)) {
        let runner = Echo(lines.join("\n"));
        for backend in Backend::ALL {
            let manager = create_manager(backend).unwrap();
            let blacklist = manager.blacklist();

            if let Ok(installed) = manager.list_installed(&runner) {
                for pkg in &installed {
                    prop_assert!(blacklist.admits_package(pkg), "{} installed: {:?}", backend, pkg);
                }
            }
            if let Ok(found) = manager.search(&runner, "query") {
                for pkg in &found {
                    prop_assert!(blacklist.admits_package(pkg), "{} search: {:?}", backend, pkg);
                }
            }
            if let Ok(updates) = manager.list_updates(&runner) {
                for update in &updates {
                    prop_assert!(blacklist.admits_update(update), "{} updates: {:?}", backend, update);
                }
            }
        }
    }
}
