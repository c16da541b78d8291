use crate::error::Result;
use crate::operations::OperationLog;
use crate::ui as output;
use crate::utils::machine_output::{self, OutputFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HistoryOut {
    path: String,
    log: String,
}

/// `unipkg history`: print the operation log as written
pub fn run(format: OutputFormat) -> Result<()> {
    let log = OperationLog::open_default()?;
    let text = log.read()?;

    if format.is_machine() {
        return machine_output::emit_v1(
            "history",
            HistoryOut {
                path: log.path().display().to_string(),
                log: text,
            },
            Vec::new(),
            Vec::new(),
            format,
        );
    }

    if text.trim().is_empty() {
        output::info("No operations recorded yet");
        return Ok(());
    }
    print!("{}", text);
    Ok(())
}
