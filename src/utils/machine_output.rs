use crate::error::{Result, UnipkgError};
use chrono::Utc;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn is_machine(&self) -> bool {
        !matches!(self, Self::Table)
    }
}

#[derive(Debug, Serialize)]
pub struct MachineEnvelope<T>
where
    T: Serialize,
{
    pub version: String,
    pub command: String,
    pub ok: bool,
    pub data: T,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub meta: MachineMeta,
}

#[derive(Debug, Serialize)]
pub struct MachineMeta {
    pub generated_at: String,
}

pub fn render_v1<T>(
    command: &str,
    data: T,
    warnings: Vec<String>,
    errors: Vec<String>,
    format: OutputFormat,
) -> Result<Option<String>>
where
    T: Serialize,
{
    let envelope = MachineEnvelope {
        version: "v1".to_string(),
        command: command.to_string(),
        ok: errors.is_empty(),
        data,
        warnings,
        errors,
        meta: MachineMeta {
            generated_at: Utc::now().to_rfc3339(),
        },
    };

    match format {
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(&envelope)?)),
        OutputFormat::Yaml => serde_yml::to_string(&envelope)
            .map(Some)
            .map_err(|e| UnipkgError::SerializationError(e.to_string())),
        OutputFormat::Table => Ok(None),
    }
}

pub fn emit_v1<T>(
    command: &str,
    data: T,
    warnings: Vec<String>,
    errors: Vec<String>,
    format: OutputFormat,
) -> Result<()>
where
    T: Serialize,
{
    if let Some(out) = render_v1(command, data, warnings, errors, format)? {
        println!("{}", out);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
