//! Filename validation command

use anyhow::{bail, Result};
use docsearch_core::AppConfig;
use docsearch_ingestion::validate_file_type;
use serde::Serialize;

use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct Verdict<'a> {
    filename: &'a str,
    valid: bool,
}

pub fn run(config: &AppConfig, filenames: &[String], format: OutputFormat) -> Result<()> {
    let allowed = &config.processing.allowed_file_types;
    let verdicts: Vec<Verdict> = filenames
        .iter()
        .map(|filename| Verdict {
            filename,
            valid: validate_file_type(filename, allowed),
        })
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&verdicts)?,
        OutputFormat::Text => {
            for verdict in &verdicts {
                if verdict.valid {
                    output::success(verdict.filename);
                } else {
                    output::failure(verdict.filename);
                }
            }
        }
    }

    let rejected = verdicts.iter().filter(|v| !v.valid).count();
    if rejected > 0 {
        bail!(
            "{} of {} filenames rejected (allowed: {})",
            rejected,
            verdicts.len(),
            allowed.join(", ")
        );
    }

    Ok(())
}
