use anyhow::{Context, Result};
use env_logger::{Target, WriteStyle};
use std::fs::File;
use std::path::Path;

/// Install the global logger.
///
/// The map owns the terminal, so interactive sessions only log when given a
/// file. Headless runs log to stderr. Filtering follows `RUST_LOG`
/// (default `info`).
pub fn init(log_file: Option<&Path>, headless: bool) -> Result<()> {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));

    match (log_file, headless) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
        (None, true) => {
            builder.target(Target::Stderr);
        }
        (None, false) => return Ok(()),
    }

    builder.try_init()?;
    Ok(())
}
