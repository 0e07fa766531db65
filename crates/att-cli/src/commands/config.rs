//! Config command for showing the effective configuration.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::Config;
use crate::config::dirs_config_path;

/// Prints the effective configuration. `config_path` is the file given with
/// `--config`, which takes precedence over the default location.
pub fn run<W: Write>(writer: &mut W, config: &Config, config_path: Option<&Path>) -> Result<()> {
    if let Some(path) = config_path {
        writeln!(writer, "# Config file: {}", path.display())?;
    } else if let Some(dir) = dirs_config_path() {
        writeln!(writer, "# Config file: {}", dir.join("config.toml").display())?;
    } else {
        writeln!(writer, "# Config file: (no config directory)")?;
    }
    writeln!(writer, "target_percent = {:?}", config.target_percent)?;
    writeln!(writer, "policy = \"{}\"", config.policy)?;
    Ok(())
}
