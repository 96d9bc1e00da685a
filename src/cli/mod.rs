pub mod infer;
pub mod runtime;
pub mod translate;
#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use kuda::ast::Program;
use kuda::RuntimeLimits;

/// Runtime limits shared by the commands that emit C.
#[derive(Args)]
pub struct LimitArgs {
    /// Largest matrix dimension (KUDA_MAX_MAT)
    #[arg(long, value_name = "N")]
    pub max_matrix_dim: Option<usize>,
    /// Scratch string buffer size (KUDA_MAX_STR)
    #[arg(long, value_name = "N")]
    pub max_str: Option<usize>,
    /// Initial list capacity (KUDA_LIST_INIT_CAP)
    #[arg(long, value_name = "N")]
    pub list_capacity: Option<usize>,
}

impl LimitArgs {
    pub fn limits(&self) -> RuntimeLimits {
        let defaults = RuntimeLimits::default();
        RuntimeLimits {
            max_str: self.max_str.unwrap_or(defaults.max_str),
            max_matrix_dim: self.max_matrix_dim.unwrap_or(defaults.max_matrix_dim),
            list_capacity: self.list_capacity.unwrap_or(defaults.list_capacity),
        }
    }
}

/// Read a syntax tree serialized as JSON.
pub fn read_program(path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a Kuda syntax tree", path.display()))
}

/// Write `text` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&PathBuf>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("cannot write '{}'", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
