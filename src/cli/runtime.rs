use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{write_output, LimitArgs};

#[derive(Args)]
pub struct RuntimeArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub limits: LimitArgs,
}

pub fn cmd_runtime(args: RuntimeArgs) -> Result<()> {
    let mut text = kuda::runtime::PREAMBLE.to_string();
    text.push('\n');
    text.push_str(&kuda::runtime_library(&args.limits.limits()));
    write_output(args.output.as_ref(), &text)
}
