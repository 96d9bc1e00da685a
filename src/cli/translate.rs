use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kuda::TranslateOptions;

use super::{read_program, write_output, LimitArgs};

#[derive(Args)]
pub struct TranslateArgs {
    /// Input syntax tree (.json)
    pub input: PathBuf,
    /// Output C file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Fixed seed for the C random generator (default: wall clock)
    #[arg(long)]
    pub seed: Option<u32>,
    #[command(flatten)]
    pub limits: LimitArgs,
}

pub fn cmd_translate(args: TranslateArgs) -> Result<()> {
    let program = read_program(&args.input)?;
    let mut options = TranslateOptions::default().with_limits(args.limits.limits());
    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }
    let unit = kuda::translate_with_options(&program, &options)?;
    log::info!(
        "translated {} ({} lines of C)",
        args.input.display(),
        unit.source.lines().count()
    );
    write_output(args.output.as_ref(), &unit.source)
}
