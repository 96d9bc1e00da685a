use std::process;

use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(
    name = "kudac",
    version,
    about = "Kuda translator: static kinds in, C out"
)]
struct Cli {
    /// Log inference and lowering decisions (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a JSON syntax tree to a C unit
    Translate(cli::translate::TranslateArgs),
    /// Print the kinds inferred for a JSON syntax tree
    Infer(cli::infer::InferArgs),
    /// Print the C runtime library block
    Runtime(cli::runtime::RuntimeArgs),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Translate(args) => cli::translate::cmd_translate(args),
        Command::Infer(args) => cli::infer::cmd_infer(args),
        Command::Runtime(args) => cli::runtime::cmd_runtime(args),
    };

    if let Err(err) = result {
        match err.downcast_ref::<kuda::CompileError>() {
            Some(compile) => eprintln!("{}", compile.render()),
            None => eprintln!("error: {:#}", err),
        }
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
