use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use kuda::infer::{FnSig, Inference, ModelInfo, Scope};

use super::read_program;

#[derive(Args)]
pub struct InferArgs {
    /// Input syntax tree (.json)
    pub input: PathBuf,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    models: &'a BTreeMap<String, ModelInfo>,
    functions: &'a BTreeMap<String, FnSig>,
    scopes: BTreeMap<String, &'a Scope>,
}

pub fn cmd_infer(args: InferArgs) -> Result<()> {
    let program = read_program(&args.input)?;
    let inference = kuda::infer(&program);
    if args.json {
        println!("{}", report_json(&inference)?);
    } else {
        print!("{}", inference);
    }
    Ok(())
}

/// The inference report as pretty JSON, scopes keyed by their display name.
pub fn report_json(inference: &Inference) -> Result<String> {
    let report = Report {
        models: &inference.models,
        functions: &inference.functions,
        scopes: inference
            .scopes
            .iter()
            .map(|(id, scope)| (id.to_string(), scope))
            .collect(),
    };
    serde_json::to_string_pretty(&report).context("cannot serialize the report")
}
