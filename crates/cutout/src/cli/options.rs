//! The `cutout options` command: show how an option string is understood.

use clap::Args;
use cutout_core::options::{parse_params, OptionParams};
use cutout_core::TransformOptions;
use serde::Serialize;

/// Arguments for the `options` command.
#[derive(Args, Debug)]
pub struct OptionsArgs {
    /// Option string, e.g. `w_200,h_100,c_fill,bo_2px_solid_white`
    pub options: String,

    /// Print compact JSON on one line
    #[arg(long)]
    pub compact: bool,
}

#[derive(Serialize)]
struct Explained {
    raw: OptionParams,
    parsed: TransformOptions,
}

fn explain(options: &str) -> Explained {
    let raw = parse_params(options);
    let parsed = TransformOptions::from_params(&raw);
    Explained { raw, parsed }
}

/// Execute the options command.
pub async fn execute(args: OptionsArgs) -> anyhow::Result<()> {
    let explained = explain(&args.options);
    let json = if args.compact {
        serde_json::to_string(&explained)?
    } else {
        serde_json::to_string_pretty(&explained)?
    };
    println!("{}", json);
    Ok(())
}
