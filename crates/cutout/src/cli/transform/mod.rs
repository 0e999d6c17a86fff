//! The `cutout transform` command.

mod batch;
mod discovery;
pub mod types;

pub use types::ReportFormat;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use cutout_core::{Config, Cutout, ReportWriter, TransformOptions};

use batch::{run_batch, BatchJob};
use discovery::discover;

/// Arguments for the `transform` command.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Image file or directory to transform
    #[arg(required = true)]
    pub input: PathBuf,

    /// Option string, e.g. `w_200,h_200,c_thumb,g_face,r_max,bo_2px_solid_white`
    #[arg(short = 'O', long, env = "CUTOUT_OPTIONS")]
    pub options: String,

    /// Directory for transformed images (defaults to next to each source)
    #[arg(short = 'd', long)]
    pub out_dir: Option<PathBuf>,

    /// Report file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,

    /// Number of parallel workers (defaults to `processing.parallel_workers`)
    #[arg(short, long)]
    pub parallel: Option<usize>,
}

/// Execute the transform command.
pub async fn execute(args: TransformArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let config = Config::load()?;
    let parallel = args
        .parallel
        .unwrap_or(config.processing.parallel_workers);
    let timeout = Duration::from_millis(config.limits.transform_timeout_ms);

    let option_string = canonical_option_string(&args.options)?;
    let files = discover(
        &args.input,
        &config.processing.supported_formats,
        &option_string,
    );
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    let total_bytes: u64 = files.iter().map(|f| f.size).sum();
    tracing::info!(
        "Found {} image(s) to transform ({:.1} MB)",
        files.len(),
        total_bytes as f64 / 1_000_000.0
    );

    let options = TransformOptions::parse(&option_string);
    tracing::debug!("Options: {:?}", options);

    let job = BatchJob {
        cutout: Arc::new(Cutout::new(config)?),
        options: Arc::new(options),
        option_string: Arc::from(option_string),
        out_dir: args.out_dir.clone(),
        timeout,
    };
    let show_progress = args.input.is_dir();
    let format = args.format.to_core();

    let summary = match &args.output {
        Some(path) => {
            let mut report = ReportWriter::new(BufWriter::new(File::create(path)?), format, true);
            let summary = run_batch(job, files, parallel, &mut report, show_progress).await?;
            report.finish()?;
            tracing::info!("Report written to {:?}", path);
            summary
        }
        None => {
            let stdout = std::io::stdout();
            let mut report = ReportWriter::new(stdout.lock(), format, true);
            let summary = run_batch(job, files, parallel, &mut report, show_progress).await?;
            report.finish()?;
            summary
        }
    };

    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} transform(s) failed",
            summary.failed,
            summary.failed + summary.succeeded
        );
    }
    Ok(())
}

/// Strip whitespace so the string can be embedded in output file names.
/// Path separators are rejected so outputs stay in their directory.
fn canonical_option_string(raw: &str) -> anyhow::Result<String> {
    let canonical = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim_matches(',')
        .to_string();
    if canonical.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        anyhow::bail!(
            "Option string {:?} contains a path separator\n\n  Hint: Options look like `w_200,h_200,c_thumb`.",
            raw
        );
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_option_string() {
        assert_eq!(
            canonical_option_string(" w_200, h_200 ,c_fill,").unwrap(),
            "w_200,h_200,c_fill"
        );
    }

    #[test]
    fn test_canonical_option_string_parses_like_raw() {
        let raw = "w_10 , c_thumb";
        assert_eq!(
            TransformOptions::parse(&canonical_option_string(raw).unwrap()),
            TransformOptions::parse(raw)
        );
    }

    #[test]
    fn test_canonical_option_string_rejects_path_separators() {
        for raw in ["w_10/../../etc", "w_10,..\\x", "/tmp/w_10"] {
            assert!(canonical_option_string(raw).is_err(), "{raw}");
        }
        // Fractions keep their dot
        assert_eq!(canonical_option_string("w_0.5").unwrap(), "w_0.5");
    }
}
