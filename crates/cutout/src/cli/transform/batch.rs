//! Batch transforms: bounded parallelism, per-file timeout, progress, report.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cutout_core::{Cutout, Outcome, ReportWriter, TransformOptions, TransformRecord};
use tokio::sync::Semaphore;

use super::discovery::DiscoveredFile;

/// Everything a worker needs to run one file.
#[derive(Clone)]
pub struct BatchJob {
    pub cutout: Arc<Cutout>,
    pub options: Arc<TransformOptions>,
    /// Option string as written into output names and report records
    pub option_string: Arc<str>,
    pub out_dir: Option<PathBuf>,
    pub timeout: Duration,
}

/// Counters for the closing summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: u64,
    pub failed: u64,
    pub output_bytes: u64,
}

/// Output path for a source: `<stem>.<options>.jpg` next to the source or
/// in `out_dir`.
pub fn output_path(source: &Path, out_dir: Option<&Path>, options: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let name = format!("{stem}.{options}.{extension}");
    match out_dir {
        Some(dir) => dir.join(name),
        None => source.with_file_name(name),
    }
}

/// Transform every file, writing one report record per source in input
/// order. Failures are recorded and counted; they never stop the batch.
pub async fn run_batch<W: Write>(
    job: BatchJob,
    files: Vec<DiscoveredFile>,
    parallel: usize,
    report: &mut ReportWriter<W>,
    show_progress: bool,
) -> anyhow::Result<BatchSummary> {
    let progress = if show_progress {
        create_progress_bar(files.len() as u64)
    } else {
        indicatif::ProgressBar::hidden()
    };

    let semaphore = Arc::new(Semaphore::new(parallel.max(1)));
    let start_time = Instant::now();

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let job = job.clone();
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                transform_file(&job, file).await
            })
        })
        .collect();

    let mut summary = BatchSummary::default();
    for handle in handles {
        let record = handle.await?;
        match &record.outcome {
            Outcome::Ok { bytes, .. } => {
                summary.succeeded += 1;
                summary.output_bytes += *bytes as u64;
            }
            Outcome::Failed { error } => {
                summary.failed += 1;
                tracing::error!("Failed: {:?} - {}", record.source, error);
            }
        }
        report.write(&record)?;

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let done = summary.succeeded + summary.failed;
            progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
        }
    }
    progress.finish_and_clear();

    if show_progress {
        print_summary(&summary, start_time.elapsed());
    }
    Ok(summary)
}

/// Read, transform, write and hash one source.
pub async fn transform_file(job: &BatchJob, file: DiscoveredFile) -> TransformRecord {
    let outcome = match run_one(job, &file.path).await {
        Ok(outcome) => outcome,
        Err(e) => Outcome::Failed {
            error: format!("{e:#}"),
        },
    };
    TransformRecord {
        source: file.path,
        options: job.option_string.to_string(),
        outcome,
    }
}

async fn run_one(job: &BatchJob, source: &Path) -> anyhow::Result<Outcome> {
    let bytes = tokio::fs::read(source).await?;

    let cutout = Arc::clone(&job.cutout);
    let options = Arc::clone(&job.options);
    // The blocking task keeps running after a timeout; only its result is dropped.
    let task = tokio::task::spawn_blocking(move || cutout.transform(&bytes, &options));
    let encoded = match tokio::time::timeout(job.timeout, task).await {
        Ok(joined) => joined??,
        Err(_) => anyhow::bail!("Transform timed out after {:?}", job.timeout),
    };

    let output = output_path(
        source,
        job.out_dir.as_deref(),
        &job.option_string,
        encoded.codec.extension(),
    );
    tokio::fs::write(&output, &encoded.bytes).await?;
    tracing::debug!("Wrote {:?} ({} bytes)", output, encoded.bytes.len());

    Ok(Outcome::Ok {
        output,
        width: encoded.width,
        height: encoded.height,
        codec: encoded.codec,
        bytes: encoded.bytes.len(),
        blake3: blake3::hash(&encoded.bytes).to_hex().to_string(),
    })
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

fn print_summary(summary: &BatchSummary, elapsed: Duration) {
    let total = summary.succeeded + summary.failed;
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { total as f64 / secs } else { 0.0 };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Written:      {:>7.1} MB", summary.output_bytes as f64 / 1_000_000.0);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutout_core::{Config, OutputFormat};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    fn job(options: &str, out_dir: Option<PathBuf>) -> BatchJob {
        BatchJob {
            cutout: Arc::new(Cutout::new(Config::default()).unwrap()),
            options: Arc::new(TransformOptions::parse(options)),
            option_string: Arc::from(options),
            out_dir,
            timeout: Duration::from_secs(30),
        }
    }

    fn discovered(path: &Path) -> DiscoveredFile {
        DiscoveredFile {
            path: path.to_path_buf(),
            size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
        }
    }

    #[test]
    fn test_output_path_next_to_source() {
        let path = output_path(Path::new("/photos/me.png"), None, "w_200,h_200", "jpg");
        assert_eq!(path, PathBuf::from("/photos/me.w_200,h_200.jpg"));
    }

    #[test]
    fn test_output_path_in_out_dir() {
        let path = output_path(
            Path::new("/photos/me.png"),
            Some(Path::new("/out")),
            "c_fill",
            "jpg",
        );
        assert_eq!(path, PathBuf::from("/out/me.c_fill.jpg"));
    }

    #[tokio::test]
    async fn test_transform_file_writes_output_and_hash() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("square.png");
        write_png(&source, 64, 64);

        let record = transform_file(&job("w_32,h_32,r_max", None), discovered(&source)).await;
        let Outcome::Ok {
            output,
            width,
            height,
            bytes,
            blake3,
            ..
        } = record.outcome
        else {
            panic!("expected a successful transform");
        };
        assert_eq!((width, height), (32, 32));
        assert_eq!(output, dir.path().join("square.w_32,h_32,r_max.jpg"));
        let written = std::fs::read(&output).unwrap();
        assert_eq!(written.len(), bytes);
        assert_eq!(blake3::hash(&written).to_hex().to_string(), blake3);
    }

    #[tokio::test]
    async fn test_transform_file_records_failure() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"not a png at all").unwrap();

        let record = transform_file(&job("w_10", None), discovered(&source)).await;
        assert!(!record.is_ok());
        assert!(matches!(record.outcome, Outcome::Failed { ref error } if error.contains("Decode")));
    }

    #[tokio::test]
    async fn test_run_batch_reports_every_file_in_order() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_png(&src.path().join("a.png"), 40, 30);
        std::fs::write(src.path().join("b.png"), b"garbage!").unwrap();
        write_png(&src.path().join("c.png"), 30, 40);
        let files = super::super::discovery::discover(
            src.path(),
            &["png".to_string()],
            "w_20,c_pad",
        );
        assert_eq!(files.len(), 3);

        let mut report = ReportWriter::new(Vec::new(), OutputFormat::JsonLines, false);
        let summary = run_batch(
            job("w_20,c_pad", Some(out.path().to_path_buf())),
            files,
            2,
            &mut report,
            false,
        )
        .await
        .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(out.path().join("a.w_20,c_pad.jpg").exists());
        assert!(out.path().join("c.w_20,c_pad.jpg").exists());

        let text = String::from_utf8(report.finish().unwrap()).unwrap();
        let records: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 3);
        assert!(records[0]["source"].as_str().unwrap().ends_with("a.png"));
        assert_eq!(records[1]["status"], "failed");
        assert_eq!(records[2]["width"], 20);
        assert_eq!(records[2]["height"], 26);
    }
}
