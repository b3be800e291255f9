//! Batch processing: bounded concurrency over a directory, with progress and a summary.

use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use upright_core::{DiscoveredFile, FileDiscovery, OutputWriter, ResizeReport};

use super::{write_png, ResizeContext};

/// Process every discovered file, mirroring the input tree under `root`.
///
/// A failing file is logged and counted; the rest of the batch continues.
pub async fn process_batch(
    ctx: &ResizeContext,
    files: Vec<DiscoveredFile>,
    root: &Path,
) -> anyhow::Result<()> {
    let total = files.len() as u64;
    let total_bytes = FileDiscovery::total_size(&files);
    let start_time = std::time::Instant::now();

    let outcome = run_batch(ctx, files, root).await?;

    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), ctx.report_format, ctx.pretty);
    for report in &outcome.reports {
        writer.write(report)?;
    }
    writer.finish()?.flush()?;

    let summary = Summary {
        succeeded: outcome.reports.len() as u64,
        failed: outcome.failed,
        skipped: outcome.skipped,
        total_bytes,
        elapsed: start_time.elapsed(),
    };
    summary.print();

    if outcome.failed > 0 {
        anyhow::bail!("{} of {} image(s) failed", outcome.failed, total);
    }
    Ok(())
}

/// Reports in input order, plus failure and skip counts.
struct BatchOutcome {
    reports: Vec<ResizeReport>,
    failed: u64,
    skipped: u64,
}

async fn run_batch(
    ctx: &ResizeContext,
    files: Vec<DiscoveredFile>,
    root: &Path,
) -> anyhow::Result<BatchOutcome> {
    let outputs = plan_outputs(root, &files)?;
    let progress = create_progress_bar(files.len() as u64);
    let start_time = std::time::Instant::now();

    let mut outcomes = stream::iter(files.into_iter().zip(outputs))
        .map(move |(file, output)| async move {
            let result = process_one(ctx, &file, &output).await;
            (file, result)
        })
        .buffer_unordered(ctx.parallel);

    let mut outcome = BatchOutcome {
        reports: Vec::new(),
        failed: 0,
        skipped: 0,
    };

    while let Some((file, result)) = outcomes.next().await {
        match result {
            Ok(Some(report)) => outcome.reports.push(report),
            Ok(None) => outcome.skipped += 1,
            Err(e) => {
                outcome.failed += 1;
                tracing::error!("Failed: {:?} - {}", file.path, e);
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let done = outcome.reports.len() as u64 + outcome.failed + outcome.skipped;
            progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
        }
    }
    progress.finish_and_clear();

    // Completion order is arbitrary; emit reports in input order
    outcome.reports.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(outcome)
}

/// Returns `Ok(None)` when the output exists and `--force` wasn't given.
async fn process_one(
    ctx: &ResizeContext,
    file: &DiscoveredFile,
    output: &Path,
) -> anyhow::Result<Option<ResizeReport>> {
    if output.exists() && !ctx.force {
        tracing::debug!("Skipping {:?}: {:?} exists", file.path, output);
        return Ok(None);
    }

    let mut result = ctx.resizer.process_file(&file.path, &ctx.options).await?;
    write_png(output, &result.png).await?;
    result.report.output_path = Some(output.to_path_buf());
    Ok(Some(result.report))
}

/// `<root>/<relative path>` with the extension replaced by `png`.
fn output_path_for(root: &Path, file: &DiscoveredFile) -> PathBuf {
    root.join(&file.relative).with_extension("png")
}

/// One output path per input, in input order.
///
/// Siblings that differ only by extension (`a.jpg`, `a.png`) keep it in
/// their output name (`a.jpg.png`, `a.png.png`). Any target still shared
/// after that fails the batch before a file is written.
fn plan_outputs(root: &Path, files: &[DiscoveredFile]) -> anyhow::Result<Vec<PathBuf>> {
    let mut counts: HashMap<PathBuf, usize> = HashMap::new();
    for file in files {
        *counts.entry(output_path_for(root, file)).or_default() += 1;
    }

    let outputs: Vec<PathBuf> = files
        .iter()
        .map(|file| {
            let output = output_path_for(root, file);
            if counts.get(&output).copied().unwrap_or(0) > 1 {
                let mut name = file.relative.clone().into_os_string();
                name.push(".png");
                root.join(name)
            } else {
                output
            }
        })
        .collect();

    let mut owners: HashMap<&Path, &Path> = HashMap::new();
    for (file, output) in files.iter().zip(&outputs) {
        if let Some(other) = owners.insert(output.as_path(), file.path.as_path()) {
            anyhow::bail!(
                "{:?} and {:?} would both be written to {:?}",
                other,
                file.path,
                output
            );
        }
    }
    Ok(outputs)
}

/// Create a progress bar for batch processing.
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

struct Summary {
    succeeded: u64,
    failed: u64,
    skipped: u64,
    total_bytes: u64,
    elapsed: std::time::Duration,
}

impl Summary {
    fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.succeeded as f64 / secs
        } else {
            0.0
        }
    }

    /// Print a formatted summary table to stderr.
    fn print(&self) {
        let total = self.succeeded + self.failed + self.skipped;
        let mb_read = self.total_bytes as f64 / 1_000_000.0;

        eprintln!();
        eprintln!("  ====================================");
        eprintln!("               Summary");
        eprintln!("  ====================================");
        eprintln!("    Succeeded:    {:>8}", self.succeeded);
        if self.failed > 0 {
            eprintln!("    Failed:       {:>8}", self.failed);
        }
        if self.skipped > 0 {
            eprintln!("    Skipped:      {:>8}", self.skipped);
        }
        eprintln!("  ------------------------------------");
        eprintln!("    Total:        {:>8}", total);
        eprintln!("    Input:        {:>7.1} MB", mb_read);
        eprintln!("    Duration:     {:>7.1}s", self.elapsed.as_secs_f64());
        eprintln!("    Rate:         {:>7.1} img/sec", self.rate());
        eprintln!("  ====================================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use upright_core::{Config, ImageResizer, OutputFormat, ResizeOptions};

    fn discovered(root: &Path, relative: &str) -> DiscoveredFile {
        DiscoveredFile {
            path: root.join(relative),
            relative: PathBuf::from(relative),
            size: 10,
        }
    }

    fn context(force: bool) -> ResizeContext {
        ResizeContext {
            resizer: ImageResizer::new(&Config::default()),
            options: ResizeOptions::default(),
            report_format: OutputFormat::Json,
            pretty: false,
            parallel: 2,
            force,
        }
    }

    fn write_png_file(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]))
            .save(path)
            .unwrap();
    }

    fn write_jpeg_file(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([200, 100, 50]))
            .save(path)
            .unwrap();
    }

    fn discover(dir: &Path) -> Vec<DiscoveredFile> {
        FileDiscovery::new(Config::default().processing).discover(dir)
    }

    fn decoded_dimensions(path: &Path) -> (u32, u32) {
        image::image_dimensions(path).unwrap()
    }

    #[test]
    fn test_output_path_mirrors_tree() {
        let file = DiscoveredFile {
            path: PathBuf::from("/in/2024/trip/IMG_1.jpeg"),
            relative: PathBuf::from("2024/trip/IMG_1.jpeg"),
            size: 10,
        };
        assert_eq!(
            output_path_for(Path::new("/out"), &file),
            PathBuf::from("/out/2024/trip/IMG_1.png")
        );
    }

    #[test]
    fn test_plan_outputs_keeps_extension_on_collision() {
        let input = Path::new("/in");
        let files = vec![
            discovered(input, "a.jpg"),
            discovered(input, "a.png"),
            discovered(input, "b.gif"),
        ];
        let outputs = plan_outputs(Path::new("/out"), &files).unwrap();
        assert_eq!(
            outputs,
            vec![
                PathBuf::from("/out/a.jpg.png"),
                PathBuf::from("/out/a.png.png"),
                PathBuf::from("/out/b.png"),
            ]
        );
    }

    #[test]
    fn test_plan_outputs_rejects_unresolvable_collision() {
        let input = Path::new("/in");
        // `a.jpg.png` already claims the name `a.jpg` falls back to
        let files = vec![
            discovered(input, "a.jpg"),
            discovered(input, "a.jpg.png"),
            discovered(input, "a.png"),
        ];
        let err = plan_outputs(Path::new("/out"), &files).unwrap_err();
        assert!(err.to_string().contains("would both be written"));
    }

    #[tokio::test]
    async fn test_batch_writes_distinct_outputs_for_sibling_names() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png_file(&input.path().join("a.png"), 10, 10);
        write_jpeg_file(&input.path().join("a.jpg"), 30, 20);

        let outcome = run_batch(&context(false), discover(input.path()), out.path())
            .await
            .unwrap();

        assert_eq!(outcome.reports.len(), 2);
        assert_eq!(outcome.failed, 0);
        let jpg_out = out.path().join("a.jpg.png");
        let png_out = out.path().join("a.png.png");
        assert_eq!(decoded_dimensions(&jpg_out), (30, 20));
        assert_eq!(decoded_dimensions(&png_out), (10, 10));
        assert_ne!(outcome.reports[0].output_path, outcome.reports[1].output_path);
    }

    #[tokio::test]
    async fn test_batch_skips_existing_unless_forced() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png_file(&input.path().join("photo.png"), 8, 6);

        let first = run_batch(&context(false), discover(input.path()), out.path())
            .await
            .unwrap();
        assert_eq!((first.reports.len(), first.skipped), (1, 0));

        let second = run_batch(&context(false), discover(input.path()), out.path())
            .await
            .unwrap();
        assert_eq!((second.reports.len(), second.skipped), (0, 1));

        let forced = run_batch(&context(true), discover(input.path()), out.path())
            .await
            .unwrap();
        assert_eq!((forced.reports.len(), forced.skipped), (1, 0));
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_png_file(&input.path().join("good.png"), 4, 4);
        std::fs::write(input.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();

        let ctx = context(false);
        let outcome = run_batch(&ctx, discover(input.path()), out.path())
            .await
            .unwrap();
        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.failed, 1);
        assert!(out.path().join("good.png").exists());

        // The same batch as a whole reports failure
        let err = process_batch(&ctx, discover(input.path()), out.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
    }

    #[tokio::test]
    async fn test_batch_reports_in_input_order() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for (name, width) in [("c.png", 30), ("a.png", 10), ("b.png", 20)] {
            write_png_file(&input.path().join(name), width, 5);
        }

        let mut ctx = context(false);
        ctx.parallel = 3;
        let outcome = run_batch(&ctx, discover(input.path()), out.path())
            .await
            .unwrap();

        let names: Vec<_> = outcome
            .reports
            .iter()
            .map(|r| r.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_summary_rate() {
        let summary = Summary {
            succeeded: 10,
            failed: 0,
            skipped: 0,
            total_bytes: 0,
            elapsed: std::time::Duration::from_secs(2),
        };
        assert!((summary.rate() - 5.0).abs() < f64::EPSILON);

        let instant = Summary {
            elapsed: std::time::Duration::ZERO,
            ..summary
        };
        assert_eq!(instant.rate(), 0.0);
    }
}
