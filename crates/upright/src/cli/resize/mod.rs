//! The `upright resize` command.

mod batch;
pub mod types;

pub use types::{OutputFormat, ScaleFilterArg};

use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};
use upright_core::{
    Config, Constraint, FileDiscovery, ImageResizer, OutputFormat as CoreOutputFormat,
    OutputWriter, ResizeOptions,
};

/// Arguments for the `resize` command.
#[derive(Args, Debug)]
pub struct ResizeArgs {
    /// Image file or directory to process
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output PNG (single file) or directory (batch); batch defaults to `output.dir`
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum output width in pixels
    #[arg(long)]
    pub max_width: Option<f64>,

    /// Maximum output height in pixels
    #[arg(long)]
    pub max_height: Option<f64>,

    /// Filter used when scaling (rotation always interpolates)
    #[arg(long, value_enum)]
    pub scale_filter: Option<ScaleFilterArg>,

    /// Number of images processed concurrently
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,
}

/// Everything the single and batch paths share.
pub(crate) struct ResizeContext {
    pub resizer: ImageResizer,
    pub options: ResizeOptions,
    pub report_format: CoreOutputFormat,
    pub pretty: bool,
    pub parallel: usize,
    pub force: bool,
}

/// Execute the resize command.
pub async fn execute(args: ResizeArgs, config: Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let ctx = setup(&args, &config)?;
    let files = FileDiscovery::new(config.processing.clone()).discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }

    if args.input.is_file() {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| default_single_output(&args.input));
        process_single(&ctx, &args.input, &output).await
    } else {
        let root = args.output.clone().unwrap_or_else(|| config.output_dir());
        tracing::info!("Found {} image(s), writing to {:?}", files.len(), root);
        batch::process_batch(&ctx, files, &root).await
    }
}

/// Merge CLI overrides into the configured defaults.
fn setup(args: &ResizeArgs, config: &Config) -> anyhow::Result<ResizeContext> {
    let resizer = ImageResizer::new(config);
    let defaults = resizer.default_options();

    let constraint = Constraint::new(
        args.max_width.or(defaults.constraint.max_width),
        args.max_height.or(defaults.constraint.max_height),
    );
    if let Some((axis, value)) = constraint.invalid_bound() {
        anyhow::bail!("{} must be a finite number > 0 (got {})", axis, value);
    }
    let scale_filter = args
        .scale_filter
        .map(Into::into)
        .unwrap_or(defaults.scale_filter);

    let report_format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json),
    };

    let parallel = args.parallel.unwrap_or(config.processing.parallel_workers);
    if parallel == 0 {
        anyhow::bail!("--parallel must be > 0");
    }

    Ok(ResizeContext {
        resizer,
        options: ResizeOptions::new(constraint).with_filter(scale_filter),
        report_format,
        pretty: config.output.pretty,
        parallel,
        force: args.force,
    })
}

/// `photo.jpg` -> `photo.upright.png` next to the input.
fn default_single_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    input.with_file_name(format!("{}.upright.png", stem))
}

async fn process_single(ctx: &ResizeContext, input: &Path, output: &Path) -> anyhow::Result<()> {
    if output.exists() && !ctx.force {
        anyhow::bail!(
            "Output file already exists: {:?}\nUse --force to overwrite.",
            output
        );
    }

    let mut result = ctx.resizer.process_file(input, &ctx.options).await?;
    write_png(output, &result.png).await?;
    result.report.output_path = Some(output.to_path_buf());
    tracing::info!(
        "{:?}: {}x{} -> {}x{}",
        input,
        result.report.original_width,
        result.report.original_height,
        result.report.width,
        result.report.height
    );

    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), ctx.report_format, ctx.pretty);
    writer.write(&result.report)?;
    writer.finish()?.flush()?;
    Ok(())
}

pub(crate) async fn write_png(path: &Path, png: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, png).await?;
    Ok(())
}
