use std::{path::PathBuf, thread, time::Duration};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use flipbook::{
    ConversionOptions, ConversionRequest, Converter, FfmpegLogLevel, FrameSource, Phase, Quality,
    SamplingMode, TitlePage, VideoReader, format_timecode,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  flipbook convert holiday.mp4 --out books\n  flipbook convert holiday.mp4 --out books --rate 2 --per-page 8 --start 00:00:05 --end 00:00:20 --progress\n  flipbook probe holiday.mp4 --json\n  flipbook completions zsh > _flipbook";

/// How often the progress bar polls a running conversion.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(
    name = "flipbook",
    version,
    about = "Turn a video into a printable flipbook PDF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar while converting.
    #[arg(long)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a video into a flipbook PDF.
    #[command(
        about = "Convert a video into a flipbook",
        after_help = "Examples:\n  flipbook convert clip.mp4 --out books\n  flipbook convert clip.mp4 --out books --quality medium --spacing --json"
    )]
    Convert {
        /// Input video path.
        input: PathBuf,
        /// Output folder for the PDF.
        #[arg(long)]
        out: PathBuf,
        /// Frames kept per second of video.
        #[arg(long, default_value_t = 1)]
        rate: u32,
        /// Frames per page (1-10).
        #[arg(long, default_value_t = 10)]
        per_page: u32,
        /// Frame quality: highest | high | medium | low.
        #[arg(long, default_value = "high")]
        quality: String,
        /// Leave a gutter left of every frame for binding.
        #[arg(long)]
        spacing: bool,
        /// Window start (HH:MM:SS).
        #[arg(long)]
        start: Option<String>,
        /// Window end (HH:MM:SS).
        #[arg(long)]
        end: Option<String>,
        /// Keep every frame in the window, ignoring --rate.
        #[arg(long)]
        every_frame: bool,
        /// Title page heading.
        #[arg(long)]
        title: Option<String>,
        /// Title page attribution line.
        #[arg(long)]
        attribution: Option<String>,
        /// Title page link line (defaults to the crate homepage).
        #[arg(long)]
        url: Option<String>,
        /// Stage frames here instead of in the output folder.
        #[arg(long)]
        staging: Option<PathBuf>,
        /// Print a machine-readable summary.
        #[arg(long)]
        json: bool,
    },

    /// Print the properties of a video.
    #[command(
        about = "Print video metadata",
        visible_alias = "info",
        after_help = "Examples:\n  flipbook probe clip.mp4\n  flipbook probe clip.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = match &global.log_level {
        Some(level) => level.parse::<FfmpegLogLevel>()?,
        None if global.verbose => FfmpegLogLevel::Warning,
        None => FfmpegLogLevel::Error,
    };
    flipbook::set_ffmpeg_log_level(level);
    Ok(())
}

fn title_page(
    title: Option<String>,
    attribution: Option<String>,
    url: Option<String>,
) -> TitlePage {
    let defaults = TitlePage::default();
    TitlePage {
        title: title.unwrap_or(defaults.title),
        attribution: attribution.unwrap_or(defaults.attribution),
        url: url.unwrap_or(defaults.url),
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Sampling => "sampling",
        Phase::Layout => "layout",
        _ => "finishing",
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Convert {
            input,
            out,
            rate,
            per_page,
            quality,
            spacing,
            start,
            end,
            every_frame,
            title,
            attribution,
            url,
            staging,
            json,
        } => {
            let mut options = ConversionOptions::new()
                .with_sample_rate(rate)
                .with_frames_per_page(per_page)
                .with_quality(quality.parse::<Quality>()?)
                .with_spacing(spacing)
                .with_title_page(title_page(title, attribution, url));
            if let Some(start) = start {
                options = options.with_start(start);
            }
            if let Some(end) = end {
                options = options.with_end(end);
            }
            if every_frame {
                options = options.with_sampling_mode(SamplingMode::EveryFrame);
            }
            if let Some(staging) = staging {
                options = options.with_staging_dir(staging);
            }

            let converter = Converter::new(ConversionRequest::new(input, out, options));
            converter.validate()?;

            let task = converter.spawn();
            if cli.global.progress {
                let bar = ProgressBar::new(100);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {msg:>9} {bar:40.cyan/blue} {pos:>3}%",
                )?;
                bar.set_style(style.progress_chars("##-"));

                while !task.is_finished() {
                    bar.set_message(phase_label(task.phase()));
                    bar.set_position(u64::from(task.progress()));
                    thread::sleep(POLL_INTERVAL);
                }
                bar.finish_and_clear();
            }
            let report = task.join()?;

            if json {
                let payload = json!({
                    "document": report.document.display().to_string(),
                    "frames": report.frames,
                    "decoded_frames": report.decoded_frames,
                    "pages": report.pages,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Flipbook created: {} ({} frame(s), {} page(s))",
                        report.document.display(),
                        report.frames,
                        report.pages
                    )
                    .green()
                );
            }
        }
        Commands::Probe { input, json } => {
            let reader = VideoReader::open(&input)?;
            let metadata = reader.metadata();
            if json {
                let payload = json!({
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "duration_seconds": metadata.duration().as_secs_f64(),
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
                );
                println!("Frames: {}", metadata.frame_count);
                println!("Duration: {}", format_timecode(metadata.duration()));
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "flipbook", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
