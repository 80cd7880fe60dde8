use std::{io, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use env_logger::Env;
use framemood::{
    AnalysisOptions, ClassifierCache, Container, FfmpegLogLevel, MediaKind, MediaUpload,
    OnnxConfig, OnnxImageClassifier, ProgressCallback, ProgressInfo, Report, Sentiment,
    SummaryTable, TextAnalysis, VideoAnalyzer, classify_image_file, summarize,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framemood analyze-video clip.mp4 --model emotion.onnx --labels labels.txt\n  cat clip.mov | framemood analyze-video - --container mov --model emotion.onnx --labels labels.txt --json\n  framemood analyze-image face.jpg --model emotion.onnx --labels labels.txt\n  framemood blend --emotion sadness --sentiment positive\n  framemood completions zsh > _framemood";

static CLASSIFIER: ClassifierCache<OnnxImageClassifier> = ClassifierCache::new();

#[derive(Debug, Parser)]
#[command(
    name = "framemood",
    version,
    about = "Detect emotions in videos, images, and text classifier output",
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
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while sampling.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Parser, Clone)]
struct ModelOptions {
    /// ONNX image classification model.
    #[arg(long)]
    model: PathBuf,

    /// Labels file, one class name per line in model output order.
    #[arg(long)]
    labels: PathBuf,

    /// Square model input size in pixels.
    #[arg(long, default_value_t = 224)]
    input_size: u32,

    /// Use ImageNet mean/std instead of 0.5/0.5.
    #[arg(long)]
    imagenet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sample video frames and classify each one.
    #[command(
        about = "Analyze emotions across video frames",
        after_help = "Examples:\n  framemood analyze-video clip.mp4 --model emotion.onnx --labels labels.txt --stride 5 --cap 300"
    )]
    AnalyzeVideo {
        /// Input video path (mp4, mov, avi), or `-` to read from stdin.
        input: String,
        /// Container of stdin input.
        #[arg(long)]
        container: Option<String>,
        /// Classify every Nth frame.
        #[arg(long, default_value_t = framemood::DEFAULT_STRIDE)]
        stride: u64,
        /// Stop once the frame index reaches this value (exclusive).
        #[arg(long, default_value_t = framemood::DEFAULT_CAP)]
        cap: u64,
        #[command(flatten)]
        model: ModelOptions,
        /// Output the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Classify a single image.
    #[command(about = "Analyze the emotion in one image")]
    AnalyzeImage {
        /// Input image path (jpg, jpeg, png).
        input: PathBuf,
        #[command(flatten)]
        model: ModelOptions,
        #[arg(long)]
        json: bool,
    },

    /// Blend text-emotion and sentiment classifier labels.
    #[command(
        about = "Blend emotion and sentiment labels",
        after_help = "Examples:\n  framemood blend --emotion joy --sentiment negative"
    )]
    Blend {
        #[arg(long)]
        emotion: String,
        #[arg(long)]
        sentiment: String,
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        framemood::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn load_classifier(
    options: &ModelOptions,
) -> Result<Arc<OnnxImageClassifier>, Box<dyn std::error::Error>> {
    let classifier = CLASSIFIER.get_or_load(|| {
        let mut config = OnnxConfig::new(&options.model, &options.labels)
            .with_input_size(options.input_size);
        if options.imagenet {
            config = config.with_imagenet_normalization();
        }
        OnnxImageClassifier::load(config).map(Arc::new)
    })?;
    Ok(classifier)
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        match info.current_frame {
            Some(frame) => self.bar.set_message(format!("frame {frame}")),
            None => self.bar.finish_with_message("done"),
        }
    }
}

fn print_report(report: &Report, summary: &SummaryTable) {
    println!("{}", "Sample Detected Emotions:".bold());
    print!("{report}");
    if let Some((label, count)) = summary.dominant() {
        println!(
            "{} {} ({} of {} sampled frames)",
            "dominant:".green().bold(),
            label,
            count,
            report.frames_classified()
        );
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    match cli.command {
        Commands::AnalyzeVideo {
            input,
            container,
            stride,
            cap,
            model,
            json,
        } => {
            let mut options = AnalysisOptions::new().with_stride(stride).with_cap(cap);
            options.validate()?;
            if cli.global.progress {
                options = options.with_progress(Arc::new(BarProgress::new()?));
            }

            let upload = if input == "-" {
                let container = container.ok_or("--container is required when reading stdin")?;
                let container = Container::from_extension(&container)?;
                if container.kind() != MediaKind::Video {
                    return Err(format!("{container} is not a video container").into());
                }
                Some(MediaUpload::from_reader(io::stdin().lock(), container)?)
            } else {
                Container::expect_kind(&input, MediaKind::Video)?;
                None
            };

            let classifier = load_classifier(&model)?;
            let mut analyzer = VideoAnalyzer::new(classifier.as_ref(), options);
            let log = match &upload {
                Some(upload) => analyzer.run_file(upload.path())?,
                None => analyzer.run_file(&input)?,
            };
            let report = Report::from_log(&log);

            if json {
                let mut payload = report.to_json();
                payload["input"] = json!(input);
                payload["stride"] = json!(stride);
                payload["cap"] = json!(cap);
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!("Video processing complete ({} sampled frames)", log.len()).green()
                );
                if log.failure_count() > 0 {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!("{} frame(s) failed to classify", log.failure_count()).yellow()
                    );
                }
                print_report(&report, &summarize(&log));
            }
        }
        Commands::AnalyzeImage { input, model, json } => {
            Container::expect_kind(&input, MediaKind::Image)?;
            let classifier = load_classifier(&model)?;
            let prediction = classify_image_file(classifier.as_ref(), &input)?;

            if json {
                let payload = json!({
                    "input": input.display().to_string(),
                    "emotion": prediction.label,
                    "confidence": prediction.confidence,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {} ({:.2})",
                    "Detected Emotion:".green().bold(),
                    prediction.label,
                    prediction.confidence
                );
            }
        }
        Commands::Blend {
            emotion,
            sentiment,
            json,
        } => {
            let sentiment: Sentiment = sentiment.parse()?;
            let analysis = TextAnalysis::new(emotion, sentiment);
            if json {
                let payload = json!({
                    "emotion": analysis.emotion,
                    "sentiment": analysis.sentiment.to_string(),
                    "final": analysis.blended,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", analysis.to_string().green());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framemood", &mut io::stdout());
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
