use anyhow::{bail, Context, Result};
use cardio_lib::{
    config::{read_config, AnalysisConfig},
    detectors::rpeak::detect_r_peaks,
    io::{
        binary::{self, load_signal, signal_from_samples},
        csv as csv_io, text as text_io,
    },
    metrics::hrv::hrv_time,
    pipeline::{AnalysisOutcome, Analyzer},
    risk::knowledge::knowledge_base,
    signal::{RRSeries, RawSignal},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::info;
use serde_json::json;
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "cardio",
    version,
    about = "Single-lead ECG analysis and disease-risk screening"
)]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ByteOrderArg {
    Little,
    Big,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SampleFormatArg {
    I16,
    I32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// Raw integer samples
    Binary,
    /// One sample per line
    Text,
    /// One column of a CSV file with headers
    Csv,
}

impl InputFormat {
    fn from_extension(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            Some(ext) if ext.eq_ignore_ascii_case("txt") => InputFormat::Text,
            _ => InputFormat::Binary,
        }
    }
}

/// Config file plus per-field overrides.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// TOML file with [loader] and [detector] tables
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    sample_rate: Option<f64>,
    #[arg(long)]
    byte_order: Option<ByteOrderArg>,
    #[arg(long)]
    sample_format: Option<SampleFormatArg>,
    #[arg(long)]
    gain: Option<f64>,
    #[arg(long)]
    min_duration_s: Option<f64>,
    #[arg(long)]
    threshold_k: Option<f64>,
    #[arg(long)]
    refractory_s: Option<f64>,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => AnalysisConfig::default(),
        };
        let loader = &mut config.loader;
        if let Some(fs) = self.sample_rate {
            loader.sample_rate = fs;
        }
        if let Some(order) = self.byte_order {
            loader.byte_order = match order {
                ByteOrderArg::Little => binary::ByteOrder::Little,
                ByteOrderArg::Big => binary::ByteOrder::Big,
            };
        }
        if let Some(format) = self.sample_format {
            loader.sample_format = match format {
                SampleFormatArg::I16 => binary::SampleFormat::I16,
                SampleFormatArg::I32 => binary::SampleFormat::I32,
            };
        }
        if let Some(gain) = self.gain {
            loader.gain = gain;
        }
        if let Some(min) = self.min_duration_s {
            loader.min_duration_s = min;
        }
        let detector = &mut config.detector;
        if let Some(k) = self.threshold_k {
            detector.threshold_k = k;
        }
        if let Some(r) = self.refractory_s {
            detector.refractory_s = r;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis on one recording and print the outcome as JSON
    Analyze {
        #[arg(long)]
        input: PathBuf,
        /// Defaults to the file extension (.csv, .txt, otherwise binary)
        #[arg(long)]
        format: Option<InputFormat>,
        /// Sample column for CSV input
        #[arg(long, default_value = "ecg")]
        column: String,
        /// Add the N highest-scoring risks as `top_risks`
        #[arg(long)]
        top: Option<usize>,
        /// Write the JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Detect R-peaks and print their sample indices
    DetectRpeaks {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        format: Option<InputFormat>,
        #[arg(long, default_value = "ecg")]
        column: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Time-domain HRV from newline-delimited RR intervals (ms), stdin or --input
    Hrv {
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the disease knowledge base
    KnowledgeBase,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();
    match cli.command {
        Commands::Analyze {
            input,
            format,
            column,
            top,
            out,
            config,
        } => cmd_analyze(&input, format, &column, top, out.as_deref(), &config)?,
        Commands::DetectRpeaks {
            input,
            format,
            column,
            config,
        } => cmd_detect_rpeaks(&input, format, &column, &config)?,
        Commands::Hrv { input } => cmd_hrv(input.as_deref())?,
        Commands::KnowledgeBase => cmd_knowledge_base()?,
    }
    Ok(())
}

/// Samples already decoded from a text or CSV source.
fn read_decoded(path: &Path, format: InputFormat, column: &str) -> Result<Option<Vec<f64>>> {
    match format {
        InputFormat::Binary => Ok(None),
        InputFormat::Text => text_io::read_values(path).map(Some),
        InputFormat::Csv => csv_io::read_sample_column(path, column).map(Some),
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_analyze(
    input: &Path,
    format: Option<InputFormat>,
    column: &str,
    top: Option<usize>,
    out: Option<&Path>,
    config: &ConfigArgs,
) -> Result<()> {
    let analyzer = Analyzer::new(config.resolve()?);
    let format = format.unwrap_or_else(|| InputFormat::from_extension(input));
    let name = display_name(input);
    let result = match read_decoded(input, format, column)? {
        Some(samples) => analyzer.analyze_samples(&name, samples),
        None => analyzer.analyze(&name, &read_bytes(input)?),
    };

    let top_risks = match (&result, top) {
        (Ok(r), Some(n)) => Some(
            r.top_risks(n)
                .into_iter()
                .map(|(disease, entry)| {
                    json!({
                        "disease": disease,
                        "score": entry.score,
                        "severity": entry.severity,
                    })
                })
                .collect::<Vec<_>>(),
        ),
        _ => None,
    };
    let failure = result.as_ref().err().map(|e| e.to_string());

    let mut js = serde_json::to_value(AnalysisOutcome::from(result))?;
    if let (Some(ranked), Some(obj)) = (top_risks, js.as_object_mut()) {
        obj.insert("top_risks".into(), ranked.into());
    }
    let text = serde_json::to_string_pretty(&js)?;
    match out {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    if let Some(message) = failure {
        bail!("analysis of {} failed: {}", name, message);
    }
    Ok(())
}

fn cmd_detect_rpeaks(
    input: &Path,
    format: Option<InputFormat>,
    column: &str,
    config: &ConfigArgs,
) -> Result<()> {
    let config = config.resolve()?;
    let format = format.unwrap_or_else(|| InputFormat::from_extension(input));
    let signal: RawSignal = match read_decoded(input, format, column)? {
        Some(samples) => signal_from_samples(samples, &config.loader)?,
        None => load_signal(&read_bytes(input)?, &config.loader)?,
    };
    let events = detect_r_peaks(&signal, &config.detector);
    println!("{}", serde_json::to_string(&events)?);
    Ok(())
}

fn cmd_hrv(input: Option<&Path>) -> Result<()> {
    let rr = match input {
        Some(path) => text_io::read_values(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_values(&buf)?
        }
    };
    let m = hrv_time(&RRSeries { rr });
    println!("{}", serde_json::to_string(&m)?);
    Ok(())
}

fn cmd_knowledge_base() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(knowledge_base())?);
    Ok(())
}
