use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ibis_lib::{
    artifacts::{find_artifacts, run_correction, ArtifactKind, ArtifactSet},
    config::IbisConfig,
    detectors::{Detector, Modality},
    io::text as text_io,
    metrics::hrv::hrv_time,
    signal::{RRSeries, TimeSeries},
    synth::{self, CleanRhythm},
};
use log::info;
use serde::Serialize;
use std::{
    collections::BTreeMap,
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "ibis",
    version,
    about = "IBIS: detect and correct artifacts in cardiac extrema"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModalityArg {
    Ecg,
    Ppg,
    Resp,
}

impl From<ModalityArg> for Modality {
    fn from(arg: ModalityArg) -> Self {
        match arg {
            ModalityArg::Ecg => Modality::Ecg,
            ModalityArg::Ppg => Modality::Ppg,
            ModalityArg::Resp => Modality::Resp,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect extrema in newline-delimited samples read from stdin or --input file
    Detect {
        #[arg(long, value_enum)]
        modality: ModalityArg,
        #[arg(long, default_value_t = 250.0)]
        fs: f64,
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write peaks (seconds, one per line) instead of printing JSON
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Detect and correct artifacts in a peak file
    Correct {
        #[arg(long)]
        peaks: PathBuf,
        #[arg(long)]
        fs: f64,
        /// Apply a single classify/correct pass
        #[arg(long)]
        single_pass: bool,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Report artifacts in a peak file without correcting them
    Classify {
        #[arg(long)]
        peaks: PathBuf,
        #[arg(long)]
        fs: f64,
    },
    /// Time-domain HRV of a peak file
    Stats {
        #[arg(long)]
        peaks: PathBuf,
        #[arg(long)]
        fs: f64,
    },
    /// Write a synthetic peak file, optionally with misaligned beats
    Simulate {
        #[arg(long, default_value_t = 1000)]
        beats: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 1000.0)]
        fs: f64,
        /// Delay every K-th beat by twice the RMSSD of the clean rhythm
        #[arg(long)]
        misalign_every: Option<usize>,
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct CorrectionReport {
    input_peaks: usize,
    output_peaks: usize,
    passes: usize,
    converged: bool,
    artifacts: BTreeMap<String, usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect {
            modality,
            fs,
            input,
            output,
            config,
        } => cmd_detect(
            modality.into(),
            fs,
            input.as_deref(),
            output.as_deref(),
            config.as_deref(),
        )?,
        Commands::Correct {
            peaks,
            fs,
            single_pass,
            output,
            config,
        } => cmd_correct(&peaks, fs, single_pass, output.as_deref(), config.as_deref())?,
        Commands::Classify { peaks, fs } => cmd_classify(&peaks, fs)?,
        Commands::Stats { peaks, fs } => cmd_stats(&peaks, fs)?,
        Commands::Simulate {
            beats,
            seed,
            fs,
            misalign_every,
            output,
        } => cmd_simulate(beats, seed, fs, misalign_every, &output)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<IbisConfig> {
    match path {
        Some(path) => IbisConfig::load(path),
        None => Ok(IbisConfig::default()),
    }
}

fn read_samples(input: Option<&Path>) -> Result<Vec<f64>> {
    match input {
        Some(path) => text_io::read_f64_series(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_f64_series(&buf)
        }
    }
}

fn cmd_detect(
    modality: Modality,
    fs: f64,
    input: Option<&Path>,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let ts = TimeSeries {
        fs,
        data: read_samples(input)?,
    };
    let events = Detector::for_modality(modality, &config).detect(&ts);
    match output {
        Some(path) => {
            text_io::write_peaks(path, &events.indices, fs)?;
            info!("wrote {} {} peaks to {}", events.len(), modality, path.display());
        }
        None => println!("{}", serde_json::to_string(&events)?),
    }
    Ok(())
}

fn cmd_correct(
    peaks_path: &Path,
    fs: f64,
    single_pass: bool,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?.correction;
    if single_pass {
        config.iterative = false;
    }
    let peaks = text_io::read_peaks(peaks_path, fs)?;
    let outcome = run_correction(&peaks, fs, &config)
        .with_context(|| format!("correcting {}", peaks_path.display()))?;

    if let Some(path) = output {
        text_io::write_peaks(path, &outcome.peaks, fs)?;
        info!("wrote {} corrected peaks to {}", outcome.peaks.len(), path.display());
    }
    let report = CorrectionReport {
        input_peaks: peaks.len(),
        output_peaks: outcome.peaks.len(),
        passes: outcome.passes,
        converged: outcome.converged,
        artifacts: artifact_counts(&outcome.initial),
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn artifact_counts(artifacts: &ArtifactSet) -> BTreeMap<String, usize> {
    [
        ArtifactKind::Ectopic,
        ArtifactKind::Missed,
        ArtifactKind::Extra,
        ArtifactKind::LongShort,
    ]
    .into_iter()
    .map(|kind| (kind.to_string(), artifacts.list(kind).len()))
    .collect()
}

fn cmd_classify(peaks_path: &Path, fs: f64) -> Result<()> {
    let peaks = text_io::read_peaks(peaks_path, fs)?;
    let artifacts = find_artifacts(&peaks, fs)
        .with_context(|| format!("classifying {}", peaks_path.display()))?;
    println!("{}", serde_json::to_string(&artifacts)?);
    Ok(())
}

fn cmd_stats(peaks_path: &Path, fs: f64) -> Result<()> {
    let peaks = text_io::read_peaks(peaks_path, fs)?;
    let m = hrv_time(&RRSeries::from_peaks(&peaks, fs));
    println!("{}", serde_json::to_string(&m)?);
    Ok(())
}

fn cmd_simulate(
    beats: usize,
    seed: u64,
    fs: f64,
    misalign_every: Option<usize>,
    output: &Path,
) -> Result<()> {
    let rhythm = CleanRhythm {
        n_beats: beats,
        ..CleanRhythm::default()
    };
    let ibis = rhythm.generate(seed)?;
    let mut peaks = synth::peaks_from_ibis(&ibis, fs);
    if let Some(every) = misalign_every {
        let shift = (2.0 * synth::rmssd_of_peaks(&peaks)).round() as usize;
        peaks = synth::misalign(&peaks, every, every / 2, shift);
        info!("misaligned every {every}th beat by {shift} samples");
    }
    text_io::write_peaks(output, &peaks, fs)?;
    info!("wrote {} simulated peaks to {}", peaks.len(), output.display());
    Ok(())
}
