// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — scan a document from an eSCL network scanner.
//
// Entry point. Parses arguments, initialises logging, then either dumps the
// scanner's capabilities (`--info`) or runs one scan job and saves the result.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::ScanParameters;
use scanwerk_escl::{EsclClient, JobOrchestrator, PollSchedule, ScannerInfo, TokioWaiter};

#[derive(Parser, Debug)]
#[command(name = "scanwerk")]
#[command(about = "Scan a document from an eSCL (AirScan) network scanner")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Scanner base URL, e.g. http://192.168.1.20:8080/
    url: String,

    /// Show scanner information and exit
    #[arg(short, long)]
    info: bool,

    /// With --info, print the information as JSON
    #[arg(long)]
    json: bool,

    /// Output file (default: <stem>_<YYYYmmdd-HHMMSS>.<ext>)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Document format
    #[arg(short = 't', long = "type", default_value = "jpg", value_parser = ["jpg", "jpeg", "pdf"])]
    format: String,

    /// Resolution in dpi, or auto for the highest the scanner offers
    #[arg(short, long, default_value = "auto")]
    resolution: String,

    /// Color mode: r24 (RGB) or g8 (grayscale)
    #[arg(short, long, default_value = "r24", value_parser = ["r24", "g8"])]
    color_mode: String,

    /// Scan size: a3, a4, a5, b5, us, letter, legal, max, or <W>x<H> in mm
    #[arg(short, long, default_value = "max")]
    size: String,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Trace logging, including the XML exchanged with the scanner
    #[arg(short = 'V', long)]
    very_verbose: bool,

    /// Give up after this many result polls
    #[arg(long, env = "SCANWERK_MAX_POLLS")]
    max_polls: Option<u32>,

    /// Seconds between result polls
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// JSON configuration file
    #[arg(long, env = "SCANWERK_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn scan_parameters(&self) -> Result<ScanParameters> {
        Ok(ScanParameters {
            format: self.format.parse()?,
            color_mode: self.color_mode.parse()?,
            resolution: self.resolution.parse()?,
            region: self.size.parse()?,
        })
    }

    /// Configuration file (or defaults) with command-line overrides applied.
    fn load_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load(path)?,
            None => ScanConfig::default(),
        };
        if let Some(max_polls) = self.max_polls {
            config.max_poll_attempts = max_polls;
        }
        if let Some(secs) = self.poll_interval {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ScanwerkError::Config(format!(
                    "invalid poll interval: {secs}"
                )));
            }
            config.poll_interval_ms = (secs * 1000.0).round() as u64;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }

    fn log_filter(&self) -> EnvFilter {
        let level = if self.very_verbose {
            "trace"
        } else if self.verbose {
            "debug"
        } else {
            return EnvFilter::new("info");
        };
        EnvFilter::new(format!(
            "info,scanwerk={level},scanwerk_escl={level},scanwerk_core={level}"
        ))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut output = None;
    match run(&cli, &mut output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(class = ?e.class(), "{e}");
            println!("{}", humanize_error(&e, output.as_deref()));
            ExitCode::FAILURE
        }
    }
}

/// Run one invocation. `output` is set as soon as the destination is known
/// so a failure can point the user at it.
async fn run(cli: &Cli, output: &mut Option<PathBuf>) -> Result<()> {
    let config = cli.load_config()?;
    let client = EsclClient::new(&cli.url, &config)?;

    if cli.info {
        return show_info(&client, &config, cli.json).await;
    }

    let params = cli.scan_parameters()?;
    let path = match &cli.out {
        Some(path) => path.clone(),
        None => output::default_filename(&config.output_stem, params.format, Local::now()),
    };
    *output = Some(path.clone());
    output::ensure_absent(&path)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling the scan");
            interrupt.cancel();
        }
    });

    info!(
        scanner = %client.base(),
        format = %params.format,
        color_mode = %params.color_mode,
        "starting scan"
    );
    let waiter = TokioWaiter::new(PollSchedule::from_config(&config), cancel);
    let mut orchestrator = JobOrchestrator::new(&client, waiter);
    let scan = orchestrator.scan(&params, &config).await?;
    info!(
        attempts = scan.attempts,
        resolution = scan.request.resolution,
        width = scan.request.width,
        height = scan.request.height,
        "scan finished"
    );

    output::write_document(&path, &scan.document, params.format)?;
    println!("{}", path.display());
    Ok(())
}

async fn show_info(client: &EsclClient, config: &ScanConfig, json: bool) -> Result<()> {
    let info = ScannerInfo::gather(client, config).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{info}");
    }
    Ok(())
}
