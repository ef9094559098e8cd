// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildband — bind a folder of page images into one PDF.
//
// Entry point. Parses arguments, initialises logging, builds the assembly
// configuration, and runs the assembler over one directory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bildband_core::SortOrder;
use bildband_core::config::AssemblyConfig;
use bildband_core::error::BildbandError;
use bildband_core::human_errors::humanize_error;
use bildband_core::integrity::verify_hash;
use bildband_document::{Assembler, AssemblyReport, PdfReader};

/// Bind the images in a folder into one PDF, one full-bleed page per image,
/// in natural filename order (page2 before page10).
#[derive(Debug, Parser)]
#[command(name = "bildband", version, about)]
struct Cli {
    /// Folder containing the page images.
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Write the PDF here instead of <DIR>/<folder name>.pdf.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// JSON file with assembly settings; flags below override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JPEG quality for the re-encoded pages.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Page millimetres per image pixel.
    #[arg(long, value_name = "MM", conflicts_with = "dpi")]
    mm_per_pixel: Option<f64>,

    /// Treat images as scanned at this resolution (sets --mm-per-pixel to 25.4/DPI).
    #[arg(long)]
    dpi: Option<f64>,

    /// Sort file names as plain strings (page10 before page2).
    #[arg(long)]
    lexical: bool,

    /// Match extensions case-sensitively (.jpg but not .JPG).
    #[arg(long)]
    case_sensitive: bool,

    /// Image extension to pick up; repeat to list several. Replaces the default set.
    #[arg(long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// PDF title (defaults to the folder name).
    #[arg(long)]
    title: Option<String>,

    /// Re-read the written PDF and check its pages and checksum.
    #[arg(long)]
    verify: bool,

    /// Debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors; no per-file lines.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Configuration from the optional file, with flags applied on top.
    fn assembly_config(&self) -> Result<AssemblyConfig> {
        let mut config = match &self.config {
            Some(path) => AssemblyConfig::load(path)?,
            None => AssemblyConfig::default(),
        };

        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(mm_per_pixel) = self.mm_per_pixel {
            config.mm_per_pixel = mm_per_pixel;
        }
        if let Some(dpi) = self.dpi {
            config.set_dpi(dpi);
        }
        if self.lexical {
            config.ordering = SortOrder::Lexical;
        }
        if self.case_sensitive {
            config.case_sensitive_extensions = true;
        }
        if !self.extensions.is_empty() {
            config.extensions = self.extensions.clone();
        }
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if self.quiet {
            config.verbose_logging = false;
        }

        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Bildband failed");
            if let Some(bildband_err) = err.downcast_ref::<BildbandError>() {
                let human = humanize_error(bildband_err);
                eprintln!("{}\n{}", human.message, human.suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.assembly_config()?;
    tracing::debug!(?config, "Configuration");

    let assembler = Assembler::new(config)?;
    let report = assembler.assemble_directory(&cli.dir, cli.output.as_deref())?;

    if cli.verify {
        verify_output(&report)?;
    }

    tracing::info!(
        pages = report.pages.len(),
        skipped = report.skipped.len(),
        "PDF created: {}",
        report.output.display()
    );
    Ok(())
}

/// Read the written file back and compare it with the run report.
fn verify_output(report: &AssemblyReport) -> Result<()> {
    let bytes = std::fs::read(&report.output)
        .with_context(|| format!("re-reading {}", report.output.display()))?;
    verify_hash(&bytes, &report.sha256)?;

    let reader = PdfReader::from_bytes(&bytes)?;
    if reader.page_count() != report.pages.len() {
        bail!(
            "{} has {} pages, expected {}",
            report.output.display(),
            reader.page_count(),
            report.pages.len()
        );
    }

    tracing::info!(sha256 = %report.sha256, "Output verified");
    Ok(())
}
