use std::path::Path;

use anyhow::Result;
use clap::Parser;
use ms_audio::SymphoniaDecoder;
use ms_core::config::{MelscopeConfig, load_config};

pub mod batch;
pub mod cli;
pub mod compare;
pub mod spectrogram;

#[cfg(test)]
mod fixtures;

use batch::{AudioBatch, process_all_audio};
use cli::{Cli, Command};
use compare::{SimilarityScan, compare_adjacent};

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config
    let config = resolve_config(&cli.config)?;

    // 4. Lancer le pipeline demandé
    match cli.command {
        Command::Spectrogram { input, output } => {
            let input = input.unwrap_or_else(|| config.batch.input_dir.clone());
            let output = output.unwrap_or_else(|| config.batch.output_dir.clone());
            run_spectrograms(&input, &output, &config)
        }
        Command::Compare { dir } => {
            let dir = dir.unwrap_or_else(|| config.batch.output_dir.clone());
            run_compare(&dir, &config)
        }
    }
}

fn run_spectrograms(input: &Path, output: &Path, config: &MelscopeConfig) -> Result<()> {
    let batch = process_all_audio(&SymphoniaDecoder, input, output, config, |outcome| {
        println!("{outcome}");
    })?;
    match batch {
        AudioBatch::NoInputs { .. } => println!("{batch}"),
        AudioBatch::Completed(_) => log::info!("{batch}"),
    }
    Ok(())
}

fn run_compare(dir: &Path, config: &MelscopeConfig) -> Result<()> {
    match SimilarityScan::discover(dir, &config.similarity, config.batch.order)? {
        SimilarityScan::Insufficient { found } => {
            log::debug!("{found} image(s) in {}", dir.display());
            println!("Error: Need at least two images to compare.");
        }
        SimilarityScan::Ready(files) => {
            let shown = dir.display().to_string();
            println!("Comparing images in '{}/' directory:\n", shown.trim_end_matches('/'));
            let summary = compare_adjacent(&files, &config.similarity, |outcome| {
                println!("{outcome}");
            });
            log::info!(
                "{} pair(s): {} scored, {} skipped, {} failed",
                summary.total(),
                summary.scored,
                summary.skipped,
                summary.failed
            );
        }
    }
    Ok(())
}

/// Missing file = defaults; an unreadable or invalid file is an error.
fn resolve_config(path: &Path) -> Result<MelscopeConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            path.display()
        );
        Ok(MelscopeConfig::default())
    }
}
