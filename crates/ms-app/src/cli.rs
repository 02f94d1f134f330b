use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// melscope: mel spectrogram rendering and image similarity in batch.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Absent = valeurs par défaut.
    #[arg(short, long, default_value = "melscope.toml", global = true)]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one mel spectrogram image per audio file of a directory.
    Spectrogram {
        /// Dossier des fichiers audio. Défaut : `batch.input_dir`.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Dossier de sortie des images. Défaut : `batch.output_dir`.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Score structural similarity between adjacent images of a directory.
    Compare {
        /// Dossier à analyser. Défaut : `batch.output_dir`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}
