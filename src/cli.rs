// cli.rs - command-line configuration for the walkthrough driver
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "tour-viewer")]
#[command(about = "Scroll-driven 3D tour walkthrough", long_about = None)]
pub struct Cli {
    /// glTF environment asset; the built-in demo cottage is used when absent
    #[arg(long)]
    pub asset: Option<PathBuf>,

    /// JSON tour script overriding the built-in one
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Scroll steps the scripted walkthrough takes from start to end
    #[arg(long, default_value_t = 400)]
    pub steps: usize,
}
