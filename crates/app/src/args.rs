pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sahara")]
#[command(about = "Sign transactions and exchange encrypted direct messages")]
pub struct Args {
    /// Path to the sahara config directory (defaults to ~/.sahara)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
