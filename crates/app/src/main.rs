// CLI modules
mod args;
mod logging;
mod op;
mod ops;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Decrypt, Encrypt, Inbox, Init, SharedKey, Sign, Version, Whoami};

command_enum! {
    (Init, Init),
    (Whoami, Whoami),
    (Sign, Sign),
    (SharedKey, SharedKey),
    (Encrypt, Encrypt),
    (Decrypt, Decrypt),
    (Inbox, Inbox),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Fall back to the default level until a config directory exists
    let log_level = state::AppState::load(args.config_path.clone())
        .map(|state| state.config.log_level)
        .unwrap_or_else(|_| state::DEFAULT_LOG_LEVEL.to_string());
    logging::init_logging(&log_level);

    let ctx = op::OpContext::new(args.config_path);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
