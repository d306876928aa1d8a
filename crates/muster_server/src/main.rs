use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use muster_core::init_logging;
use muster_server::config::DEFAULT_CONFIG_FILE;
use muster_server::{load_config, ServerError};

#[derive(Parser, Debug)]
#[command(name = "muster-server", version, about = "Muster drill attendance service")]
struct Args {
    /// TOML config file; missing files fall back to defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides `bind`.
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Overrides `log_level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=server_exit module=server status=error error={err}");
            eprintln!("muster-server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    init_logging(&config.log_level, config.log_dir_str()?).map_err(ServerError::Logging)?;
    muster_server::serve(config).await
}
