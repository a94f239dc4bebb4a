mod config;
mod env;
mod error;
mod guard;
mod launch;

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::error::{LaunchError, LaunchResult};

/// Project root and the outcome of loading its `.env`, gathered before logging starts.
struct Bootstrap {
    root: PathBuf,
    loaded: LaunchResult<Vec<String>>,
}

fn main() -> ExitCode {
    // .env may carry RUST_LOG, so it is read before the subscriber is built
    let bootstrap = bootstrap();
    init_logging();

    match bootstrap.and_then(run) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e
                .downcast_ref::<LaunchError>()
                .map(LaunchError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_logging() {
    // an empty RUST_LOG would otherwise filter out every event
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn bootstrap() -> Result<Bootstrap> {
    let start_dir = std::env::current_dir().context("reading current directory")?;
    let root = config::resolve_root(&start_dir);
    let loaded = env::load_env(&root);
    Ok(Bootstrap { root, loaded })
}

fn run(bootstrap: Bootstrap) -> Result<u8> {
    let Bootstrap { root, loaded } = bootstrap;

    // .env problems leave the launch in degraded mode, same as a missing key
    match loaded {
        Ok(loaded) => {
            for file in loaded {
                tracing::debug!("loaded {file} from {}", root.display());
            }
        }
        Err(e) => tracing::warn!("{e}"),
    }

    let cfg = config::LaunchConfig::from_env(root);
    let runtime = guard::ensure_runtime(&cfg.venv_dir)?;

    if env::check_credential() == env::Credential::Present {
        tracing::debug!("credential present, app will use model {}", cfg.model);
    }

    let cmd = launch::build_command(&cfg, &runtime)?;
    Ok(launch::replace_process(cmd)?)
}
