use crate::config::LaunchConfig;
use crate::error::{LaunchError, LaunchResult};
use crate::guard::{is_executable, Runtime};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Command;

/// Server argv after the program: entry point, `--reload`, optional bind overrides.
pub fn server_args(cfg: &LaunchConfig) -> Vec<String> {
    let mut args = vec![cfg.app.clone(), "--reload".to_string()];
    if let Some(host) = &cfg.host {
        args.push("--host".to_string());
        args.push(host.clone());
    }
    if let Some(port) = cfg.port {
        args.push("--port".to_string());
        args.push(port.to_string());
    }
    args
}

/// `PATH` with the venv's executables directory in front.
pub fn activated_path(bin_dir: &Path, current: Option<&OsStr>) -> LaunchResult<OsString> {
    let mut dirs = vec![bin_dir.to_path_buf()];
    if let Some(current) = current {
        dirs.extend(std::env::split_paths(current));
    }
    std::env::join_paths(dirs).map_err(|e| LaunchError::Env(format!("PATH: {e}")))
}

/// Build the server command the way `source .venv/bin/activate && uvicorn ...` would run it.
pub fn build_command(cfg: &LaunchConfig, rt: &Runtime) -> LaunchResult<Command> {
    let program: OsString = match rt.program(&cfg.server) {
        Some(p) => {
            if !is_executable(&p) {
                tracing::warn!("{} is not executable", p.display());
            }
            p.into_os_string()
        }
        None => {
            tracing::debug!("{} not in {}, resolving from PATH", cfg.server, rt.bin_dir.display());
            OsString::from(&cfg.server)
        }
    };

    let path = activated_path(&rt.bin_dir, std::env::var_os("PATH").as_deref())?;

    let mut cmd = Command::new(program);
    cmd.args(server_args(cfg))
        .current_dir(&cfg.root)
        .env("VIRTUAL_ENV", &rt.dir)
        .env("PATH", path)
        .env_remove("PYTHONHOME");
    Ok(cmd)
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace the current process with the server. Only returns on failure.
#[cfg(unix)]
pub fn replace_process(mut cmd: Command) -> LaunchResult<u8> {
    use std::os::unix::process::CommandExt;

    tracing::info!("starting {}", describe(&cmd));
    let source = cmd.exec();
    Err(LaunchError::Exec {
        program: cmd.get_program().to_string_lossy().into_owned(),
        source,
    })
}

/// No exec here: run the server as a child and hand back its status.
#[cfg(not(unix))]
pub fn replace_process(mut cmd: Command) -> LaunchResult<u8> {
    tracing::info!("starting {}", describe(&cmd));
    let status = cmd.status().map_err(|source| LaunchError::Exec {
        program: cmd.get_program().to_string_lossy().into_owned(),
        source,
    })?;
    Ok(status_code(status.code()))
}

/// Child status as a launcher exit code; anything outside 0..=255 reports failure.
#[cfg(any(not(unix), test))]
fn status_code(code: Option<i32>) -> u8 {
    code.and_then(|c| u8::try_from(c).ok()).unwrap_or(1)
}
