use crate::error::{LaunchError, LaunchResult};
use std::path::{Path, PathBuf};

#[cfg(unix)]
const BIN_DIR: &str = "bin";
#[cfg(not(unix))]
const BIN_DIR: &str = "Scripts";

/// A virtual environment that passed the precondition check.
#[derive(Debug, Clone)]
pub struct Runtime {
    pub dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl Runtime {
    /// Full path of `program` inside the venv, if the venv ships it.
    pub fn program(&self, program: &str) -> Option<PathBuf> {
        let direct = self.bin_dir.join(program);
        if direct.is_file() {
            return Some(direct);
        }
        #[cfg(not(unix))]
        {
            let exe = self.bin_dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    }
}

/// Fail fast unless `venv_dir` exists and is a directory.
pub fn ensure_runtime(venv_dir: &Path) -> LaunchResult<Runtime> {
    if !venv_dir.is_dir() {
        return Err(LaunchError::MissingRuntime {
            path: venv_dir.to_path_buf(),
        });
    }

    let dir = std::fs::canonicalize(venv_dir)?;
    let bin_dir = dir.join(BIN_DIR);
    if !bin_dir.is_dir() {
        tracing::warn!("{} has no {BIN_DIR}/ directory; is it a complete venv?", dir.display());
    }

    Ok(Runtime { dir, bin_dir })
}

/// Whether `path` is executable by the current user.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    nix::unistd::access(path, nix::unistd::AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
