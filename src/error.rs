use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error(
        "virtual environment not found at {}; create it with `python3 -m venv .venv` and install requirements",
        path.display()
    )]
    MissingRuntime { path: PathBuf },

    #[error("failed to launch {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("env error: {0}")]
    Env(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl LaunchError {
    /// Exit status reported to the caller, following shell `exec` conventions.
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::MissingRuntime { .. } => 1,
            LaunchError::Exec { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            LaunchError::Env(_) | LaunchError::Io(_) => 1,
        }
    }
}

pub type LaunchResult<T> = Result<T, LaunchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_runtime_exits_one_and_names_path() {
        let err = LaunchError::MissingRuntime {
            path: PathBuf::from("/srv/app/.venv"),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("/srv/app/.venv"));
    }

    #[test]
    fn exec_codes_follow_shell() {
        let not_found = LaunchError::Exec {
            program: "uvicorn".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let denied = LaunchError::Exec {
            program: "uvicorn".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let other = LaunchError::Exec {
            program: "uvicorn".into(),
            source: io::Error::other("boom"),
        };
        assert_eq!(not_found.exit_code(), 127);
        assert_eq!(denied.exit_code(), 126);
        assert_eq!(other.exit_code(), 1);
        assert!(not_found.to_string().contains("uvicorn"));
    }
}
