use std::path::{Path, PathBuf};

pub const CREDENTIAL_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_VENV: &str = ".venv";
const DEFAULT_SERVER: &str = "uvicorn";
const DEFAULT_APP: &str = "main:app";

/// Files that mark the application's directory, in order of preference.
const ROOT_MARKERS: &[&str] = &["main.py", "requirements.txt"];

#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub root: PathBuf,
    pub venv_dir: PathBuf,
    pub server: String,
    pub app: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: String,
}

impl LaunchConfig {
    pub fn from_env(root: PathBuf) -> Self {
        Self::from_lookup(root, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(root: PathBuf, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let venv_dir = root.join(non_empty("REFINERY_VENV").unwrap_or_else(|| DEFAULT_VENV.to_string()));

        let port = non_empty("PORT").and_then(|raw| match raw.trim().parse::<u16>() {
            Ok(p) => Some(p),
            Err(_) => {
                tracing::warn!("ignoring PORT={raw}: not a valid port number");
                None
            }
        });

        Self {
            venv_dir,
            server: non_empty("REFINERY_SERVER").unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            app: non_empty("REFINERY_APP").unwrap_or_else(|| DEFAULT_APP.to_string()),
            host: non_empty("HOST"),
            port,
            model: non_empty(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            root,
        }
    }
}

/// Resolve the project root: `REFINERY_ROOT` if set, else discovery from `start_dir`.
pub fn resolve_root(start_dir: &Path) -> PathBuf {
    match std::env::var("REFINERY_ROOT") {
        Ok(r) if !r.trim().is_empty() => start_dir.join(r.trim()),
        _ => find_project_root(start_dir),
    }
}

pub fn find_project_root(start_dir: &Path) -> PathBuf {
    let mut dir = start_dir.to_path_buf();

    for _ in 0..12 {
        if ROOT_MARKERS.iter().any(|m| dir.join(m).is_file()) {
            return dir;
        }

        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => break,
        }
    }

    start_dir.to_path_buf()
}
