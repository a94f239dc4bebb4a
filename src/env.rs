use crate::config::CREDENTIAL_VAR;
use crate::error::{LaunchError, LaunchResult};
use std::path::Path;

/// Load `<root>/.env` into the process env without overriding what is already set.
/// Values it sets then get a few passes of ${VAR} and ${VAR:-default} expansion;
/// inherited variables are left untouched.
pub fn load_env(root: &Path) -> LaunchResult<Vec<String>> {
    let mut loaded: Vec<String> = Vec::new();

    let base = root.join(".env");
    if !base.is_file() {
        return Ok(loaded);
    }

    let env_err = |e: dotenvy::Error| LaunchError::Env(format!("{}: {e}", base.display()));
    let mut defined: Vec<String> = Vec::new();
    for item in dotenvy::from_path_iter(&base).map_err(env_err)? {
        let (key, value) = item.map_err(env_err)?;
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, value);
            defined.push(key);
        }
    }
    loaded.push(".env".to_string());

    for _pass in 0..5 {
        let mut changes = 0;

        for key in &defined {
            // non-UTF-8 values cannot hold a reference we could expand
            let Ok(val) = std::env::var(key) else {
                continue;
            };
            if !val.contains("${") {
                continue;
            }
            let new_val = expand_value(key, &val, |name| std::env::var(name).ok());
            if new_val != val {
                std::env::set_var(key, new_val);
                changes += 1;
            }
        }
        if changes == 0 {
            break;
        }
    }

    Ok(loaded)
}

/// Replace `${NAME}` and `${NAME:-default}` in `input`. A variable never resolves itself.
fn expand_value<F>(current_key: &str, input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);

        let inner = &rest[start + 2..start + 2 + len];
        let (name, default) = match inner.split_once(":-") {
            Some((n, d)) => (n, Some(d)),
            None => (inner, None),
        };

        let resolved = (name != current_key)
            .then(|| lookup(name))
            .flatten()
            .filter(|v| !v.is_empty());

        if let Some(v) = resolved {
            out.push_str(&v);
        } else if let Some(d) = default {
            out.push_str(d);
        }

        rest = &rest[start + 2 + len + 1..];
    }

    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Present,
    Missing,
    Blank,
}

impl Credential {
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            None => Credential::Missing,
            Some(v) if v.trim().is_empty() => Credential::Blank,
            Some(_) => Credential::Present,
        }
    }

    pub fn warning(&self) -> Option<String> {
        match self {
            Credential::Present => None,
            Credential::Missing => Some(format!(
                "{CREDENTIAL_VAR} is not set; the app will start but refinement requests will fail"
            )),
            Credential::Blank => Some(format!(
                "{CREDENTIAL_VAR} is empty; the app will start but refinement requests will fail"
            )),
        }
    }
}

/// Check the API credential in the process env and warn when it is absent.
pub fn check_credential() -> Credential {
    let value = std::env::var(CREDENTIAL_VAR).ok();
    let status = Credential::from_value(value.as_deref());
    if let Some(msg) = status.warning() {
        tracing::warn!("{msg}");
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |k| pairs.iter().find(|(n, _)| *n == k).map(|(_, v)| v.to_string())
    }

    #[test]
    fn expands_known_and_default_refs() {
        let lookup = vars(&[("HOME_DIR", "/home/me")]);
        assert_eq!(
            expand_value("X", "${HOME_DIR}/app:${MISSING:-fallback}", lookup),
            "/home/me/app:fallback"
        );
    }

    #[test]
    fn self_reference_uses_default_or_nothing() {
        let lookup = vars(&[("PORT", "${PORT:-8000}")]);
        assert_eq!(expand_value("PORT", "${PORT:-8000}", &lookup), "8000");
        assert_eq!(expand_value("PORT", "x${PORT}y", &lookup), "xy");
    }

    #[test]
    fn empty_value_falls_to_default() {
        let lookup = vars(&[("MODEL", "")]);
        assert_eq!(expand_value("X", "${MODEL:-gpt-4o-mini}", lookup), "gpt-4o-mini");
    }

    #[test]
    fn unterminated_reference_is_kept() {
        let lookup = vars(&[]);
        assert_eq!(expand_value("X", "a${B", lookup), "a${B");
    }

    #[test]
    fn dotenv_values_expand_but_inherited_values_do_not() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "LOADENV_T_BASE=one\nLOADENV_T_DERIVED='${LOADENV_T_BASE}-two'\nLOADENV_T_KEPT=from-file\n",
        )
        .unwrap();
        std::env::set_var("LOADENV_T_KEPT", "from-shell");
        std::env::set_var("LOADENV_T_INHERITED", "literal ${LOADENV_T_BASE} text");

        assert_eq!(load_env(dir.path()).unwrap(), vec![".env"]);

        assert_eq!(std::env::var("LOADENV_T_DERIVED").unwrap(), "one-two");
        assert_eq!(std::env::var("LOADENV_T_KEPT").unwrap(), "from-shell");
        assert_eq!(
            std::env::var("LOADENV_T_INHERITED").unwrap(),
            "literal ${LOADENV_T_BASE} text"
        );
    }

    #[test]
    fn no_dotenv_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn credential_states() {
        assert_eq!(Credential::from_value(None), Credential::Missing);
        assert_eq!(Credential::from_value(Some("")), Credential::Blank);
        assert_eq!(Credential::from_value(Some("  \t")), Credential::Blank);
        assert_eq!(Credential::from_value(Some("sk-abc")), Credential::Present);
    }

    #[test]
    fn warning_names_variable_only_when_absent() {
        assert!(Credential::Present.warning().is_none());
        for c in [Credential::Missing, Credential::Blank] {
            let msg = c.warning().unwrap();
            assert!(msg.contains("OPENAI_API_KEY"), "{msg}");
        }
    }
}
