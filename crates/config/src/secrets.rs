// Secret resolution
//
// Secrets (bot token, lookup API key) come from:
// 1. Environment variables (preferred for deployments)
// 2. The config file (fallback)
//
// The first non-empty value wins.

/// Where a secret was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    File,
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Environment => "environment",
            KeySource::File => "file",
            KeySource::None => "none",
        }
    }
}

/// Result of a secret lookup
#[derive(Clone, PartialEq, Eq)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

impl std::fmt::Debug for KeyLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLookup")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve a secret from the first set environment variable in `env_names`,
/// then from the config file value.
pub fn resolve(
    file_value: Option<&str>,
    env_names: &[&str],
    env: &dyn Fn(&str) -> Option<String>,
) -> KeyLookup {
    for name in env_names {
        if let Some(key) = env(name) {
            if !key.trim().is_empty() {
                return KeyLookup {
                    key: Some(key.trim().to_string()),
                    source: KeySource::Environment,
                };
            }
        }
    }

    match file_value.map(str::trim) {
        Some(key) if !key.is_empty() => KeyLookup {
            key: Some(key.to_string()),
            source: KeySource::File,
        },
        _ => KeyLookup {
            key: None,
            source: KeySource::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_environment_wins() {
        let env = env_of(&[("DADATA_KEY", "from-env")]);
        let lookup = resolve(Some("from-file"), &["DADATA_KEY"], &env);
        assert_eq!(lookup.key.as_deref(), Some("from-env"));
        assert_eq!(lookup.source, KeySource::Environment);
    }

    #[test]
    fn test_second_env_name() {
        let env = env_of(&[("INNBOT_DADATA_KEY", "alt")]);
        let lookup = resolve(None, &["DADATA_KEY", "INNBOT_DADATA_KEY"], &env);
        assert_eq!(lookup.key.as_deref(), Some("alt"));
    }

    #[test]
    fn test_blank_env_falls_back_to_file() {
        let env = env_of(&[("DADATA_KEY", "  ")]);
        let lookup = resolve(Some("from-file"), &["DADATA_KEY"], &env);
        assert_eq!(lookup.source, KeySource::File);
    }

    #[test]
    fn test_missing() {
        let env = env_of(&[]);
        let lookup = resolve(Some(""), &["DADATA_KEY"], &env);
        assert_eq!(lookup.key, None);
        assert_eq!(lookup.source.as_str(), "none");
    }

    #[test]
    fn test_debug_redacts() {
        let lookup = KeyLookup { key: Some("secret".into()), source: KeySource::File };
        assert!(!format!("{:?}", lookup).contains("secret"));
    }
}
