// `.env` file support
//
// A `.env` in the working directory supplies the same variables as the
// process environment (TOKEN, DADATA_KEY, ...). Variables already set in the
// process win, the way `dotenv` loaders leave existing variables alone.

use std::collections::HashMap;
use std::path::Path;

use crate::settings::ConfigError;

/// Default `.env` location, relative to the working directory
pub const DOTENV_FILE: &str = ".env";

#[derive(Default, Clone)]
pub struct DotEnv {
    vars: HashMap<String, String>,
}

impl std::fmt::Debug for DotEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();
        f.debug_struct("DotEnv").field("names", &names).finish()
    }
}

impl DotEnv {
    /// Parse `path`. A missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        };

        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => return Ok(Self::default()),
            Err(e) => return Err(parse_error(e.to_string())),
        };

        let mut vars = HashMap::new();
        for item in iter {
            let (name, value) = item.map_err(|e| parse_error(e.to_string()))?;
            vars.insert(name, value);
        }
        Ok(Self { vars })
    }

    /// `.env` in the working directory.
    pub fn from_cwd() -> Result<Self, ConfigError> {
        Self::load(Path::new(DOTENV_FILE))
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    /// Lookup that asks `process` first and falls back to this file.
    pub fn layered<'a>(
        &'a self,
        process: &'a dyn Fn(&str) -> Option<String>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| process(name).or_else(|| self.get(name))
    }
}
