//! Stock providers: files, in-memory bytes and environment variables.

use super::Provider;
use crate::error::Result;
use crate::path::DEFAULT_DELIMITER;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads a file from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Provider for FileProvider {
    fn read(&self) -> Result<Vec<u8>> {
        debug!(path = %self.path.display(), "reading config file");
        Ok(std::fs::read(&self.path)?)
    }
}

/// Serves bytes held in memory, e.g. defaults embedded with `include_str!`.
#[derive(Debug, Clone)]
pub struct BytesProvider {
    content: Cow<'static, [u8]>,
}

impl BytesProvider {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: Cow::Owned(content.into()),
        }
    }

    pub fn from_static(content: &'static str) -> Self {
        Self {
            content: Cow::Borrowed(content.as_bytes()),
        }
    }
}

impl Provider for BytesProvider {
    fn read(&self) -> Result<Vec<u8>> {
        Ok(self.content.to_vec())
    }
}

/// Renders prefixed environment variables as `key=value` lines for
/// [`super::KeyValueParser`].
///
/// `APP_DATABASE__PORT=5432` with prefix `APP_` becomes `database.port=5432`:
/// the prefix is stripped, the name lowercased and `__` replaced by the
/// delimiter.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    prefix: String,
    delimiter: char,
    vars: Option<Vec<(String, String)>>,
}

impl EnvProvider {
    /// Read from the process environment at `read` time.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: DEFAULT_DELIMITER,
            vars: None,
        }
    }

    /// Read from a fixed set of variables instead of the process environment.
    pub fn with_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            delimiter: DEFAULT_DELIMITER,
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Map a variable name to a path, or `None` if it lacks the prefix.
    fn key_for(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix(&self.prefix)?;
        if rest.is_empty() {
            return None;
        }
        Some(
            rest.to_lowercase()
                .replace("__", &self.delimiter.to_string()),
        )
    }
}

impl Provider for EnvProvider {
    fn read(&self) -> Result<Vec<u8>> {
        let vars: Vec<(String, String)> = match &self.vars {
            Some(vars) => vars.clone(),
            None => std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        };

        let mut out = String::new();
        for (name, value) in vars {
            let Some(key) = self.key_for(&name) else {
                continue;
            };
            if value.contains('\n') {
                warn!(var = %name, "skipping multi-line environment value");
                continue;
            }
            out.push_str(&key);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_provider_reads_and_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("c.yaml");
        std::fs::write(&path, "a: 1\n").unwrap();
        assert_eq!(FileProvider::new(&path).read().unwrap(), b"a: 1\n");

        let missing = FileProvider::new(temp.path().join("missing.yaml"));
        assert!(matches!(missing.read(), Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_bytes_provider() {
        assert_eq!(BytesProvider::from_static("x").read().unwrap(), b"x");
        assert_eq!(BytesProvider::new(vec![1u8, 2]).read().unwrap(), vec![1u8, 2]);
    }

    #[test]
    fn test_env_provider_maps_names() {
        let provider = EnvProvider::with_vars(
            "APP_",
            [
                ("APP_DATABASE__PORT", "5432"),
                ("APP_NAME", "demo"),
                ("OTHER_NAME", "ignored"),
                ("APP_", "ignored"),
                ("APP_MULTI", "a\nb"),
            ],
        );
        let text = String::from_utf8(provider.read().unwrap()).unwrap();
        let mut lines: Vec<&str> = text.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["database.port=5432", "name=demo"]);
    }

    #[test]
    fn test_env_provider_custom_delimiter() {
        let provider = EnvProvider::with_vars("X_", [("X_A__B", "1")]).delimiter('/');
        assert_eq!(provider.read().unwrap(), b"a/b=1\n");
    }
}
