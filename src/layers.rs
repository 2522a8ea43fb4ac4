//! Tiered loading into a single store.
//!
//! Tiers are merged leaf by leaf in priority order, lowest first:
//! embedded defaults, the project directory, the user directory, then
//! prefixed environment variables. `PATHCONF_CONFIG_PATH` names one file
//! that replaces the project and user tiers.

use crate::error::Result;
use crate::path::DEFAULT_DELIMITER;
use crate::source::{self, EnvProvider, FileProvider, KeyValueParser, Parser, Provider, YamlParser};
use crate::store::Store;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "APP_";

/// File names probed in each tier directory, in order.
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/pathconf/)
    Project = 1,
    /// User-level config (~/.pathconf/)
    User = 2,
    /// A file named by `PATHCONF_CONFIG_PATH`
    Explicit = 3,
    /// Environment variables (highest priority)
    Environment = 4,
}

impl fmt::Display for LayerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerTier::Defaults => write!(f, "defaults"),
            LayerTier::Project => write!(f, "project"),
            LayerTier::User => write!(f, "user"),
            LayerTier::Explicit => write!(f, "explicit"),
            LayerTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories for each file tier.
#[derive(Debug, Clone, Default)]
pub struct LayerPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
    /// Single file replacing both directories
    pub config_path: Option<PathBuf>,
}

impl LayerPaths {
    /// Discover tier paths from the environment and defaults.
    pub fn discover() -> Self {
        // User dir: PATHCONF_USER_DIR or ~/.pathconf
        let user_dir = std::env::var("PATHCONF_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".pathconf")));

        // Project dir: PATHCONF_PROJECT_DIR or $CWD/pathconf
        let project_dir = std::env::var("PATHCONF_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("pathconf")));

        let config_path = std::env::var("PATHCONF_CONFIG_PATH").ok().map(PathBuf::from);

        Self {
            project_dir,
            user_dir,
            config_path,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            config_path: None,
        }
    }
}

/// One document that made it into the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub tier: LayerTier,
    /// File the tier came from; `None` for defaults and the environment.
    pub path: Option<PathBuf>,
}

/// The merged store and where its content came from.
#[derive(Debug)]
pub struct Layered {
    pub store: Store,
    pub sources: Vec<LoadedSource>,
}

type Defaults = (Box<dyn Provider + Send + Sync>, Box<dyn Parser + Send + Sync>);

/// Loads the tiers into one [`Store`].
pub struct LayeredLoader {
    paths: LayerPaths,
    defaults: Option<Defaults>,
    file_stem: String,
    env_prefix: Option<String>,
    env_vars: Option<Vec<(String, String)>>,
    delimiter: char,
}

impl fmt::Debug for LayeredLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredLoader")
            .field("paths", &self.paths)
            .field("has_defaults", &self.defaults.is_some())
            .field("file_stem", &self.file_stem)
            .field("env_prefix", &self.env_prefix)
            .field("delimiter", &self.delimiter)
            .finish()
    }
}

impl Default for LayeredLoader {
    fn default() -> Self {
        Self::new(LayerPaths::discover())
    }
}

impl LayeredLoader {
    /// A loader over `paths`. The environment prefix comes from
    /// `PATHCONF_ENV_PREFIX`, falling back to [`DEFAULT_ENV_PREFIX`].
    pub fn new(paths: LayerPaths) -> Self {
        let env_prefix =
            std::env::var("PATHCONF_ENV_PREFIX").unwrap_or_else(|_| DEFAULT_ENV_PREFIX.to_string());
        Self {
            paths,
            defaults: None,
            file_stem: "config".to_string(),
            env_prefix: Some(env_prefix),
            env_vars: None,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Embedded defaults, loaded first.
    pub fn defaults(
        mut self,
        provider: impl Provider + Send + Sync + 'static,
        parser: impl Parser + Send + Sync + 'static,
    ) -> Self {
        self.defaults = Some((Box::new(provider), Box::new(parser)));
        self
    }

    /// File name without extension probed in each tier (default `config`).
    pub fn file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    /// Prefix for environment overrides; `None` disables the tier.
    pub fn env_prefix(mut self, prefix: Option<String>) -> Self {
        self.env_prefix = prefix;
        self
    }

    /// Use a fixed variable set instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn paths(&self) -> &LayerPaths {
        &self.paths
    }

    /// First `<stem>.<ext>` that exists in `dir`.
    fn find_file(&self, dir: &Path) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{ext}", self.file_stem)))
            .find(|candidate| candidate.is_file())
    }

    /// Load every tier.
    ///
    /// Missing tier files are skipped. An unreadable or malformed project or
    /// user file is skipped with a warning; an explicit file must load. A
    /// tier that conflicts with what lower tiers wrote fails the load.
    pub fn load(&self) -> Result<Layered> {
        let store = Store::with_delimiter(self.delimiter);
        let mut sources = Vec::new();

        // Tier 1: Defaults (embedded)
        if let Some((provider, parser)) = &self.defaults {
            let data = source::read_mapping(provider.as_ref(), parser.as_ref())?;
            store.merge_mapping(&data)?;
            sources.push(LoadedSource {
                tier: LayerTier::Defaults,
                path: None,
            });
        }

        if let Some(path) = &self.paths.config_path {
            // Explicit file replaces the directory tiers
            let parser = source::parser_for_path(path).unwrap_or_else(|| Box::new(YamlParser));
            let data = source::read_mapping(&FileProvider::new(path), parser.as_ref())?;
            store.merge_mapping(&data)?;
            debug!(path = %path.display(), "loaded explicit config file");
            sources.push(LoadedSource {
                tier: LayerTier::Explicit,
                path: Some(path.clone()),
            });
        } else {
            // Tiers 2 and 3: project, then user
            let tiers = [
                (LayerTier::Project, &self.paths.project_dir),
                (LayerTier::User, &self.paths.user_dir),
            ];
            for (tier, dir) in tiers {
                let Some(dir) = dir else { continue };
                let Some(file) = self.find_file(dir) else {
                    debug!(%tier, dir = %dir.display(), "no config file in tier");
                    continue;
                };
                let parser = source::parser_for_path(&file).unwrap_or_else(|| Box::new(YamlParser));
                match source::read_mapping(&FileProvider::new(&file), parser.as_ref()) {
                    Ok(data) => {
                        store.merge_mapping(&data)?;
                        debug!(%tier, path = %file.display(), "loaded config tier");
                        sources.push(LoadedSource {
                            tier,
                            path: Some(file),
                        });
                    }
                    Err(err) => {
                        warn!(%tier, path = %file.display(), error = %err, "skipping unreadable config file");
                    }
                }
            }
        }

        // Tier 4: Environment variable overrides
        if let Some(prefix) = &self.env_prefix {
            let provider = match &self.env_vars {
                Some(vars) => EnvProvider::with_vars(prefix.clone(), vars.clone()),
                None => EnvProvider::new(prefix.clone()),
            }
            .delimiter(self.delimiter);
            let parser = KeyValueParser::new()
                .delimiter(self.delimiter)
                .typed_values(true)
                .skip_invalid(true);
            let data = source::read_mapping(&provider, &parser)?;
            if !data.is_empty() {
                store.merge_mapping(&data)?;
                debug!(%prefix, keys = data.len(), "applied environment overrides");
                sources.push(LoadedSource {
                    tier: LayerTier::Environment,
                    path: None,
                });
            }
        }

        Ok(Layered { store, sources })
    }
}
