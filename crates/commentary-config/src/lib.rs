//! TOML configuration for commentary.
//!
//! Every section is optional. Missing keys fall back to the engine's
//! defaults, so an empty file configures the same pipeline as no file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use commentary_engine::pool::PoolError;
use commentary_engine::{
    CommandPatterns, Diagnostics, DocumentSource, FilterOptions, HeadingTemplates, Inventory,
    LinkTemplates, PatternError, SyncPool, Templates, ThreadPool, WorkerPool,
};
use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid command pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("Invalid exclude pattern: {0}")]
    Exclude(#[from] regex::Error),

    #[error("Invalid document pattern '{pattern}': {source}")]
    DocumentPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Failed to read document at {path}: {source}")]
    DocumentReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] PoolError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Freestanding markdown documents, as glob patterns relative to the
    /// project root.
    pub documents: Vec<String>,
    pub comment: CommentConfig,
    /// Recognition pattern overrides keyed by command name. A key starting
    /// with `|` extends the default pattern instead of replacing it.
    pub commands: BTreeMap<String, String>,
    pub templates: TemplatesConfig,
    pub filter: FilterConfig,
    #[serde(rename = "inventory")]
    pub inventories: Vec<InventoryConfig>,
    pub diagnostics: DiagnosticsConfig,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub free_file_binding: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub heading: HeadingTemplatesConfig,
    pub link: LinkTemplatesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingTemplatesConfig {
    pub declaration: Option<String>,
    pub module: Option<String>,
    pub group: Option<String>,
    pub document: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkTemplatesConfig {
    pub declaration: Option<String>,
    pub module: Option<String>,
    pub inventory: Option<String>,
    pub uri: Option<String>,
    pub unresolved: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Regexes over qualified declaration names and module names.
    pub exclude: Vec<String>,
    pub exclude_private: bool,
    pub exclude_uncommented: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude: vec![],
            exclude_private: true,
            exclude_uncommented: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub project: String,
    pub version: String,
    pub base_url: String,
    pub entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub warnings_as_errors: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Worker count; 0 picks the hardware concurrency plus one.
    pub threads: usize,
    /// Runs every task inline on the calling thread.
    pub synchronous: bool,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config = Self::from_toml(&content).map_err(|source| ConfigError::ConfigParseError {
            config_path: config_path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Per-user default location of the config file.
    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/commentary");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn command_patterns(&self) -> Result<CommandPatterns, ConfigError> {
        Ok(CommandPatterns::with_overrides(
            self.commands.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )?)
    }

    pub fn templates(&self) -> Templates {
        let heading = &self.templates.heading;
        let link = &self.templates.link;
        let defaults = Templates::default();
        Templates {
            heading: HeadingTemplates {
                declaration: pick(&heading.declaration, defaults.heading.declaration),
                module: pick(&heading.module, defaults.heading.module),
                group: pick(&heading.group, defaults.heading.group),
                document: pick(&heading.document, defaults.heading.document),
            },
            link: LinkTemplates {
                declaration: pick(&link.declaration, defaults.link.declaration),
                module: pick(&link.module, defaults.link.module),
                inventory: pick(&link.inventory, defaults.link.inventory),
                uri: pick(&link.uri, defaults.link.uri),
                unresolved: pick(&link.unresolved, defaults.link.unresolved),
            },
        }
    }

    pub fn filter_options(&self) -> Result<FilterOptions, ConfigError> {
        let mut options = FilterOptions::with_patterns(&self.filter.exclude)?;
        options.exclude_private = self.filter.exclude_private;
        options.exclude_uncommented = self.filter.exclude_uncommented;
        Ok(options)
    }

    pub fn inventories(&self) -> Vec<Inventory> {
        self.inventories
            .iter()
            .map(|inv| Inventory {
                project: inv.project.clone(),
                version: inv.version.clone(),
                base_url: inv.base_url.clone(),
                entries: inv.entries.clone(),
            })
            .collect()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::with_warnings_as_errors(self.diagnostics.warnings_as_errors)
    }

    pub fn worker_pool(&self) -> Result<Box<dyn WorkerPool>, ConfigError> {
        if self.pool.synchronous {
            return Ok(Box::new(SyncPool));
        }
        let pool = match self.pool.threads {
            0 => ThreadPool::with_default_threads()?,
            n => ThreadPool::new(n)?,
        };
        Ok(Box::new(pool))
    }

    /// Reads every document matched by the configured patterns, relative
    /// to `root`. Names are file stems; paths stay relative to `root`.
    pub fn load_documents(&self, root: &Path) -> Result<Vec<DocumentSource>, ConfigError> {
        let mut documents = Vec::new();
        for pattern in &self.documents {
            let expanded = shellexpand::tilde(pattern);
            let full = root.join(expanded.as_ref());
            let entries = glob::glob(&full.to_string_lossy()).map_err(|source| {
                ConfigError::DocumentPattern {
                    pattern: pattern.clone(),
                    source,
                }
            })?;
            for path in entries.filter_map(Result::ok).filter(|p| p.is_file()) {
                let text = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::DocumentReadError {
                        path: path.clone(),
                        source,
                    }
                })?;
                let relative = path.strip_prefix(root).unwrap_or(path.as_path());
                let Ok(relative) = RelativePathBuf::from_path(relative) else {
                    log::warn!("skipping document outside the project: {}", path.display());
                    continue;
                };
                if documents.iter().any(|d: &DocumentSource| d.path == relative) {
                    continue;
                }
                documents.push(DocumentSource {
                    name: relative.file_stem().unwrap_or_default().to_string(),
                    path: relative,
                    text,
                });
            }
        }
        log::debug!("found {} documents", documents.len());
        Ok(documents)
    }
}

fn pick(configured: &Option<String>, default: String) -> String {
    configured.clone().unwrap_or(default)
}
