use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::change::ExtractionLimits;
use crate::error::{Error, Result};
use crate::gate::{DEFAULT_ALLOWED_KINDS, DEFAULT_KEYWORDS, EmissionGate};
use crate::syntax::SyntaxKind;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "idiomine.toml";

/// Configuration for a mining run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of lines a change may touch on either side.
    pub max_changed_lines: usize,
    /// Unchanged context lines kept around each change.
    pub context_lines: usize,
    /// Statement kinds a change chunk may consist of.
    pub allowed_kinds: Vec<SyntaxKind>,
    /// Tokens that do not count as meaningful content of a chunk.
    pub keywords: Vec<String>,
    /// Canonicalize the before file in two passes.
    pub two_pass_before: bool,
    /// Canonicalize the after file in two passes.
    pub two_pass_after: bool,
    /// Copy the revision's commit message into each record.
    pub include_commit_message: bool,
    /// Number of input lines processed per parallel batch.
    pub batch_size: usize,
    /// Worker threads; the global rayon pool when unset.
    pub threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_changed_lines: 5,
            context_lines: 2,
            allowed_kinds: DEFAULT_ALLOWED_KINDS.to_vec(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            two_pass_before: true,
            two_pass_after: false,
            include_commit_message: false,
            batch_size: 256,
            threads: None,
        }
    }
}

/// Config as stored in idiomine.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    max_changed_lines: Option<usize>,
    context_lines: Option<usize>,
    allowed_kinds: Option<Vec<SyntaxKind>>,
    keywords: Option<Vec<String>>,
    two_pass_before: Option<bool>,
    two_pass_after: Option<bool>,
    include_commit_message: Option<bool>,
    batch_size: Option<usize>,
    threads: Option<usize>,
}

impl Config {
    /// Load `idiomine.toml` from `dir` on top of the defaults.
    ///
    /// A missing or unreadable file leaves the defaults in place.
    pub fn load(dir: &Path) -> Self {
        let mut config = Config::default();
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists()
            && let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(file_config) = toml::from_str::<FileConfig>(&content)
        {
            config.apply_file_config(&file_config);
        }
        config
    }

    /// Load an explicitly named config file. Unlike [`Config::load`], any
    /// problem with the file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file_config = toml::from_str::<FileConfig>(&content).map_err(|e| Error::Config {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;
        let mut config = Config::default();
        config.apply_file_config(&file_config);
        Ok(config)
    }

    fn apply_file_config(&mut self, fc: &FileConfig) {
        if let Some(v) = fc.max_changed_lines {
            self.max_changed_lines = v;
        }
        if let Some(v) = fc.context_lines {
            self.context_lines = v;
        }
        if let Some(ref v) = fc.allowed_kinds {
            self.allowed_kinds = v.clone();
        }
        if let Some(ref v) = fc.keywords {
            self.keywords = v.clone();
        }
        if let Some(v) = fc.two_pass_before {
            self.two_pass_before = v;
        }
        if let Some(v) = fc.two_pass_after {
            self.two_pass_after = v;
        }
        if let Some(v) = fc.include_commit_message {
            self.include_commit_message = v;
        }
        if let Some(v) = fc.batch_size {
            self.batch_size = v;
        }
        if let Some(v) = fc.threads {
            self.threads = Some(v);
        }
    }

    #[must_use]
    pub fn limits(&self) -> ExtractionLimits {
        ExtractionLimits {
            max_changed_lines: self.max_changed_lines,
            context_lines: self.context_lines,
        }
    }

    #[must_use]
    pub fn gate(&self) -> EmissionGate {
        EmissionGate::new(self.keywords.iter().cloned(), self.allowed_kinds.iter().copied())
    }
}
