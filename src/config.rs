//! Where catalogs live and how they are read.
//!
//! Values come from `Default` or from environment variables:
//!
//! - `TARGET_CATALOG_PATH`: catalog file (default `catalog.json`)
//! - `TARGET_CATALOG_TEMPLATES`: optional entry directory tree
//! - `TARGET_CATALOG_MAX_DEPTH`: directory scan depth limit (default 5)
//! - `TARGET_CATALOG_SCHEMA`: optional override for the persisted-form schema
//! - `TARGET_CATALOG_SCHEMA_CHECK`: `0` disables the schema check on load

use crate::loader::DEFAULT_MAX_SCAN_DEPTH;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const ENV_CATALOG_PATH: &str = "TARGET_CATALOG_PATH";
pub const ENV_TEMPLATES_DIR: &str = "TARGET_CATALOG_TEMPLATES";
pub const ENV_MAX_DEPTH: &str = "TARGET_CATALOG_MAX_DEPTH";
pub const ENV_SCHEMA_PATH: &str = "TARGET_CATALOG_SCHEMA";
pub const ENV_SCHEMA_CHECK: &str = "TARGET_CATALOG_SCHEMA_CHECK";

const DEFAULT_CATALOG_FILE: &str = "catalog.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub catalog_path: PathBuf,
    pub templates_dir: Option<PathBuf>,
    pub max_scan_depth: usize,
    pub schema_path: Option<PathBuf>,
    pub check_schema: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_FILE),
            templates_dir: None,
            max_scan_depth: DEFAULT_MAX_SCAN_DEPTH,
            schema_path: None,
            check_schema: true,
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset or blank keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_CATALOG_PATH) {
            config.catalog_path = PathBuf::from(path);
        }
        config.templates_dir = get(ENV_TEMPLATES_DIR).map(PathBuf::from);
        config.schema_path = get(ENV_SCHEMA_PATH).map(PathBuf::from);
        if let Some(depth) = get(ENV_MAX_DEPTH) {
            config.max_scan_depth = depth
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_DEPTH} must be a non-negative integer, got '{depth}'"))?;
        }
        if let Some(flag) = get(ENV_SCHEMA_CHECK) {
            config.check_schema = flag.trim() != "0";
        }
        Ok(config)
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    pub fn with_max_scan_depth(mut self, depth: usize) -> Self {
        self.max_scan_depth = depth;
        self
    }

    pub fn with_check_schema(mut self, enabled: bool) -> Self {
        self.check_schema = enabled;
        self
    }
}
