use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use sigbus_signal::SignalIdentity;
use tracing::info;

use crate::builtin;
use crate::config::CatalogConfig;
use crate::definition::{RawSignalList, SignalDefinition};
use crate::error::{CatalogError, Result};
use crate::schema::validate_document;

/// Bidirectional name/identity registry of signal definitions.
#[derive(Debug, Clone)]
pub struct SignalCatalog {
    version: u32,
    definitions: Vec<SignalDefinition>,
    by_name: HashMap<String, usize>,
    by_identity: BTreeMap<SignalIdentity, usize>,
    config: CatalogConfig,
}

impl SignalCatalog {
    /// Create an empty catalog with default config.
    pub fn new(version: u32) -> Result<Self> {
        Self::with_config(version, CatalogConfig::default())
    }

    /// Create an empty catalog with explicit config.
    pub fn with_config(version: u32, config: CatalogConfig) -> Result<Self> {
        if version == 0 {
            return Err(CatalogError::InvalidVersion(0));
        }
        Ok(Self {
            version,
            definitions: Vec::new(),
            by_name: HashMap::new(),
            by_identity: BTreeMap::new(),
            config,
        })
    }

    /// The built-in cockpit signal table.
    pub fn builtin() -> Self {
        let mut catalog = Self {
            version: builtin::BUILTIN_VERSION,
            definitions: Vec::new(),
            by_name: HashMap::new(),
            by_identity: BTreeMap::new(),
            config: CatalogConfig::default(),
        };
        for definition in builtin::definitions() {
            catalog.push(definition);
        }
        catalog
    }

    /// Add a definition, rejecting duplicate names and identities.
    pub fn insert(&mut self, definition: SignalDefinition) -> Result<()> {
        definition.check()?;

        if self.by_name.contains_key(&definition.name) {
            return Err(CatalogError::DuplicateName(definition.name));
        }
        if let Some(&existing) = self.by_identity.get(&definition.identity) {
            let first = self
                .definitions
                .get(existing)
                .map(|d| d.name.clone())
                .unwrap_or_default();
            return Err(CatalogError::DuplicateIdentity {
                identity: definition.identity,
                first,
                second: definition.name,
            });
        }

        let count = self.definitions.len().saturating_add(1);
        if count > self.config.max_signals {
            return Err(CatalogError::TooManySignals {
                count,
                max: self.config.max_signals,
            });
        }

        self.push(definition);
        Ok(())
    }

    /// Parse a JSON signal list.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_config(json, CatalogConfig::default())
    }

    /// Parse a JSON signal list with explicit config.
    pub fn from_json_with_config(json: &str, config: CatalogConfig) -> Result<Self> {
        if json.len() > config.max_file_size {
            return Err(CatalogError::LoadFailed(format!(
                "signal list too large ({} bytes)",
                json.len()
            )));
        }

        let document: Value = serde_json::from_str(json)?;
        if config.validate_schema {
            validate_document(&document)?;
        }
        let raw: RawSignalList = serde_json::from_value(document)?;

        let version = match u32::try_from(raw.version) {
            Ok(version) if version > 0 => version,
            _ => return Err(CatalogError::InvalidVersion(raw.version)),
        };
        if raw.signals.len() > config.max_signals {
            return Err(CatalogError::TooManySignals {
                count: raw.signals.len(),
                max: config.max_signals,
            });
        }

        let mut catalog = Self::with_config(version, config)?;
        for signal in raw.signals {
            catalog.insert(SignalDefinition::try_from(signal)?)?;
        }

        info!(
            version = catalog.version,
            signals = catalog.len(),
            "signal list loaded"
        );
        Ok(catalog)
    }

    /// Load a JSON signal list from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_file_with_config(path, CatalogConfig::default())
    }

    /// Load a JSON signal list from a file with explicit config.
    pub fn from_file_with_config(path: &Path, config: CatalogConfig) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| CatalogError::LoadFailed(format!("{}: {err}", path.display())))?;
        let metadata = file
            .metadata()
            .map_err(|err| CatalogError::LoadFailed(err.to_string()))?;
        if !metadata.is_file() {
            return Err(CatalogError::LoadFailed(format!(
                "not a regular file: {}",
                path.display()
            )));
        }
        if metadata.len() > config.max_file_size as u64 {
            return Err(CatalogError::LoadFailed(format!(
                "signal list too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        let read_limit = u64::try_from(config.max_file_size.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                CatalogError::LoadFailed(format!("failed reading {}: {err}", path.display()))
            })?;

        info!(path = %path.display(), "loading signal list");
        Self::from_json_with_config(&content, config)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&SignalDefinition> {
        self.by_name
            .get(name)
            .and_then(|&index| self.definitions.get(index))
    }

    /// Look up a definition by identity.
    pub fn definition(&self, identity: SignalIdentity) -> Option<&SignalDefinition> {
        self.by_identity
            .get(&identity)
            .and_then(|&index| self.definitions.get(index))
    }

    pub fn identity_for(&self, name: &str) -> Option<SignalIdentity> {
        self.get(name).map(|definition| definition.identity)
    }

    pub fn name_for(&self, identity: SignalIdentity) -> Option<&str> {
        self.definition(identity)
            .map(|definition| definition.name.as_str())
    }

    /// Definitions ordered by identity.
    pub fn iter(&self) -> impl Iterator<Item = &SignalDefinition> + '_ {
        self.by_identity
            .values()
            .filter_map(|&index| self.definitions.get(index))
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn push(&mut self, definition: SignalDefinition) {
        let index = self.definitions.len();
        self.by_name.insert(definition.name.clone(), index);
        self.by_identity.insert(definition.identity, index);
        self.definitions.push(definition);
    }
}

impl<'a> IntoIterator for &'a SignalCatalog {
    type Item = &'a SignalDefinition;
    type IntoIter = Box<dyn Iterator<Item = &'a SignalDefinition> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
