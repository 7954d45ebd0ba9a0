//! RON-backed configuration store
//!
//! One file holds a map of named sections; each component loads its own
//! section by name and deserializes it into its config struct. Sections the
//! file does not mention fall back to the struct defaults, so a config file
//! only ever spells out the overrides:
//!
//! ```ron
//! {
//!     "stabilizer": (
//!         initialization_period_s: 2.5,
//!     ),
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ron::ser::PrettyConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

/// Named config sections, optionally bound to a file on disk
///
/// # Example
/// ```
/// use strider_core::config::ConfigStore;
/// use strider_core::control::StabilizerConfig;
///
/// let store: ConfigStore = r#"{
///     "stabilizer": (initialization_period_s: 2.5),
/// }"#
/// .parse()
/// .unwrap();
///
/// let config: StabilizerConfig = store.load("stabilizer").unwrap();
/// assert_eq!(config.initialization_period_s, 2.5);
/// assert_eq!(config.watchdog_period_s, 0.1);
/// ```
#[derive(Debug, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    sections: HashMap<String, ron::Value>,
}

impl ConfigStore {
    /// Read the store from `path`
    ///
    /// A missing file yields an empty store still bound to `path`, so a
    /// later [`ConfigStore::save`] creates it. Any other I/O or parse
    /// problem is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::Config(format!("{}: {}", path.display(), e))),
        };
        let sections = parse_sections(&text, Some(&path))?;
        Ok(Self {
            path: Some(path),
            sections,
        })
    }

    /// Deserialize the section `name`
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .sections
            .get(name)
            .ok_or_else(|| Error::Config(format!("no config section '{}'", name)))?;
        value
            .clone()
            .into_rust()
            .map_err(|e| Error::Config(format!("config section '{}': {}", name, e)))
    }

    /// Deserialize the section `name`, or its default when absent
    ///
    /// A present but malformed section is still an error.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        if self.sections.contains_key(name) {
            self.load(name)
        } else {
            Ok(T::default())
        }
    }

    /// Serialize `value` into the section `name`, replacing any old content
    pub fn set<T: Serialize>(&mut self, name: &str, value: &T) -> Result<()> {
        let text = ron::ser::to_string(value)
            .map_err(|e| Error::Config(format!("config section '{}': {}", name, e)))?;
        let value: ron::Value = ron::from_str(&text)
            .map_err(|e| Error::Config(format!("config section '{}': {}", name, e)))?;
        self.sections.insert(name.to_string(), value);
        Ok(())
    }

    /// Drop the section `name`, reporting whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        self.sections.remove(name).is_some()
    }

    /// Whether a section named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// All section names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sections.keys().cloned().collect();
        names.sort();
        names
    }

    /// Write back to the file this store was opened from
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_to(path.clone()),
            None => Err(Error::Config("config store has no backing file".to_string())),
        }
    }

    /// Write the store to `path`
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = ron::ser::to_string_pretty(&self.sections, PrettyConfig::default())
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        fs::write(path, text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

impl std::str::FromStr for ConfigStore {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self {
            path: None,
            sections: parse_sections(s, None)?,
        })
    }
}

fn parse_sections(text: &str, path: Option<&Path>) -> Result<HashMap<String, ron::Value>> {
    if text.trim().is_empty() {
        return Ok(HashMap::new());
    }
    ron::from_str(text).map_err(|e| match path {
        Some(p) => Error::Config(format!("{}: {}", p.display(), e)),
        None => Error::Config(e.to_string()),
    })
}
