// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Configuration utils.

use crate::mapping::MappingTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Encountered when the configuration cannot be loaded.
#[derive(Error, Debug)]
#[error("Configuration Error: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

/// Default configuration TOML string.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Represents a piece of configuration that can be merged with another one.
trait MergeableConfig {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self;
}

/// Where the tag mapping table comes from.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct MappingConfig {
    /// Mapping table file. The builtin table is used if unset.
    pub path: Option<PathBuf>,
}

impl MergeableConfig for MappingConfig {
    fn merge(&self, other: &Self) -> Self {
        MappingConfig {
            path: self.path.clone().or_else(|| other.path.clone()),
        }
    }
}

/// Options for writing tags back to files.
#[expect(missing_copy_implementations)]
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct SaveConfig {
    /// Drop padding from the tag area on save.
    pub strip_padding: Option<bool>,
}

impl MergeableConfig for SaveConfig {
    fn merge(&self, other: &Self) -> Self {
        SaveConfig {
            strip_padding: self.strip_padding.or(other.strip_padding),
        }
    }
}

/// The main configuration struct.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Mapping table configuration.
    #[serde(default)]
    pub mapping: MappingConfig,
    /// Save configuration.
    #[serde(default)]
    pub save: SaveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::load_default().expect("Failed to load default config")
    }
}

impl MergeableConfig for Config {
    fn merge(&self, other: &Self) -> Self {
        Config {
            mapping: self.mapping.merge(&other.mapping),
            save: self.save.merge(&other.save),
        }
    }
}

impl Config {
    /// Load the configuration from a string slice.
    fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load the default configuration.
    fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_str(DEFAULT_CONFIG)
    }

    /// Load the configuration from a file located at the given path.
    ///
    /// # Errors
    ///
    /// This method can fail if the file cannot be accessed or if it contains malformed
    /// configuration markup.
    pub fn load_from_path<T: AsRef<Path>>(path: T) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::load_from_str(&text)?;
        Ok(config)
    }

    /// Merge this configuration struct with the default values.
    #[must_use]
    pub fn with_defaults(&self) -> Self {
        let default = Self::default();
        self.merge(&default)
    }

    /// Whether saving strips padding by default.
    #[must_use]
    pub fn strip_padding(&self) -> bool {
        self.save.strip_padding.unwrap_or(false)
    }

    /// Load the configured mapping table, or the builtin one.
    ///
    /// # Errors
    ///
    /// Fails if the table file cannot be read or is malformed.
    pub fn mapping_table(&self) -> crate::Result<MappingTable> {
        let table = match &self.mapping.path {
            Some(path) => {
                log::debug!("Loading tag mapping table from {}", path.display());
                MappingTable::load_from_path(path)?
            }
            None => MappingTable::builtin()?,
        };
        Ok(table)
    }
}
