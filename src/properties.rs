// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Logical tag access for a single music file.

use crate::config::Config;
use crate::format::{self, FormatKind};
use crate::io::{FileStorage, TagStorage};
use crate::mapper::{self, Mapper, NativeProperty};
use crate::mapping::MappingTable;
use crate::native::NativeTagContainer;
use crate::tag_name::TagName;
use crate::value::TagValue;
use std::path::PathBuf;
use std::sync::Arc;

/// Error for any access after [`MusicFileProperties::close`].
fn closed() -> crate::ErrorType {
    crate::ErrorType::InvalidUsage("music file properties have already been closed")
}

/// The tags of one music file, addressed by logical tag name.
///
/// Changes are kept in memory until [`MusicFileProperties::save`] writes them back.
#[derive(Debug)]
pub struct MusicFileProperties {
    /// Where the tags are read from and written to.
    storage: Box<dyn TagStorage>,
    /// Native tags of the file. `None` once closed.
    container: Option<NativeTagContainer>,
    /// Format of the native tags.
    kind: FormatKind,
    /// Mapping between logical and native tag names.
    table: Arc<MappingTable>,
    /// Whether there are changes since the last successful save.
    dirty: bool,
}

impl MusicFileProperties {
    /// Open the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file type is not supported or its tags cannot be read.
    pub fn open(path: impl Into<PathBuf>, table: Arc<MappingTable>) -> crate::Result<Self> {
        let storage = FileStorage::new(path)?;
        Self::from_storage(Box::new(storage), table)
    }

    /// Open the file at `path` with the mapping table from `config`.
    ///
    /// # Errors
    ///
    /// Fails if the mapping table cannot be loaded or the file cannot be opened.
    pub fn open_with_config(path: impl Into<PathBuf>, config: &Config) -> crate::Result<Self> {
        let table = config.mapping_table()?;
        Self::open(path, Arc::new(table))
    }

    /// Load the tags from an arbitrary storage.
    ///
    /// # Errors
    ///
    /// Fails if the tags cannot be loaded or their format is not supported.
    pub fn from_storage(
        storage: Box<dyn TagStorage>,
        table: Arc<MappingTable>,
    ) -> crate::Result<Self> {
        let container = storage.load()?;
        let kind = format::detect(&container)?;
        log::debug!("Opened {} with {kind} tags", storage.path().display());
        Ok(MusicFileProperties {
            storage,
            container: Some(container),
            kind,
            table,
            dirty: false,
        })
    }

    /// Format of the native tags.
    #[must_use]
    pub fn format_kind(&self) -> FormatKind {
        self.kind
    }

    /// Mapper of the format.
    fn mapper(&self) -> &'static dyn Mapper {
        mapper::for_kind(self.kind)
    }

    /// The native tags, unless closed.
    fn container(&self) -> crate::Result<&NativeTagContainer> {
        self.container.as_ref().ok_or_else(closed)
    }

    /// Values of the tag with the given logical name.
    ///
    /// # Errors
    ///
    /// Fails for unknown tag names, malformed native values or after closing.
    pub fn get_property(&self, name: &str) -> crate::Result<Vec<TagValue>> {
        self.get(name.parse()?)
    }

    /// Values of a tag. Missing tags yield an empty list.
    ///
    /// # Errors
    ///
    /// Fails for malformed native values or after closing.
    pub fn get(&self, tag_name: TagName) -> crate::Result<Vec<TagValue>> {
        let container = self.container()?;
        self.mapper().read(container, tag_name, &self.table)
    }

    /// Replace the tag with the given logical name by a single value.
    ///
    /// Tag names without a native name in this format are skipped with a warning and leave the
    /// file unchanged, so no save is pending afterwards.
    ///
    /// # Errors
    ///
    /// Fails for unknown tag names, values that cannot be encoded or after closing.
    pub fn set_property(&mut self, name: &str, value: impl Into<TagValue>) -> crate::Result<()> {
        self.set(name.parse()?, &[value.into()])
    }

    /// Replace the tag with the given logical name by a list of values.
    ///
    /// # Errors
    ///
    /// Fails for unknown tag names, values that cannot be encoded or after closing.
    pub fn set_property_values(&mut self, name: &str, values: &[TagValue]) -> crate::Result<()> {
        self.set(name.parse()?, values)
    }

    /// Replace the values of a tag. An empty list deletes it.
    ///
    /// Only a write that reaches a native name marks the file as changed. Unmapped tag names are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Fails for values that cannot be encoded or after closing.
    pub fn set(&mut self, tag_name: TagName, values: &[TagValue]) -> crate::Result<()> {
        let container = self.container.as_mut().ok_or_else(closed)?;
        if mapper::for_kind(self.kind).write(container, tag_name, values, &self.table)? {
            self.dirty = true;
        }
        Ok(())
    }

    /// Delete the tag with the given logical name.
    ///
    /// # Errors
    ///
    /// Fails for unknown tag names or after closing.
    pub fn delete_property(&mut self, name: &str) -> crate::Result<()> {
        self.delete(name.parse()?)
    }

    /// Delete a tag.
    ///
    /// # Errors
    ///
    /// Fails after closing.
    pub fn delete(&mut self, tag_name: TagName) -> crate::Result<()> {
        let container = self.container.as_mut().ok_or_else(closed)?;
        if mapper::for_kind(self.kind).delete(container, tag_name, &self.table)? {
            self.dirty = true;
        }
        Ok(())
    }

    /// Remove values of the tag that are stored under any native name but the preferred one.
    ///
    /// # Errors
    ///
    /// Fails for unknown tag names or after closing.
    pub fn remove_non_preferred(&mut self, name: &str) -> crate::Result<()> {
        let tag_name: TagName = name.parse()?;
        let container = self.container.as_mut().ok_or_else(closed)?;
        if mapper::for_kind(self.kind).remove_non_preferred(container, tag_name, &self.table)? {
            self.dirty = true;
        }
        Ok(())
    }

    /// All native tags with their decoded values.
    ///
    /// # Errors
    ///
    /// Fails after closing.
    pub fn native_properties(&self) -> crate::Result<Vec<NativeProperty>> {
        let container = self.container()?;
        self.mapper().dump(container, &self.table)
    }

    /// Whether there are changes that have not been saved yet.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Write pending changes back. Returns `false` without writing if there are none.
    ///
    /// The changes are kept if writing fails, so saving can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorType::Persistence`] if the tags cannot be written, or
    /// [`crate::ErrorType::InvalidUsage`] after closing.
    pub fn save(&mut self, strip_padding: bool) -> crate::Result<bool> {
        let container = self.container.as_mut().ok_or_else(closed)?;
        if !self.dirty {
            log::debug!("No changes to save for {}", self.storage.path().display());
            return Ok(false);
        }

        self.storage
            .store(container, strip_padding)
            .map_err(|err| crate::ErrorType::Persistence {
                path: self.storage.path().to_path_buf(),
                source: Box::new(err),
            })?;
        log::debug!("Saved tags to {}", self.storage.path().display());
        self.dirty = false;
        Ok(true)
    }

    /// Like [`MusicFileProperties::save`], with the padding option taken from `config`.
    ///
    /// # Errors
    ///
    /// See [`MusicFileProperties::save`].
    pub fn save_with_config(&mut self, config: &Config) -> crate::Result<bool> {
        self.save(config.strip_padding())
    }

    /// Release the native tags. Unsaved changes are discarded.
    pub fn close(&mut self) {
        if self.container.take().is_some() && self.dirty {
            log::warn!(
                "Discarding unsaved changes to {}",
                self.storage.path().display()
            );
        }
        self.dirty = false;
    }
}
