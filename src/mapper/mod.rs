// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Per-format translation between tag values and native values.
//!
//! Every format implements [`FormatMapper`]. The generic read, write, and delete algorithms are
//! provided for all of them through the object-safe [`Mapper`] trait, and one shared instance per
//! format is kept in a lazily initialized registry (see [`for_kind`]).

mod ape;
mod asf;
mod id3;
mod mp4;
mod packed;
mod vorbis;

use crate::error::DecodeError;
use crate::format::FormatKind;
use crate::mapping::MappingTable;
use crate::native::NativeTagContainer;
use crate::tag_name::{TagName, ValueKind};
use crate::value::TagValue;
use std::collections::HashMap;
use std::sync::LazyLock;

pub(crate) use self::packed::{PackedPair, PackedText};

/// A native tag together with the tag name it maps to, as returned by
/// [`crate::MusicFileProperties::native_properties`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeProperty {
    /// Native tag name as stored in the file.
    pub native_name: String,
    /// The tag name this native name maps to, if any.
    pub tag_name: Option<TagName>,
    /// Decoded value.
    pub value: TagValue,
}

/// The value kind that a native value is decoded to.
///
/// Native names without a mapping are decoded as text.
pub(crate) fn value_kind(tag_name: Option<TagName>) -> ValueKind {
    tag_name.map_or(ValueKind::Text, TagName::value_kind)
}

/// Translation between tag values and the native values of one format.
pub(crate) trait FormatMapper: Send + Sync {
    /// The native tag carrier.
    type Tag;
    /// A single native value.
    type Value;

    /// The format this mapper handles.
    fn format_kind(&self) -> FormatKind;

    /// The native tag inside a container, if the container holds this format.
    fn tag<'a>(&self, container: &'a NativeTagContainer) -> Option<&'a Self::Tag>;

    /// Mutable access to the native tag inside a container.
    fn tag_mut<'a>(&self, container: &'a mut NativeTagContainer) -> Option<&'a mut Self::Tag>;

    /// All native values stored under a native name, in native order.
    fn native_values(&self, tag: &Self::Tag, native_name: &str) -> Vec<Self::Value>;

    /// Replace all native values stored under a native name.
    fn store_values(&self, tag: &mut Self::Tag, native_name: &str, values: Vec<Self::Value>);

    /// Remove all native values stored under a native name. Returns `true` if any were present.
    fn remove_values(&self, tag: &mut Self::Tag, native_name: &str) -> bool;

    /// All native values of the tag, keyed by their native name.
    fn native_entries(&self, tag: &Self::Tag) -> Vec<(String, Self::Value)>;

    /// The tag name that a native value is listed under by [`Mapper::dump`].
    fn entry_tag_name(
        &self,
        native_name: &str,
        _value: &Self::Value,
        table: &MappingTable,
    ) -> Option<TagName> {
        table.logical_name_for(native_name, FormatMapper::format_kind(self))
    }

    /// Decode one native value into scalars.
    ///
    /// `tag_name` is `None` if the native name has no mapping.
    fn decode_value(
        &self,
        value: &Self::Value,
        tag_name: Option<TagName>,
        native_name: &str,
    ) -> Result<Vec<TagValue>, DecodeError>;

    /// Encode one scalar into a native value.
    fn encode_value(
        &self,
        value: &TagValue,
        tag_name: TagName,
        native_name: &str,
        tag: &Self::Tag,
    ) -> crate::Result<Self::Value>;

    /// Encode the scalars of one tag name into native values.
    fn encode_values(
        &self,
        values: &[TagValue],
        tag_name: TagName,
        native_name: &str,
        tag: &Self::Tag,
    ) -> crate::Result<Vec<Self::Value>> {
        values
            .iter()
            .map(|value| self.encode_value(value, tag_name, native_name, tag))
            .collect()
    }

    /// Returns `true` if the tag name cannot be handled by a plain native name lookup.
    fn has_special_handling(&self, _tag_name: TagName) -> bool {
        false
    }

    /// Read a tag name that has special handling.
    fn special_values(
        &self,
        _tag_name: TagName,
        _tag: &Self::Tag,
        _table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>> {
        Ok(Vec::new())
    }

    /// Write a tag name that has special handling. `values` is never empty.
    fn set_special(
        &self,
        _tag_name: TagName,
        _values: &[TagValue],
        _tag: &mut Self::Tag,
        _table: &MappingTable,
    ) -> crate::Result<()> {
        Ok(())
    }

    /// Delete a tag name that has special handling.
    fn delete_special(&self, _tag_name: TagName, _tag: &mut Self::Tag, _table: &MappingTable) {}
}

/// Format-independent access to the tags of a container.
pub(crate) trait Mapper: Send + Sync {
    /// The format this mapper handles.
    fn format_kind(&self) -> FormatKind;

    /// Read the values of a tag name.
    ///
    /// The native names are consulted in table order and the first one with values wins. An
    /// unmapped tag name yields an empty list.
    ///
    /// # Errors
    ///
    /// Fails if the container does not hold this format or a native value is malformed.
    fn read(
        &self,
        container: &NativeTagContainer,
        tag_name: TagName,
        table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>>;

    /// Write the values of a tag name to its preferred native name. An empty list deletes the
    /// tag.
    ///
    /// Returns `false` without touching the container if the tag name is unmapped.
    ///
    /// # Errors
    ///
    /// Fails if the container does not hold this format or a value cannot be encoded.
    fn write(
        &self,
        container: &mut NativeTagContainer,
        tag_name: TagName,
        values: &[TagValue],
        table: &MappingTable,
    ) -> crate::Result<bool>;

    /// Delete a tag name from all of its native names.
    ///
    /// Returns `false` if the tag name is unmapped.
    ///
    /// # Errors
    ///
    /// Fails if the container does not hold this format.
    fn delete(
        &self,
        container: &mut NativeTagContainer,
        tag_name: TagName,
        table: &MappingTable,
    ) -> crate::Result<bool>;

    /// Remove the values stored under all but the preferred native name.
    ///
    /// Native names that belong to another tag name are left alone. Returns `true` if anything
    /// was removed.
    ///
    /// # Errors
    ///
    /// Fails if the container does not hold this format.
    fn remove_non_preferred(
        &self,
        container: &mut NativeTagContainer,
        tag_name: TagName,
        table: &MappingTable,
    ) -> crate::Result<bool>;

    /// Decode all native values of the container.
    ///
    /// Values that cannot be decoded are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails if the container does not hold this format.
    fn dump(
        &self,
        container: &NativeTagContainer,
        table: &MappingTable,
    ) -> crate::Result<Vec<NativeProperty>>;
}

/// Error for a container that does not match the mapper.
fn mismatch() -> crate::ErrorType {
    crate::ErrorType::InvalidUsage("tag container does not match the detected format")
}

impl<M: FormatMapper> Mapper for M {
    fn format_kind(&self) -> FormatKind {
        FormatMapper::format_kind(self)
    }

    fn read(
        &self,
        container: &NativeTagContainer,
        tag_name: TagName,
        table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>> {
        let kind = FormatMapper::format_kind(self);
        let tag = self.tag(container).ok_or_else(mismatch)?;
        let native_names = table.native_names_for(tag_name, kind);
        if native_names.is_empty() {
            log::trace!("{tag_name} is not mapped for {kind}");
            return Ok(Vec::new());
        }
        if self.has_special_handling(tag_name) {
            return self.special_values(tag_name, tag, table);
        }

        for native_name in native_names {
            let mut decoded = Vec::new();
            for value in self.native_values(tag, native_name) {
                decoded.extend(self.decode_value(&value, Some(tag_name), native_name)?);
            }
            if !decoded.is_empty() {
                log::trace!("Read {tag_name} from {native_name}");
                return Ok(decoded);
            }
        }
        Ok(Vec::new())
    }

    fn write(
        &self,
        container: &mut NativeTagContainer,
        tag_name: TagName,
        values: &[TagValue],
        table: &MappingTable,
    ) -> crate::Result<bool> {
        if values.is_empty() {
            return self.delete(container, tag_name, table);
        }
        let kind = FormatMapper::format_kind(self);
        let tag = self.tag_mut(container).ok_or_else(mismatch)?;
        let Some(native_name) = table.preferred_native_name(tag_name, kind) else {
            log::warn!("Not writing {tag_name}: no native tag name for {kind}");
            return Ok(false);
        };
        if self.has_special_handling(tag_name) {
            self.set_special(tag_name, values, tag, table)?;
        } else {
            let encoded = self.encode_values(values, tag_name, native_name, tag)?;
            self.store_values(tag, native_name, encoded);
        }
        log::trace!("Wrote {tag_name} to {native_name}");
        Ok(true)
    }

    fn delete(
        &self,
        container: &mut NativeTagContainer,
        tag_name: TagName,
        table: &MappingTable,
    ) -> crate::Result<bool> {
        let kind = FormatMapper::format_kind(self);
        let tag = self.tag_mut(container).ok_or_else(mismatch)?;
        let native_names = table.native_names_for(tag_name, kind);
        if native_names.is_empty() {
            log::warn!("Not deleting {tag_name}: no native tag name for {kind}");
            return Ok(false);
        }
        if self.has_special_handling(tag_name) {
            self.delete_special(tag_name, tag, table);
        } else {
            for native_name in native_names {
                let _ = self.remove_values(tag, native_name);
            }
        }
        Ok(true)
    }

    fn remove_non_preferred(
        &self,
        container: &mut NativeTagContainer,
        tag_name: TagName,
        table: &MappingTable,
    ) -> crate::Result<bool> {
        let kind = FormatMapper::format_kind(self);
        let tag = self.tag_mut(container).ok_or_else(mismatch)?;
        let mut removed = false;
        for native_name in table.native_names_for(tag_name, kind).iter().skip(1) {
            if table.logical_name_for(native_name, kind) != Some(tag_name) {
                continue;
            }
            if self.remove_values(tag, native_name) {
                log::debug!("Removed non-preferred {native_name} of {tag_name}");
                removed = true;
            }
        }
        Ok(removed)
    }

    fn dump(
        &self,
        container: &NativeTagContainer,
        table: &MappingTable,
    ) -> crate::Result<Vec<NativeProperty>> {
        let tag = self.tag(container).ok_or_else(mismatch)?;
        let mut properties = Vec::new();
        for (native_name, value) in self.native_entries(tag) {
            let tag_name = self.entry_tag_name(&native_name, &value, table);
            match self.decode_value(&value, tag_name, &native_name) {
                Ok(values) => properties.extend(values.into_iter().map(|value| NativeProperty {
                    native_name: native_name.clone(),
                    tag_name,
                    value,
                })),
                Err(err) => log::warn!("Skipping undecodable native tag: {err}"),
            }
        }
        Ok(properties)
    }
}

/// One shared mapper per format.
static REGISTRY: LazyLock<HashMap<FormatKind, Box<dyn Mapper>>> = LazyLock::new(|| {
    let mut registry: HashMap<FormatKind, Box<dyn Mapper>> = HashMap::new();
    let _ = registry.insert(FormatKind::Mp4, Box::new(mp4::Mp4Mapper));
    let _ = registry.insert(FormatKind::FlacVorbis, Box::new(vorbis::FLAC_MAPPER));
    let _ = registry.insert(FormatKind::OggVorbis, Box::new(vorbis::OGG_MAPPER));
    let _ = registry.insert(FormatKind::Asf, Box::new(asf::AsfMapper));
    let _ = registry.insert(FormatKind::Ape, Box::new(ape::ApeMapper));
    let _ = registry.insert(FormatKind::Id3v24, Box::new(id3::Id3Mapper::V24));
    let _ = registry.insert(FormatKind::Id3v23, Box::new(id3::Id3Mapper::V23));
    log::debug!("Initialized {} format mappers", registry.len());
    registry
});

/// The mapper for a format.
pub(crate) fn for_kind(kind: FormatKind) -> &'static dyn Mapper {
    REGISTRY
        .get(&kind)
        .map(|mapper| &**mapper)
        .unwrap_or_else(|| unreachable!("every format kind has a registered mapper"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The shipped mapping table.
    pub(crate) fn table() -> MappingTable {
        MappingTable::builtin().unwrap()
    }

    /// Write values to an empty container, read them back, and delete them again.
    pub(crate) fn check_roundtrip(
        mut container: NativeTagContainer,
        tag_name: TagName,
        values: Vec<TagValue>,
    ) {
        let table = table();
        let kind = crate::format::detect(&container).unwrap();
        let mapper = for_kind(kind);

        assert!(mapper.read(&container, tag_name, &table).unwrap().is_empty());
        assert!(mapper
            .write(&mut container, tag_name, &values, &table)
            .unwrap());
        assert_eq!(mapper.read(&container, tag_name, &table).unwrap(), values);
        assert!(mapper.delete(&mut container, tag_name, &table).unwrap());
        assert!(mapper.read(&container, tag_name, &table).unwrap().is_empty());
    }

    #[test]
    fn test_registry_is_complete() {
        for kind in FormatKind::ALL {
            assert_eq!(for_kind(kind).format_kind(), kind);
        }
    }

    #[test]
    fn test_container_mismatch() {
        let table = table();
        let container = NativeTagContainer::Mp4(crate::native::Mp4Tag::default());
        let err = for_kind(FormatKind::Ape)
            .read(&container, TagName::AlbumTitle, &table)
            .unwrap_err();
        assert!(matches!(err, crate::ErrorType::InvalidUsage(_)));
    }

    #[test]
    fn test_unmapped_tag_name() {
        let table = MappingTable::load_from_str(concat!(
            "MusicTagName,MP4,Vorbis,WMA,ID3v24,ID3v23,APEv2\n",
            "Asin,~:ASIN,ASIN,,TXXX:ASIN,TXXX:ASIN,ASIN\n",
        ))
        .unwrap();
        let mut container = NativeTagContainer::Asf(crate::native::AsfTag::default());
        let mapper = for_kind(FormatKind::Asf);
        assert!(mapper.read(&container, TagName::Asin, &table).unwrap().is_empty());
        assert!(!mapper
            .write(&mut container, TagName::Asin, &["B000".into()], &table)
            .unwrap());
        assert!(mapper.dump(&container, &table).unwrap().is_empty());
    }
}
