// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! MP4 `ilst` atoms.

use super::{packed, value_kind, FormatMapper, PackedPair};
use crate::error::DecodeError;
use crate::format::FormatKind;
use crate::mapping::MappingTable;
use crate::native::picture::mime_type_of;
use crate::native::{FreeFormType, Mp4Data, Mp4Tag, NativeTagContainer, MP4_FREEFORM_PREFIX};
use crate::tag_name::{TagName, ValueKind};
use crate::value::TagValue;
use lofty::picture::MimeType;

/// Pairs stored in one `(number, total)` atom.
const NUMBER_PAIRS: [PackedPair; 2] = [PackedPair::TRACK, PackedPair::DISC];

/// Atom that holds a boolean flag.
const COMPILATION_ATOM: &str = "cpil";

/// Mapper for MP4 files.
#[derive(Debug, Clone, Copy)]
pub(super) struct Mp4Mapper;

impl Mp4Mapper {
    /// The native name of the pair atom and the current `(number, total)`.
    fn number_pair<'a>(
        pair: PackedPair,
        tag: &Mp4Tag,
        table: &'a MappingTable,
    ) -> Option<(&'a str, Option<(u16, u16)>)> {
        let native_name = table.preferred_native_name(pair.number, FormatKind::Mp4)?;
        let current = tag
            .get(native_name)
            .and_then(|data| data.first())
            .and_then(|data| match data {
                Mp4Data::NumberPair(number, total) => Some((*number, *total)),
                _ => None,
            });
        Some((native_name, current))
    }

    /// Replace one half of a number pair, removing the atom if both halves become zero.
    fn update_number_pair(
        pair: PackedPair,
        tag_name: TagName,
        value: u16,
        tag: &mut Mp4Tag,
        table: &MappingTable,
    ) {
        let Some((native_name, current)) = Self::number_pair(pair, tag, table) else {
            return;
        };
        let (mut number, mut total) = current.unwrap_or_default();
        if tag_name == pair.number {
            number = value;
        } else {
            total = value;
        }
        if number == 0 && total == 0 {
            let _ = tag.remove(native_name);
        } else {
            tag.set(native_name, vec![Mp4Data::NumberPair(number, total)]);
        }
    }
}

/// Decode free-form atom data.
fn decode_freeform(
    format: FreeFormType,
    data: &[u8],
    kind: ValueKind,
    native_name: &str,
) -> Result<TagValue, DecodeError> {
    if kind == ValueKind::Binary {
        return Ok(TagValue::Binary(data.to_vec()));
    }
    let text = match format {
        FreeFormType::Utf16 => {
            let units: Vec<u16> = data
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            String::from_utf16(&units)
                .map_err(|_| DecodeError::new(native_name, "free-form data is not valid UTF-16"))?
        }
        FreeFormType::Utf8 | FreeFormType::Implicit | FreeFormType::Other(_) => {
            String::from_utf8(data.to_vec())
                .map_err(|_| DecodeError::new(native_name, "free-form data is not valid UTF-8"))?
        }
    };
    TagValue::from_native_text(&text, kind, native_name)
}

impl FormatMapper for Mp4Mapper {
    type Tag = Mp4Tag;
    type Value = Mp4Data;

    fn format_kind(&self) -> FormatKind {
        FormatKind::Mp4
    }

    fn tag<'a>(&self, container: &'a NativeTagContainer) -> Option<&'a Mp4Tag> {
        match container {
            NativeTagContainer::Mp4(tag) => Some(tag),
            _ => None,
        }
    }

    fn tag_mut<'a>(&self, container: &'a mut NativeTagContainer) -> Option<&'a mut Mp4Tag> {
        match container {
            NativeTagContainer::Mp4(tag) => Some(tag),
            _ => None,
        }
    }

    fn native_values(&self, tag: &Mp4Tag, native_name: &str) -> Vec<Mp4Data> {
        tag.get(native_name).map(<[Mp4Data]>::to_vec).unwrap_or_default()
    }

    fn store_values(&self, tag: &mut Mp4Tag, native_name: &str, values: Vec<Mp4Data>) {
        tag.set(native_name, values);
    }

    fn remove_values(&self, tag: &mut Mp4Tag, native_name: &str) -> bool {
        tag.remove(native_name)
    }

    fn native_entries(&self, tag: &Mp4Tag) -> Vec<(String, Mp4Data)> {
        let mut entries = Vec::new();
        for atom in tag.atoms() {
            for data in &atom.data {
                match data {
                    // The halves of a pair belong to different tag names.
                    Mp4Data::NumberPair(number, total) => {
                        if *number != 0 {
                            entries.push((atom.ident.clone(), Mp4Data::NumberPair(*number, 0)));
                        }
                        if *total != 0 {
                            entries.push((atom.ident.clone(), Mp4Data::NumberPair(0, *total)));
                        }
                    }
                    data => entries.push((atom.ident.clone(), data.clone())),
                }
            }
        }
        entries
    }

    fn entry_tag_name(
        &self,
        native_name: &str,
        value: &Mp4Data,
        table: &MappingTable,
    ) -> Option<TagName> {
        if let Mp4Data::NumberPair(0, total) = value {
            if *total != 0 {
                let pair = NUMBER_PAIRS.iter().find(|pair| {
                    table
                        .preferred_native_name(pair.number, FormatKind::Mp4)
                        .is_some_and(|name| name == native_name)
                });
                if let Some(pair) = pair {
                    return Some(pair.count);
                }
            }
        }
        table.logical_name_for(native_name, FormatKind::Mp4)
    }

    fn decode_value(
        &self,
        value: &Mp4Data,
        tag_name: Option<TagName>,
        native_name: &str,
    ) -> Result<Vec<TagValue>, DecodeError> {
        let kind = value_kind(tag_name);
        let value = match value {
            Mp4Data::Utf8(text) => TagValue::from_native_text(text, kind, native_name)?,
            Mp4Data::Integer(number) => match kind {
                ValueKind::Integer => TagValue::Integer(*number),
                ValueKind::Text | ValueKind::Binary => TagValue::Text(number.to_string()),
            },
            Mp4Data::Bool(flag) => TagValue::Integer(i64::from(*flag)),
            Mp4Data::NumberPair(number, total) => {
                return Ok([*number, *total]
                    .into_iter()
                    .filter(|value| *value != 0)
                    .map(|value| TagValue::Integer(i64::from(value)))
                    .collect());
            }
            Mp4Data::Jpeg(data) | Mp4Data::Png(data) | Mp4Data::Binary(data) => {
                TagValue::Binary(data.clone())
            }
            Mp4Data::FreeForm(format, data) => decode_freeform(*format, data, kind, native_name)?,
        };
        Ok(vec![value])
    }

    fn encode_value(
        &self,
        value: &TagValue,
        tag_name: TagName,
        native_name: &str,
        _tag: &Mp4Tag,
    ) -> crate::Result<Mp4Data> {
        if native_name.starts_with(MP4_FREEFORM_PREFIX) {
            return Ok(match value {
                TagValue::Binary(data) => Mp4Data::FreeForm(FreeFormType::Implicit, data.clone()),
                TagValue::Text(text) => {
                    Mp4Data::FreeForm(FreeFormType::Utf8, text.as_bytes().to_vec())
                }
                TagValue::Integer(number) => {
                    Mp4Data::FreeForm(FreeFormType::Utf8, number.to_string().into_bytes())
                }
            });
        }

        let data = match (tag_name.value_kind(), value) {
            (_, TagValue::Binary(data)) => match mime_type_of(data) {
                Some(MimeType::Jpeg) => Mp4Data::Jpeg(data.clone()),
                Some(MimeType::Png) => Mp4Data::Png(data.clone()),
                _ => Mp4Data::Binary(data.clone()),
            },
            (ValueKind::Integer, value) => {
                let number = value.as_integer().ok_or_else(|| {
                    crate::ErrorType::encode(native_name, format!("{value} is not a number"))
                })?;
                if native_name == COMPILATION_ATOM {
                    Mp4Data::Bool(number != 0)
                } else {
                    Mp4Data::Integer(number)
                }
            }
            (_, TagValue::Integer(number)) => Mp4Data::Utf8(number.to_string()),
            (_, TagValue::Text(text)) => Mp4Data::Utf8(text.clone()),
        };
        Ok(data)
    }

    fn has_special_handling(&self, tag_name: TagName) -> bool {
        PackedPair::find(&NUMBER_PAIRS, tag_name).is_some()
    }

    fn special_values(
        &self,
        tag_name: TagName,
        tag: &Mp4Tag,
        table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>> {
        let Some(pair) = PackedPair::find(&NUMBER_PAIRS, tag_name) else {
            return Ok(Vec::new());
        };
        let Some((native_name, current)) = Self::number_pair(pair, tag, table) else {
            return Ok(Vec::new());
        };
        match current {
            Some((number, total)) => {
                let value = if tag_name == pair.number { number } else { total };
                Ok(Some(value)
                    .filter(|value| *value != 0)
                    .map(|value| TagValue::Integer(i64::from(value)))
                    .into_iter()
                    .collect())
            }
            // Some writers store the number as a plain integer or text.
            None if tag_name == pair.number => {
                let mut values = Vec::new();
                for data in self.native_values(tag, native_name) {
                    values.extend(self.decode_value(&data, Some(tag_name), native_name)?);
                }
                Ok(values)
            }
            None => Ok(Vec::new()),
        }
    }

    fn set_special(
        &self,
        tag_name: TagName,
        values: &[TagValue],
        tag: &mut Mp4Tag,
        table: &MappingTable,
    ) -> crate::Result<()> {
        let Some(pair) = PackedPair::find(&NUMBER_PAIRS, tag_name) else {
            return Ok(());
        };
        let native_name = table
            .preferred_native_name(pair.number, FormatKind::Mp4)
            .unwrap_or_default();
        let value = packed::integer_value(values, native_name)?.unwrap_or(0);
        let value = u16::try_from(value).map_err(|_| {
            crate::ErrorType::encode(native_name, format!("{value} does not fit into 16 bits"))
        })?;
        Self::update_number_pair(pair, tag_name, value, tag, table);
        Ok(())
    }

    fn delete_special(&self, tag_name: TagName, tag: &mut Mp4Tag, table: &MappingTable) {
        if let Some(pair) = PackedPair::find(&NUMBER_PAIRS, tag_name) {
            Self::update_number_pair(pair, tag_name, 0, tag, table);
        }
    }
}
