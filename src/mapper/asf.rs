// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! ASF (WMA) attributes.

use super::{packed, value_kind, FormatMapper, PackedPair, PackedText};
use crate::error::DecodeError;
use crate::format::FormatKind;
use crate::mapping::MappingTable;
use crate::native::picture::{self, Picture};
use crate::native::{AsfTag, AsfValue, NativeTagContainer};
use crate::tag_name::{TagName, ValueKind};
use crate::value::TagValue;

/// Pairs that may be packed into one `N/M` attribute.
const PACKED_PAIRS: [PackedPair; 2] = [PackedPair::TRACK, PackedPair::DISC];

/// Attribute that holds embedded pictures.
const PICTURE_ATTRIBUTE: &str = "WM/Picture";

/// Attribute that holds a boolean flag.
const COMPILATION_ATTRIBUTE: &str = "WM/IsCompilation";

/// Mapper for ASF files.
#[derive(Debug, Clone, Copy)]
pub(super) struct AsfMapper;

impl AsfMapper {
    /// All decodable pictures stored under a native name, plus the undecodable raw values.
    fn pictures(tag: &AsfTag, native_name: &str) -> Result<Vec<Picture>, DecodeError> {
        tag.get(native_name)
            .into_iter()
            .filter_map(|value| match value {
                AsfValue::Binary(data) => Some(data),
                _ => None,
            })
            .map(|data| {
                picture::decode_asf_picture(data)
                    .map_err(|reason| DecodeError::new(native_name, reason))
            })
            .collect()
    }

    /// The native name of the cover art.
    fn picture_name(table: &MappingTable) -> &str {
        table
            .preferred_native_name(TagName::CoverArt, FormatKind::Asf)
            .unwrap_or(PICTURE_ATTRIBUTE)
    }
}

impl PackedText for AsfMapper {
    fn read_text(&self, tag: &AsfTag, native_name: &str) -> Option<String> {
        tag.get(native_name)
            .into_iter()
            .find_map(|value| match value {
                AsfValue::Unicode(text) => Some(text.clone()),
                AsfValue::DWord(number) => Some(number.to_string()),
                AsfValue::QWord(number) => Some(number.to_string()),
                AsfValue::Word(number) => Some(number.to_string()),
                AsfValue::Binary(_) | AsfValue::Bool(_) => None,
            })
    }

    fn write_text(&self, tag: &mut AsfTag, native_name: &str, text: String) {
        tag.set(native_name, vec![AsfValue::Unicode(text)]);
    }
}

impl FormatMapper for AsfMapper {
    type Tag = AsfTag;
    type Value = AsfValue;

    fn format_kind(&self) -> FormatKind {
        FormatKind::Asf
    }

    fn tag<'a>(&self, container: &'a NativeTagContainer) -> Option<&'a AsfTag> {
        match container {
            NativeTagContainer::Asf(tag) => Some(tag),
            _ => None,
        }
    }

    fn tag_mut<'a>(&self, container: &'a mut NativeTagContainer) -> Option<&'a mut AsfTag> {
        match container {
            NativeTagContainer::Asf(tag) => Some(tag),
            _ => None,
        }
    }

    fn native_values(&self, tag: &AsfTag, native_name: &str) -> Vec<AsfValue> {
        tag.get(native_name).into_iter().cloned().collect()
    }

    fn store_values(&self, tag: &mut AsfTag, native_name: &str, values: Vec<AsfValue>) {
        tag.set(native_name, values);
    }

    fn remove_values(&self, tag: &mut AsfTag, native_name: &str) -> bool {
        tag.remove(native_name)
    }

    fn native_entries(&self, tag: &AsfTag) -> Vec<(String, AsfValue)> {
        tag.attributes()
            .map(|attribute| (attribute.name.clone(), attribute.value.clone()))
            .collect()
    }

    fn decode_value(
        &self,
        value: &AsfValue,
        tag_name: Option<TagName>,
        native_name: &str,
    ) -> Result<Vec<TagValue>, DecodeError> {
        let kind = value_kind(tag_name);
        let number = match value {
            AsfValue::Unicode(text) => {
                return Ok(vec![TagValue::from_native_text(text, kind, native_name)?]);
            }
            AsfValue::Binary(data) => {
                let data = if kind == ValueKind::Binary
                    && native_name.eq_ignore_ascii_case(PICTURE_ATTRIBUTE)
                {
                    picture::decode_asf_picture(data)
                        .map_err(|reason| DecodeError::new(native_name, reason))?
                        .data
                } else {
                    data.clone()
                };
                return Ok(vec![TagValue::Binary(data)]);
            }
            AsfValue::Bool(flag) => return Ok(vec![TagValue::Integer(i64::from(*flag))]),
            AsfValue::DWord(number) => i64::from(*number),
            AsfValue::Word(number) => i64::from(*number),
            AsfValue::QWord(number) => i64::try_from(*number)
                .map_err(|_| DecodeError::new(native_name, "number out of range"))?,
        };
        Ok(vec![match kind {
            ValueKind::Integer => TagValue::Integer(number),
            ValueKind::Text | ValueKind::Binary => TagValue::Text(number.to_string()),
        }])
    }

    fn encode_value(
        &self,
        value: &TagValue,
        tag_name: TagName,
        native_name: &str,
        _tag: &AsfTag,
    ) -> crate::Result<AsfValue> {
        let value = match (tag_name.value_kind(), value) {
            (_, TagValue::Binary(data)) => {
                if native_name.eq_ignore_ascii_case(PICTURE_ATTRIBUTE) {
                    AsfValue::Binary(picture::encode_asf_picture(&Picture::front_cover(
                        data.clone(),
                    )))
                } else {
                    AsfValue::Binary(data.clone())
                }
            }
            (ValueKind::Integer, value) => {
                let number = value.as_integer().ok_or_else(|| {
                    crate::ErrorType::encode(native_name, format!("{value} is not a number"))
                })?;
                if native_name.eq_ignore_ascii_case(COMPILATION_ATTRIBUTE) {
                    AsfValue::Bool(number != 0)
                } else {
                    AsfValue::DWord(u32::try_from(number).map_err(|_| {
                        crate::ErrorType::encode(native_name, format!("{number} is out of range"))
                    })?)
                }
            }
            (_, TagValue::Integer(number)) => AsfValue::Unicode(number.to_string()),
            (_, TagValue::Text(text)) => AsfValue::Unicode(text.clone()),
        };
        Ok(value)
    }

    fn has_special_handling(&self, tag_name: TagName) -> bool {
        tag_name == TagName::CoverArt || PackedPair::find(&PACKED_PAIRS, tag_name).is_some()
    }

    fn special_values(
        &self,
        tag_name: TagName,
        tag: &AsfTag,
        table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>> {
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            return packed::read(self, pair, tag_name, tag, table);
        }
        let pictures = Self::pictures(tag, Self::picture_name(table))?;
        Ok(picture::select_cover(&pictures, Picture::is_front_cover)
            .map(|picture| TagValue::Binary(picture.data.clone()))
            .into_iter()
            .collect())
    }

    fn set_special(
        &self,
        tag_name: TagName,
        values: &[TagValue],
        tag: &mut AsfTag,
        table: &MappingTable,
    ) -> crate::Result<()> {
        let native_name = table
            .preferred_native_name(tag_name, FormatKind::Asf)
            .unwrap_or_default();
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            let value = packed::integer_value(values, native_name)?;
            packed::write(self, pair, tag_name, value, tag, table);
            return Ok(());
        }

        let data = values
            .first()
            .and_then(TagValue::as_bytes)
            .ok_or_else(|| crate::ErrorType::encode(native_name, "cover art must be binary"))?;
        let mut kept: Vec<AsfValue> = tag
            .get(native_name)
            .into_iter()
            .filter(|value| match value {
                AsfValue::Binary(data) => picture::decode_asf_picture(data)
                    .map_or(true, |picture| !picture.is_front_cover()),
                _ => true,
            })
            .cloned()
            .collect();
        kept.push(AsfValue::Binary(picture::encode_asf_picture(
            &Picture::front_cover(data.to_vec()),
        )));
        tag.set(native_name, kept);
        Ok(())
    }

    fn delete_special(&self, tag_name: TagName, tag: &mut AsfTag, table: &MappingTable) {
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            packed::delete(self, pair, tag_name, tag, table);
        } else {
            let _ = tag.remove(Self::picture_name(table));
        }
    }
}
