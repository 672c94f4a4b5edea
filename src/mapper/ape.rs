// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! APEv2 items.
//!
//! Multiple text values share one item, separated by nul characters. Cover art items start with
//! a nul-terminated file name followed by the image data.

use super::{packed, value_kind, FormatMapper, PackedPair, PackedText};
use crate::error::DecodeError;
use crate::format::FormatKind;
use crate::mapping::MappingTable;
use crate::native::picture;
use crate::native::{ApeTag, ApeValue, NativeTagContainer};
use crate::tag_name::{TagName, ValueKind};
use crate::value::TagValue;
use lofty::picture::MimeType;

/// Pairs stored as `N/M` in one item.
const PACKED_PAIRS: [PackedPair; 2] = [PackedPair::TRACK, PackedPair::DISC];

/// Key prefix of cover art items.
const COVER_ART_PREFIX: &str = "Cover Art";

/// Whether an item key names a cover art item, e.g. `Cover Art (Back)`.
fn is_cover_art_key(key: &str) -> bool {
    key.get(..COVER_ART_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(COVER_ART_PREFIX))
}

/// File name stored in front of cover art data.
fn cover_file_name(data: &[u8]) -> &'static str {
    match picture::mime_type_of(data) {
        Some(MimeType::Jpeg) => "cover.jpg",
        Some(MimeType::Png) => "cover.png",
        Some(MimeType::Gif) => "cover.gif",
        Some(MimeType::Bmp) => "cover.bmp",
        _ => "cover.bin",
    }
}

/// Split the values of an item into separate native values.
fn split_item(value: &ApeValue) -> Vec<ApeValue> {
    match value {
        ApeValue::Text(text) => text
            .split('\0')
            .filter(|part| !part.is_empty())
            .map(|part| ApeValue::Text(part.to_string()))
            .collect(),
        other => vec![other.clone()],
    }
}

/// Mapper for APEv2 tags.
#[derive(Debug, Clone, Copy)]
pub(super) struct ApeMapper;

impl PackedText for ApeMapper {
    fn read_text(&self, tag: &ApeTag, native_name: &str) -> Option<String> {
        match tag.get(native_name)? {
            ApeValue::Text(text) => text.split('\0').next().map(str::to_string),
            ApeValue::Binary(_) | ApeValue::Locator(_) => None,
        }
    }

    fn write_text(&self, tag: &mut ApeTag, native_name: &str, text: String) {
        tag.set(native_name, ApeValue::Text(text));
    }
}

impl FormatMapper for ApeMapper {
    type Tag = ApeTag;
    type Value = ApeValue;

    fn format_kind(&self) -> FormatKind {
        FormatKind::Ape
    }

    fn tag<'a>(&self, container: &'a NativeTagContainer) -> Option<&'a ApeTag> {
        match container {
            NativeTagContainer::Ape(tag) => Some(tag),
            _ => None,
        }
    }

    fn tag_mut<'a>(&self, container: &'a mut NativeTagContainer) -> Option<&'a mut ApeTag> {
        match container {
            NativeTagContainer::Ape(tag) => Some(tag),
            _ => None,
        }
    }

    fn native_values(&self, tag: &ApeTag, native_name: &str) -> Vec<ApeValue> {
        tag.get(native_name).map(split_item).unwrap_or_default()
    }

    fn store_values(&self, tag: &mut ApeTag, native_name: &str, values: Vec<ApeValue>) {
        let mut texts = Vec::with_capacity(values.len());
        for value in values {
            match value {
                ApeValue::Text(text) => texts.push(text),
                other => {
                    tag.set(native_name, other);
                    return;
                }
            }
        }
        if texts.is_empty() {
            let _ = tag.remove(native_name);
        } else {
            tag.set(native_name, ApeValue::Text(texts.join("\0")));
        }
    }

    fn remove_values(&self, tag: &mut ApeTag, native_name: &str) -> bool {
        tag.remove(native_name)
    }

    fn native_entries(&self, tag: &ApeTag) -> Vec<(String, ApeValue)> {
        tag.items()
            .flat_map(|item| {
                split_item(&item.value)
                    .into_iter()
                    .map(|value| (item.key.clone(), value))
            })
            .collect()
    }

    fn decode_value(
        &self,
        value: &ApeValue,
        tag_name: Option<TagName>,
        native_name: &str,
    ) -> Result<Vec<TagValue>, DecodeError> {
        let kind = value_kind(tag_name);
        let value = match value {
            ApeValue::Text(text) | ApeValue::Locator(text) => {
                TagValue::from_native_text(text, kind, native_name)?
            }
            ApeValue::Binary(data) if kind == ValueKind::Binary && is_cover_art_key(native_name) => {
                let start = data
                    .iter()
                    .position(|byte| *byte == 0)
                    .ok_or_else(|| DecodeError::new(native_name, "missing cover art file name"))?;
                TagValue::Binary(data[start + 1..].to_vec())
            }
            ApeValue::Binary(data) => TagValue::Binary(data.clone()),
        };
        Ok(vec![value])
    }

    fn encode_value(
        &self,
        value: &TagValue,
        _tag_name: TagName,
        native_name: &str,
        _tag: &ApeTag,
    ) -> crate::Result<ApeValue> {
        let value = match value {
            TagValue::Text(text) => ApeValue::Text(text.clone()),
            TagValue::Integer(number) => ApeValue::Text(number.to_string()),
            TagValue::Binary(data) if is_cover_art_key(native_name) => {
                let mut item = cover_file_name(data).as_bytes().to_vec();
                item.push(0);
                item.extend_from_slice(data);
                ApeValue::Binary(item)
            }
            TagValue::Binary(data) => ApeValue::Binary(data.clone()),
        };
        Ok(value)
    }

    fn has_special_handling(&self, tag_name: TagName) -> bool {
        PackedPair::find(&PACKED_PAIRS, tag_name).is_some()
    }

    fn special_values(
        &self,
        tag_name: TagName,
        tag: &ApeTag,
        table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>> {
        match PackedPair::find(&PACKED_PAIRS, tag_name) {
            Some(pair) => packed::read(self, pair, tag_name, tag, table),
            None => Ok(Vec::new()),
        }
    }

    fn set_special(
        &self,
        tag_name: TagName,
        values: &[TagValue],
        tag: &mut ApeTag,
        table: &MappingTable,
    ) -> crate::Result<()> {
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            let native_name = table
                .preferred_native_name(tag_name, FormatKind::Ape)
                .unwrap_or_default();
            let value = packed::integer_value(values, native_name)?;
            packed::write(self, pair, tag_name, value, tag, table);
        }
        Ok(())
    }

    fn delete_special(&self, tag_name: TagName, tag: &mut ApeTag, table: &MappingTable) {
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            packed::delete(self, pair, tag_name, tag, table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::tests::{check_roundtrip, table};
    use crate::mapper::for_kind;
    use paste::paste;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

    fn container(items: &[(&str, ApeValue)]) -> NativeTagContainer {
        let mut tag = ApeTag::default();
        for (key, value) in items {
            tag.set(key, value.clone());
        }
        NativeTagContainer::Ape(tag)
    }

    fn text(value: &str) -> ApeValue {
        ApeValue::Text(value.to_string())
    }

    macro_rules! add_roundtrip_test {
        ($tag_name:ident, $value:expr) => {
            paste! {
                #[test]
                fn [<test_roundtrip_ $tag_name:snake>]() {
                    check_roundtrip(container(&[]), TagName::$tag_name, $value);
                }
            }
        };
    }

    add_roundtrip_test!(Artist, vec!["Nina Simone".into()]);
    add_roundtrip_test!(Genre, vec!["Soul".into(), "Jazz".into()]);
    add_roundtrip_test!(Bpm, vec![TagValue::Integer(74)]);
    add_roundtrip_test!(TrackNumber, vec![TagValue::Integer(3)]);
    add_roundtrip_test!(TrackCount, vec![TagValue::Integer(12)]);
    add_roundtrip_test!(DiscCount, vec![TagValue::Integer(2)]);
    add_roundtrip_test!(CoverArt, vec![TagValue::Binary(PNG.to_vec())]);

    #[test]
    fn test_multiple_values_share_item() {
        let mut container = container(&[]);
        let table = table();
        assert!(for_kind(FormatKind::Ape)
            .write(
                &mut container,
                TagName::Genre,
                &["Soul".into(), "Jazz".into()],
                &table
            )
            .unwrap());
        let tag = ApeMapper.tag(&container).unwrap();
        assert_eq!(tag.get("Genre"), Some(&text("Soul\0Jazz")));
    }

    #[test]
    fn test_packed_track() {
        let mut container = container(&[("Track", text("3/12"))]);
        let table = table();
        let mapper = for_kind(FormatKind::Ape);
        assert_eq!(
            mapper.read(&container, TagName::TrackNumber, &table).unwrap(),
            [TagValue::Integer(3)]
        );
        assert_eq!(
            mapper.read(&container, TagName::TrackCount, &table).unwrap(),
            [TagValue::Integer(12)]
        );

        assert!(mapper
            .write(&mut container, TagName::TrackCount, &[TagValue::Integer(14)], &table)
            .unwrap());
        assert_eq!(ApeMapper.tag(&container).unwrap().get("Track"), Some(&text("3/14")));

        assert!(mapper.delete(&mut container, TagName::TrackNumber, &table).unwrap());
        assert_eq!(ApeMapper.tag(&container).unwrap().get("Track"), Some(&text("0/14")));
        assert!(mapper
            .read(&container, TagName::TrackNumber, &table)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_cover_art_file_name() {
        let mut container = container(&[]);
        let table = table();
        assert!(for_kind(FormatKind::Ape)
            .write(&mut container, TagName::CoverArt, &[PNG.to_vec().into()], &table)
            .unwrap());
        let Some(ApeValue::Binary(data)) =
            ApeMapper.tag(&container).unwrap().get("Cover Art (Front)")
        else {
            panic!("cover art not stored as binary item");
        };
        assert!(data.starts_with(b"cover.png\0"));
        assert_eq!(&data[10..], PNG);
    }

    #[test]
    fn test_cover_art_without_file_name() {
        let container = container(&[("Cover Art (Front)", ApeValue::Binary(vec![1, 2, 3]))]);
        let err = for_kind(FormatKind::Ape)
            .read(&container, TagName::CoverArt, &table())
            .unwrap_err();
        assert!(matches!(err, crate::ErrorType::Decode(_)));
    }

    #[test]
    fn test_dump_splits_values() {
        let container = container(&[("Artist", text("A\0B")), ("Unknown", text("x"))]);
        let properties = for_kind(FormatKind::Ape).dump(&container, &table()).unwrap();
        assert_eq!(properties.len(), 3);
        assert_eq!(properties[1].tag_name, Some(TagName::Artist));
        assert_eq!(properties[1].value, TagValue::from("B"));
        assert_eq!(properties[2].tag_name, None);
    }
}
