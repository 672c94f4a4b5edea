// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Vorbis comments of FLAC files and Ogg streams.

use super::{value_kind, FormatMapper};
use crate::error::DecodeError;
use crate::format::FormatKind;
use crate::mapping::MappingTable;
use crate::native::picture::{self, Picture};
use crate::native::{NativeTagContainer, VorbisCommentStore, VorbisComments};
use crate::tag_name::{TagName, ValueKind};
use crate::value::TagValue;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use metaflac::block::{BlockType, PictureType};
use std::marker::PhantomData;

/// Comment that carries a base64-encoded FLAC picture block.
const PICTURE_COMMENT: &str = "METADATA_BLOCK_PICTURE";

/// Decode a base64-encoded FLAC picture block.
fn decode_picture_comment(text: &str, native_name: &str) -> Result<Picture, DecodeError> {
    let data = BASE64
        .decode(text.trim())
        .map_err(|err| DecodeError::new(native_name, format!("invalid base64 data: {err}")))?;
    picture::decode_flac_picture(&data).map_err(|reason| DecodeError::new(native_name, reason))
}

/// Encode a picture as a base64 FLAC picture block.
fn encode_picture_comment(picture: &Picture) -> String {
    BASE64.encode(picture::encode_flac_picture(picture))
}

/// A tag that carries Vorbis comments and embedded pictures.
pub(super) trait VorbisCarrier: VorbisCommentStore + 'static {
    /// The format of this carrier.
    const KIND: FormatKind;

    /// The carrier inside a container.
    fn from_container(container: &NativeTagContainer) -> Option<&Self>;

    /// Mutable access to the carrier inside a container.
    fn from_container_mut(container: &mut NativeTagContainer) -> Option<&mut Self>;

    /// All embedded pictures in native order.
    fn embedded_pictures(&self, native_name: &str) -> Result<Vec<Picture>, DecodeError>;

    /// Replace the front cover, keeping other pictures.
    fn set_front_cover(&mut self, native_name: &str, data: Vec<u8>);

    /// Remove all embedded pictures. Returns `true` if there were any.
    fn remove_pictures(&mut self, native_name: &str) -> bool;

    /// Native entries that are not stored as comments.
    fn extra_entries(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

impl VorbisCarrier for metaflac::Tag {
    const KIND: FormatKind = FormatKind::FlacVorbis;

    fn from_container(container: &NativeTagContainer) -> Option<&Self> {
        match container {
            NativeTagContainer::Flac(tag) => Some(tag),
            _ => None,
        }
    }

    fn from_container_mut(container: &mut NativeTagContainer) -> Option<&mut Self> {
        match container {
            NativeTagContainer::Flac(tag) => Some(tag),
            _ => None,
        }
    }

    fn embedded_pictures(&self, _native_name: &str) -> Result<Vec<Picture>, DecodeError> {
        Ok(self
            .pictures()
            .cloned()
            .map(Picture::from)
            .collect())
    }

    fn set_front_cover(&mut self, _native_name: &str, data: Vec<u8>) {
        self.remove_picture_type(PictureType::CoverFront);
        self.add_picture(picture::mime_type_name(&data), PictureType::CoverFront, data);
    }

    fn remove_pictures(&mut self, _native_name: &str) -> bool {
        let had_pictures = self.pictures().next().is_some();
        self.remove_blocks(BlockType::Picture);
        had_pictures
    }

    fn extra_entries(&self) -> Vec<(String, String)> {
        self.embedded_pictures(PICTURE_COMMENT)
            .unwrap_or_default()
            .iter()
            .map(|picture| (PICTURE_COMMENT.to_string(), encode_picture_comment(picture)))
            .collect()
    }
}

impl VorbisCarrier for VorbisComments {
    const KIND: FormatKind = FormatKind::OggVorbis;

    fn from_container(container: &NativeTagContainer) -> Option<&Self> {
        match container {
            NativeTagContainer::Ogg(tag) => Some(tag),
            _ => None,
        }
    }

    fn from_container_mut(container: &mut NativeTagContainer) -> Option<&mut Self> {
        match container {
            NativeTagContainer::Ogg(tag) => Some(tag),
            _ => None,
        }
    }

    fn embedded_pictures(&self, native_name: &str) -> Result<Vec<Picture>, DecodeError> {
        self.values(native_name)
            .into_iter()
            .map(|text| decode_picture_comment(text, native_name))
            .collect()
    }

    fn set_front_cover(&mut self, native_name: &str, data: Vec<u8>) {
        let mut values: Vec<String> = self
            .values(native_name)
            .into_iter()
            .filter(|text| {
                decode_picture_comment(text, native_name)
                    .map_or(true, |picture| !picture.is_front_cover())
            })
            .cloned()
            .collect();
        values.push(encode_picture_comment(&Picture::front_cover(data)));
        self.set_values(native_name, values);
    }

    fn remove_pictures(&mut self, native_name: &str) -> bool {
        self.remove_values(native_name)
    }
}

/// Mapper for Vorbis comments, generic over the carrier.
pub(super) struct VorbisMapper<T>(PhantomData<fn() -> T>);

/// Mapper for FLAC files.
pub(super) const FLAC_MAPPER: VorbisMapper<metaflac::Tag> = VorbisMapper(PhantomData);

/// Mapper for Ogg Vorbis streams.
pub(super) const OGG_MAPPER: VorbisMapper<VorbisComments> = VorbisMapper(PhantomData);

impl<T: VorbisCarrier> FormatMapper for VorbisMapper<T> {
    type Tag = T;
    type Value = String;

    fn format_kind(&self) -> FormatKind {
        T::KIND
    }

    fn tag<'a>(&self, container: &'a NativeTagContainer) -> Option<&'a T> {
        T::from_container(container)
    }

    fn tag_mut<'a>(&self, container: &'a mut NativeTagContainer) -> Option<&'a mut T> {
        T::from_container_mut(container)
    }

    fn native_values(&self, tag: &T, native_name: &str) -> Vec<String> {
        tag.values(native_name).into_iter().cloned().collect()
    }

    fn store_values(&self, tag: &mut T, native_name: &str, values: Vec<String>) {
        tag.set_values(native_name, values);
    }

    fn remove_values(&self, tag: &mut T, native_name: &str) -> bool {
        VorbisCommentStore::remove_values(tag, native_name)
    }

    fn native_entries(&self, tag: &T) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = tag
            .entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        entries.extend(tag.extra_entries());
        entries
    }

    fn decode_value(
        &self,
        value: &String,
        tag_name: Option<TagName>,
        native_name: &str,
    ) -> Result<Vec<TagValue>, DecodeError> {
        let value = match value_kind(tag_name) {
            ValueKind::Binary => {
                TagValue::Binary(decode_picture_comment(value, native_name)?.data)
            }
            kind => TagValue::from_native_text(value, kind, native_name)?,
        };
        Ok(vec![value])
    }

    fn encode_value(
        &self,
        value: &TagValue,
        _tag_name: TagName,
        _native_name: &str,
        _tag: &T,
    ) -> crate::Result<String> {
        Ok(match value {
            TagValue::Binary(data) => encode_picture_comment(&Picture::front_cover(data.clone())),
            TagValue::Text(text) => text.clone(),
            TagValue::Integer(number) => number.to_string(),
        })
    }

    fn has_special_handling(&self, tag_name: TagName) -> bool {
        tag_name == TagName::CoverArt
    }

    fn special_values(
        &self,
        tag_name: TagName,
        tag: &T,
        table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>> {
        let native_name = table
            .preferred_native_name(tag_name, T::KIND)
            .unwrap_or(PICTURE_COMMENT);
        let pictures = tag.embedded_pictures(native_name)?;
        Ok(picture::select_cover(&pictures, Picture::is_front_cover)
            .map(|picture| TagValue::Binary(picture.data.clone()))
            .into_iter()
            .collect())
    }

    fn set_special(
        &self,
        tag_name: TagName,
        values: &[TagValue],
        tag: &mut T,
        table: &MappingTable,
    ) -> crate::Result<()> {
        let native_name = table
            .preferred_native_name(tag_name, T::KIND)
            .unwrap_or(PICTURE_COMMENT);
        let data = values
            .first()
            .and_then(TagValue::as_bytes)
            .ok_or_else(|| crate::ErrorType::encode(native_name, "cover art must be binary"))?;
        tag.set_front_cover(native_name, data.to_vec());
        Ok(())
    }

    fn delete_special(&self, tag_name: TagName, tag: &mut T, table: &MappingTable) {
        let native_name = table
            .preferred_native_name(tag_name, T::KIND)
            .unwrap_or(PICTURE_COMMENT);
        let _ = tag.remove_pictures(native_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::tests::{check_roundtrip, table};
    use crate::mapper::for_kind;
    use paste::paste;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

    fn flac() -> NativeTagContainer {
        NativeTagContainer::Flac(metaflac::Tag::new())
    }

    fn ogg() -> NativeTagContainer {
        NativeTagContainer::Ogg(VorbisComments::default())
    }

    fn comments(pairs: &[(&str, &str)]) -> NativeTagContainer {
        let mut comments = VorbisComments::default();
        for (key, value) in pairs {
            comments.push(*key, *value);
        }
        NativeTagContainer::Ogg(comments)
    }

    macro_rules! add_roundtrip_tests {
        ($tag_name:ident, $value:expr) => {
            paste! {
                #[test]
                fn [<test_roundtrip_ $tag_name:snake _flac>]() {
                    check_roundtrip(flac(), TagName::$tag_name, $value);
                }

                #[test]
                fn [<test_roundtrip_ $tag_name:snake _ogg>]() {
                    check_roundtrip(ogg(), TagName::$tag_name, $value);
                }
            }
        };
    }

    add_roundtrip_tests!(AlbumTitle, vec!["A Love Supreme".into()]);
    add_roundtrip_tests!(Artists, vec!["John Coltrane".into(), "McCoy Tyner".into()]);
    add_roundtrip_tests!(TrackNumber, vec![TagValue::Integer(4)]);
    add_roundtrip_tests!(TrackCount, vec![TagValue::Integer(4)]);
    add_roundtrip_tests!(DiscCount, vec![TagValue::Integer(1)]);
    add_roundtrip_tests!(MusicBrainzTrackId, vec!["c5a9b8f0-3c9d-4a7e-9d2f-1d3a2f0b4e55".into()]);
    add_roundtrip_tests!(CoverArt, vec![TagValue::Binary(PNG.to_vec())]);

    #[test]
    fn test_total_tracks_priority() {
        let container = comments(&[("TRACKTOTAL", "7"), ("TOTALTRACKS", "10")]);
        assert_eq!(
            for_kind(FormatKind::OggVorbis)
                .read(&container, TagName::TrackCount, &table())
                .unwrap(),
            [TagValue::Integer(10)]
        );
    }

    #[test]
    fn test_total_tracks_fallback_and_cleanup() {
        let table = table();
        let mapper = for_kind(FormatKind::OggVorbis);
        let mut container = comments(&[("TRACKTOTAL", "7")]);
        assert_eq!(
            mapper.read(&container, TagName::TrackCount, &table).unwrap(),
            [TagValue::Integer(7)]
        );

        assert!(mapper
            .write(&mut container, TagName::TrackCount, &[TagValue::Integer(9)], &table)
            .unwrap());
        let tag = OGG_MAPPER.tag(&container).unwrap();
        assert_eq!(tag.values("TOTALTRACKS"), [&"9".to_string()]);
        assert_eq!(tag.values("TRACKTOTAL"), [&"7".to_string()]);

        assert!(mapper
            .remove_non_preferred(&mut container, TagName::TrackCount, &table)
            .unwrap());
        let tag = OGG_MAPPER.tag(&container).unwrap();
        assert!(tag.values("TRACKTOTAL").is_empty());
        assert_eq!(
            mapper.read(&container, TagName::TrackCount, &table).unwrap(),
            [TagValue::Integer(9)]
        );
    }

    #[test]
    fn test_invalid_number() {
        let container = comments(&[("TRACKNUMBER", "three")]);
        let err = for_kind(FormatKind::OggVorbis)
            .read(&container, TagName::TrackNumber, &table())
            .unwrap_err();
        assert!(matches!(err, crate::ErrorType::Decode(_)));
    }

    #[test]
    fn test_ogg_cover_prefers_front() {
        let back = Picture {
            picture_type: 4,
            ..Picture::front_cover(JPEG.to_vec())
        };
        let container = comments(&[
            (PICTURE_COMMENT, &encode_picture_comment(&back)),
            (PICTURE_COMMENT, &encode_picture_comment(&Picture::front_cover(PNG.to_vec()))),
        ]);
        assert_eq!(
            for_kind(FormatKind::OggVorbis)
                .read(&container, TagName::CoverArt, &table())
                .unwrap(),
            [TagValue::Binary(PNG.to_vec())]
        );
    }

    #[test]
    fn test_ogg_cover_replaces_front_only() {
        let table = table();
        let back = Picture {
            picture_type: 4,
            ..Picture::front_cover(JPEG.to_vec())
        };
        let mut container = comments(&[
            (PICTURE_COMMENT, &encode_picture_comment(&back)),
            (PICTURE_COMMENT, &encode_picture_comment(&Picture::front_cover(JPEG.to_vec()))),
        ]);
        let mapper = for_kind(FormatKind::OggVorbis);
        assert!(mapper
            .write(&mut container, TagName::CoverArt, &[PNG.to_vec().into()], &table)
            .unwrap());

        let tag = OGG_MAPPER.tag(&container).unwrap();
        let pictures = tag.embedded_pictures(PICTURE_COMMENT).unwrap();
        assert_eq!(pictures.len(), 2);
        assert_eq!(pictures[0], back);
        assert_eq!(pictures[1].data, PNG);
        assert_eq!(pictures[1].mime_type, "image/png");
    }

    #[test]
    fn test_flac_cover_prefers_front() {
        let mut tag = metaflac::Tag::new();
        tag.add_picture("image/jpeg", PictureType::CoverBack, JPEG.to_vec());
        tag.add_picture("image/png", PictureType::CoverFront, PNG.to_vec());
        let container = NativeTagContainer::Flac(tag);
        assert_eq!(
            for_kind(FormatKind::FlacVorbis)
                .read(&container, TagName::CoverArt, &table())
                .unwrap(),
            [TagValue::Binary(PNG.to_vec())]
        );
    }

    #[test]
    fn test_flac_dump_includes_pictures() {
        let mut tag = metaflac::Tag::new();
        tag.set_vorbis("TITLE", vec!["Alabama"]);
        tag.add_picture("image/png", PictureType::CoverFront, PNG.to_vec());
        let properties = for_kind(FormatKind::FlacVorbis)
            .dump(&NativeTagContainer::Flac(tag), &table())
            .unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].tag_name, Some(TagName::TrackTitle));
        assert_eq!(properties[1].native_name, PICTURE_COMMENT);
        assert_eq!(properties[1].value, TagValue::Binary(PNG.to_vec()));
    }
}
