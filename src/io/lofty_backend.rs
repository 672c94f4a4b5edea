// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! MP4, Ogg Vorbis and APEv2 files via `lofty`.

use crate::native::picture::{self, Picture};
use crate::native::{
    ApeTag, ApeValue, FreeFormType, Mp4Atom, Mp4Data, Mp4Tag, VorbisComments,
    MP4_FREEFORM_PREFIX,
};
use base64::Engine as _;
use lofty::ape::{ApeFile, ApeItem as LoftyApeItem, ApeTag as LoftyApeTag};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::AudioFile;
use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst, Mp4File};
use lofty::ogg::{OggPictureStorage, VorbisComments as LoftyVorbisComments, VorbisFile};
use lofty::picture::{MimeType, Picture as LoftyPicture, PictureType};
use lofty::tag::ItemValue;
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Vorbis comment key of embedded pictures.
const PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";

/// Only the tags are read, audio properties are skipped.
fn parse_options() -> ParseOptions {
    ParseOptions::new().read_properties(false)
}

/// Write options, without padding if `strip_padding` is set.
fn write_options(strip_padding: bool) -> WriteOptions {
    let options = WriteOptions::default();
    if strip_padding {
        options.preferred_padding(0)
    } else {
        options
    }
}

/// Open a file for reading and writing.
fn open_for_writing(path: &Path) -> crate::Result<File> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    Ok(file)
}

/// Type code of free-form atom data.
fn freeform_type(code: u32) -> FreeFormType {
    match code {
        0 => FreeFormType::Implicit,
        1 => FreeFormType::Utf8,
        2 => FreeFormType::Utf16,
        code => FreeFormType::Other(code),
    }
}

/// Inverse of [`freeform_type`].
fn freeform_code(kind: FreeFormType) -> u32 {
    match kind {
        FreeFormType::Implicit => 0,
        FreeFormType::Utf8 => 1,
        FreeFormType::Utf16 => 2,
        FreeFormType::Other(code) => code,
    }
}

/// Four-character codes are Latin-1, e.g. `©nam` is `A9 6E 61 6D`.
fn fourcc_name(code: [u8; 4]) -> String {
    code.iter().copied().map(char::from).collect()
}

/// Inverse of [`fourcc_name`]. `None` if the name is not four Latin-1 characters.
fn fourcc_code(name: &str) -> Option<[u8; 4]> {
    let bytes = name
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    bytes.try_into().ok()
}

/// Native data of a picture atom.
fn picture_data(picture: &LoftyPicture) -> Mp4Data {
    let data = picture.data().to_vec();
    match picture.mime_type() {
        Some(MimeType::Jpeg) => Mp4Data::Jpeg(data),
        Some(MimeType::Png) => Mp4Data::Png(data),
        _ => Mp4Data::Binary(data),
    }
}

/// Front cover atom data.
fn cover_picture(mime_type: MimeType, data: Vec<u8>) -> AtomData {
    AtomData::Picture(LoftyPicture::new_unchecked(
        PictureType::CoverFront,
        Some(mime_type),
        None,
        data,
    ))
}

/// Native data of a standard atom. `trkn` and `disk` hold number pairs.
fn fourcc_data(ident: &str, data: &AtomData) -> Mp4Data {
    match data {
        AtomData::UTF8(text) | AtomData::UTF16(text) => Mp4Data::Utf8(text.clone()),
        AtomData::SignedInteger(number) => Mp4Data::Integer(i64::from(*number)),
        AtomData::UnsignedInteger(number) => Mp4Data::Integer(i64::from(*number)),
        AtomData::Bool(flag) => Mp4Data::Bool(*flag),
        AtomData::Picture(picture) => picture_data(picture),
        AtomData::Unknown { data, .. } if matches!(ident, "trkn" | "disk") && data.len() >= 6 => {
            Mp4Data::NumberPair(
                u16::from_be_bytes([data[2], data[3]]),
                u16::from_be_bytes([data[4], data[5]]),
            )
        }
        AtomData::Unknown { data, .. } => Mp4Data::Binary(data.clone()),
    }
}

/// Native data of a free-form (`----`) atom.
fn freeform_data(ident: &str, data: &AtomData) -> Mp4Data {
    match data {
        AtomData::UTF8(text) => Mp4Data::FreeForm(FreeFormType::Utf8, text.as_bytes().to_vec()),
        AtomData::UTF16(text) => Mp4Data::FreeForm(
            FreeFormType::Utf16,
            text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        ),
        AtomData::Unknown { code, data } => {
            Mp4Data::FreeForm(freeform_type((*code).into()), data.clone())
        }
        other => fourcc_data(ident, other),
    }
}

/// Native atoms of an `ilst`.
fn mp4_tag_from_ilst(ilst: &Ilst) -> Mp4Tag {
    ilst.into_iter()
        .map(|atom| {
            let (ident, is_freeform) = match atom.ident() {
                AtomIdent::Fourcc(code) => (fourcc_name(*code), false),
                AtomIdent::Freeform { mean, name } => {
                    (format!("{MP4_FREEFORM_PREFIX}{mean}:{name}"), true)
                }
            };
            let data = atom
                .data()
                .map(|data| {
                    if is_freeform {
                        freeform_data(&ident, data)
                    } else {
                        fourcc_data(&ident, data)
                    }
                })
                .collect();
            Mp4Atom { ident, data }
        })
        .collect()
}

/// Lofty atom data of a native value.
fn atom_data(ident: &str, data: &Mp4Data) -> AtomData {
    match data {
        Mp4Data::Utf8(text) => AtomData::UTF8(text.clone()),
        Mp4Data::Integer(number) => match i32::try_from(*number) {
            Ok(number) => AtomData::SignedInteger(number),
            Err(_) => AtomData::UTF8(number.to_string()),
        },
        Mp4Data::Bool(flag) => AtomData::Bool(*flag),
        Mp4Data::NumberPair(number, count) => {
            let mut data = vec![0, 0];
            data.extend_from_slice(&number.to_be_bytes());
            data.extend_from_slice(&count.to_be_bytes());
            if ident == "trkn" {
                data.extend_from_slice(&[0, 0]);
            }
            AtomData::Unknown {
                code: 0u32.into(),
                data,
            }
        }
        Mp4Data::Jpeg(data) => cover_picture(MimeType::Jpeg, data.clone()),
        Mp4Data::Png(data) => cover_picture(MimeType::Png, data.clone()),
        Mp4Data::FreeForm(FreeFormType::Utf8, data) => match String::from_utf8(data.clone()) {
            Ok(text) => AtomData::UTF8(text),
            Err(err) => AtomData::Unknown {
                code: 1u32.into(),
                data: err.into_bytes(),
            },
        },
        Mp4Data::FreeForm(kind, data) => AtomData::Unknown {
            code: freeform_code(*kind).into(),
            data: data.clone(),
        },
        Mp4Data::Binary(data) => AtomData::Unknown {
            code: 0u32.into(),
            data: data.clone(),
        },
    }
}

/// Build an `ilst` from native atoms, skipping atoms with unusable names.
fn ilst_from_mp4_tag(tag: &Mp4Tag) -> Ilst {
    let mut ilst = Ilst::default();
    for atom in tag.atoms() {
        let ident = match atom.ident.strip_prefix(MP4_FREEFORM_PREFIX) {
            Some(rest) => {
                let (mean, name) = rest.split_once(':').unwrap_or(("com.apple.iTunes", rest));
                AtomIdent::Freeform {
                    mean: Cow::Owned(mean.to_string()),
                    name: Cow::Owned(name.to_string()),
                }
            }
            None => match fourcc_code(&atom.ident) {
                Some(code) => AtomIdent::Fourcc(code),
                None => {
                    log::warn!("Skipping MP4 atom with invalid name {:?}", atom.ident);
                    continue;
                }
            },
        };
        let data: Vec<AtomData> = atom
            .data
            .iter()
            .map(|data| atom_data(&atom.ident, data))
            .collect();
        if let Some(atom) = Atom::from_collection(ident, data) {
            ilst.insert(atom);
        }
    }
    ilst
}

/// Read the `ilst` atoms of an MP4 file. Files without tags yield an empty tag.
pub(super) fn read_mp4(path: &Path) -> crate::Result<Mp4Tag> {
    let mut file = File::open(path)?;
    let mp4_file = <Mp4File as AudioFile>::read_from(&mut file, parse_options())?;
    Ok(mp4_file.ilst().map(mp4_tag_from_ilst).unwrap_or_default())
}

/// Replace the `ilst` atoms of an MP4 file.
pub(super) fn write_mp4(path: &Path, tag: &Mp4Tag, strip_padding: bool) -> crate::Result<()> {
    let mut file = open_for_writing(path)?;
    let mut mp4_file = <Mp4File as AudioFile>::read_from(&mut file, parse_options())?;
    let _ = mp4_file.set_ilst(ilst_from_mp4_tag(tag));
    mp4_file.save_to(&mut file, write_options(strip_padding))?;
    Ok(())
}

/// Native comments from lofty comments, with pictures as `METADATA_BLOCK_PICTURE` comments.
fn vorbis_comments_from_lofty(comments: &LoftyVorbisComments) -> VorbisComments {
    let mut vorbis_comments = VorbisComments {
        vendor: comments.vendor().to_string(),
        ..VorbisComments::default()
    };
    for (key, value) in comments.items() {
        vorbis_comments.push(key, value);
    }
    for (lofty_picture, _) in comments.pictures() {
        let picture = Picture {
            picture_type: lofty_picture.pic_type().as_u8(),
            mime_type: lofty_picture
                .mime_type()
                .map_or_else(
                    || picture::mime_type_name(lofty_picture.data()),
                    |mime_type| mime_type.as_str().to_string(),
                ),
            description: lofty_picture.description().unwrap_or_default().to_string(),
            data: lofty_picture.data().to_vec(),
        };
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(picture::encode_flac_picture(&picture));
        vorbis_comments.push(PICTURE_KEY, encoded);
    }
    vorbis_comments
}

/// Lofty comments from native comments. Pictures stay `METADATA_BLOCK_PICTURE` comments.
fn lofty_from_vorbis_comments(vorbis_comments: &VorbisComments) -> LoftyVorbisComments {
    use crate::native::VorbisCommentStore as _;

    let mut comments = LoftyVorbisComments::default();
    comments.set_vendor(vorbis_comments.vendor.clone());
    for (key, value) in vorbis_comments.entries() {
        comments.push(key.to_string(), value.to_string());
    }
    comments
}

/// Read the comment header of an Ogg Vorbis stream.
pub(super) fn read_ogg(path: &Path) -> crate::Result<VorbisComments> {
    let mut file = File::open(path)?;
    let ogg_file = <VorbisFile as AudioFile>::read_from(&mut file, parse_options())?;
    Ok(vorbis_comments_from_lofty(ogg_file.vorbis_comments()))
}

/// Replace the comment header of an Ogg Vorbis stream.
pub(super) fn write_ogg(
    path: &Path,
    vorbis_comments: &VorbisComments,
    strip_padding: bool,
) -> crate::Result<()> {
    let mut file = open_for_writing(path)?;
    let mut ogg_file = <VorbisFile as AudioFile>::read_from(&mut file, parse_options())?;
    let _ = ogg_file.set_vorbis_comments(lofty_from_vorbis_comments(vorbis_comments));
    ogg_file.save_to(&mut file, write_options(strip_padding))?;
    Ok(())
}

/// Native items of a lofty APEv2 tag.
fn ape_tag_from_lofty(tag: &LoftyApeTag) -> ApeTag {
    let mut ape_tag = ApeTag::default();
    for item in tag {
        let value = match item.value() {
            ItemValue::Text(text) => ApeValue::Text(text.clone()),
            ItemValue::Locator(locator) => ApeValue::Locator(locator.clone()),
            ItemValue::Binary(data) => ApeValue::Binary(data.clone()),
        };
        ape_tag.set(item.key(), value);
    }
    ape_tag
}

/// Lofty APEv2 tag from native items.
///
/// Fails for items that lofty rejects, e.g. reserved keys.
fn lofty_from_ape_tag(ape_tag: &ApeTag) -> crate::Result<LoftyApeTag> {
    let mut tag = LoftyApeTag::default();
    for item in ape_tag.items() {
        let value = match &item.value {
            ApeValue::Text(text) => ItemValue::Text(text.clone()),
            ApeValue::Locator(locator) => ItemValue::Locator(locator.clone()),
            ApeValue::Binary(data) => ItemValue::Binary(data.clone()),
        };
        tag.insert(LoftyApeItem::new(item.key.clone(), value)?);
    }
    Ok(tag)
}

/// Read the APEv2 tag of a Monkey's Audio file.
pub(super) fn read_ape(path: &Path) -> crate::Result<ApeTag> {
    let mut file = File::open(path)?;
    let ape_file = <ApeFile as AudioFile>::read_from(&mut file, parse_options())?;
    Ok(ape_file.ape().map(ape_tag_from_lofty).unwrap_or_default())
}

/// Replace the APEv2 tag of a Monkey's Audio file.
pub(super) fn write_ape(path: &Path, ape_tag: &ApeTag, strip_padding: bool) -> crate::Result<()> {
    let tag = lofty_from_ape_tag(ape_tag)?;
    let mut file = open_for_writing(path)?;
    let mut ape_file = <ApeFile as AudioFile>::read_from(&mut file, parse_options())?;
    let _ = ape_file.set_ape(tag);
    ape_file.save_to(&mut file, write_options(strip_padding))?;
    Ok(())
}
