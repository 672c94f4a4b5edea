// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! ID3v2.4 and ID3v2.3 frames.
//!
//! Native names are frame IDs, optionally qualified by a colon:
//!
//! | Native name       | Frames                                              |
//! |-------------------|-----------------------------------------------------|
//! | `TXXX:<desc>`     | User-defined text with the given description        |
//! | `UFID:<owner>`    | Unique file identifier of the given owner           |
//! | `TIPL:<role>`     | Involved people with the given role (also `IPLS`)   |
//! | `TMCL`, `IPLS`    | Musician credits, as `instrument: name`             |
//! | `COMM[:<desc>]`   | Comment with the given (or an empty) description    |
//! | `USLT[:<desc>]`   | Unsynchronized lyrics                               |
//! | `APIC`            | Attached pictures, front cover preferred            |
//! | anything else     | Plain text frame                                    |

use super::{packed, value_kind, FormatMapper, PackedPair, PackedText};
use crate::error::DecodeError;
use crate::format::FormatKind;
use crate::mapping::MappingTable;
use crate::native::picture;
use crate::native::NativeTagContainer;
use crate::tag_name::{TagName, ValueKind};
use crate::value::TagValue;
use id3::frame::{
    Comment, ExtendedText, Lyrics, Picture as Id3Picture, PictureType, UniqueFileIdentifier,
};
use id3::{Content, Frame, TagLike};
use itertools::Itertools;

/// Pairs stored as `N/M` in one text frame.
const PACKED_PAIRS: [PackedPair; 3] = [PackedPair::TRACK, PackedPair::DISC, PackedPair::MOVEMENT];

/// Tag names whose values are merged from all of their native names.
const MERGED_TAG_NAMES: [TagName; 6] = [
    TagName::Producer,
    TagName::Engineer,
    TagName::MixedBy,
    TagName::DjMixer,
    TagName::Arranger,
    TagName::MusicianCredits,
];

/// Language written to new comment and lyrics frames.
const DEFAULT_LANGUAGE: &str = "eng";

/// Preference of a comment language, lower is better.
fn language_rank(lang: &str) -> u8 {
    if lang.eq_ignore_ascii_case(DEFAULT_LANGUAGE) {
        0
    } else if lang.eq_ignore_ascii_case("XXX") {
        1
    } else {
        2
    }
}

/// A parsed native name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameName<'a> {
    /// Text frame.
    Text(&'a str),
    /// Extended Text frame (`TXXX`) with a description.
    ExtendedText(&'a str),
    /// Unique File Identifier frame (`UFID`) with an owner.
    UniqueFileIdentifier(&'a str),
    /// Involved people list (`TIPL`, `TMCL`, `IPLS`), optionally restricted to one role.
    People {
        /// Frame ID.
        id: &'a str,
        /// Role of the involved people.
        role: Option<&'a str>,
    },
    /// Comment frame (`COMM`) with a description.
    Comment(&'a str),
    /// Unsynchronized lyrics frame (`USLT`) with a description.
    Lyrics(&'a str),
    /// Attached picture frame (`APIC`).
    Picture,
}

impl<'a> FrameName<'a> {
    /// Parse `ID[:qualifier]`.
    fn parse(native_name: &'a str) -> Self {
        let (id, qualifier) = match native_name.split_once(':') {
            Some((id, qualifier)) => (id, Some(qualifier)),
            None => (native_name, None),
        };
        match (id, qualifier) {
            ("TXXX", Some(description)) => FrameName::ExtendedText(description),
            ("UFID", Some(owner)) => FrameName::UniqueFileIdentifier(owner),
            ("TIPL" | "TMCL" | "IPLS", role) => FrameName::People { id, role },
            ("COMM", description) => FrameName::Comment(description.unwrap_or_default()),
            ("USLT", description) => FrameName::Lyrics(description.unwrap_or_default()),
            ("APIC", _) => FrameName::Picture,
            _ => FrameName::Text(native_name),
        }
    }
}

/// Returns `true` for the frame IDs of involved people lists.
fn is_people_frame(id: &str) -> bool {
    matches!(id, "TIPL" | "TMCL" | "IPLS")
}

/// A native ID3 value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum FrameValue {
    /// Text.
    Text(String),
    /// Binary data, e.g. picture data or a file identifier.
    Binary(Vec<u8>),
}

impl FrameValue {
    /// Raw bytes of the value.
    fn into_bytes(self) -> Vec<u8> {
        match self {
            FrameValue::Text(text) => text.into_bytes(),
            FrameValue::Binary(data) => data,
        }
    }
}

/// Split NUL-separated frame text into values, dropping empty ones.
fn split_text(text: &str) -> Vec<FrameValue> {
    text.split('\0')
        .filter(|value| !value.is_empty())
        .map(|value| FrameValue::Text(value.to_string()))
        .collect()
}

/// Render a native name with an optional description.
fn qualified_name(id: &str, description: &str) -> String {
    if description.is_empty() {
        id.to_string()
    } else {
        format!("{id}:{description}")
    }
}

/// Split a musician credit into instrument and name.
fn split_credit(credit: &str) -> (String, String) {
    match credit.split_once(": ") {
        Some((role, person)) => (role.to_string(), person.to_string()),
        None => (String::new(), credit.to_string()),
    }
}

/// Render a musician credit.
fn join_credit(role: &str, person: &str) -> String {
    if role.is_empty() {
        person.to_string()
    } else {
        format!("{role}: {person}")
    }
}

/// Role/person pairs of an involved people list frame.
fn people_pairs(frame: &Frame) -> Vec<(String, String)> {
    match frame.content() {
        Content::InvolvedPeopleList(list) => list
            .items
            .iter()
            .map(|item| (item.involvement.clone(), item.involvee.clone()))
            .collect(),
        content => content
            .text_values()
            .into_iter()
            .flatten()
            .tuples()
            .map(|(role, person): (&str, &str)| (role.to_string(), person.to_string()))
            .collect(),
    }
}

/// All role/person pairs stored in frames with the given ID.
fn people(tag: &id3::Tag, id: &str) -> Vec<(String, String)> {
    tag.frames()
        .filter(|frame| frame.id() == id)
        .flat_map(people_pairs)
        .collect()
}

/// Replace the involved people list of a frame ID.
fn set_people(tag: &mut id3::Tag, id: &str, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        let _ = tag.remove(id);
    } else {
        let text = pairs
            .iter()
            .flat_map(|(role, person)| [role.as_str(), person.as_str()])
            .join("\0");
        tag.set_text(id, text);
    }
}

/// Remove the frames with an ID that match a predicate. Returns `true` if any were removed.
fn remove_frames_where(tag: &mut id3::Tag, id: &str, predicate: impl Fn(&Frame) -> bool) -> bool {
    let mut removed = false;
    for frame in tag.remove(id) {
        if predicate(&frame) {
            removed = true;
        } else {
            let _ = tag.add_frame(frame);
        }
    }
    removed
}

/// Whether a frame is a front cover picture.
fn is_front_cover(frame: &Frame) -> bool {
    matches!(frame.content(), Content::Picture(picture) if picture.picture_type == PictureType::CoverFront)
}

/// Roles of an involved people frame that are mapped to a tag name of their own.
fn claimed_roles<'a>(table: &'a MappingTable, kind: FormatKind, frame_id: &str) -> Vec<&'a str> {
    table
        .tag_names()
        .flat_map(|tag_name| table.native_names_for(tag_name, kind))
        .filter_map(|native_name| match FrameName::parse(native_name) {
            FrameName::People {
                id,
                role: Some(role),
            } if id == frame_id => Some(role),
            _ => None,
        })
        .collect()
}

/// Whether a role is in the list of claimed roles, ignoring case.
fn is_claimed(claimed: &[&str], role: &str) -> bool {
    claimed.iter().any(|claimed| claimed.eq_ignore_ascii_case(role))
}

/// Mapper for ID3v2 tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Id3Mapper {
    /// ID3v2.4.
    V24,
    /// ID3v2.3.
    V23,
}

impl Id3Mapper {
    /// ID3v2 version of the tags this mapper reads.
    fn version(self) -> id3::Version {
        match self {
            Id3Mapper::V24 => id3::Version::Id3v24,
            Id3Mapper::V23 => id3::Version::Id3v23,
        }
    }

    /// Musician credits of a people frame, i.e. all pairs with an unclaimed role.
    fn credits(tag: &id3::Tag, id: &str, claimed: &[&str]) -> Vec<FrameValue> {
        people(tag, id)
            .into_iter()
            .filter(|(role, _)| !is_claimed(claimed, role))
            .map(|(role, person)| FrameValue::Text(join_credit(&role, &person)))
            .collect()
    }

    /// Replace the musician credits of a people frame, keeping pairs with a claimed role.
    fn set_credits(tag: &mut id3::Tag, id: &str, claimed: &[&str], values: Vec<FrameValue>) {
        let mut pairs: Vec<(String, String)> = people(tag, id)
            .into_iter()
            .filter(|(role, _)| is_claimed(claimed, role))
            .collect();
        pairs.extend(values.into_iter().filter_map(|value| match value {
            FrameValue::Text(credit) => Some(split_credit(&credit)),
            FrameValue::Binary(_) => None,
        }));
        set_people(tag, id, &pairs);
    }

    /// The values of the best comment or lyrics frame with a description. Multiple values are
    /// separated by NUL characters.
    fn best_texts<'a>(
        frames: impl Iterator<Item = (&'a str, &'a str, &'a str)>,
        description: &str,
    ) -> Vec<FrameValue> {
        frames
            .filter(|(_, frame_description, _)| frame_description.eq_ignore_ascii_case(description))
            .min_by_key(|(lang, _, _)| language_rank(lang))
            .map(|(_, _, text)| split_text(text))
            .unwrap_or_default()
    }
}

impl PackedText for Id3Mapper {
    fn read_text(&self, tag: &id3::Tag, native_name: &str) -> Option<String> {
        self.native_values(tag, native_name)
            .into_iter()
            .find_map(|value| match value {
                FrameValue::Text(text) => Some(text),
                FrameValue::Binary(_) => None,
            })
    }

    fn write_text(&self, tag: &mut id3::Tag, native_name: &str, text: String) {
        self.store_values(tag, native_name, vec![FrameValue::Text(text)]);
    }
}

impl FormatMapper for Id3Mapper {
    type Tag = id3::Tag;
    type Value = FrameValue;

    fn format_kind(&self) -> FormatKind {
        match self {
            Id3Mapper::V24 => FormatKind::Id3v24,
            Id3Mapper::V23 => FormatKind::Id3v23,
        }
    }

    fn tag<'a>(&self, container: &'a NativeTagContainer) -> Option<&'a id3::Tag> {
        match container {
            NativeTagContainer::Id3(tag) if tag.version() == self.version() => Some(tag),
            _ => None,
        }
    }

    fn tag_mut<'a>(&self, container: &'a mut NativeTagContainer) -> Option<&'a mut id3::Tag> {
        match container {
            NativeTagContainer::Id3(tag) if tag.version() == self.version() => Some(tag),
            _ => None,
        }
    }

    fn native_values(&self, tag: &id3::Tag, native_name: &str) -> Vec<FrameValue> {
        match FrameName::parse(native_name) {
            FrameName::Text(id) => match tag.get(id).map(Frame::content) {
                Some(Content::Link(url)) => vec![FrameValue::Text(url.clone())],
                Some(content) => content
                    .text_values()
                    .into_iter()
                    .flatten()
                    .filter(|text| !text.is_empty())
                    .map(|text| FrameValue::Text(text.to_string()))
                    .collect(),
                None => Vec::new(),
            },
            FrameName::ExtendedText(description) => tag
                .extended_texts()
                .filter(|extended_text| extended_text.description.eq_ignore_ascii_case(description))
                .flat_map(|extended_text| extended_text.value.split('\0'))
                .filter(|text| !text.is_empty())
                .map(|text| FrameValue::Text(text.to_string()))
                .collect(),
            FrameName::UniqueFileIdentifier(owner) => tag
                .unique_file_identifiers()
                .filter(|ufid| ufid.owner_identifier == owner)
                .map(|ufid| FrameValue::Binary(ufid.identifier.clone()))
                .collect(),
            FrameName::People {
                id,
                role: Some(role),
            } => people(tag, id)
                .into_iter()
                .filter(|(frame_role, _)| frame_role.eq_ignore_ascii_case(role))
                .map(|(_, person)| FrameValue::Text(person))
                .collect(),
            FrameName::People { id, role: None } => Self::credits(tag, id, &[]),
            FrameName::Comment(description) => Self::best_texts(
                tag.comments().map(|comment| {
                    (
                        comment.lang.as_str(),
                        comment.description.as_str(),
                        comment.text.as_str(),
                    )
                }),
                description,
            ),
            FrameName::Lyrics(description) => Self::best_texts(
                tag.lyrics().map(|lyrics| {
                    (
                        lyrics.lang.as_str(),
                        lyrics.description.as_str(),
                        lyrics.text.as_str(),
                    )
                }),
                description,
            ),
            FrameName::Picture => {
                let pictures: Vec<&Id3Picture> = tag.pictures().collect();
                picture::select_cover(&pictures, |picture| {
                    picture.picture_type == PictureType::CoverFront
                })
                .map(|picture| FrameValue::Binary(picture.data.clone()))
                .into_iter()
                .collect()
            }
        }
    }

    fn store_values(&self, tag: &mut id3::Tag, native_name: &str, values: Vec<FrameValue>) {
        if values.is_empty() {
            let _ = self.remove_values(tag, native_name);
            return;
        }
        let texts = || {
            values
                .iter()
                .filter_map(|value| match value {
                    FrameValue::Text(text) => Some(text.as_str()),
                    FrameValue::Binary(_) => None,
                })
                .join("\0")
        };
        match FrameName::parse(native_name) {
            FrameName::Text(id) => tag.set_text(id, texts()),
            FrameName::ExtendedText(description) => {
                let value = texts();
                let _ = self.remove_values(tag, native_name);
                let _ = tag.add_frame(ExtendedText {
                    description: description.to_string(),
                    value,
                });
            }
            FrameName::UniqueFileIdentifier(owner) => {
                let _ = self.remove_values(tag, native_name);
                if let Some(identifier) = values.into_iter().next().map(FrameValue::into_bytes) {
                    let _ = tag.add_frame(UniqueFileIdentifier {
                        owner_identifier: owner.to_string(),
                        identifier,
                    });
                }
            }
            FrameName::People {
                id,
                role: Some(role),
            } => {
                let mut pairs: Vec<(String, String)> = people(tag, id)
                    .into_iter()
                    .filter(|(frame_role, _)| !frame_role.eq_ignore_ascii_case(role))
                    .collect();
                pairs.extend(values.into_iter().filter_map(|value| match value {
                    FrameValue::Text(person) => Some((role.to_string(), person)),
                    FrameValue::Binary(_) => None,
                }));
                set_people(tag, id, &pairs);
            }
            FrameName::People { id, role: None } => Self::set_credits(tag, id, &[], values),
            FrameName::Comment(description) => {
                let text = texts();
                let _ = self.remove_values(tag, native_name);
                let _ = tag.add_frame(Comment {
                    lang: DEFAULT_LANGUAGE.to_string(),
                    description: description.to_string(),
                    text,
                });
            }
            FrameName::Lyrics(description) => {
                let text = texts();
                let _ = self.remove_values(tag, native_name);
                let _ = tag.add_frame(Lyrics {
                    lang: DEFAULT_LANGUAGE.to_string(),
                    description: description.to_string(),
                    text,
                });
            }
            FrameName::Picture => {
                let Some(data) = values.into_iter().find_map(|value| match value {
                    FrameValue::Binary(data) => Some(data),
                    FrameValue::Text(_) => None,
                }) else {
                    return;
                };
                let _ = remove_frames_where(tag, "APIC", is_front_cover);
                let _ = tag.add_frame(Id3Picture {
                    mime_type: picture::mime_type_name(&data),
                    picture_type: PictureType::CoverFront,
                    description: String::new(),
                    data,
                });
            }
        }
    }

    fn remove_values(&self, tag: &mut id3::Tag, native_name: &str) -> bool {
        match FrameName::parse(native_name) {
            FrameName::Text(id) => !tag.remove(id).is_empty(),
            FrameName::ExtendedText(description) => remove_frames_where(tag, "TXXX", |frame| {
                matches!(frame.content(), Content::ExtendedText(extended_text)
                    if extended_text.description.eq_ignore_ascii_case(description))
            }),
            FrameName::UniqueFileIdentifier(owner) => remove_frames_where(tag, "UFID", |frame| {
                matches!(frame.content(), Content::UniqueFileIdentifier(ufid)
                    if ufid.owner_identifier == owner)
            }),
            FrameName::People {
                id,
                role: Some(role),
            } => {
                let pairs = people(tag, id);
                let kept: Vec<(String, String)> = pairs
                    .iter()
                    .filter(|(frame_role, _)| !frame_role.eq_ignore_ascii_case(role))
                    .cloned()
                    .collect();
                if kept.len() == pairs.len() {
                    return false;
                }
                set_people(tag, id, &kept);
                true
            }
            FrameName::People { id, role: None } => !tag.remove(id).is_empty(),
            FrameName::Comment(description) => remove_frames_where(tag, "COMM", |frame| {
                matches!(frame.content(), Content::Comment(comment)
                    if comment.description.eq_ignore_ascii_case(description))
            }),
            FrameName::Lyrics(description) => remove_frames_where(tag, "USLT", |frame| {
                matches!(frame.content(), Content::Lyrics(lyrics)
                    if lyrics.description.eq_ignore_ascii_case(description))
            }),
            FrameName::Picture => !tag.remove("APIC").is_empty(),
        }
    }

    fn native_entries(&self, tag: &id3::Tag) -> Vec<(String, FrameValue)> {
        let mut entries = Vec::new();
        for frame in tag.frames() {
            let id = frame.id();
            if is_people_frame(id) {
                entries.extend(people_pairs(frame).into_iter().map(|(role, person)| {
                    if id == "TMCL" {
                        (id.to_string(), FrameValue::Text(join_credit(&role, &person)))
                    } else {
                        (qualified_name(id, &role), FrameValue::Text(person))
                    }
                }));
                continue;
            }
            match frame.content() {
                Content::ExtendedText(extended_text) => {
                    let name = qualified_name("TXXX", &extended_text.description);
                    entries.extend(
                        extended_text
                            .value
                            .split('\0')
                            .map(|value| (name.clone(), FrameValue::Text(value.to_string()))),
                    );
                }
                Content::UniqueFileIdentifier(ufid) => entries.push((
                    qualified_name("UFID", &ufid.owner_identifier),
                    FrameValue::Binary(ufid.identifier.clone()),
                )),
                Content::Comment(comment) => {
                    let name = qualified_name(id, &comment.description);
                    entries.extend(
                        split_text(&comment.text)
                            .into_iter()
                            .map(|value| (name.clone(), value)),
                    );
                }
                Content::Lyrics(lyrics) => {
                    let name = qualified_name(id, &lyrics.description);
                    entries.extend(
                        split_text(&lyrics.text)
                            .into_iter()
                            .map(|value| (name.clone(), value)),
                    );
                }
                Content::Picture(picture) => {
                    entries.push((id.to_string(), FrameValue::Binary(picture.data.clone())));
                }
                Content::Link(url) => {
                    entries.push((id.to_string(), FrameValue::Text(url.clone())));
                }
                content => match content.text_values() {
                    Some(values) => entries.extend(
                        values.map(|value| (id.to_string(), FrameValue::Text(value.to_string()))),
                    ),
                    None => log::trace!("Skipping {id} frame without textual content"),
                },
            }
        }
        entries
    }

    fn decode_value(
        &self,
        value: &FrameValue,
        tag_name: Option<TagName>,
        native_name: &str,
    ) -> Result<Vec<TagValue>, DecodeError> {
        let kind = value_kind(tag_name);
        let value = match value {
            FrameValue::Text(text) => TagValue::from_native_text(text, kind, native_name)?,
            FrameValue::Binary(data) if kind == ValueKind::Binary => TagValue::Binary(data.clone()),
            FrameValue::Binary(data) => {
                let text = std::str::from_utf8(data)
                    .map_err(|_| DecodeError::new(native_name, "identifier is not valid UTF-8"))?;
                TagValue::from_native_text(text, kind, native_name)?
            }
        };
        Ok(vec![value])
    }

    fn encode_value(
        &self,
        value: &TagValue,
        tag_name: TagName,
        native_name: &str,
        _tag: &id3::Tag,
    ) -> crate::Result<FrameValue> {
        let is_picture = FrameName::parse(native_name) == FrameName::Picture;
        let value = match value {
            TagValue::Binary(data) => FrameValue::Binary(data.clone()),
            _ if is_picture => {
                return Err(crate::ErrorType::encode(
                    native_name,
                    "picture data must be binary",
                ))
            }
            TagValue::Text(text) if tag_name.value_kind() == ValueKind::Integer => {
                let number = value.as_integer().ok_or_else(|| {
                    crate::ErrorType::encode(native_name, format!("{text:?} is not a number"))
                })?;
                FrameValue::Text(number.to_string())
            }
            TagValue::Text(text) => FrameValue::Text(text.clone()),
            TagValue::Integer(number) => FrameValue::Text(number.to_string()),
        };
        Ok(value)
    }

    fn has_special_handling(&self, tag_name: TagName) -> bool {
        PackedPair::find(&PACKED_PAIRS, tag_name).is_some() || MERGED_TAG_NAMES.contains(&tag_name)
    }

    fn special_values(
        &self,
        tag_name: TagName,
        tag: &id3::Tag,
        table: &MappingTable,
    ) -> crate::Result<Vec<TagValue>> {
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            return packed::read(self, pair, tag_name, tag, table);
        }

        let kind = FormatMapper::format_kind(self);
        let mut decoded = Vec::new();
        for native_name in table.native_names_for(tag_name, kind) {
            let values = match FrameName::parse(native_name) {
                FrameName::People { id, role: None } => {
                    Self::credits(tag, id, &claimed_roles(table, kind, id))
                }
                _ => self.native_values(tag, native_name),
            };
            for value in values {
                decoded.extend(self.decode_value(&value, Some(tag_name), native_name)?);
            }
        }
        Ok(decoded.into_iter().unique().collect())
    }

    fn set_special(
        &self,
        tag_name: TagName,
        values: &[TagValue],
        tag: &mut id3::Tag,
        table: &MappingTable,
    ) -> crate::Result<()> {
        let kind = FormatMapper::format_kind(self);
        let native_names = table.native_names_for(tag_name, kind);
        let Some((preferred, others)) = native_names.split_first() else {
            return Ok(());
        };
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            let value = packed::integer_value(values, preferred)?;
            packed::write(self, pair, tag_name, value, tag, table);
            return Ok(());
        }

        let encoded = self.encode_values(values, tag_name, preferred, tag)?;
        match FrameName::parse(preferred) {
            FrameName::People { id, role: None } => {
                Self::set_credits(tag, id, &claimed_roles(table, kind, id), encoded);
            }
            _ => self.store_values(tag, preferred, encoded),
        }
        for native_name in others {
            self.remove_merged(tag, native_name, table);
        }
        Ok(())
    }

    fn delete_special(&self, tag_name: TagName, tag: &mut id3::Tag, table: &MappingTable) {
        if let Some(pair) = PackedPair::find(&PACKED_PAIRS, tag_name) {
            packed::delete(self, pair, tag_name, tag, table);
            return;
        }
        let kind = FormatMapper::format_kind(self);
        for native_name in table.native_names_for(tag_name, kind) {
            self.remove_merged(tag, native_name, table);
        }
    }
}

impl Id3Mapper {
    /// Remove a native name of a merged tag name. Credits with a claimed role are kept.
    fn remove_merged(&self, tag: &mut id3::Tag, native_name: &str, table: &MappingTable) {
        match FrameName::parse(native_name) {
            FrameName::People { id, role: None } => {
                let claimed = claimed_roles(table, FormatMapper::format_kind(self), id);
                Self::set_credits(tag, id, &claimed, Vec::new());
            }
            _ => {
                let _ = self.remove_values(tag, native_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::tests::{check_roundtrip, table};
    use crate::mapper::for_kind;
    use id3::Version;
    use paste::paste;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01];

    fn container(version: Version) -> NativeTagContainer {
        NativeTagContainer::Id3(id3::Tag::with_version(version))
    }

    fn kind(version: Version) -> FormatKind {
        match version {
            Version::Id3v24 => FormatKind::Id3v24,
            _ => FormatKind::Id3v23,
        }
    }

    fn tag_mut(container: &mut NativeTagContainer) -> &mut id3::Tag {
        match container {
            NativeTagContainer::Id3(tag) => tag,
            _ => unreachable!(),
        }
    }

    fn read(container: &NativeTagContainer, version: Version, tag_name: TagName) -> Vec<TagValue> {
        for_kind(kind(version))
            .read(container, tag_name, &table())
            .unwrap()
    }

    macro_rules! add_roundtrip_test_with_id3_version {
        ($tag_name:ident, $value:expr, $version:expr, $fnsuffix:ident) => {
            paste! {
                #[test]
                fn [<test_roundtrip_ $tag_name:snake _ $fnsuffix>]() {
                    check_roundtrip(container($version), TagName::$tag_name, $value);
                }
            }
        };
    }

    macro_rules! add_roundtrip_test_all_id3_versions {
        ($tag_name:ident, $value:expr) => {
            add_roundtrip_test_with_id3_version!($tag_name, $value, Version::Id3v24, id3v24);
            add_roundtrip_test_with_id3_version!($tag_name, $value, Version::Id3v23, id3v23);
        };
    }

    add_roundtrip_test_all_id3_versions!(AlbumTitle, vec!["Kind of Blue".into()]);
    add_roundtrip_test_all_id3_versions!(Artist, vec!["Miles Davis".into(), "John Coltrane".into()]);
    add_roundtrip_test_all_id3_versions!(Bpm, vec![TagValue::Integer(136)]);
    add_roundtrip_test_all_id3_versions!(Compilation, vec![TagValue::Integer(1)]);
    add_roundtrip_test_all_id3_versions!(TrackNumber, vec![TagValue::Integer(4)]);
    add_roundtrip_test_all_id3_versions!(TrackCount, vec![TagValue::Integer(5)]);
    add_roundtrip_test_all_id3_versions!(DiscNumber, vec![TagValue::Integer(1)]);
    add_roundtrip_test_all_id3_versions!(MovementCount, vec![TagValue::Integer(3)]);
    add_roundtrip_test_all_id3_versions!(Comment, vec!["Recorded in one take".into()]);
    add_roundtrip_test_all_id3_versions!(Lyrics, vec!["So what".into()]);
    add_roundtrip_test_all_id3_versions!(CoverArt, vec![TagValue::Binary(JPEG.to_vec())]);
    add_roundtrip_test_all_id3_versions!(
        MusicBrainzTrackId,
        vec!["bc1d9a1c-6bf1-4bb6-88d6-c69e6c6d7f6e".into()]
    );
    add_roundtrip_test_all_id3_versions!(
        MusicBrainzAlbumId,
        vec!["f8a5b8a8-8b2b-4f7e-9f1a-1d7b1a2d9e43".into()]
    );
    add_roundtrip_test_all_id3_versions!(Producer, vec!["Teo Macero".into()]);
    add_roundtrip_test_all_id3_versions!(MixedBy, vec!["Fred Plaut".into()]);
    add_roundtrip_test_all_id3_versions!(MusicianCredits, vec!["piano: Bill Evans".into()]);
    add_roundtrip_test_with_id3_version!(
        DiscSubtitle,
        vec!["Side A".into()],
        Version::Id3v24,
        id3v24
    );
    add_roundtrip_test_with_id3_version!(
        DiscSubtitle,
        vec!["Side A".into()],
        Version::Id3v23,
        id3v23
    );

    #[test]
    fn test_version_mismatch() {
        let container = container(Version::Id3v24);
        let err = for_kind(FormatKind::Id3v23)
            .read(&container, TagName::AlbumTitle, &table())
            .unwrap_err();
        assert!(matches!(err, crate::ErrorType::InvalidUsage(_)));
    }

    #[test]
    fn test_comment_prefers_english() {
        let mut container = container(Version::Id3v24);
        let tag = tag_mut(&mut container);
        for (lang, text) in [("deu", "Hallo"), ("eng", "Hello"), ("XXX", "Unknown")] {
            let _ = tag.add_frame(Comment {
                lang: lang.to_string(),
                description: String::new(),
                text: text.to_string(),
            });
        }
        let _ = tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: "iTunNORM".to_string(),
            text: "00000".to_string(),
        });
        assert_eq!(
            read(&container, Version::Id3v24, TagName::Comment),
            [TagValue::from("Hello")]
        );
    }

    #[test]
    fn test_multiple_comments_and_lyrics() {
        for version in [Version::Id3v24, Version::Id3v23] {
            check_roundtrip(
                container(version),
                TagName::Comment,
                vec!["First take".into(), "Second take".into()],
            );
            check_roundtrip(
                container(version),
                TagName::Lyrics,
                vec!["Verse".into(), "Chorus".into()],
            );
        }

        let mut container = container(Version::Id3v24);
        assert!(for_kind(FormatKind::Id3v24)
            .write(
                &mut container,
                TagName::Comment,
                &["a".into(), "b".into()],
                &table(),
            )
            .unwrap());
        let comments: Vec<_> = tag_mut(&mut container).comments().collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "a\0b");
        assert_eq!(
            read(&container, Version::Id3v24, TagName::Comment),
            [TagValue::from("a"), TagValue::from("b")]
        );
    }

    #[test]
    fn test_comment_write_keeps_described_frames() {
        let mut container = container(Version::Id3v24);
        let tag = tag_mut(&mut container);
        let _ = tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: "iTunNORM".to_string(),
            text: "00000".to_string(),
        });
        assert!(for_kind(FormatKind::Id3v24)
            .write(&mut container, TagName::Comment, &["New".into()], &table())
            .unwrap());
        let tag = tag_mut(&mut container);
        assert_eq!(tag.comments().count(), 2);
        assert_eq!(
            read(&container, Version::Id3v24, TagName::Comment),
            [TagValue::from("New")]
        );
    }

    #[test]
    fn test_people_list_roles() {
        let mut container = container(Version::Id3v24);
        let tag = tag_mut(&mut container);
        tag.set_text("TIPL", "producer\0Teo Macero\0engineer\0Fred Plaut");
        let _ = tag.add_frame(ExtendedText {
            description: "PRODUCER".to_string(),
            value: "Teo Macero\0Irving Townsend".to_string(),
        });

        assert_eq!(
            read(&container, Version::Id3v24, TagName::Producer),
            [TagValue::from("Teo Macero"), TagValue::from("Irving Townsend")]
        );
        assert_eq!(
            read(&container, Version::Id3v24, TagName::Engineer),
            [TagValue::from("Fred Plaut")]
        );

        assert!(for_kind(FormatKind::Id3v24)
            .delete(&mut container, TagName::Producer, &table())
            .unwrap());
        assert!(read(&container, Version::Id3v24, TagName::Producer).is_empty());
        assert_eq!(
            read(&container, Version::Id3v24, TagName::Engineer),
            [TagValue::from("Fred Plaut")]
        );
    }

    #[test]
    fn test_ipls_credits_skip_claimed_roles() {
        let mut container = container(Version::Id3v23);
        let tag = tag_mut(&mut container);
        tag.set_text("IPLS", "producer\0Teo Macero\0trumpet\0Miles Davis");

        assert_eq!(
            read(&container, Version::Id3v23, TagName::MusicianCredits),
            [TagValue::from("trumpet: Miles Davis")]
        );

        assert!(for_kind(FormatKind::Id3v23)
            .write(
                &mut container,
                TagName::MusicianCredits,
                &["saxophone: Cannonball Adderley".into()],
                &table()
            )
            .unwrap());
        assert_eq!(
            read(&container, Version::Id3v23, TagName::Producer),
            [TagValue::from("Teo Macero")]
        );
        assert_eq!(
            read(&container, Version::Id3v23, TagName::MusicianCredits),
            [TagValue::from("saxophone: Cannonball Adderley")]
        );
    }

    #[test]
    fn test_packed_track_number() {
        let mut container = container(Version::Id3v24);
        tag_mut(&mut container).set_text("TRCK", "3/9");
        assert_eq!(
            read(&container, Version::Id3v24, TagName::TrackNumber),
            [TagValue::Integer(3)]
        );
        assert_eq!(
            read(&container, Version::Id3v24, TagName::TrackCount),
            [TagValue::Integer(9)]
        );

        assert!(for_kind(FormatKind::Id3v24)
            .write(&mut container, TagName::TrackNumber, &[TagValue::Integer(4)], &table())
            .unwrap());
        let tag = tag_mut(&mut container);
        assert_eq!(tag.get("TRCK").and_then(|frame| frame.content().text()), Some("4/9"));
    }

    #[test]
    fn test_cover_prefers_front() {
        let mut container = container(Version::Id3v24);
        let tag = tag_mut(&mut container);
        let _ = tag.add_frame(Id3Picture {
            mime_type: "image/png".to_string(),
            picture_type: PictureType::CoverBack,
            description: "back".to_string(),
            data: vec![1, 2, 3],
        });
        let _ = tag.add_frame(Id3Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: JPEG.to_vec(),
        });
        assert_eq!(
            read(&container, Version::Id3v24, TagName::CoverArt),
            [TagValue::Binary(JPEG.to_vec())]
        );

        assert!(for_kind(FormatKind::Id3v24)
            .write(&mut container, TagName::CoverArt, &[vec![9, 9].into()], &table())
            .unwrap());
        let tag = tag_mut(&mut container);
        assert_eq!(tag.pictures().count(), 2);
        assert_eq!(
            read(&container, Version::Id3v24, TagName::CoverArt),
            [TagValue::Binary(vec![9, 9])]
        );
    }

    #[test]
    fn test_ufid_not_utf8() {
        let mut container = container(Version::Id3v24);
        let _ = tag_mut(&mut container).add_frame(UniqueFileIdentifier {
            owner_identifier: "http://musicbrainz.org".to_string(),
            identifier: vec![0xFF, 0xFE],
        });
        let err = for_kind(FormatKind::Id3v24)
            .read(&container, TagName::MusicBrainzTrackId, &table())
            .unwrap_err();
        assert!(matches!(err, crate::ErrorType::Decode(_)));
    }

    #[test]
    fn test_dump() {
        let mut container = container(Version::Id3v24);
        let tag = tag_mut(&mut container);
        tag.set_text("TIT2", "So What");
        tag.set_text("TIPL", "producer\0Teo Macero");
        let _ = tag.add_frame(ExtendedText {
            description: "MusicBrainz Album Id".to_string(),
            value: "f8a5b8a8".to_string(),
        });
        let properties = for_kind(FormatKind::Id3v24)
            .dump(&container, &table())
            .unwrap();
        let find = |native_name: &str| {
            properties
                .iter()
                .find(|property| property.native_name == native_name)
                .and_then(|property| property.tag_name)
        };
        assert_eq!(find("TIT2"), Some(TagName::TrackTitle));
        assert_eq!(find("TIPL:producer"), Some(TagName::Producer));
        assert_eq!(
            find("TXXX:MusicBrainz Album Id"),
            Some(TagName::MusicBrainzAlbumId)
        );
    }

    #[test]
    fn test_parse_frame_names() {
        assert_eq!(FrameName::parse("TALB"), FrameName::Text("TALB"));
        assert_eq!(
            FrameName::parse("UFID:http://musicbrainz.org"),
            FrameName::UniqueFileIdentifier("http://musicbrainz.org")
        );
        assert_eq!(
            FrameName::parse("TIPL:DJ-mix"),
            FrameName::People {
                id: "TIPL",
                role: Some("DJ-mix")
            }
        );
        assert_eq!(FrameName::parse("COMM"), FrameName::Comment(""));
        assert_eq!(FrameName::parse("APIC"), FrameName::Picture);
    }
}
