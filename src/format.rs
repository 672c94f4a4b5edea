// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Tag format kinds and their detection.

use crate::native::NativeTagContainer;
use std::fmt;

/// The tag format of an opened file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatKind {
    /// iTunes-style `ilst` atoms of an MP4 file.
    Mp4,
    /// Vorbis comments of a FLAC file.
    FlacVorbis,
    /// Vorbis comments of an Ogg Vorbis stream.
    OggVorbis,
    /// ASF (WMA) attributes.
    Asf,
    /// APEv2 tag.
    Ape,
    /// ID3v2.4 tag
    Id3v24,
    /// ID3v2.3 tag
    Id3v23,
}

impl FormatKind {
    /// All supported format kinds.
    pub const ALL: [FormatKind; 7] = [
        FormatKind::Mp4,
        FormatKind::FlacVorbis,
        FormatKind::OggVorbis,
        FormatKind::Asf,
        FormatKind::Ape,
        FormatKind::Id3v24,
        FormatKind::Id3v23,
    ];

    /// Name of the mapping table column that holds the native names of this format.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            FormatKind::Mp4 => "MP4",
            FormatKind::FlacVorbis | FormatKind::OggVorbis => "Vorbis",
            FormatKind::Asf => "WMA",
            FormatKind::Ape => "APEv2",
            FormatKind::Id3v24 => "ID3v24",
            FormatKind::Id3v23 => "ID3v23",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::Mp4 => "MP4",
            FormatKind::FlacVorbis => "FLAC (Vorbis comments)",
            FormatKind::OggVorbis => "Ogg Vorbis",
            FormatKind::Asf => "ASF",
            FormatKind::Ape => "APEv2",
            FormatKind::Id3v24 => "ID3v2.4",
            FormatKind::Id3v23 => "ID3v2.3",
        };
        f.write_str(name)
    }
}

/// Classify a native tag container.
///
/// # Errors
///
/// Returns [`crate::ErrorType::UnsupportedFormat`] for ID3v2.2 tags, which have no mapping.
pub fn detect(container: &NativeTagContainer) -> crate::Result<FormatKind> {
    let kind = match container {
        NativeTagContainer::Mp4(_) => FormatKind::Mp4,
        NativeTagContainer::Flac(_) => FormatKind::FlacVorbis,
        NativeTagContainer::Ogg(_) => FormatKind::OggVorbis,
        NativeTagContainer::Asf(_) => FormatKind::Asf,
        NativeTagContainer::Ape(_) => FormatKind::Ape,
        NativeTagContainer::Id3(tag) => match tag.version() {
            id3::Version::Id3v24 => FormatKind::Id3v24,
            id3::Version::Id3v23 => FormatKind::Id3v23,
            id3::Version::Id3v22 => {
                return Err(crate::ErrorType::UnsupportedFormat(
                    "ID3v2.2 tags are not supported".to_string(),
                ))
            }
        },
    };
    log::trace!("Detected tag format {kind}");
    Ok(kind)
}
