// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Native, format-specific tag containers.
//!
//! ID3 and FLAC tags are held in the structures of the [`id3`] and [`metaflac`] crates. The
//! remaining formats are kept in small in-memory stores that the file backend fills from and
//! writes back to the tag library.

mod ape;
mod asf;
mod mp4;
pub(crate) mod picture;
mod vorbis;

pub use self::ape::{ApeItem, ApeTag, ApeValue};
pub use self::asf::{AsfAttribute, AsfTag, AsfValue};
pub use self::mp4::{FreeFormType, Mp4Atom, Mp4Data, Mp4Tag, MP4_FREEFORM_PREFIX};
pub use self::vorbis::{VorbisCommentStore, VorbisComments};

use std::fmt;

/// The native tags of one open file.
pub enum NativeTagContainer {
    /// MP4 `ilst` atoms.
    Mp4(Mp4Tag),
    /// FLAC metadata blocks.
    Flac(metaflac::Tag),
    /// Vorbis comments of an Ogg stream.
    Ogg(VorbisComments),
    /// ASF attributes.
    Asf(AsfTag),
    /// APEv2 items.
    Ape(ApeTag),
    /// ID3v2 frames.
    Id3(id3::Tag),
}

impl fmt::Debug for NativeTagContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeTagContainer::Mp4(tag) => f.debug_tuple("Mp4").field(tag).finish(),
            NativeTagContainer::Flac(_) => f.write_str("Flac(..)"),
            NativeTagContainer::Ogg(tag) => f.debug_tuple("Ogg").field(tag).finish(),
            NativeTagContainer::Asf(tag) => f.debug_tuple("Asf").field(tag).finish(),
            NativeTagContainer::Ape(tag) => f.debug_tuple("Ape").field(tag).finish(),
            NativeTagContainer::Id3(tag) => f.debug_tuple("Id3").field(tag).finish(),
        }
    }
}

impl From<Mp4Tag> for NativeTagContainer {
    fn from(tag: Mp4Tag) -> Self {
        NativeTagContainer::Mp4(tag)
    }
}

impl From<metaflac::Tag> for NativeTagContainer {
    fn from(tag: metaflac::Tag) -> Self {
        NativeTagContainer::Flac(tag)
    }
}

impl From<VorbisComments> for NativeTagContainer {
    fn from(tag: VorbisComments) -> Self {
        NativeTagContainer::Ogg(tag)
    }
}

impl From<AsfTag> for NativeTagContainer {
    fn from(tag: AsfTag) -> Self {
        NativeTagContainer::Asf(tag)
    }
}

impl From<ApeTag> for NativeTagContainer {
    fn from(tag: ApeTag) -> Self {
        NativeTagContainer::Ape(tag)
    }
}

impl From<id3::Tag> for NativeTagContainer {
    fn from(tag: id3::Tag) -> Self {
        NativeTagContainer::Id3(tag)
    }
}
