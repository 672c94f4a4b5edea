// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The registry of format-independent tag names.

use std::fmt;
use std::str::FromStr;

/// The kind of scalar a logical tag decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text.
    Text,
    /// A non-negative number, e.g. a track number.
    Integer,
    /// Raw bytes, e.g. an embedded image.
    Binary,
}

/// Defines the [`TagName`] enum together with its canonical string representation and value
/// kind.
macro_rules! tag_names {
    ($($(#[$meta:meta])* $variant:ident => $kind:ident,)+) => {
        /// A tag name describes the kind of information in a generic, format-independent way.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TagName {
            $($(#[$meta])* $variant,)+
        }

        impl TagName {
            /// All tag names, in declaration order.
            pub const ALL: &'static [TagName] = &[$(TagName::$variant,)+];

            /// The canonical name of this tag.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(TagName::$variant => stringify!($variant),)+
                }
            }

            /// The kind of scalar that values of this tag decode to.
            #[must_use]
            pub const fn value_kind(self) -> ValueKind {
                match self {
                    $(TagName::$variant => ValueKind::$kind,)+
                }
            }
        }
    };
}

tag_names! {
    /// Title of the release.
    AlbumTitle => Text,
    /// Release Title's Sort Name.
    AlbumSortOrder => Text,
    /// Artist(s) primarily credited on the release.
    AlbumArtist => Text,
    /// Release Artist's Sort Name (e.g.: "Beatles, The").
    AlbumArtistSortOrder => Text,
    /// Track Artist Name(s).
    Artist => Text,
    /// Track Artist Sort Name.
    ArtistSortOrder => Text,
    /// Track Artist Names as a list.
    Artists => Text,
    /// Track Title.
    TrackTitle => Text,
    /// Track Title's Sort Name.
    TrackTitleSortOrder => Text,
    /// Used for information directly related to the contents title.
    Subtitle => Text,
    /// Content Group.
    Grouping => Text,
    /// Track number on the disc.
    TrackNumber => Integer,
    /// Total tracks on this disc.
    TrackCount => Integer,
    /// Number of the disc in this release that contains this track.
    DiscNumber => Integer,
    /// Total number of discs in this release.
    DiscCount => Integer,
    /// The Media Title given to a specific disc.
    DiscSubtitle => Text,
    /// Composer Name(s).
    Composer => Text,
    /// Composer Sort Name.
    ComposerSortOrder => Text,
    /// Conductor Name(s).
    Conductor => Text,
    /// Lyricist Name(s).
    Lyricist => Text,
    /// Writer Name(s).
    Writer => Text,
    /// Remixer Name(s).
    Remixer => Text,
    /// Producer Name(s).
    Producer => Text,
    /// Recording Engineer Name(s).
    Engineer => Text,
    /// Mixing Engineer Name(s).
    MixedBy => Text,
    /// DJ-Mix Artist Name(s).
    DjMixer => Text,
    /// Artist who arranged the tune for performance.
    Arranger => Text,
    /// Musicians and their instruments, as `instrument: name` entries.
    MusicianCredits => Text,
    /// Genre Name(s) of the track.
    Genre => Text,
    /// Mood.
    Mood => Text,
    /// Beats per minute of the track.
    Bpm => Integer,
    /// Initial key of the track.
    InitialKey => Text,
    /// Comment.
    Comment => Text,
    /// Lyrics.
    Lyrics => Text,
    /// Copyright message.
    Copyright => Text,
    /// Release Record Label Name(s).
    RecordLabel => Text,
    /// The number(s) assigned to the release by the label(s).
    CatalogNumber => Text,
    /// Release Barcode.
    Barcode => Text,
    /// International Standard Recording Code.
    Isrc => Text,
    /// Amazon Standard Identification Number.
    Asin => Text,
    /// Release Date (YYYY-MM-DD).
    ReleaseDate => Text,
    /// The original release date in the format YYYY-MM-DD.
    OriginalReleaseDate => Text,
    /// Country in which the release was issued.
    ReleaseCountry => Text,
    /// Release Status indicating the "official" status of the release.
    ReleaseStatus => Text,
    /// Release Group Type.
    ReleaseType => Text,
    /// Release Format (e.g.: CD).
    Media => Text,
    /// Work lyric language as per ISO 639-3.
    Language => Text,
    /// The script used to write the release's track list (ISO 15924).
    Script => Text,
    /// 1 for Various Artist albums, otherwise 0 (compatible with iTunes).
    Compilation => Integer,
    /// Encoded by (person or organization).
    EncodedBy => Text,
    /// Encoder Settings used.
    EncoderSettings => Text,
    /// Title of the work.
    WorkTitle => Text,
    /// Movement name.
    Movement => Text,
    /// Movement Number.
    MovementNumber => Integer,
    /// Movement Count.
    MovementCount => Integer,
    /// Show Work & Movement.
    ShowMovement => Text,
    /// Embedded cover image.
    CoverArt => Binary,
    /// Track Artist's MusicBrainz Identifier.
    MusicBrainzArtistId => Text,
    /// Release Artist's MusicBrainz Identifier.
    MusicBrainzAlbumArtistId => Text,
    /// Release MusicBrainz Identifier.
    MusicBrainzAlbumId => Text,
    /// Release Group's MusicBrainz Identifier.
    MusicBrainzReleaseGroupId => Text,
    /// Recording's MusicBrainz Identifier.
    MusicBrainzTrackId => Text,
    /// Release Track MusicBrainz Identifier.
    MusicBrainzReleaseTrackId => Text,
    /// MusicBrainz Identifier for the work.
    MusicBrainzWorkId => Text,
    /// MusicBrainz Disc ID.
    MusicBrainzDiscId => Text,
    /// AcoustID associated with the track.
    AcoustId => Text,
    /// AcoustID Fingerprint for the track.
    AcoustIdFingerprint => Text,
    /// ReplayGain Track Gain.
    ReplayGainTrackGain => Text,
    /// ReplayGain Track Peak.
    ReplayGainTrackPeak => Text,
    /// ReplayGain Album Gain.
    ReplayGainAlbumGain => Text,
    /// ReplayGain Album Peak.
    ReplayGainAlbumPeak => Text,
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagName {
    type Err = crate::ErrorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        TagName::ALL
            .iter()
            .copied()
            .find(|tag_name| tag_name.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| crate::ErrorType::UnknownTagName(s.to_string()))
    }
}
