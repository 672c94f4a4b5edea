// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Declarative mapping between tag names and native tag names.

use crate::format::FormatKind;
use crate::tag_name::TagName;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// The mapping table shipped with this crate.
const BUILTIN_TABLE: &str = include_str!("../data/tag_mapping.csv");

/// Placeholder prefix of MP4 names in the table.
const MP4_PLACEHOLDER: &str = "~:";

/// Namespace prefix that [`MP4_PLACEHOLDER`] expands to.
const MP4_ITUNES_PREFIX: &str = "----:com.apple.iTunes:";

/// Name of the column that holds the tag names.
const TAG_NAME_COLUMN: &str = "MusicTagName";

/// Columns that must be present in the header row.
const REQUIRED_COLUMNS: [&str; 7] = [
    TAG_NAME_COLUMN,
    "MP4",
    "Vorbis",
    "WMA",
    "ID3v24",
    "ID3v23",
    "APEv2",
];

/// Encountered when a mapping table cannot be loaded.
#[derive(Error, Debug)]
pub enum MappingLoadError {
    /// The source could not be read.
    #[error("Failed to read mapping table")]
    Io(#[from] io::Error),
    /// The source contains no header row.
    #[error("Mapping table is empty")]
    Empty,
    /// A required column is missing from the header row.
    #[error("Mapping table lacks the required column {0:?}")]
    MissingColumn(&'static str),
    /// A row names a tag that does not exist.
    #[error("Line {line}: unknown tag name {name:?}")]
    UnknownTagName {
        /// One-based line number.
        line: usize,
        /// The offending name.
        name: String,
    },
    /// A tag name occurs in more than one row.
    #[error("Line {line}: duplicate row for {tag_name}")]
    DuplicateRow {
        /// One-based line number.
        line: usize,
        /// The repeated tag name.
        tag_name: TagName,
    },
    /// A row has more cells than the header has columns.
    #[error("Line {line}: row has {cells} cells, but the header only has {columns} columns")]
    TooManyCells {
        /// One-based line number.
        line: usize,
        /// Number of cells in the row.
        cells: usize,
        /// Number of header columns.
        columns: usize,
    },
}

/// Native names of one tag name, per format.
///
/// Within one format, the first name is the preferred one for writing and all names are consulted
/// in order when reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingEntry {
    /// Native names keyed by format.
    names: HashMap<FormatKind, Vec<String>>,
}

impl MappingEntry {
    /// The native names for a format, in table order.
    #[must_use]
    pub fn native_names(&self, kind: FormatKind) -> &[String] {
        self.names.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Forward and reverse index between tag names and native tag names.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    /// Entries by tag name.
    entries: HashMap<TagName, MappingEntry>,
    /// Tag names in table order.
    order: Vec<TagName>,
    /// Reverse index keyed by format and upper-cased native name.
    reverse: HashMap<(FormatKind, String), TagName>,
}

/// Remove a trailing `#` comment.
fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(content, _)| content)
}

/// Expand the MP4 placeholder prefix.
fn expand_mp4_name(name: &str) -> String {
    name.strip_prefix(MP4_PLACEHOLDER).map_or_else(
        || name.to_string(),
        |suffix| format!("{MP4_ITUNES_PREFIX}{suffix}"),
    )
}

/// The formats whose native names are listed in a column.
fn column_formats(column: &str) -> Vec<FormatKind> {
    FormatKind::ALL
        .into_iter()
        .filter(|kind| kind.column_name().eq_ignore_ascii_case(column))
        .collect()
}

impl MappingTable {
    /// The table shipped with this crate.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded table is malformed.
    pub fn builtin() -> Result<Self, MappingLoadError> {
        Self::load_from_str(BUILTIN_TABLE)
    }

    /// Load a mapping table from a string slice.
    ///
    /// # Errors
    ///
    /// See [`MappingTable::load`].
    pub fn load_from_str(text: &str) -> Result<Self, MappingLoadError> {
        Self::load(text.as_bytes())
    }

    /// Load a mapping table from a file located at the given path.
    ///
    /// # Errors
    ///
    /// See [`MappingTable::load`].
    pub fn load_from_path<T: AsRef<Path>>(path: T) -> Result<Self, MappingLoadError> {
        let file = File::open(path)?;
        Self::load(BufReader::new(file))
    }

    /// Load a mapping table.
    ///
    /// The first non-comment line is the header row. Every following row maps one tag name to
    /// `|`-separated native names per format column. A `#` starts a comment that runs to the end
    /// of the line, and rows without a tag name are skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingLoadError`] if the source cannot be read, has no header, lacks a
    /// required column, or contains an invalid row.
    pub fn load<R: BufRead>(reader: R) -> Result<Self, MappingLoadError> {
        let mut table = MappingTable::default();
        let mut header: Option<Vec<Vec<FormatKind>>> = None;
        let mut tag_name_index = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let content = strip_comment(&line);
            if content.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = content.split(',').map(str::trim).collect();

            if header.is_none() {
                for required in REQUIRED_COLUMNS {
                    if !cells.iter().any(|cell| cell.eq_ignore_ascii_case(required)) {
                        return Err(MappingLoadError::MissingColumn(required));
                    }
                }
                tag_name_index = cells
                    .iter()
                    .position(|cell| cell.eq_ignore_ascii_case(TAG_NAME_COLUMN))
                    .unwrap_or_default();
                header = Some(cells.iter().map(|cell| column_formats(cell)).collect());
                continue;
            }
            let columns: &[Vec<FormatKind>] = header.as_deref().unwrap_or_default();

            if cells.len() > columns.len() {
                return Err(MappingLoadError::TooManyCells {
                    line: line_number,
                    cells: cells.len(),
                    columns: columns.len(),
                });
            }

            let name = cells.get(tag_name_index).copied().unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            let tag_name: TagName =
                name.parse()
                    .map_err(|_| MappingLoadError::UnknownTagName {
                        line: line_number,
                        name: name.to_string(),
                    })?;
            if table.entries.contains_key(&tag_name) {
                return Err(MappingLoadError::DuplicateRow {
                    line: line_number,
                    tag_name,
                });
            }

            let mut entry = MappingEntry::default();
            for (cell, kinds) in cells.iter().zip(columns) {
                for &kind in kinds {
                    let names: Vec<String> = cell
                        .split('|')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(|name| match kind {
                            FormatKind::Mp4 => expand_mp4_name(name),
                            _ => name.to_string(),
                        })
                        .collect();
                    if names.is_empty() {
                        continue;
                    }
                    for native_name in &names {
                        let _ = table
                            .reverse
                            .entry((kind, native_name.to_uppercase()))
                            .or_insert(tag_name);
                    }
                    let _ = entry.names.insert(kind, names);
                }
            }
            log::trace!("Loaded mapping for {tag_name}");
            table.order.push(tag_name);
            let _ = table.entries.insert(tag_name, entry);
        }

        if header.is_none() {
            return Err(MappingLoadError::Empty);
        }
        log::debug!("Loaded mapping table with {} rows", table.order.len());
        Ok(table)
    }

    /// The mapping entry of a tag name, if the table has a row for it.
    #[must_use]
    pub fn entry(&self, tag_name: TagName) -> Option<&MappingEntry> {
        self.entries.get(&tag_name)
    }

    /// Tag names in table order.
    pub fn tag_names(&self) -> impl Iterator<Item = TagName> + '_ {
        self.order.iter().copied()
    }

    /// The native names of a tag name for a format, in table order. Empty if unmapped.
    #[must_use]
    pub fn native_names_for(&self, tag_name: TagName, kind: FormatKind) -> &[String] {
        self.entry(tag_name)
            .map(|entry| entry.native_names(kind))
            .unwrap_or_default()
    }

    /// The native name that is used when writing a tag name.
    #[must_use]
    pub fn preferred_native_name(&self, tag_name: TagName, kind: FormatKind) -> Option<&str> {
        self.native_names_for(tag_name, kind)
            .first()
            .map(String::as_str)
    }

    /// The tag name a native name belongs to. The lookup ignores case.
    #[must_use]
    pub fn logical_name_for(&self, native_name: &str, kind: FormatKind) -> Option<TagName> {
        self.reverse
            .get(&(kind, native_name.to_uppercase()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "MusicTagName,MP4,Vorbis,WMA,ID3v24,ID3v23,APEv2\n";

    fn load(rows: &str) -> MappingTable {
        MappingTable::load_from_str(&format!("{HEADER}{rows}")).unwrap()
    }

    #[test]
    fn test_track_number_row() {
        let table = load("TrackNumber,trkn,TRACKNUMBER,WM/TrackNumber,TRCK,TRCK,Track\n");
        assert_eq!(
            table.native_names_for(TagName::TrackNumber, FormatKind::Mp4),
            ["trkn"]
        );
        assert_eq!(
            table.logical_name_for("TRCK", FormatKind::Id3v24),
            Some(TagName::TrackNumber)
        );
        assert_eq!(
            table.native_names_for(TagName::TrackNumber, FormatKind::OggVorbis),
            table.native_names_for(TagName::TrackNumber, FormatKind::FlacVorbis)
        );
    }

    #[test]
    fn test_reverse_lookup_ignores_case() {
        let table = load("TrackNumber,trkn,TRACKNUMBER,WM/TrackNumber,TRCK,TRCK,Track\n");
        assert_eq!(
            table.logical_name_for("tRkN", FormatKind::Mp4),
            table.logical_name_for("TRKN", FormatKind::Mp4)
        );
        assert_eq!(
            table.logical_name_for("tracknumber", FormatKind::FlacVorbis),
            Some(TagName::TrackNumber)
        );
    }

    #[test]
    fn test_unknown_native_name() {
        let table = MappingTable::builtin().unwrap();
        assert_eq!(table.logical_name_for("XYZ123", FormatKind::Mp4), None);
    }

    #[test]
    fn test_alternatives_and_first_registration() {
        let table = load(concat!(
            "TrackCount,trkn,TOTALTRACKS|TRACKTOTAL,WM/TrackTotal,TRCK,TRCK,Track\n",
            "TrackNumber,trkn,TRACKNUMBER,WM/TrackNumber,TRCK,TRCK,Track\n",
        ));
        assert_eq!(
            table.native_names_for(TagName::TrackCount, FormatKind::OggVorbis),
            ["TOTALTRACKS", "TRACKTOTAL"]
        );
        assert_eq!(
            table.preferred_native_name(TagName::TrackCount, FormatKind::OggVorbis),
            Some("TOTALTRACKS")
        );
        assert_eq!(
            table.logical_name_for("trkn", FormatKind::Mp4),
            Some(TagName::TrackCount)
        );
    }

    #[test]
    fn test_comments_and_skipped_rows() {
        let table = load(concat!(
            "# a comment line\n",
            "\n",
            ",ignored,ignored,,,,\n",
            "Genre,\u{a9}gen,GENRE # trailing comment,WM/Genre,TCON,TCON,Genre\n",
        ));
        assert_eq!(table.tag_names().collect::<Vec<_>>(), [TagName::Genre]);
        assert_eq!(
            table.native_names_for(TagName::Genre, FormatKind::OggVorbis),
            ["GENRE"]
        );
        assert!(table
            .native_names_for(TagName::Genre, FormatKind::Ape)
            .is_empty());
    }

    #[test]
    fn test_mp4_placeholder_expansion() {
        let table = load("Barcode,~:BARCODE,BARCODE,WM/Barcode,TXXX:BARCODE,TXXX:BARCODE,Barcode\n");
        assert_eq!(
            table.preferred_native_name(TagName::Barcode, FormatKind::Mp4),
            Some("----:com.apple.iTunes:BARCODE")
        );
    }

    #[test]
    fn test_column_order_is_free() {
        let table = MappingTable::load_from_str(concat!(
            "apev2,id3v23,id3v24,wma,vorbis,mp4,musictagname\n",
            "Album,TALB,TALB,WM/AlbumTitle,ALBUM,\u{a9}alb,AlbumTitle\n",
        ))
        .unwrap();
        assert_eq!(
            table.preferred_native_name(TagName::AlbumTitle, FormatKind::Ape),
            Some("Album")
        );
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            MappingTable::load_from_str("# nothing\n"),
            Err(MappingLoadError::Empty)
        ));
        assert!(matches!(
            MappingTable::load_from_str("MusicTagName,MP4,Vorbis,WMA,ID3v24,ID3v23\n"),
            Err(MappingLoadError::MissingColumn("APEv2"))
        ));
        assert!(matches!(
            MappingTable::load_from_str(&format!("{HEADER}NoSuchTag,a,b,c,d,e,f\n")),
            Err(MappingLoadError::UnknownTagName { line: 2, .. })
        ));
        assert!(matches!(
            MappingTable::load_from_str(&format!(
                "{HEADER}Genre,a,b,c,d,e,f\nGenre,a,b,c,d,e,f\n"
            )),
            Err(MappingLoadError::DuplicateRow {
                line: 3,
                tag_name: TagName::Genre
            })
        ));
        assert!(matches!(
            MappingTable::load_from_str(&format!("{HEADER}Genre,a,b,c,d,e,f,g\n")),
            Err(MappingLoadError::TooManyCells { line: 2, .. })
        ));
    }

    #[test]
    fn test_builtin_covers_all_tag_names() {
        let table = MappingTable::builtin().unwrap();
        for tag_name in TagName::ALL {
            assert!(table.entry(*tag_name).is_some(), "{tag_name} is not mapped");
        }
    }
}
