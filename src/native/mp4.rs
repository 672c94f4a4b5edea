// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! In-memory MP4 `ilst` atoms.

/// Prefix of free-form (`----`) atom names; followed by `mean:name`.
pub const MP4_FREEFORM_PREFIX: &str = "----:";

/// The declared type of free-form atom data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeFormType {
    /// Type indicated by the atom name (type code 0).
    Implicit,
    /// UTF-8 text (type code 1).
    Utf8,
    /// UTF-16 big-endian text (type code 2).
    Utf16,
    /// Any other type code.
    Other(u32),
}

/// One data item of an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mp4Data {
    /// UTF-8 text of a four-character-code atom.
    Utf8(String),
    /// Signed integer.
    Integer(i64),
    /// Boolean flag (e.g. `cpil`).
    Bool(bool),
    /// Number pair of `trkn` and `disk` atoms. `0` means unset.
    NumberPair(u16, u16),
    /// JPEG image.
    Jpeg(Vec<u8>),
    /// PNG image.
    Png(Vec<u8>),
    /// Data of a free-form atom, tagged with its declared type.
    FreeForm(FreeFormType, Vec<u8>),
    /// Opaque binary data.
    Binary(Vec<u8>),
}

/// A named atom with one or more data items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mp4Atom {
    /// Atom name, either a four-character code (e.g. `©nam`) or `----:mean:name`.
    pub ident: String,
    /// Data items in native order.
    pub data: Vec<Mp4Data>,
}

impl Mp4Atom {
    /// Returns `true` if this is a free-form atom.
    #[must_use]
    pub fn is_freeform(&self) -> bool {
        is_freeform(&self.ident)
    }
}

/// Returns `true` if the atom name denotes a free-form (`----`) atom.
#[must_use]
pub fn is_freeform(ident: &str) -> bool {
    ident.starts_with(MP4_FREEFORM_PREFIX)
}

/// MP4 tag, i.e. the ordered list of `ilst` atoms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mp4Tag {
    /// The atoms in file order.
    atoms: Vec<Mp4Atom>,
}

impl Mp4Tag {
    /// Free-form atom names are compared case-insensitively, four-character codes exactly.
    fn matches(atom: &Mp4Atom, ident: &str) -> bool {
        if atom.is_freeform() {
            atom.ident.eq_ignore_ascii_case(ident)
        } else {
            atom.ident == ident
        }
    }

    /// Get the data items of an atom.
    #[must_use]
    pub fn get(&self, ident: &str) -> Option<&[Mp4Data]> {
        self.atoms
            .iter()
            .find(|atom| Self::matches(atom, ident))
            .map(|atom| atom.data.as_slice())
    }

    /// Replace the data of an atom, keeping its position, or append a new atom.
    ///
    /// An empty `data` vector removes the atom.
    pub fn set(&mut self, ident: &str, data: Vec<Mp4Data>) {
        if data.is_empty() {
            let _ = self.remove(ident);
            return;
        }
        match self.atoms.iter_mut().find(|atom| Self::matches(atom, ident)) {
            Some(atom) => atom.data = data,
            None => self.atoms.push(Mp4Atom {
                ident: ident.to_string(),
                data,
            }),
        }
    }

    /// Remove an atom. Returns `true` if it was present.
    pub fn remove(&mut self, ident: &str) -> bool {
        let len = self.atoms.len();
        self.atoms.retain(|atom| !Self::matches(atom, ident));
        self.atoms.len() != len
    }

    /// Iterate over all atoms.
    pub fn atoms(&self) -> impl Iterator<Item = &Mp4Atom> {
        self.atoms.iter()
    }

    /// Returns `true` if there are no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl FromIterator<Mp4Atom> for Mp4Tag {
    fn from_iter<T: IntoIterator<Item = Mp4Atom>>(iter: T) -> Self {
        let mut tag = Mp4Tag::default();
        for atom in iter {
            tag.set(&atom.ident, atom.data);
        }
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_position() {
        let mut tag = Mp4Tag::default();
        tag.set("\u{a9}nam", vec![Mp4Data::Utf8("Title".into())]);
        tag.set("\u{a9}ART", vec![Mp4Data::Utf8("Artist".into())]);
        tag.set("\u{a9}nam", vec![Mp4Data::Utf8("Other Title".into())]);

        let idents: Vec<&str> = tag.atoms().map(|atom| atom.ident.as_str()).collect();
        assert_eq!(idents, ["\u{a9}nam", "\u{a9}ART"]);
        assert_eq!(
            tag.get("\u{a9}nam"),
            Some([Mp4Data::Utf8("Other Title".into())].as_slice())
        );
    }

    #[test]
    fn test_freeform_lookup_ignores_case() {
        let mut tag = Mp4Tag::default();
        tag.set(
            "----:com.apple.iTunes:MusicBrainz Album Id",
            vec![Mp4Data::FreeForm(FreeFormType::Utf8, b"abc".to_vec())],
        );
        assert!(tag.get("----:com.apple.iTunes:MUSICBRAINZ ALBUM ID").is_some());
        assert!(tag.get("----:com.apple.iTunes:MusicBrainz Album Id").is_some());
    }

    #[test]
    fn test_set_empty_removes() {
        let mut tag = Mp4Tag::default();
        tag.set("trkn", vec![Mp4Data::NumberPair(1, 2)]);
        tag.set("trkn", Vec::new());
        assert!(tag.is_empty());
        assert!(!tag.remove("trkn"));
    }
}
