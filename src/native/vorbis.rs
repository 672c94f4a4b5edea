// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Vorbis comments.
//!
//! FLAC files keep their comments in a [`metaflac::Tag`], Ogg streams in [`VorbisComments`].
//! Both are accessed through the [`VorbisCommentStore`] trait.

/// Key/value access to Vorbis comments. Keys are case-insensitive.
pub trait VorbisCommentStore {
    /// All values for the key, in native order.
    fn values(&self, key: &str) -> Vec<&String>;
    /// Replace all values for the key.
    fn set_values(&mut self, key: &str, values: Vec<String>);
    /// Remove all values for the key. Returns `true` if any were present.
    fn remove_values(&mut self, key: &str) -> bool;
    /// All comments as `(key, value)` pairs.
    fn entries(&self) -> Vec<(&str, &str)>;
}

/// Vorbis comments of an Ogg stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VorbisComments {
    /// Vendor string.
    pub vendor: String,
    /// Comments in native order.
    pub(crate) comments: Vec<(String, String)>,
}

impl VorbisComments {
    /// Append a comment without touching existing values of the same key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.comments.push((key.into(), value.into()));
    }
}

impl VorbisCommentStore for VorbisComments {
    fn values(&self, key: &str) -> Vec<&String> {
        self.comments
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
            .collect()
    }

    fn set_values(&mut self, key: &str, values: Vec<String>) {
        let position = self
            .comments
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
            .unwrap_or(self.comments.len());
        let _ = self.remove_values(key);
        let position = position.min(self.comments.len());
        let key = key.to_ascii_uppercase();
        let _ = self.comments.splice(
            position..position,
            values.into_iter().map(|value| (key.clone(), value)),
        );
    }

    fn remove_values(&mut self, key: &str) -> bool {
        let len = self.comments.len();
        self.comments.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self.comments.len() != len
    }

    fn entries(&self) -> Vec<(&str, &str)> {
        self.comments
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

impl VorbisCommentStore for metaflac::Tag {
    fn values(&self, key: &str) -> Vec<&String> {
        self.vorbis_comments()
            .into_iter()
            .flat_map(|comments| comments.comments.iter())
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .flat_map(|(_, values)| values.iter())
            .collect()
    }

    fn set_values(&mut self, key: &str, values: Vec<String>) {
        let _ = VorbisCommentStore::remove_values(self, key);
        self.set_vorbis(key.to_ascii_uppercase(), values);
    }

    fn remove_values(&mut self, key: &str) -> bool {
        let Some(comments) = self.vorbis_comments_mut_if_present() else {
            return false;
        };
        let len = comments.comments.len();
        comments.comments.retain(|k, _| !k.eq_ignore_ascii_case(key));
        comments.comments.len() != len
    }

    fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .vorbis_comments()
            .into_iter()
            .flat_map(|comments| comments.comments.iter())
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
            .collect();
        // Comments of a FLAC tag are kept in a hash map, so sort them for a stable order.
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Mutable access to the vorbis comment block of a FLAC tag, without creating one.
trait FlacCommentsExt {
    /// Returns the vorbis comment block if the tag has one.
    fn vorbis_comments_mut_if_present(&mut self) -> Option<&mut metaflac::block::VorbisComment>;
}

impl FlacCommentsExt for metaflac::Tag {
    fn vorbis_comments_mut_if_present(&mut self) -> Option<&mut metaflac::block::VorbisComment> {
        if self.vorbis_comments().is_some() {
            Some(self.vorbis_comments_mut())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_store(store: &mut impl VorbisCommentStore) {
        assert!(store.values("TITLE").is_empty());

        store.set_values("title", vec!["Blue Train".into()]);
        assert_eq!(store.values("TITLE"), [&"Blue Train".to_string()]);

        store.set_values("ARTIST", vec!["John Coltrane".into(), "Lee Morgan".into()]);
        assert_eq!(
            store.values("Artist"),
            [&"John Coltrane".to_string(), &"Lee Morgan".to_string()]
        );
        assert_eq!(store.entries().len(), 3);

        assert!(store.remove_values("artist"));
        assert!(!store.remove_values("artist"));
        assert!(store.values("ARTIST").is_empty());
    }

    #[test]
    fn test_ogg_comments() {
        check_store(&mut VorbisComments::default());
    }

    #[test]
    fn test_flac_comments() {
        check_store(&mut metaflac::Tag::new());
    }

    #[test]
    fn test_set_values_keeps_position() {
        let mut comments = VorbisComments::default();
        comments.push("TITLE", "A");
        comments.push("ARTIST", "B");
        comments.set_values("TITLE", vec!["C".into()]);
        assert_eq!(comments.entries(), [("TITLE", "C"), ("ARTIST", "B")]);
    }
}
