// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Reading and writing the native tags of files.

#[cfg(test)]
pub(crate) mod fixtures;
mod lofty_backend;

use crate::native::NativeTagContainer;
use std::fmt;
use std::path::{Path, PathBuf};

/// Source and sink of the native tags of one file.
pub trait TagStorage: fmt::Debug {
    /// The path of the underlying file.
    fn path(&self) -> &Path;

    /// Read the native tags.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its tags cannot be parsed.
    fn load(&self) -> crate::Result<NativeTagContainer>;

    /// Write the native tags back.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written or the container does not belong to this storage.
    fn store(
        &mut self,
        container: &mut NativeTagContainer,
        strip_padding: bool,
    ) -> crate::Result<()>;
}

/// The tag library used for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// ID3v2 tags via the [`id3`] crate.
    Id3,
    /// FLAC metadata blocks via the [`metaflac`] crate.
    Flac,
    /// MP4 `ilst` atoms via `lofty`.
    Mp4,
    /// Ogg Vorbis comments via `lofty`.
    Ogg,
    /// APEv2 tags via `lofty`.
    Ape,
}

impl Backend {
    /// Pick the backend by file extension.
    fn from_path(path: &Path) -> crate::Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let backend = match extension.as_str() {
            "mp3" => Backend::Id3,
            "flac" => Backend::Flac,
            "m4a" | "m4b" | "mp4" => Backend::Mp4,
            "ogg" | "oga" => Backend::Ogg,
            "ape" => Backend::Ape,
            "wma" | "asf" => {
                return Err(crate::ErrorType::UnsupportedFormat(
                    "no tag library available for ASF files".to_string(),
                ))
            }
            _ => {
                return Err(crate::ErrorType::UnsupportedFormat(format!(
                    "unknown file extension {extension:?}"
                )))
            }
        };
        Ok(backend)
    }
}

/// Tag storage backed by a file on disk. The tag library is picked by file extension.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Path of the file.
    path: PathBuf,
    /// Tag library for the file.
    backend: Backend,
}

impl FileStorage {
    /// Create a storage for the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ErrorType::UnsupportedFormat`] if the file extension is not supported.
    pub fn new(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        let backend = Backend::from_path(&path)?;
        log::trace!("Using {backend:?} backend for {}", path.display());
        Ok(FileStorage { path, backend })
    }

    /// Read the ID3v2 tag, or start a new ID3v2.4 tag if the file has none.
    fn load_id3(&self) -> crate::Result<id3::Tag> {
        match id3::Tag::read_from_path(&self.path) {
            Ok(tag) => Ok(tag),
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => {
                log::debug!("No ID3 tag in {}, starting a new one", self.path.display());
                Ok(id3::Tag::with_version(id3::Version::Id3v24))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write the ID3v2 tag in its own version.
    fn store_id3(&self, tag: &id3::Tag, strip_padding: bool) -> crate::Result<()> {
        if strip_padding {
            id3::Encoder::new()
                .version(tag.version())
                .padding(0)
                .write_to_path(tag, &self.path)?;
        } else {
            tag.write_to_path(&self.path, tag.version())?;
        }
        Ok(())
    }

    /// Write the FLAC metadata blocks.
    fn store_flac(&self, tag: &mut metaflac::Tag, strip_padding: bool) -> crate::Result<()> {
        if strip_padding {
            tag.remove_blocks(metaflac::BlockType::Padding);
        }
        tag.write_to_path(&self.path)?;
        Ok(())
    }
}

impl TagStorage for FileStorage {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> crate::Result<NativeTagContainer> {
        log::debug!("Reading tags from {}", self.path.display());
        let container = match self.backend {
            Backend::Id3 => NativeTagContainer::Id3(self.load_id3()?),
            Backend::Flac => NativeTagContainer::Flac(metaflac::Tag::read_from_path(&self.path)?),
            Backend::Mp4 => NativeTagContainer::Mp4(lofty_backend::read_mp4(&self.path)?),
            Backend::Ogg => NativeTagContainer::Ogg(lofty_backend::read_ogg(&self.path)?),
            Backend::Ape => NativeTagContainer::Ape(lofty_backend::read_ape(&self.path)?),
        };
        Ok(container)
    }

    fn store(
        &mut self,
        container: &mut NativeTagContainer,
        strip_padding: bool,
    ) -> crate::Result<()> {
        log::debug!(
            "Writing tags to {} (strip padding: {strip_padding})",
            self.path.display()
        );
        match (self.backend, container) {
            (Backend::Id3, NativeTagContainer::Id3(tag)) => self.store_id3(tag, strip_padding),
            (Backend::Flac, NativeTagContainer::Flac(tag)) => self.store_flac(tag, strip_padding),
            (Backend::Mp4, NativeTagContainer::Mp4(tag)) => {
                lofty_backend::write_mp4(&self.path, tag, strip_padding)
            }
            (Backend::Ogg, NativeTagContainer::Ogg(tag)) => {
                lofty_backend::write_ogg(&self.path, tag, strip_padding)
            }
            (Backend::Ape, NativeTagContainer::Ape(tag)) => {
                lofty_backend::write_ape(&self.path, tag, strip_padding)
            }
            _ => Err(crate::ErrorType::InvalidUsage(
                "tag container does not belong to this file",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_by_extension() {
        assert_eq!(Backend::from_path(Path::new("a.MP3")).unwrap(), Backend::Id3);
        assert_eq!(Backend::from_path(Path::new("a.flac")).unwrap(), Backend::Flac);
        assert_eq!(Backend::from_path(Path::new("a.m4b")).unwrap(), Backend::Mp4);
        assert_eq!(Backend::from_path(Path::new("a.oga")).unwrap(), Backend::Ogg);
        assert_eq!(Backend::from_path(Path::new("a.ape")).unwrap(), Backend::Ape);
    }

    #[test]
    fn test_unsupported_extensions() {
        for path in ["a.wma", "a.asf", "a.txt", "noextension"] {
            let err = FileStorage::new(path).unwrap_err();
            assert!(matches!(err, crate::ErrorType::UnsupportedFormat(_)));
        }
    }

    #[test]
    fn test_id3_without_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.mp3");
        std::fs::write(&path, [0u8; 256]).unwrap();

        let storage = FileStorage::new(&path).unwrap();
        let NativeTagContainer::Id3(tag) = storage.load().unwrap() else {
            panic!("expected an ID3 container");
        };
        assert_eq!(tag.version(), id3::Version::Id3v24);
        assert_eq!(tag.frames().count(), 0);
    }

    #[test]
    fn test_container_mismatch() {
        let mut storage = FileStorage::new("a.mp3").unwrap();
        let mut container = NativeTagContainer::Ape(crate::native::ApeTag::default());
        let err = storage.store(&mut container, false).unwrap_err();
        assert!(matches!(err, crate::ErrorType::InvalidUsage(_)));
    }
}
