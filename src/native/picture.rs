// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Embedded picture structures.
//!
//! FLAC `PICTURE` blocks (also used, base64 encoded, by the `METADATA_BLOCK_PICTURE` Vorbis
//! comment) go through `metaflac`. The ASF `WM/Picture` attribute layout is decoded here.

use lofty::picture::{MimeType, Picture as LoftyPicture};
use metaflac::block::{Picture as FlacPicture, PictureType};

/// Picture type code of the front cover, shared by FLAC, ID3 and ASF.
pub(crate) const FRONT_COVER: u8 = 3;

/// MIME type of data that is not a known image format.
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// FLAC picture types, indexed by their type code.
const FLAC_PICTURE_TYPES: [PictureType; 21] = [
    PictureType::Other,
    PictureType::Icon,
    PictureType::OtherIcon,
    PictureType::CoverFront,
    PictureType::CoverBack,
    PictureType::Leaflet,
    PictureType::Media,
    PictureType::LeadArtist,
    PictureType::Artist,
    PictureType::Conductor,
    PictureType::Band,
    PictureType::Composer,
    PictureType::Lyricist,
    PictureType::RecordingLocation,
    PictureType::DuringRecording,
    PictureType::DuringPerformance,
    PictureType::ScreenCapture,
    PictureType::BrightFish,
    PictureType::Illustration,
    PictureType::BandLogo,
    PictureType::PublisherLogo,
];

/// A decoded embedded picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Picture {
    /// Picture type code, e.g. [`FRONT_COVER`].
    pub picture_type: u8,
    /// MIME type of the image data.
    pub mime_type: String,
    /// Free-form description.
    pub description: String,
    /// Image data.
    pub data: Vec<u8>,
}

impl Picture {
    /// A front cover picture whose MIME type is detected from the data.
    pub fn front_cover(data: Vec<u8>) -> Self {
        Picture {
            picture_type: FRONT_COVER,
            mime_type: mime_type_name(&data),
            description: String::new(),
            data,
        }
    }

    /// Whether this is the front cover.
    pub fn is_front_cover(&self) -> bool {
        self.picture_type == FRONT_COVER
    }
}

impl From<FlacPicture> for Picture {
    fn from(picture: FlacPicture) -> Self {
        Picture {
            picture_type: picture.picture_type as u8,
            mime_type: picture.mime_type,
            description: picture.description,
            data: picture.data,
        }
    }
}

/// The FLAC picture type of a type code. Unknown codes become "other".
fn flac_picture_type(code: u8) -> PictureType {
    FLAC_PICTURE_TYPES
        .get(usize::from(code))
        .cloned()
        .unwrap_or(PictureType::Other)
}

/// Pick the front cover if there is one, otherwise the first picture.
pub(crate) fn select_cover<T>(pictures: &[T], is_front_cover: impl Fn(&T) -> bool) -> Option<&T> {
    pictures
        .iter()
        .find(|picture| is_front_cover(*picture))
        .or_else(|| pictures.first())
}

/// Detect the image format of picture data from its magic bytes.
pub(crate) fn mime_type_of(data: &[u8]) -> Option<MimeType> {
    LoftyPicture::from_reader(&mut &data[..])
        .ok()
        .and_then(|picture| picture.mime_type().cloned())
}

/// The MIME type name of picture data, `application/octet-stream` if unknown.
pub(crate) fn mime_type_name(data: &[u8]) -> String {
    mime_type_of(data).map_or_else(
        || UNKNOWN_MIME_TYPE.to_string(),
        |mime_type| mime_type.as_str().to_string(),
    )
}

/// Decode a FLAC `PICTURE` metadata block body.
pub(crate) fn decode_flac_picture(data: &[u8]) -> Result<Picture, String> {
    FlacPicture::from_bytes(data)
        .map(Picture::from)
        .map_err(|err| format!("invalid picture block: {err}"))
}

/// Encode a FLAC `PICTURE` metadata block body.
pub(crate) fn encode_flac_picture(picture: &Picture) -> Vec<u8> {
    let mut block = FlacPicture::new();
    block.picture_type = flac_picture_type(picture.picture_type);
    block.mime_type.clone_from(&picture.mime_type);
    block.description.clone_from(&picture.description);
    block.data.clone_from(&picture.data);
    block.to_bytes()
}

/// Sequential reader over the bytes of a `WM/Picture` value.
struct Cursor<'a> {
    /// Bytes not read yet.
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    /// Take the next `len` bytes.
    fn take(&mut self, len: usize) -> Result<&'a [u8], &'static str> {
        if self.data.len() < len {
            return Err("picture data is truncated");
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    /// Read a little-endian `u32`.
    fn u32_le(&mut self) -> Result<u32, &'static str> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a UTF-16LE string terminated by a double nul byte.
    fn utf16_le_nul_terminated(&mut self) -> Result<String, &'static str> {
        let mut units = Vec::new();
        loop {
            let bytes = self.take(2)?;
            let unit = u16::from_le_bytes([bytes[0], bytes[1]]);
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        String::from_utf16(&units).map_err(|_| "invalid UTF-16 string")
    }
}

/// Decode an ASF `WM/Picture` attribute value.
pub(crate) fn decode_asf_picture(data: &[u8]) -> Result<Picture, &'static str> {
    let mut cursor = Cursor { data };
    let picture_type = cursor.take(1)?[0];
    let len = cursor.u32_le()?;
    let mime_type = cursor.utf16_le_nul_terminated()?;
    let description = cursor.utf16_le_nul_terminated()?;
    let data = cursor
        .take(usize::try_from(len).map_err(|_| "length out of range")?)?
        .to_vec();
    Ok(Picture {
        picture_type,
        mime_type,
        description,
        data,
    })
}

/// Encode an ASF `WM/Picture` attribute value.
pub(crate) fn encode_asf_picture(picture: &Picture) -> Vec<u8> {
    /// Append NUL-terminated UTF-16LE text.
    fn push_utf16(out: &mut Vec<u8>, text: &str) {
        for unit in text.encode_utf16().chain(std::iter::once(0)) {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }

    let mut out = Vec::with_capacity(16 + picture.data.len());
    out.push(picture.picture_type);
    out.extend_from_slice(
        &u32::try_from(picture.data.len())
            .unwrap_or(u32::MAX)
            .to_le_bytes(),
    );
    push_utf16(&mut out, &picture.mime_type);
    push_utf16(&mut out, &picture.description);
    out.extend_from_slice(&picture.data);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Picture type code for "other".
    const OTHER: u8 = 0;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    #[test]
    fn test_mime_type_of() {
        assert_eq!(mime_type_of(PNG), Some(MimeType::Png));
        assert_eq!(mime_type_name(PNG), "image/png");
        assert_eq!(
            mime_type_of(b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00\x01"),
            Some(MimeType::Jpeg)
        );
        assert_eq!(mime_type_of(b"not an image"), None);
        assert_eq!(mime_type_name(b"not an image"), "application/octet-stream");
    }

    #[test]
    fn test_flac_picture_block() {
        let picture = Picture {
            description: "Front".to_string(),
            ..Picture::front_cover(PNG.to_vec())
        };
        let encoded = encode_flac_picture(&picture);
        assert_eq!(&encoded[..4], &[0, 0, 0, 3]);
        assert_eq!(&encoded[4..8], &[0, 0, 0, 9]);
        assert_eq!(&encoded[8..17], b"image/png");
        assert_eq!(decode_flac_picture(&encoded).unwrap(), picture);
    }

    #[test]
    fn test_flac_picture_type_codes() {
        assert_eq!(flac_picture_type(FRONT_COVER), PictureType::CoverFront);
        assert_eq!(flac_picture_type(4), PictureType::CoverBack);
        assert_eq!(flac_picture_type(200), PictureType::Other);
        for (code, picture_type) in FLAC_PICTURE_TYPES.iter().enumerate() {
            assert_eq!(usize::from(*picture_type as u8), code);
        }
    }

    #[test]
    fn test_asf_picture_layout() {
        let picture = Picture {
            picture_type: OTHER,
            mime_type: "image/png".to_string(),
            description: "Back".to_string(),
            data: PNG.to_vec(),
        };
        let encoded = encode_asf_picture(&picture);
        assert_eq!(encoded[0], OTHER);
        assert_eq!(&encoded[1..5], &11u32.to_le_bytes());
        assert_eq!(decode_asf_picture(&encoded).unwrap(), picture);
    }

    #[test]
    fn test_truncated_asf_picture() {
        assert!(decode_asf_picture(&[3, 1, 0, 0, 0, b'i']).is_err());
    }

    #[test]
    fn test_select_cover_prefers_front() {
        let pictures = [
            Picture {
                picture_type: OTHER,
                ..Picture::front_cover(vec![1])
            },
            Picture::front_cover(vec![2]),
        ];
        let cover = select_cover(&pictures, Picture::is_front_cover).unwrap();
        assert_eq!(cover.data, [2]);

        let cover = select_cover(&pictures[..1], Picture::is_front_cover).unwrap();
        assert_eq!(cover.data, [1]);
    }
}
