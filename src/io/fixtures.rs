// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Smallest files each tag library accepts, without audio data.

/// FLAC stream with a single `STREAMINFO` block (44.1 kHz, stereo, 16 bit, no samples).
pub(crate) fn flac() -> Vec<u8> {
    let mut data = b"fLaC".to_vec();
    data.extend_from_slice(&[0x80, 0x00, 0x00, 0x22]);
    data.extend_from_slice(&[0x10, 0x00, 0x10, 0x00]);
    data.extend_from_slice(&[0; 6]);
    data.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(&[0; 16]);
    data
}

/// MP4 atom with a 32 bit size.
fn atom(ident: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let size = u32::try_from(payload.len() + 8).unwrap();
    let mut data = size.to_be_bytes().to_vec();
    data.extend_from_slice(ident);
    data.extend_from_slice(payload);
    data
}

/// MP4 file with `ftyp`, an empty `mdat` and a `moov` that only holds the movie header.
pub(crate) fn mp4() -> Vec<u8> {
    let mut ftyp = b"M4A ".to_vec();
    ftyp.extend_from_slice(&0u32.to_be_bytes());
    ftyp.extend_from_slice(b"M4A isom");

    let mut mvhd = vec![0; 100];
    mvhd[12..16].copy_from_slice(&1000u32.to_be_bytes());
    mvhd[20..24].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    mvhd[24..26].copy_from_slice(&0x0100u16.to_be_bytes());
    mvhd[96..100].copy_from_slice(&1u32.to_be_bytes());

    [
        atom(b"ftyp", &ftyp),
        atom(b"mdat", &[0; 8]),
        atom(b"moov", &atom(b"mvhd", &mvhd)),
    ]
    .concat()
}

/// CRC-32 of an Ogg page (polynomial `0x04C11DB7`, no reflection).
fn ogg_crc(page: &[u8]) -> u32 {
    page.iter().fold(0, |crc, byte| {
        (0..8).fold(crc ^ (u32::from(*byte) << 24), |crc, _| {
            if crc & 0x8000_0000 == 0 {
                crc << 1
            } else {
                (crc << 1) ^ 0x04C1_1DB7
            }
        })
    })
}

/// Ogg page of the first logical stream with complete packets.
fn ogg_page(header_type: u8, sequence: u32, packets: &[&[u8]]) -> Vec<u8> {
    let mut lacing = Vec::new();
    for packet in packets {
        lacing.extend(std::iter::repeat(255).take(packet.len() / 255));
        lacing.push(u8::try_from(packet.len() % 255).unwrap());
    }

    let mut page = b"OggS".to_vec();
    page.push(0);
    page.push(header_type);
    page.extend_from_slice(&0u64.to_le_bytes());
    page.extend_from_slice(&1u32.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&[0; 4]);
    page.push(u8::try_from(lacing.len()).unwrap());
    page.extend_from_slice(&lacing);
    for packet in packets {
        page.extend_from_slice(packet);
    }
    let crc = ogg_crc(&page);
    page[22..26].copy_from_slice(&crc.to_le_bytes());
    page
}

/// Ogg Vorbis stream with the three header packets and no audio packets.
pub(crate) fn ogg_vorbis() -> Vec<u8> {
    let mut identification = b"\x01vorbis".to_vec();
    identification.extend_from_slice(&0u32.to_le_bytes());
    identification.push(2);
    identification.extend_from_slice(&44100u32.to_le_bytes());
    identification.extend_from_slice(&0i32.to_le_bytes());
    identification.extend_from_slice(&128_000i32.to_le_bytes());
    identification.extend_from_slice(&0i32.to_le_bytes());
    identification.extend_from_slice(&[0xB8, 0x01]);

    let vendor = b"musicprops";
    let mut comments = b"\x03vorbis".to_vec();
    comments.extend_from_slice(&u32::try_from(vendor.len()).unwrap().to_le_bytes());
    comments.extend_from_slice(vendor);
    comments.extend_from_slice(&0u32.to_le_bytes());
    comments.push(1);

    let setup = b"\x05vorbis\x00\x01";

    [
        ogg_page(0x02, 0, &[&identification]),
        ogg_page(0x00, 1, &[&comments, setup]),
    ]
    .concat()
}

/// Monkey's Audio file that consists of its magic and zeroes.
pub(crate) fn ape() -> Vec<u8> {
    let mut data = b"MAC ".to_vec();
    data.resize(1024, 0);
    data
}

#[test]
fn test_ogg_crc() {
    assert_eq!(ogg_crc(b""), 0);
    assert_eq!(ogg_crc(b"123456789"), 0x89A1_897F);
}
