// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Format-independent access to the tags of music files.
//!
//! Logical tag names such as [`TagName::AlbumTitle`] are mapped to the native tag names of MP4,
//! Vorbis comments (FLAC and Ogg), ASF, APEv2 and ID3v2.3/2.4 by a [`MappingTable`]. A
//! [`MusicFileProperties`] object reads and writes the tags of one file by logical name.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![warn(absolute_paths_not_starting_with_crate)]
#![warn(elided_lifetimes_in_paths)]
#![warn(explicit_outlives_requirements)]
#![warn(keyword_idents)]
#![warn(let_underscore_drop)]
#![warn(macro_use_extern_crate)]
#![warn(meta_variable_misuse)]
#![warn(missing_abi)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(noop_method_call)]
#![warn(single_use_lifetimes)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![deny(unsafe_code)]
#![warn(unsafe_op_in_unsafe_fn)]
#![warn(unstable_features)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_macro_rules)]
#![warn(unused_qualifications)]
#![warn(variant_size_differences)]

mod config;
mod error;
mod format;
mod io;
mod mapper;
mod mapping;
mod native;
mod properties;
mod tag_name;
mod value;

pub use self::config::{Config, ConfigError, MappingConfig, SaveConfig};
pub use self::error::{DecodeError, ErrorType, Result};
pub use self::format::{detect, FormatKind};
pub use self::io::{FileStorage, TagStorage};
pub use self::mapper::NativeProperty;
pub use self::mapping::{MappingEntry, MappingLoadError, MappingTable};
pub use self::native::{
    ApeItem, ApeTag, ApeValue, AsfAttribute, AsfTag, AsfValue, FreeFormType, Mp4Atom, Mp4Data,
    Mp4Tag, NativeTagContainer, VorbisCommentStore, VorbisComments, MP4_FREEFORM_PREFIX,
};
pub use self::properties::MusicFileProperties;
pub use self::tag_name::{TagName, ValueKind};
pub use self::value::TagValue;
