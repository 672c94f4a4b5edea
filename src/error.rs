// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Error and result types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type.
#[derive(Error, Debug)]
pub enum ErrorType {
    /// Configuration error.
    #[error("Configuration Error ({0})")]
    Config(#[from] crate::config::ConfigError),
    /// The mapping table could not be loaded.
    #[error("Failed to load tag mapping table ({0})")]
    MappingLoad(#[from] crate::mapping::MappingLoadError),
    /// The native tag container is not one of the supported kinds.
    #[error("Unsupported tag format: {0}")]
    UnsupportedFormat(String),
    /// A logical tag name outside of the registry was requested.
    #[error("Unknown tag name {0:?}")]
    UnknownTagName(String),
    /// A native value could not be interpreted.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A logical value cannot be represented in the native format.
    #[error("Cannot encode value for native tag {native_name:?}: {reason}")]
    Encode {
        /// Native tag name that the value was meant for.
        native_name: String,
        /// Why encoding failed.
        reason: String,
    },
    /// Operation on a closed properties object.
    #[error("Invalid usage: {0}")]
    InvalidUsage(&'static str),
    /// Writing the tags back to disk failed.
    #[error("Failed to save tags to {path:?}")]
    Persistence {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<ErrorType>,
    },
    /// I/O Error.
    #[error("Input/Output error ({:?})", .0)]
    Io(#[from] io::Error),
    /// Errors raised by the [`id3`] crate.
    #[error("Failed to access ID3 tag")]
    Id3(#[from] id3::Error),
    /// Errors raised by the [`metaflac`] crate.
    #[error("Failed to access FLAC tag")]
    Flac(#[from] metaflac::Error),
    /// Errors raised by the [`lofty`] crate.
    #[error("Failed to access tag ({0})")]
    Lofty(#[from] lofty::error::LoftyError),
}

impl ErrorType {
    /// Create an [`ErrorType::Encode`] error for the given native tag.
    pub(crate) fn encode(native_name: &str, reason: impl Into<String>) -> Self {
        Self::Encode {
            native_name: native_name.to_string(),
            reason: reason.into(),
        }
    }
}

/// A native value that could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed value in native tag {native_name:?}: {reason}")]
pub struct DecodeError {
    /// Name of the offending native tag.
    pub native_name: String,
    /// Description of the problem.
    pub reason: String,
}

impl DecodeError {
    /// Create a new decode error for a native tag.
    pub fn new(native_name: &str, reason: impl Into<String>) -> Self {
        Self {
            native_name: native_name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type.
pub type Result<T> = std::result::Result<T, ErrorType>;
