// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Scalar tag values.

use crate::error::DecodeError;
use crate::tag_name::ValueKind;
use std::borrow::Cow;
use std::fmt;

/// A single scalar value of a tag.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TagValue {
    /// Free text.
    Text(String),
    /// A number.
    Integer(i64),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl TagValue {
    /// Returns the text if this is a [`TagValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the number if this is a [`TagValue::Integer`] or a text holding a number.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TagValue::Integer(number) => Some(*number),
            TagValue::Text(text) => text.trim().parse().ok(),
            TagValue::Binary(_) => None,
        }
    }

    /// Returns the bytes if this is a [`TagValue::Binary`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TagValue::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// The textual form of this value, if it has one.
    ///
    /// Binary values have no textual form.
    #[must_use]
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            TagValue::Text(text) => Some(Cow::Borrowed(text)),
            TagValue::Integer(number) => Some(Cow::Owned(number.to_string())),
            TagValue::Binary(_) => None,
        }
    }

    /// Parse a native text into a value of the given kind.
    ///
    /// Numbers accept a leading `N` of an `N/M` pair, so that writers which pack the total into
    /// the number field are still understood.
    pub(crate) fn from_native_text(
        text: &str,
        kind: ValueKind,
        native_name: &str,
    ) -> Result<Self, DecodeError> {
        match kind {
            ValueKind::Integer => {
                let number = text.split('/').next().unwrap_or_default().trim();
                number
                    .parse()
                    .map(TagValue::Integer)
                    .map_err(|_| DecodeError::new(native_name, format!("{text:?} is not a number")))
            }
            ValueKind::Text | ValueKind::Binary => Ok(TagValue::Text(text.to_string())),
        }
    }
}

impl fmt::Debug for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            TagValue::Integer(number) => f.debug_tuple("Integer").field(number).finish(),
            TagValue::Binary(data) => write!(f, "Binary({} bytes)", data.len()),
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.write_str(text),
            TagValue::Integer(number) => write!(f, "{number}"),
            TagValue::Binary(data) => write!(f, "<{} bytes>", data.len()),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Integer(value)
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::Integer(i64::from(value))
    }
}

impl From<Vec<u8>> for TagValue {
    fn from(value: Vec<u8>) -> Self {
        TagValue::Binary(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_native_text_number() {
        assert_eq!(
            TagValue::from_native_text("3/12", ValueKind::Integer, "TRACKNUMBER").unwrap(),
            TagValue::Integer(3)
        );
        assert_eq!(
            TagValue::from_native_text(" 7 ", ValueKind::Integer, "DISCTOTAL").unwrap(),
            TagValue::Integer(7)
        );
    }

    #[test]
    fn test_from_native_text_invalid_number() {
        let err = TagValue::from_native_text("three", ValueKind::Integer, "TRACKNUMBER")
            .unwrap_err();
        assert_eq!(err.native_name, "TRACKNUMBER");
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(TagValue::from("42").as_integer(), Some(42));
        assert_eq!(TagValue::from(42u32).as_integer(), Some(42));
        assert_eq!(TagValue::from(vec![1u8, 2]).as_integer(), None);
    }
}
