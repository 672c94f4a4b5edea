// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! In-memory ASF (WMA) attributes.

/// Typed value of an ASF attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsfValue {
    /// UTF-16 string, stored decoded.
    Unicode(String),
    /// Byte array.
    Binary(Vec<u8>),
    /// Boolean.
    Bool(bool),
    /// 32-bit unsigned integer.
    DWord(u32),
    /// 64-bit unsigned integer.
    QWord(u64),
    /// 16-bit unsigned integer.
    Word(u16),
}

/// A named attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsfAttribute {
    /// Attribute name, e.g. `WM/AlbumTitle`.
    pub name: String,
    /// Attribute value.
    pub value: AsfValue,
}

/// ASF extended content description attributes.
///
/// An attribute name may occur more than once; names are compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsfTag {
    attributes: Vec<AsfAttribute>,
}

impl AsfTag {
    /// All values stored under the name, in native order.
    #[must_use]
    pub fn get(&self, name: &str) -> Vec<&AsfValue> {
        self.attributes
            .iter()
            .filter(|attribute| attribute.name.eq_ignore_ascii_case(name))
            .map(|attribute| &attribute.value)
            .collect()
    }

    /// Replace all values stored under the name.
    pub fn set(&mut self, name: &str, values: Vec<AsfValue>) {
        let _ = self.remove(name);
        self.attributes
            .extend(values.into_iter().map(|value| AsfAttribute {
                name: name.to_string(),
                value,
            }));
    }

    /// Append a value without touching existing values of the same name.
    pub fn push(&mut self, name: impl Into<String>, value: AsfValue) {
        self.attributes.push(AsfAttribute {
            name: name.into(),
            value,
        });
    }

    /// Remove all values stored under the name. Returns `true` if any were present.
    pub fn remove(&mut self, name: &str) -> bool {
        let len = self.attributes.len();
        self.attributes
            .retain(|attribute| !attribute.name.eq_ignore_ascii_case(name));
        self.attributes.len() != len
    }

    /// Iterate over all attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &AsfAttribute> {
        self.attributes.iter()
    }
}
