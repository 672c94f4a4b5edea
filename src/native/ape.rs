// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! In-memory APEv2 items.

/// Value of an APEv2 item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApeValue {
    /// UTF-8 text. Multiple values are separated by nul characters.
    Text(String),
    /// Binary data.
    Binary(Vec<u8>),
    /// External locator (URL).
    Locator(String),
}

/// A keyed APEv2 item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApeItem {
    /// Item key, e.g. `Album`.
    pub key: String,
    /// Item value.
    pub value: ApeValue,
}

/// APEv2 tag. Keys are unique and compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApeTag {
    items: Vec<ApeItem>,
}

impl ApeTag {
    /// Get the value of an item.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ApeValue> {
        self.items
            .iter()
            .find(|item| item.key.eq_ignore_ascii_case(key))
            .map(|item| &item.value)
    }

    /// Insert or replace an item, keeping the position of an existing one.
    pub fn set(&mut self, key: &str, value: ApeValue) {
        match self
            .items
            .iter_mut()
            .find(|item| item.key.eq_ignore_ascii_case(key))
        {
            Some(item) => item.value = value,
            None => self.items.push(ApeItem {
                key: key.to_string(),
                value,
            }),
        }
    }

    /// Remove an item. Returns `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let len = self.items.len();
        self.items.retain(|item| !item.key.eq_ignore_ascii_case(key));
        self.items.len() != len
    }

    /// Iterate over all items.
    pub fn items(&self) -> impl Iterator<Item = &ApeItem> {
        self.items.iter()
    }
}
