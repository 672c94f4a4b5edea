// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Number/count pairs packed into one `N/M` text value.
//!
//! The native name of the number is the packed one. The count is either read from a separate
//! native field or, if its native name is the packed one, from the part after the slash. A `0`
//! component counts as unset.

use super::FormatMapper;
use crate::error::DecodeError;
use crate::mapping::MappingTable;
use crate::tag_name::TagName;
use crate::value::TagValue;

/// A number tag and the count tag that may share its native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PackedPair {
    /// The tag name of the number, e.g. [`TagName::TrackNumber`].
    pub number: TagName,
    /// The tag name of the count, e.g. [`TagName::TrackCount`].
    pub count: TagName,
}

impl PackedPair {
    /// Track number and track count.
    pub const TRACK: PackedPair = PackedPair {
        number: TagName::TrackNumber,
        count: TagName::TrackCount,
    };

    /// Disc number and disc count.
    pub const DISC: PackedPair = PackedPair {
        number: TagName::DiscNumber,
        count: TagName::DiscCount,
    };

    /// Movement number and movement count.
    pub const MOVEMENT: PackedPair = PackedPair {
        number: TagName::MovementNumber,
        count: TagName::MovementCount,
    };

    /// Find the pair a tag name belongs to.
    pub fn find(pairs: &[PackedPair], tag_name: TagName) -> Option<PackedPair> {
        pairs
            .iter()
            .copied()
            .find(|pair| pair.number == tag_name || pair.count == tag_name)
    }
}

/// Text access to the native values that hold packed pairs.
pub(crate) trait PackedText: FormatMapper {
    /// The text stored under a native name.
    fn read_text(&self, tag: &Self::Tag, native_name: &str) -> Option<String>;

    /// Store a text under a native name, replacing any existing value.
    fn write_text(&self, tag: &mut Self::Tag, native_name: &str, text: String);
}

/// Split an `N/M` text into its components.
fn split(text: &str) -> (&str, Option<&str>) {
    match text.split_once('/') {
        Some((number, count)) => (number, Some(count)),
        None => (text, None),
    }
}

/// Parse one component. Empty and zero components are unset.
fn parse_component(component: &str, native_name: &str) -> Result<Option<i64>, DecodeError> {
    let component = component.trim();
    if component.is_empty() {
        return Ok(None);
    }
    component
        .parse::<i64>()
        .map(|number| Some(number).filter(|number| *number != 0))
        .map_err(|_| DecodeError::new(native_name, format!("{component:?} is not a number")))
}

/// Parse one component, treating garbage as unset.
fn parse_lenient(component: Option<&str>) -> Option<i64> {
    component
        .and_then(|component| component.trim().parse().ok())
        .filter(|number| *number != 0)
}

/// Render a packed value, or `None` if both halves are unset.
fn pack(number: Option<i64>, count: Option<i64>) -> Option<String> {
    match (number, count) {
        (None, None) => None,
        (Some(number), None) => Some(number.to_string()),
        (number, Some(count)) => Some(format!("{}/{count}", number.unwrap_or(0))),
    }
}

/// The current number and count of the packed native value.
fn current<M: PackedText>(mapper: &M, tag: &M::Tag, packed_name: &str) -> (Option<i64>, Option<i64>) {
    mapper
        .read_text(tag, packed_name)
        .map(|text| {
            let (number, count) = split(&text);
            (parse_lenient(Some(number)), parse_lenient(count))
        })
        .unwrap_or_default()
}

/// Store a packed value, removing the native value if both halves are unset.
fn store<M: PackedText>(
    mapper: &M,
    tag: &mut M::Tag,
    packed_name: &str,
    number: Option<i64>,
    count: Option<i64>,
) {
    match pack(number, count) {
        Some(text) => mapper.write_text(tag, packed_name, text),
        None => {
            let _ = mapper.remove_values(tag, packed_name);
        }
    }
}

/// Read the number or the count of a pair.
pub(crate) fn read<M: PackedText>(
    mapper: &M,
    pair: PackedPair,
    tag_name: TagName,
    tag: &M::Tag,
    table: &MappingTable,
) -> crate::Result<Vec<TagValue>> {
    let kind = mapper.format_kind();
    let packed_name = table.preferred_native_name(pair.number, kind);
    for native_name in table.native_names_for(tag_name, kind) {
        let Some(text) = mapper.read_text(tag, native_name) else {
            continue;
        };
        let (number, count) = split(&text);
        let is_packed = packed_name.is_some_and(|name| name.eq_ignore_ascii_case(native_name));
        let component = if tag_name == pair.count && is_packed {
            count.unwrap_or_default()
        } else {
            number
        };
        if let Some(value) = parse_component(component, native_name)? {
            return Ok(vec![TagValue::Integer(value)]);
        }
    }
    Ok(Vec::new())
}

/// Write the number or the count of a pair. `None` unsets it.
///
/// A count with its own native field is written there and dropped from the packed value.
pub(crate) fn write<M: PackedText>(
    mapper: &M,
    pair: PackedPair,
    tag_name: TagName,
    value: Option<i64>,
    tag: &mut M::Tag,
    table: &MappingTable,
) {
    let kind = mapper.format_kind();
    let Some(packed_name) = table.preferred_native_name(pair.number, kind) else {
        return;
    };
    let (number, count) = current(mapper, tag, packed_name);
    if tag_name == pair.number {
        store(mapper, tag, packed_name, value, count);
        return;
    }

    let Some(count_name) = table.preferred_native_name(pair.count, kind) else {
        return;
    };
    if count_name.eq_ignore_ascii_case(packed_name) {
        store(mapper, tag, packed_name, number, value);
    } else {
        if count.is_some() {
            store(mapper, tag, packed_name, number, None);
        }
        match value {
            Some(value) => mapper.write_text(tag, count_name, value.to_string()),
            None => {
                let _ = mapper.remove_values(tag, count_name);
            }
        }
    }
}

/// Delete the number or the count of a pair from all of its native names.
pub(crate) fn delete<M: PackedText>(
    mapper: &M,
    pair: PackedPair,
    tag_name: TagName,
    tag: &mut M::Tag,
    table: &MappingTable,
) {
    let kind = mapper.format_kind();
    let packed_name = table.preferred_native_name(pair.number, kind);
    for native_name in table.native_names_for(tag_name, kind) {
        if packed_name.is_some_and(|name| name.eq_ignore_ascii_case(native_name)) {
            let (number, count) = current(mapper, tag, native_name);
            if tag_name == pair.number {
                store(mapper, tag, native_name, None, count);
            } else {
                store(mapper, tag, native_name, number, None);
            }
        } else {
            let _ = mapper.remove_values(tag, native_name);
        }
    }
}

/// The integer to write for a packed tag name. Packed tag names hold a single value.
pub(crate) fn integer_value(values: &[TagValue], native_name: &str) -> crate::Result<Option<i64>> {
    match values {
        [] => Ok(None),
        [value] => value
            .as_integer()
            .map(|number| Some(number).filter(|number| *number != 0))
            .ok_or_else(|| crate::ErrorType::encode(native_name, format!("{value} is not a number"))),
        _ => Err(crate::ErrorType::encode(
            native_name,
            format!("expected a single number, got {} values", values.len()),
        )),
    }
}
