// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains functions to serialize JSON arrays.
//!
//! The main objective is to serialize entries from an iterator into a JSON
//! array, without collecting them into memory first.
//!
//! The format these methods produce is a JSON array of objects.
//! It's *not* JSON lines format, which is a sequence of JSON objects
//! separated by newlines.

use serde::Serializer;
use serde::ser::{Serialize, SerializeSeq};
use std::io;

/// Serialize entries from an iterator into a JSON array.
///
/// The iterator must yield `Result<T, E>` where `T` is the type to be serialized
/// and `E` is the error type. If an error occurs during serialization,
/// the function will return that error.
pub fn serialize_result_seq<W, T, E>(writer: W, entries: impl Iterator<Item = Result<T, E>>) -> Result<(), E>
where
    W: io::Write,
    T: Serialize,
    E: std::error::Error + From<serde_json::Error>,
{
    let mut ser = serde_json::Serializer::pretty(writer);
    let mut seq = ser.serialize_seq(None)?;
    for entry in entries {
        match entry {
            Ok(object) => seq.serialize_element(&object)?,
            Err(err) => return Err(err),
        }
    }
    seq.end()?;

    Ok(())
}
