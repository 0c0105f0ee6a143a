// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The NBT reader: a recursive decoder that turns a byte stream into an
//! [`NbtTag`] tree.

use std::io::Read;

use indexmap::IndexMap;

use crate::nbt::array::NbtArray;
use crate::nbt::error::NbtError;
use crate::nbt::io;
use crate::nbt::options::NbtOptions;
use crate::nbt::tag::{NbtList, NbtTag, TagType};

/// Reads a root named tag: a type byte, a name, and that type's payload.
///
/// If the root type byte is `0` (End), there is no document to decode and
/// the empty document `("", Compound {})` is returned rather than
/// attempting to read a name and payload that aren't there.
pub fn read_root(r: &mut impl Read, options: NbtOptions) -> Result<(String, NbtTag), NbtError> {
    let little_endian = options.little_endian;
    let type_id = io::read_u8(r)?;
    if type_id == 0 {
        return Ok((String::new(), NbtTag::compound()));
    }
    let tag_type = TagType::from_id(type_id)
        .ok_or_else(|| NbtError::Type(format!("unknown root tag type {type_id}")))?;
    let name = io::read_string(r, little_endian)?;
    let value = read_payload(r, tag_type, little_endian)?;
    Ok((name, value))
}

/// Decodes a complete, possibly-compressed document from `bytes`.
pub fn decode(bytes: &[u8], options: NbtOptions) -> Result<(String, NbtTag), NbtError> {
    let decompressed = io::decompress(bytes, options)?;
    let mut cursor = &decompressed[..];
    read_root(&mut cursor, options)
}

fn read_payload(
    r: &mut impl Read,
    tag_type: TagType,
    little_endian: bool,
) -> Result<NbtTag, NbtError> {
    Ok(match tag_type {
        TagType::End => {
            return Err(NbtError::Type(
                "End cannot occur as a value payload".to_string(),
            ));
        }
        TagType::Byte => NbtTag::Byte(io::read_i8(r)?),
        TagType::Short => NbtTag::Short(io::read_i16(r, little_endian)?),
        TagType::Int => NbtTag::Int(io::read_i32(r, little_endian)?),
        TagType::Long => NbtTag::Long(io::read_i64(r, little_endian)?),
        TagType::Float => NbtTag::Float(io::read_f32(r, little_endian)?),
        TagType::Double => NbtTag::Double(io::read_f64(r, little_endian)?),
        TagType::ByteArray => {
            let len = read_length(r, little_endian)?;
            let bytes = io::read_bytes(r, len)?;
            let values: Vec<i8> = bytes.into_iter().map(|b| b as i8).collect();
            NbtTag::ByteArray(NbtArray::from(values))
        }
        TagType::String => NbtTag::String(io::read_string(r, little_endian)?),
        TagType::List => {
            let element_id = io::read_u8(r)?;
            let element_type = TagType::from_id(element_id)
                .ok_or_else(|| NbtError::Type(format!("unknown list element type {element_id}")))?;
            let len = read_signed_length(r, little_endian)?;
            if len <= 0 {
                NbtTag::List(NbtList::empty(element_type))
            } else {
                let mut values = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    values.push(read_payload(r, element_type, little_endian)?);
                }
                NbtTag::List(
                    NbtList::new(values)
                        .unwrap_or_else(|| NbtList::empty(element_type)),
                )
            }
        }
        TagType::Compound => {
            let mut map = IndexMap::new();
            loop {
                let child_id = io::read_u8(r)?;
                if child_id == 0 {
                    break;
                }
                let child_type = TagType::from_id(child_id)
                    .ok_or_else(|| NbtError::Type(format!("unknown tag type {child_id}")))?;
                let name = io::read_string(r, little_endian)?;
                let value = read_payload(r, child_type, little_endian)?;
                // Duplicate keys: last occurrence wins.
                map.insert(name, value);
            }
            NbtTag::Compound(map)
        }
        TagType::IntArray => {
            let len = read_length(r, little_endian)?;
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(io::read_i32(r, little_endian)?);
            }
            NbtTag::IntArray(NbtArray::from(values))
        }
        TagType::LongArray => {
            let len = read_length(r, little_endian)?;
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(io::read_i64(r, little_endian)?);
            }
            NbtTag::LongArray(NbtArray::from(values))
        }
    })
}

/// Reads an i32 length prefix and rejects negative lengths.
fn read_length(r: &mut impl Read, little_endian: bool) -> Result<usize, NbtError> {
    let len = io::read_i32(r, little_endian)?;
    if len < 0 {
        return Err(NbtError::Type(format!("negative array length {len}")));
    }
    Ok(len as usize)
}

/// Like `read_length`, but a negative or zero list length is not an error:
/// it just means an empty list.
fn read_signed_length(r: &mut impl Read, little_endian: bool) -> Result<i32, NbtError> {
    io::read_i32(r, little_endian)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> NbtOptions {
        NbtOptions::new()
    }

    #[test]
    fn empty_compound_round_trip_bytes() {
        let bytes = [0x0A, 0x00, 0x00, 0x00];
        let (name, tag) = decode(&bytes, opts()).unwrap();
        assert_eq!(name, "");
        assert_eq!(tag, NbtTag::compound());
    }

    #[test]
    fn single_int_named_hello() {
        let bytes = [
            0x0A, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o', 0x03, 0x00, 0x01, b'x', 0x00, 0x00,
            0x00, 0x2A, 0x00,
        ];
        let (name, tag) = decode(&bytes, opts()).unwrap();
        assert_eq!(name, "hello");
        let compound = tag.as_compound().unwrap();
        assert_eq!(compound.get("x"), Some(&NbtTag::Int(42)));
    }

    #[test]
    fn root_end_byte_is_empty_document() {
        let bytes = [0x00];
        let (name, tag) = decode(&bytes, opts()).unwrap();
        assert_eq!(name, "");
        assert_eq!(tag, NbtTag::compound());
    }

    #[test]
    fn unknown_tag_type_is_a_type_error() {
        let bytes = [0xFF, 0x00, 0x00];
        let err = decode(&bytes, opts()).unwrap_err();
        assert!(matches!(err, NbtError::Type(_)));
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let mut input: Vec<u8> = vec![0x0A, 0x00, 0x00];
        // "a" = Byte(1)
        input.extend([0x01, 0x00, 0x01, b'a', 1]);
        // "a" = Byte(2)
        input.extend([0x01, 0x00, 0x01, b'a', 2]);
        input.push(0x00); // End
        let (_, tag) = decode(&input, opts()).unwrap();
        let compound = tag.as_compound().unwrap();
        assert_eq!(compound.get("a"), Some(&NbtTag::Byte(2)));
        assert_eq!(compound.len(), 1);
    }

    #[test]
    fn truncated_stream_is_a_read_error() {
        let bytes = [0x03, 0x00, 0x01, b'x'];
        let err = decode(&bytes, opts()).unwrap_err();
        assert!(matches!(err, NbtError::Read(_)));
    }
}
