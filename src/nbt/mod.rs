// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core NBT data structures, codec, and options.
//!
//! NBT is a tree-based binary format used by the Minecraft family of
//! games for player data, level data, and (compressed, inside a region
//! file) chunk data. This module provides the typed value tree
//! ([`NbtTag`]), the reader and writer that move it to and from a byte
//! stream, and the small set of options (endianness, compression) that
//! control both.

pub mod array;
pub mod error;
pub mod io;
pub mod options;
pub mod read;
pub mod tag;
pub mod write;

use std::io::{Read, Write};

pub use array::NbtArray;
pub use error::NbtError;
pub use options::NbtOptions;
pub use tag::{NbtList, NbtTag, TagType};

/// Decodes a complete NBT document from an in-memory byte slice.
pub fn decode(bytes: &[u8], options: NbtOptions) -> Result<(String, NbtTag), NbtError> {
    read::decode(bytes, options)
}

/// Decodes a complete NBT document from a stream, decompressing on the
/// fly rather than buffering the whole stream first.
pub fn decode_reader(r: &mut impl Read, options: NbtOptions) -> Result<(String, NbtTag), NbtError> {
    let mut wrapped = io::wrap_decompress_reader(r, options)?;
    read::read_root(&mut wrapped, options)
}

/// Encodes `root` (which must be a `Compound`) to a fresh byte buffer.
pub fn encode(name: &str, root: &NbtTag, options: NbtOptions) -> Result<Vec<u8>, NbtError> {
    write::encode(name, root, options)
}

/// Encodes `root` directly to a stream, returning the number of bytes
/// written to the (possibly compressed) underlying stream.
pub fn encode_writer(
    w: &mut impl Write,
    name: &str,
    root: &NbtTag,
    options: NbtOptions,
) -> Result<u64, NbtError> {
    write::write_root(w, name, root, options)
}

/// Returns `true` if `value` can be written as a well-formed NBT document
/// body.
pub fn is_valid(value: &NbtTag) -> bool {
    write::is_valid(value)
}

/// The wire type tag of a value.
pub fn type_of(value: &NbtTag) -> TagType {
    write::type_of(value)
}
