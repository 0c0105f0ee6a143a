// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! The NBT writer: validates an [`NbtTag`] tree, then recursively encodes
//! it to a byte stream.

use std::cell::Cell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::nbt::error::NbtError;
use crate::nbt::io as nbtio;
use crate::nbt::options::NbtOptions;
use crate::nbt::tag::{NbtList, NbtTag, TagType};

/// Forwards every write to `inner` while tallying the bytes that actually
/// land there, so a caller on the other side of a boxed, possibly
/// compressing writer can still learn the final byte count.
struct CountingWriter<W> {
    inner: W,
    count: Rc<Cell<u64>>,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count.set(self.count.get() + n as u64);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Returns `true` if `root` is a well-formed document body: a `Compound`
/// whose every nested `List` agrees on element type and whose every
/// `String`/key fits the NBT wire limits.
pub fn is_valid(root: &NbtTag) -> bool {
    matches!(root, NbtTag::Compound(_)) && validate(root).is_ok()
}

/// The wire type tag of a value.
pub fn type_of(tag: &NbtTag) -> TagType {
    tag.tag_type()
}

fn validate(tag: &NbtTag) -> Result<(), NbtError> {
    match tag {
        NbtTag::String(s) => {
            if s.len() > u16::MAX as usize {
                return Err(NbtError::InvalidArg(format!(
                    "string of {} bytes exceeds the 65535-byte NBT limit",
                    s.len()
                )));
            }
        }
        NbtTag::List(list) => validate_list(list)?,
        NbtTag::Compound(map) => {
            for (key, value) in map {
                if key.len() > u16::MAX as usize {
                    return Err(NbtError::InvalidArg(format!(
                        "compound key {key:?} exceeds the 65535-byte NBT limit"
                    )));
                }
                validate(value)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_list(list: &NbtList) -> Result<(), NbtError> {
    for value in list.values() {
        if value.tag_type() != list.element_type() {
            return Err(NbtError::InvalidArg(format!(
                "list declared as {:?} contains a {:?} element",
                list.element_type(),
                value.tag_type()
            )));
        }
        validate(value)?;
    }
    Ok(())
}

/// Writes a root named tag: type byte, name, payload.
///
/// Pre-flight validates the whole tree and requires `root` to be a
/// `Compound` before writing a single byte. The payload is streamed
/// straight through `options`' compression framing rather than built up
/// as one block first; `w` only ever sees the bytes as they're produced.
pub fn write_root(
    w: &mut impl Write,
    name: &str,
    root: &NbtTag,
    options: NbtOptions,
) -> Result<u64, NbtError> {
    if !matches!(root, NbtTag::Compound(_)) {
        return Err(NbtError::InvalidArg(
            "root tag must be a Compound".to_string(),
        ));
    }
    validate(root)?;

    let little_endian = options.little_endian;
    let count = Rc::new(Cell::new(0u64));
    let counting = CountingWriter {
        inner: w,
        count: count.clone(),
    };
    let mut sink = nbtio::wrap_compress_writer(counting, options);

    nbtio::write_u8(&mut sink, root.tag_type().id())?;
    nbtio::write_string(&mut sink, name, little_endian)?;
    write_payload(&mut sink, root, little_endian)?;
    sink.flush().map_err(NbtError::write)?;
    drop(sink);

    Ok(count.get())
}

/// Encodes a complete, possibly-compressed document to a `Vec<u8>`.
pub fn encode(name: &str, root: &NbtTag, options: NbtOptions) -> Result<Vec<u8>, NbtError> {
    let mut buf = Vec::new();
    write_root(&mut buf, name, root, options)?;
    Ok(buf)
}

fn write_payload(w: &mut impl Write, tag: &NbtTag, little_endian: bool) -> Result<(), NbtError> {
    match tag {
        NbtTag::Byte(v) => nbtio::write_i8(w, *v),
        NbtTag::Short(v) => nbtio::write_i16(w, *v, little_endian),
        NbtTag::Int(v) => nbtio::write_i32(w, *v, little_endian),
        NbtTag::Long(v) => nbtio::write_i64(w, *v, little_endian),
        NbtTag::Float(v) => nbtio::write_f32(w, *v, little_endian),
        NbtTag::Double(v) => nbtio::write_f64(w, *v, little_endian),
        NbtTag::ByteArray(arr) => {
            let len: i32 = arr
                .len()
                .try_into()
                .map_err(|_| NbtError::InvalidArg("ByteArray too long".to_string()))?;
            nbtio::write_i32(w, len, little_endian)?;
            let bytes: Vec<u8> = arr.as_slice().iter().map(|&b| b as u8).collect();
            nbtio::write_bytes(w, &bytes)
        }
        NbtTag::String(s) => nbtio::write_string(w, s, little_endian),
        NbtTag::List(list) => {
            nbtio::write_u8(w, list.element_type().id())?;
            let len: i32 = list
                .len()
                .try_into()
                .map_err(|_| NbtError::InvalidArg("List too long".to_string()))?;
            nbtio::write_i32(w, len, little_endian)?;
            for value in list.values() {
                write_payload(w, value, little_endian)?;
            }
            Ok(())
        }
        NbtTag::Compound(map) => {
            for (key, value) in map {
                nbtio::write_u8(w, value.tag_type().id())?;
                nbtio::write_string(w, key, little_endian)?;
                write_payload(w, value, little_endian)?;
            }
            nbtio::write_u8(w, TagType::End.id())
        }
        NbtTag::IntArray(arr) => {
            let len: i32 = arr
                .len()
                .try_into()
                .map_err(|_| NbtError::InvalidArg("IntArray too long".to_string()))?;
            nbtio::write_i32(w, len, little_endian)?;
            for &v in arr.as_slice() {
                nbtio::write_i32(w, v, little_endian)?;
            }
            Ok(())
        }
        NbtTag::LongArray(arr) => {
            let len: i32 = arr
                .len()
                .try_into()
                .map_err(|_| NbtError::InvalidArg("LongArray too long".to_string()))?;
            nbtio::write_i32(w, len, little_endian)?;
            for &v in arr.as_slice() {
                nbtio::write_i64(w, v, little_endian)?;
            }
            Ok(())
        }
    }
}
