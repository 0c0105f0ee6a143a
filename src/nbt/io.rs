// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Endian-aware primitive I/O and compression framing, kept thin: the
//! NBT reader/writer never know whether the underlying stream is
//! compressed, and endianness is a single runtime flag rather than a
//! type parameter threaded through every call site.

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::nbt::error::NbtError;
use crate::nbt::options::NbtOptions;

pub fn read_i8(r: &mut impl Read) -> Result<i8, NbtError> {
    r.read_i8().map_err(NbtError::read)
}

pub fn read_u8(r: &mut impl Read) -> Result<u8, NbtError> {
    r.read_u8().map_err(NbtError::read)
}

pub fn read_i16(r: &mut impl Read, little_endian: bool) -> Result<i16, NbtError> {
    if little_endian {
        r.read_i16::<LittleEndian>()
    } else {
        r.read_i16::<BigEndian>()
    }
    .map_err(NbtError::read)
}

pub fn read_u16(r: &mut impl Read, little_endian: bool) -> Result<u16, NbtError> {
    if little_endian {
        r.read_u16::<LittleEndian>()
    } else {
        r.read_u16::<BigEndian>()
    }
    .map_err(NbtError::read)
}

pub fn read_i32(r: &mut impl Read, little_endian: bool) -> Result<i32, NbtError> {
    if little_endian {
        r.read_i32::<LittleEndian>()
    } else {
        r.read_i32::<BigEndian>()
    }
    .map_err(NbtError::read)
}

pub fn read_i64(r: &mut impl Read, little_endian: bool) -> Result<i64, NbtError> {
    if little_endian {
        r.read_i64::<LittleEndian>()
    } else {
        r.read_i64::<BigEndian>()
    }
    .map_err(NbtError::read)
}

pub fn read_f32(r: &mut impl Read, little_endian: bool) -> Result<f32, NbtError> {
    if little_endian {
        r.read_f32::<LittleEndian>()
    } else {
        r.read_f32::<BigEndian>()
    }
    .map_err(NbtError::read)
}

pub fn read_f64(r: &mut impl Read, little_endian: bool) -> Result<f64, NbtError> {
    if little_endian {
        r.read_f64::<LittleEndian>()
    } else {
        r.read_f64::<BigEndian>()
    }
    .map_err(NbtError::read)
}

pub fn read_bytes(r: &mut impl Read, len: usize) -> Result<Vec<u8>, NbtError> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(NbtError::read)?;
    Ok(buf)
}

/// Reads a u16-length-prefixed, plain-UTF-8 string (not Java's Modified
/// UTF-8).
pub fn read_string(r: &mut impl Read, little_endian: bool) -> Result<String, NbtError> {
    let len = read_u16(r, little_endian)? as usize;
    let bytes = read_bytes(r, len)?;
    String::from_utf8(bytes).map_err(|e| NbtError::Type(format!("invalid UTF-8 string: {e}")))
}

pub fn write_i8(w: &mut impl Write, value: i8) -> Result<(), NbtError> {
    w.write_i8(value).map_err(NbtError::write)
}

pub fn write_u8(w: &mut impl Write, value: u8) -> Result<(), NbtError> {
    w.write_u8(value).map_err(NbtError::write)
}

pub fn write_i16(w: &mut impl Write, value: i16, little_endian: bool) -> Result<(), NbtError> {
    if little_endian {
        w.write_i16::<LittleEndian>(value)
    } else {
        w.write_i16::<BigEndian>(value)
    }
    .map_err(NbtError::write)
}

pub fn write_u16(w: &mut impl Write, value: u16, little_endian: bool) -> Result<(), NbtError> {
    if little_endian {
        w.write_u16::<LittleEndian>(value)
    } else {
        w.write_u16::<BigEndian>(value)
    }
    .map_err(NbtError::write)
}

pub fn write_i32(w: &mut impl Write, value: i32, little_endian: bool) -> Result<(), NbtError> {
    if little_endian {
        w.write_i32::<LittleEndian>(value)
    } else {
        w.write_i32::<BigEndian>(value)
    }
    .map_err(NbtError::write)
}

pub fn write_i64(w: &mut impl Write, value: i64, little_endian: bool) -> Result<(), NbtError> {
    if little_endian {
        w.write_i64::<LittleEndian>(value)
    } else {
        w.write_i64::<BigEndian>(value)
    }
    .map_err(NbtError::write)
}

pub fn write_f32(w: &mut impl Write, value: f32, little_endian: bool) -> Result<(), NbtError> {
    if little_endian {
        w.write_f32::<LittleEndian>(value)
    } else {
        w.write_f32::<BigEndian>(value)
    }
    .map_err(NbtError::write)
}

pub fn write_f64(w: &mut impl Write, value: f64, little_endian: bool) -> Result<(), NbtError> {
    if little_endian {
        w.write_f64::<LittleEndian>(value)
    } else {
        w.write_f64::<BigEndian>(value)
    }
    .map_err(NbtError::write)
}

pub fn write_bytes(w: &mut impl Write, bytes: &[u8]) -> Result<(), NbtError> {
    w.write_all(bytes).map_err(NbtError::write)
}

pub fn write_string(w: &mut impl Write, s: &str, little_endian: bool) -> Result<(), NbtError> {
    let bytes = s.as_bytes();
    if bytes.len() > u16::MAX as usize {
        return Err(NbtError::InvalidArg(format!(
            "string of {} bytes exceeds the 65535-byte NBT limit",
            bytes.len()
        )));
    }
    write_u16(w, bytes.len() as u16, little_endian)?;
    write_bytes(w, bytes)
}

/// Wraps `data` in the compression framing requested by `options`, reading
/// it fully to completion. Per the options' own documentation, `compressed`
/// alone yields gzip; `compressed` combined with `use_zlib` yields zlib.
pub fn compress(data: &[u8], options: NbtOptions) -> Result<Vec<u8>, NbtError> {
    if !options.compressed {
        return Ok(data.to_vec());
    }
    if options.use_zlib {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).map_err(NbtError::write)?;
        encoder.finish().map_err(NbtError::write)
    } else {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).map_err(NbtError::write)?;
        encoder.finish().map_err(NbtError::write)
    }
}

/// Decompresses `data` per `options`. When `options.compressed` is set, the
/// framing is auto-detected by sniffing the gzip magic (`1F 8B`), so a
/// reader tolerates either gzip or zlib input regardless of `use_zlib`.
pub fn decompress(data: &[u8], options: NbtOptions) -> Result<Vec<u8>, NbtError> {
    if !options.compressed {
        return Ok(data.to_vec());
    }
    let mut out = Vec::new();
    if data.starts_with(&[0x1F, 0x8B]) {
        GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(NbtError::read)?;
    } else {
        ZlibDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(NbtError::read)?;
    }
    Ok(out)
}

/// Wraps `r` in the decompression framing requested by `options` as a
/// streaming decorator: the reader decompresses as it is pulled from
/// rather than requiring the whole stream be buffered up front. Framing
/// is auto-detected the same way `decompress` does, by sniffing the
/// first two bytes for the gzip magic (`1F 8B`); those bytes are spliced
/// back onto the front of the stream before decoding.
pub fn wrap_decompress_reader<'a, R: Read + 'a>(
    mut r: R,
    options: NbtOptions,
) -> Result<Box<dyn Read + 'a>, NbtError> {
    if !options.compressed {
        return Ok(Box::new(r));
    }
    let mut magic = [0u8; 2];
    r.read_exact(&mut magic).map_err(NbtError::read)?;
    let prefixed = Cursor::new(magic).chain(r);
    if magic == [0x1F, 0x8B] {
        Ok(Box::new(GzDecoder::new(prefixed)))
    } else {
        Ok(Box::new(ZlibDecoder::new(prefixed)))
    }
}

/// Wraps `w` in the compression framing requested by `options` as a
/// streaming decorator: bytes handed to the returned writer are
/// compressed incrementally and forwarded to `w`, rather than
/// accumulated into one block before compressing. Mirrors `compress`'s
/// choice of gzip vs. zlib. The wrapped encoder must be dropped (or
/// explicitly finished) for the final compressed bytes to reach `w`.
pub fn wrap_compress_writer<'a, W: Write + 'a>(w: W, options: NbtOptions) -> Box<dyn Write + 'a> {
    if !options.compressed {
        return Box::new(w);
    }
    if options.use_zlib {
        Box::new(ZlibEncoder::new(w, Compression::default()))
    } else {
        Box::new(GzEncoder::new(w, Compression::default()))
    }
}
