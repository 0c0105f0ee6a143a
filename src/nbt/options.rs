// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reader/writer options, mirroring `NBTKit`'s `NBTOptions` bitfield
//! (`NBTLittleEndian`, `NBTCompressed`, `NBTUseZlib`).

/// Endianness and compression framing for a standalone NBT document.
///
/// `use_zlib` only has an effect when combined with `compressed`.
/// The region engine does not use this type: chunk
/// compression is always zlib and is handled directly by
/// `region::Region`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NbtOptions {
    /// Read/write multi-byte numbers little-endian instead of big-endian
    /// (used by Minecraft Pocket/Bedrock Edition).
    pub little_endian: bool,
    /// Wrap the document in gzip on write; tolerate gzip or zlib on read.
    pub compressed: bool,
    /// Combined with `compressed`, write zlib instead of gzip.
    pub use_zlib: bool,
}

impl NbtOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn little_endian(mut self, value: bool) -> Self {
        self.little_endian = value;
        self
    }

    pub fn compressed(mut self, value: bool) -> Self {
        self.compressed = value;
        self
    }

    pub fn use_zlib(mut self, value: bool) -> Self {
        self.use_zlib = value;
        self
    }
}
