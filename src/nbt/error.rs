// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Errors produced by the NBT codec.

use std::io;

/// Errors from decoding or encoding an NBT document.
///
/// Four kinds: `InvalidArg` (bad options or a tree that fails pre-flight
/// validation), `Read` and `Write` (I/O failure or truncation), and
/// `Type` (an unknown wire tag code, or a `List` element that disagrees
/// with its declared type).
#[derive(Debug, thiserror::Error)]
pub enum NbtError {
    #[error("invalid argument: {0}")]
    InvalidArg(String),
    #[error("read error: {0}")]
    Read(#[source] io::Error),
    #[error("write error: {0}")]
    Write(#[source] io::Error),
    #[error("type error: {0}")]
    Type(String),
}

impl NbtError {
    pub(crate) fn read(err: io::Error) -> Self {
        NbtError::Read(err)
    }

    pub(crate) fn write(err: io::Error) -> Self {
        NbtError::Write(err)
    }
}
