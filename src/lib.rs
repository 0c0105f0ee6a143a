// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

#![cfg_attr(docsrs, feature(doc_cfg))]

//! # anvil-nbt
//!
//! A Rust library for reading and writing Minecraft's NBT format and
//! Anvil (.mca) region files.
//!
//! Key features:
//! - A typed NBT value tree ([`nbt::NbtTag`]) that preserves each value's
//!   original numeric width and never collapses an empty list's element type
//! - A big/little-endian, gzip/zlib-aware codec ([`nbt::decode`]/[`nbt::encode`])
//!   with pre-flight tree validation before a single byte is written
//! - A mutable Anvil region file engine ([`region::Region`]) supporting
//!   chunk read, write, delete, and in-place defragmentation
//!
//! NBT strings are plain UTF-8, not Java's Modified UTF-8; see `DESIGN.md`
//! for why.

pub mod nbt;
pub mod region;
