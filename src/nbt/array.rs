// Copyright 2026 driedpampas@proton.me
// SPDX-License-Identifier: GPL-3.0-or-later

//! Generic primitive-array leaf ([`NbtArray`]) backing `ByteArray`,
//! `IntArray`, and `LongArray`.
//!
//! The original Objective-C library (`NBTKit`, see `NBTIntArray.h` and
//! `NBTLongArray.h`) gives `Int`/`LongArray` a small in-place mutation API
//! — construct from a buffer, a zero count, or a reserved capacity; append
//! a value, a buffer, or another array; read by index; replace or reset a
//! range — but never extends it to `ByteArray`. This type generalizes
//! that API uniformly to all three primitive-array kinds.

use std::ops::Range;

/// A growable, fixed-element-width array used for `ByteArray`, `IntArray`,
/// and `LongArray` payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct NbtArray<T> {
    values: Vec<T>,
}

impl<T: Copy + Default> NbtArray<T> {
    /// Builds an array by copying `values`.
    pub fn from_values(values: &[T]) -> Self {
        NbtArray {
            values: values.to_vec(),
        }
    }

    /// An array of `count` zeroed values.
    pub fn with_count(count: usize) -> Self {
        NbtArray {
            values: vec![T::default(); count],
        }
    }

    /// An empty array that has pre-allocated room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        NbtArray {
            values: Vec::with_capacity(capacity),
        }
    }

    /// The number of elements currently stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at `index`, or `None` if it is out of range.
    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied()
    }

    /// Borrows the full contents as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// A raw pointer to the array's storage.
    ///
    /// As with `NBTIntArray.values`/`NBTLongArray.values` in the original
    /// library, any append or replace that reallocates the backing buffer
    /// invalidates pointers previously returned here.
    pub fn as_ptr(&self) -> *const T {
        self.values.as_ptr()
    }

    /// A mutable raw pointer to the array's storage; see [`Self::as_ptr`]
    /// for the reallocation caveat.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.values.as_mut_ptr()
    }

    /// Appends a single value.
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    /// Appends every value in `values`.
    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.values.extend_from_slice(values);
    }

    /// Appends the contents of another array of the same element type.
    pub fn extend(&mut self, other: &NbtArray<T>) {
        self.values.extend_from_slice(&other.values);
    }

    /// Replaces `range` with `values`, shifting any trailing elements.
    ///
    /// A zero-length `values` deletes the range; a `values` longer than
    /// `range` inserts the extra elements. Panics if `range` is out of
    /// bounds, matching `Vec::splice`.
    pub fn replace_range(&mut self, range: Range<usize>, values: &[T]) {
        self.values.splice(range, values.iter().copied());
    }

    /// Overwrites every element in `range` with the zero value, without
    /// changing the array's length.
    pub fn reset_range(&mut self, range: Range<usize>) {
        for slot in &mut self.values[range] {
            *slot = T::default();
        }
    }

    /// Consumes the array, returning its contents as a plain `Vec<T>`.
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T> From<Vec<T>> for NbtArray<T> {
    fn from(values: Vec<T>) -> Self {
        NbtArray { values }
    }
}

impl<T> From<NbtArray<T>> for Vec<T> {
    fn from(array: NbtArray<T>) -> Self {
        array.values
    }
}
