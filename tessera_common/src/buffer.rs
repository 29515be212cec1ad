// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-owned pixel memory.

use crate::colour::PixelWord;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};

/// A block of pixel memory owned by the caller.
///
/// Tiles only refer to a buffer; several tiles can describe windows of the same buffer. The
/// renderer borrows the bytes for the duration of one operation and never allocates or frees
/// pixel memory itself.
#[derive(Debug, Default)]
pub struct PixelBuffer {
    data: RefCell<Vec<u8>>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self::from_vec(vec![0; len])
    }

    /// Wrap existing bytes.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: RefCell::new(data),
        }
    }

    /// Create a buffer holding the given pixel words in native byte order.
    pub fn from_pixels<P: PixelWord>(pixels: &[P]) -> Self {
        Self::from_vec(bytemuck::cast_slice(pixels).to_vec())
    }

    /// The size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set every byte to `value`.
    pub fn fill(&self, value: u8) {
        self.data.borrow_mut().fill(value);
    }

    /// Borrow the bytes.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed mutably.
    pub fn bytes(&self) -> Ref<'_, [u8]> {
        Ref::map(self.data.borrow(), Vec::as_slice)
    }

    /// Borrow the bytes mutably.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is currently borrowed.
    pub fn bytes_mut(&self) -> RefMut<'_, [u8]> {
        RefMut::map(self.data.borrow_mut(), Vec::as_mut_slice)
    }

    /// Borrow the bytes, failing if they are borrowed mutably.
    pub fn try_bytes(&self) -> Result<Ref<'_, [u8]>, BorrowError> {
        self.data
            .try_borrow()
            .map(|data| Ref::map(data, Vec::as_slice))
    }

    /// Borrow the bytes mutably, failing if they are borrowed.
    pub fn try_bytes_mut(&self) -> Result<RefMut<'_, [u8]>, BorrowMutError> {
        self.data
            .try_borrow_mut()
            .map(|data| RefMut::map(data, Vec::as_mut_slice))
    }

    /// Copy the buffer out as pixel words, reading `len / size_of::<P>()` words.
    pub fn to_pixels<P: PixelWord>(&self) -> Vec<P> {
        self.bytes().chunks_exact(P::BYTES).map(P::read).collect()
    }

    /// Consume the buffer and return its bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_inner()
    }
}
