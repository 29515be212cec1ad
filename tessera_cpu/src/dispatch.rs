// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing of sub-tasks to software kernels or accelerators.
//!
//! Every pair of [`OpKind`] and [`ColourDepth`] has exactly one binding in a [`DispatchTable`].
//! The default table binds the software kernels. A platform with an accelerator registers it
//! for the slots it supports while building the table:
//!
//! ```
//! # use std::sync::Arc;
//! # use tessera_cpu::dispatch::{Accelerator, AcceleratorError, DispatchTable, LowLevelIo, OpKind, Ticket};
//! # use tessera_cpu::kernel::SubTask;
//! # use tessera_cpu::ColourDepth;
//! #[derive(Debug)]
//! struct Dma2d;
//!
//! impl Accelerator for Dma2d {
//!     fn submit(&self, _task: &mut SubTask<'_>) -> Result<Ticket, AcceleratorError> {
//!         // Program the hardware here.
//!         Err(AcceleratorError::Rejected)
//!     }
//!
//!     fn poll(&self, _ticket: Ticket) -> Result<bool, AcceleratorError> {
//!         Ok(true)
//!     }
//! }
//!
//! let table = DispatchTable::builder()
//!     .override_kernel(
//!         OpKind::FillColour,
//!         ColourDepth::Bits16,
//!         LowLevelIo::Accelerated(Arc::new(Dma2d)),
//!     )
//!     .build();
//! # assert!(matches!(table.get(OpKind::FillColour, ColourDepth::Bits16), LowLevelIo::Accelerated(_)));
//! ```
//!
//! The table cannot be changed once built, so it can be shared freely.

use crate::kernel::{self, KernelFn, SubTask};
use alloc::sync::Arc;
use core::fmt::{self, Debug, Formatter};
use static_assertions::assert_impl_all;
use tessera_common::colour::ColourDepth;
use tessera_common::mask::MaskAllow;
use thiserror::Error;

/// The kinds of operation the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Fill a region with a colour.
    FillColour = 0,
    /// Fill a region with a colour, weighted by a mask.
    FillColourWithMask = 1,
    /// Copy a mask into one channel of a region.
    FillChannelWithMask = 2,
}

impl OpKind {
    /// The number of operation kinds.
    pub const COUNT: usize = 3;

    /// All operation kinds, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::FillColour,
        Self::FillColourWithMask,
        Self::FillChannelWithMask,
    ];

    /// A dense index, suitable for table lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The static description of this kind.
    pub fn descriptor(self) -> &'static OpDescriptor {
        match self {
            Self::FillColour => &FILL_COLOUR,
            Self::FillColourWithMask => &FILL_COLOUR_WITH_MASK,
            Self::FillChannelWithMask => &FILL_CHANNEL_WITH_MASK,
        }
    }
}

/// The static description of an operation kind.
pub struct OpDescriptor {
    /// The kind described.
    pub kind: OpKind,
    /// Whether the operation reads a mask.
    pub has_source: bool,
    /// Whether the operation writes a target.
    pub has_target: bool,
    /// The mask layouts the operation accepts.
    pub mask_allow: MaskAllow,
    /// The software kernels, indexed by [`ColourDepth::index`].
    pub software: [KernelFn; ColourDepth::COUNT],
}

impl Debug for OpDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpDescriptor")
            .field("kind", &self.kind)
            .field("has_source", &self.has_source)
            .field("has_target", &self.has_target)
            .field("mask_allow", &self.mask_allow)
            .finish_non_exhaustive()
    }
}

/// Description of [`OpKind::FillColour`].
pub static FILL_COLOUR: OpDescriptor = OpDescriptor {
    kind: OpKind::FillColour,
    has_source: false,
    has_target: true,
    mask_allow: MaskAllow::NONE,
    software: [
        kernel::fill_colour::<u8>,
        kernel::fill_colour::<u16>,
        kernel::fill_colour::<u32>,
    ],
};

/// Description of [`OpKind::FillColourWithMask`].
pub static FILL_COLOUR_WITH_MASK: OpDescriptor = OpDescriptor {
    kind: OpKind::FillColourWithMask,
    has_source: true,
    has_target: true,
    mask_allow: MaskAllow::A8_AND_8IN32,
    software: [
        kernel::fill_colour_with_mask::<u8>,
        kernel::fill_colour_with_mask::<u16>,
        kernel::fill_colour_with_mask::<u32>,
    ],
};

/// Description of [`OpKind::FillChannelWithMask`].
pub static FILL_CHANNEL_WITH_MASK: OpDescriptor = OpDescriptor {
    kind: OpKind::FillChannelWithMask,
    has_source: true,
    has_target: true,
    mask_allow: MaskAllow::A8_AND_8IN32,
    software: [
        kernel::fill_channel::<u8>,
        kernel::fill_channel::<u16>,
        kernel::fill_channel::<u32>,
    ],
};

/// Identifies work submitted to an [`Accelerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(pub u64);

/// Errors an [`Accelerator`] can report.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AcceleratorError {
    /// The accelerator cannot take more work right now.
    #[error("Accelerator queue is full")]
    Busy,
    /// The accelerator cannot process this sub-task; it is run by the software kernel instead.
    #[error("Accelerator cannot process this sub-task")]
    Rejected,
    /// The accelerator failed.
    #[error("Accelerator fault")]
    Fault,
}

/// A hardware backend for one or more dispatch slots.
///
/// The sub-task only borrows the pixel buffers for the duration of [`submit`](Self::submit):
/// an accelerator must be done with them, or hold its own copy, when it returns.
pub trait Accelerator: Debug + Send + Sync {
    /// Start processing a sub-task.
    fn submit(&self, task: &mut SubTask<'_>) -> Result<Ticket, AcceleratorError>;

    /// Whether the work identified by `ticket` has finished.
    fn poll(&self, ticket: Ticket) -> Result<bool, AcceleratorError>;
}

/// The binding of one dispatch slot.
#[derive(Debug, Clone)]
pub enum LowLevelIo {
    /// A software kernel, run inline.
    Software(KernelFn),
    /// An accelerator, possibly completing asynchronously.
    Accelerated(Arc<dyn Accelerator>),
}

const SLOTS: usize = OpKind::COUNT * ColourDepth::COUNT;

#[inline]
const fn slot(kind: OpKind, depth: ColourDepth) -> usize {
    kind.index() * ColourDepth::COUNT + depth.index()
}

/// The bindings of every operation kind and colour depth.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    slots: [LowLevelIo; SLOTS],
}

assert_impl_all!(DispatchTable: Send, Sync);

impl Default for DispatchTable {
    fn default() -> Self {
        Self {
            slots: core::array::from_fn(|i| {
                let kind = OpKind::ALL[i / ColourDepth::COUNT];
                LowLevelIo::Software(kind.descriptor().software[i % ColourDepth::COUNT])
            }),
        }
    }
}

impl DispatchTable {
    /// Start from the software bindings.
    pub fn builder() -> DispatchTableBuilder {
        DispatchTableBuilder {
            table: Self::default(),
        }
    }

    /// The binding for an operation kind and colour depth.
    #[inline]
    pub fn get(&self, kind: OpKind, depth: ColourDepth) -> &LowLevelIo {
        &self.slots[slot(kind, depth)]
    }

    /// The software kernel for an operation kind and colour depth.
    #[inline]
    pub fn software(kind: OpKind, depth: ColourDepth) -> KernelFn {
        kind.descriptor().software[depth.index()]
    }
}

/// Builds a [`DispatchTable`] with overridden bindings.
#[derive(Debug)]
pub struct DispatchTableBuilder {
    table: DispatchTable,
}

impl DispatchTableBuilder {
    /// Replace the binding of one slot. The last override of a slot wins.
    pub fn override_kernel(mut self, kind: OpKind, depth: ColourDepth, io: LowLevelIo) -> Self {
        log::debug!("binding {kind:?} at {depth:?} to {io:?}");
        self.table.slots[slot(kind, depth)] = io;
        self
    }

    /// Freeze the table.
    pub fn build(self) -> DispatchTable {
        self.table
    }
}
