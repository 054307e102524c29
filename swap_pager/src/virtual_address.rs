/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use core::fmt;

/// Identifies the simulated process that pages and allocations belong to.
///
/// Owner ids are chosen by the caller, they are not tied to any thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnerId(u64);

impl OwnerId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A virtual address handed out by a [`MemoryManager`](crate::MemoryManager).
///
/// This is only a token: it is validated by the manager that created it on
/// every access and never refers to real memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualAddress(u64);

impl VirtualAddress {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the address `bytes` after this one, e.g. to reach the second
    /// element of an allocated array.
    pub fn offset(self, bytes: usize) -> Option<VirtualAddress> {
        let bytes = u64::try_from(bytes).ok()?;
        self.0.checked_add(bytes).map(VirtualAddress)
    }

    /// Distance in bytes from `base` to `self`
    ///
    /// **Note**: `base <= self` has to hold
    pub(crate) fn distance_from(self, base: VirtualAddress) -> usize {
        debug_assert!(base.0 <= self.0, "{} is located before {}", self, base);
        (self.0 - base.0) as usize
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}
