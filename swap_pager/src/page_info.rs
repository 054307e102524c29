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

use crate::{
    page::PageId,
    virtual_address::{OwnerId, VirtualAddress},
};

/// Snapshot of a single page, see [`MemoryManager::list_pages`](crate::MemoryManager::list_pages)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageInfo {
    pub id: PageId,
    pub owner: OwnerId,
    pub resident: bool,

    /// Bytes that were never handed out
    pub free_bytes: usize,

    /// Bytes that were freed again and can be reused
    pub reclaimed_bytes: usize,

    pub base_address: VirtualAddress,
    pub cursor_address: VirtualAddress,
    pub swap_name: String,
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page: {{ loaded: {:>3} | space left = {:>4}b | reclaimed = {:>4}b | virtual address = {} | cursor = {} | owner = {:>5} }}",
            if self.resident { "Yes" } else { "no" },
            self.free_bytes,
            self.reclaimed_bytes,
            self.base_address,
            self.cursor_address,
            self.owner
        )
    }
}

/// Counters of a [`MemoryManager`](crate::MemoryManager)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PagerStats {
    pub resident_pages: usize,
    pub total_pages: usize,

    /// How many times a page was written to the swap store
    pub evictions: u64,

    /// How many times a page was restored from the swap store
    pub fault_ins: u64,
}
