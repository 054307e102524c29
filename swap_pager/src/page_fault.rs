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

use std::io;

use thiserror::Error;

use crate::virtual_address::VirtualAddress;

/// Every way an operation of the [`MemoryManager`](crate::MemoryManager) can fail.
///
/// A failed operation never leaves a half-updated page table behind.
#[derive(Debug, Error)]
pub enum PageFault {
    /// Fault-in was attempted but the swap store holds no bytes for this page
    #[error("page {name} cannot be found in the swap store")]
    StoreMiss { name: String },

    /// Address is not covered by any page or lies outside of the allocated bytes
    #[error("access violation at address {address}")]
    AccessViolation { address: VirtualAddress },

    /// A new page is required but the total page limit is reached
    #[error("cannot create a new page: limit of {max_total_pages} pages reached")]
    CapacityExceeded { max_total_pages: usize },

    /// The resident budget is full and no page can be swapped out
    #[error("resident budget of {max_resident_pages} pages is full and no page can be evicted")]
    EvictionImpossible { max_resident_pages: usize },

    #[error("invalid allocation size of {size} bytes (page capacity is {capacity} bytes)")]
    InvalidSize { size: usize, capacity: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The swap store failed for another reason than a missing page
    #[error("swap store failed for page {name}")]
    StoreIo {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Another caller panicked while it was holding the manager lock
    #[error("memory manager lock is poisoned")]
    LockPoisoned,
}

impl PageFault {
    pub(crate) fn store_io(name: &str, source: io::Error) -> Self {
        PageFault::StoreIo {
            name: name.to_string(),
            source,
        }
    }

    pub(crate) fn store_miss(name: &str) -> Self {
        PageFault::StoreMiss {
            name: name.to_string(),
        }
    }
}

pub type Result<T> = core::result::Result<T, PageFault>;
