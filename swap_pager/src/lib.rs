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

mod memory_manager;
mod page;
mod page_fault;
mod page_info;
mod page_table;
mod page_value;
mod page_value_mut_ref;
mod pager_config;
mod util;
mod virtual_address;

#[cfg(test)]
mod test;

pub mod modules;

pub use memory_manager::MemoryManager;
pub use page::PageId;
pub use page_fault::{PageFault, Result};
pub use page_info::{PageInfo, PagerStats};
pub use page_value::PageValue;
pub use page_value_mut_ref::PageValueMutRef;
pub use pager_config::{
    PagerConfig, DEFAULT_MAX_RESIDENT_PAGES, DEFAULT_MAX_TOTAL_PAGES, DEFAULT_PAGE_CAPACITY,
};
pub use virtual_address::{OwnerId, VirtualAddress};
