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

use crate::{
    modules::eviction::EvictionCandidate,
    page::{Page, PageId},
    pager_config::PagerConfig,
    virtual_address::{OwnerId, VirtualAddress},
};

/// Virtual address of the first page of every manager
pub(crate) const FIRST_PAGE_ADDRESS: u64 = 0x1000;

/// All pages of all owners in creation order
pub(crate) struct PageTable {
    pages: Vec<Page>,

    /// How many pages are currently resident?
    resident_count: usize,

    /// Sequence number of the next page
    next_page_id: u64,

    /// Base address of the next page, addresses are never reused
    next_base_address: u64,
}

impl PageTable {
    pub(crate) fn new() -> Self {
        Self {
            pages: Vec::new(),
            resident_count: 0,
            next_page_id: 0,
            next_base_address: FIRST_PAGE_ADDRESS,
        }
    }

    #[inline]
    pub(crate) fn resident_count(&self) -> usize {
        self.resident_count
    }

    #[inline]
    pub(crate) fn total_count(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> &Page {
        &self.pages[index]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Page {
        &mut self.pages[index]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// First resident page of `owner` that can fit `size` bytes
    pub(crate) fn find_resident_with_room(&self, owner: OwnerId, size: usize) -> Option<usize> {
        self.pages
            .iter()
            .position(|page| page.owner() == owner && page.is_resident() && page.has_room(size))
    }

    /// First swapped page of `owner` that can fit `size` bytes
    pub(crate) fn find_swapped_with_room(&self, owner: OwnerId, size: usize) -> Option<usize> {
        self.pages.iter().position(|page| {
            page.owner() == owner && !page.is_resident() && page.has_spare_room(size)
        })
    }

    /// Page whose address range contains `address`
    pub(crate) fn find_by_address(&self, address: VirtualAddress) -> Option<usize> {
        // base addresses are increasing in page order
        let index = self
            .pages
            .partition_point(|page| page.base_address() <= address);
        if index == 0 {
            return None;
        }

        let index = index - 1;
        self.pages[index].contains(address).then_some(index)
    }

    /// Indices of all resident pages of `owner`
    pub(crate) fn resident_pages_of(&self, owner: OwnerId) -> Vec<usize> {
        (0..self.pages.len())
            .filter(|&i| self.pages[i].owner() == owner && self.pages[i].is_resident())
            .collect()
    }

    /// All resident pages except `protected`
    pub(crate) fn eviction_candidates(&self, protected: Option<PageId>) -> Vec<EvictionCandidate> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.is_resident() && Some(page.id()) != protected)
            .map(|(index, page)| EvictionCandidate {
                index,
                id: page.id(),
                owner: page.owner(),
            })
            .collect()
    }

    /// Registers a new resident page for `owner` and returns its index
    pub(crate) fn create_page(&mut self, owner: OwnerId, capacity: usize) -> usize {
        let id = PageId(self.next_page_id);
        self.next_page_id += 1;

        let base_address = VirtualAddress::from_raw(self.next_base_address);
        self.next_base_address += capacity as u64;

        let swap_name = format!("owner{}-page{}", owner.get(), id.get());
        self.pages
            .push(Page::new(id, owner, base_address, capacity, swap_name));
        self.resident_count += 1;

        self.pages.len() - 1
    }

    /// Takes the buffer of a resident page, the page is swapped afterwards
    pub(crate) fn mark_swapped(&mut self, index: usize) -> Option<Box<[u8]>> {
        let buffer = self.pages[index].take_buffer()?;
        self.resident_count -= 1;
        Some(buffer)
    }

    /// Installs a restored buffer, the page is resident afterwards
    pub(crate) fn mark_resident(&mut self, index: usize, buffer: Box<[u8]>) {
        self.pages[index].install_buffer(buffer);
        self.resident_count += 1;
    }

    /// Removes all pages of `owner`
    pub(crate) fn remove_owner(&mut self, owner: OwnerId) -> Vec<Page> {
        let (removed, kept): (Vec<Page>, Vec<Page>) = core::mem::take(&mut self.pages)
            .into_iter()
            .partition(|page| page.owner() == owner);
        self.pages = kept;
        self.resident_count -= removed.iter().filter(|page| page.is_resident()).count();

        removed
    }

    /// Removes all pages
    pub(crate) fn clear(&mut self) -> Vec<Page> {
        self.resident_count = 0;
        core::mem::take(&mut self.pages)
    }

    /// Checks counters, limits and address ranges of all pages
    pub(crate) fn check_integrity(&self, config: &PagerConfig) -> Result<(), String> {
        let resident = self.pages.iter().filter(|page| page.is_resident()).count();
        if resident != self.resident_count {
            return Err(format!(
                "resident_count is {} but {} pages are resident",
                self.resident_count, resident
            ));
        }
        if self.resident_count > config.max_resident_pages {
            return Err(format!(
                "{} resident pages exceed the budget of {}",
                self.resident_count, config.max_resident_pages
            ));
        }
        if self.pages.len() > config.max_total_pages {
            return Err(format!(
                "{} pages exceed the limit of {}",
                self.pages.len(),
                config.max_total_pages
            ));
        }

        for window in self.pages.windows(2) {
            let end = window[0].base_address().as_u64() + window[0].capacity() as u64;
            if end > window[1].base_address().as_u64() {
                return Err(format!(
                    "page {} overlaps with page {}",
                    window[0].id(),
                    window[1].id()
                ));
            }
        }

        self.pages.iter().try_for_each(|page| page.check_integrity())
    }
}
