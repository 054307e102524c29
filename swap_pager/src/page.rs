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
use std::collections::BTreeMap;

use crate::{
    page_fault::{PageFault, Result},
    page_info::PageInfo,
    util::free_list::FreeList,
    virtual_address::{OwnerId, VirtualAddress},
};

/// Creation sequence number of a page, unique inside of one manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageId(pub(crate) u64);

impl PageId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct Page {
    id: PageId,
    owner: OwnerId,

    capacity: usize,

    /// Bytes behind the cursor that were never handed out
    ///
    /// Following is always true: `free_bytes + (cursor_address - base_address) == capacity`
    free_bytes: usize,

    base_address: VirtualAddress,
    cursor_address: VirtualAddress,

    /// Page content, `Some` iff this page is resident
    buffer: Option<Box<[u8]>>,

    /// Name of this page inside of the swap store
    swap_name: String,

    /// Live allocations below the cursor, `offset -> len`
    allocations: BTreeMap<usize, usize>,

    /// Allocations below the cursor that were freed again
    free_list: FreeList,
}

impl Page {
    /// Creates a new resident and zeroed page
    pub(crate) fn new(
        id: PageId,
        owner: OwnerId,
        base_address: VirtualAddress,
        capacity: usize,
        swap_name: String,
    ) -> Self {
        Self {
            id,
            owner,
            capacity,
            free_bytes: capacity,
            base_address,
            cursor_address: base_address,
            buffer: Some(vec![0u8; capacity].into_boxed_slice()),
            swap_name,
            allocations: BTreeMap::new(),
            free_list: FreeList::new(),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> PageId {
        self.id
    }

    #[inline]
    pub(crate) fn owner(&self) -> OwnerId {
        self.owner
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn free_bytes(&self) -> usize {
        self.free_bytes
    }

    #[inline]
    pub(crate) fn base_address(&self) -> VirtualAddress {
        self.base_address
    }

    #[inline]
    pub(crate) fn swap_name(&self) -> &str {
        &self.swap_name
    }

    #[inline]
    pub(crate) fn is_resident(&self) -> bool {
        self.buffer.is_some()
    }

    #[inline]
    pub(crate) fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    /// Bytes between base and cursor
    #[inline]
    fn used_bytes(&self) -> usize {
        self.cursor_address.distance_from(self.base_address)
    }

    /// Can `size` bytes be allocated inside of this page?
    pub(crate) fn has_room(&self, size: usize) -> bool {
        self.free_bytes >= size || self.free_list.fits(size)
    }

    /// Like [`Page::has_room`], but requires strictly more untouched bytes than `size`.
    /// Used to decide whether a swapped page is worth a fault-in.
    pub(crate) fn has_spare_room(&self, size: usize) -> bool {
        self.free_bytes > size || self.free_list.fits(size)
    }

    pub(crate) fn contains(&self, address: VirtualAddress) -> bool {
        let end = self.base_address.as_u64() + self.capacity as u64;
        self.base_address <= address && address.as_u64() < end
    }

    /// Allocates `size` bytes inside of this page and returns their address.
    ///
    /// Previously freed ranges are reused before the cursor is advanced.
    ///
    /// **Note**: The caller has to make sure that [`Page::has_room`] holds for `size`.
    pub(crate) fn try_allocate(&mut self, size: usize) -> VirtualAddress {
        debug_assert!(self.has_room(size), "page {} cannot fit {} bytes", self.id, size);

        let offset = match self.free_list.take_first_fit(size) {
            Some(offset) => offset,
            None => {
                let offset = self.used_bytes();
                self.cursor_address = VirtualAddress::from_raw(self.cursor_address.as_u64() + size as u64);
                self.free_bytes -= size;
                offset
            }
        };

        self.allocations.insert(offset, size);
        VirtualAddress::from_raw(self.base_address.as_u64() + offset as u64)
    }

    /// Translates an access of `len` bytes at `address` to an offset inside of this page.
    ///
    /// Fails if the address lies at or behind the cursor or if any accessed byte was freed.
    pub(crate) fn translate(&self, address: VirtualAddress, len: usize) -> Result<usize> {
        let violation = PageFault::AccessViolation { address };

        if !self.contains(address) || address >= self.cursor_address {
            return Err(violation);
        }

        let offset = address.distance_from(self.base_address);
        if offset + len > self.used_bytes() || self.free_list.overlaps(offset, len) {
            return Err(violation);
        }

        Ok(offset)
    }

    /// Returns `true` if an allocation starts at `address`
    pub(crate) fn is_allocation_start(&self, address: VirtualAddress) -> bool {
        self.contains(address)
            && self
                .allocations
                .contains_key(&address.distance_from(self.base_address))
    }

    /// Gives the allocation starting at `address` back to the free list of this page
    /// and zeroes its bytes. Returns the amount of reclaimed bytes.
    ///
    /// **Note**: The page has to be resident.
    pub(crate) fn release(&mut self, address: VirtualAddress) -> Result<usize> {
        debug_assert!(self.is_resident(), "page {} has to be resident", self.id);

        if !self.contains(address) {
            return Err(PageFault::AccessViolation { address });
        }
        let offset = address.distance_from(self.base_address);
        let len = self
            .allocations
            .remove(&offset)
            .ok_or(PageFault::AccessViolation { address })?;

        if let Some(buffer) = self.buffer.as_mut() {
            buffer[offset..offset + len].fill(0);
        }
        self.free_list.insert(offset, len);

        Ok(len)
    }

    pub(crate) fn bytes(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.buffer.as_deref()?.get(offset..offset + len)
    }

    pub(crate) fn bytes_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        self.buffer.as_deref_mut()?.get_mut(offset..offset + len)
    }

    /// Releases the buffer of this page, it is not resident afterwards
    pub(crate) fn take_buffer(&mut self) -> Option<Box<[u8]>> {
        self.buffer.take()
    }

    /// Makes this page resident again with the restored `buffer`
    pub(crate) fn install_buffer(&mut self, buffer: Box<[u8]>) {
        debug_assert_eq!(buffer.len(), self.capacity);
        debug_assert!(self.buffer.is_none(), "page {} is already resident", self.id);
        self.buffer = Some(buffer);
    }

    pub(crate) fn info(&self) -> PageInfo {
        PageInfo {
            id: self.id,
            owner: self.owner,
            resident: self.is_resident(),
            free_bytes: self.free_bytes(),
            reclaimed_bytes: self.free_list.total(),
            base_address: self.base_address,
            cursor_address: self.cursor_address,
            swap_name: self.swap_name.clone(),
        }
    }

    /// Checks the bookkeeping invariants of this page
    pub(crate) fn check_integrity(&self) -> core::result::Result<(), String> {
        if self.free_bytes + self.used_bytes() != self.capacity {
            return Err(format!(
                "page {}: free_bytes ({}) + used bytes ({}) != capacity ({})",
                self.id,
                self.free_bytes,
                self.used_bytes(),
                self.capacity
            ));
        }

        if let Some(buffer) = self.buffer.as_ref() {
            if buffer.len() != self.capacity {
                return Err(format!("page {}: buffer has {} bytes", self.id, buffer.len()));
            }
        }

        let allocated: usize = self.allocations.values().sum();
        if allocated + self.free_list.total() != self.used_bytes() {
            return Err(format!(
                "page {}: allocated ({}) + reclaimed ({}) bytes do not cover the used bytes ({})",
                self.id,
                allocated,
                self.free_list.total(),
                self.used_bytes()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{Page, PageId};
    use crate::{OwnerId, PageFault, VirtualAddress};

    fn test_page(capacity: usize) -> Page {
        Page::new(
            PageId(0),
            OwnerId::new(1),
            VirtualAddress::from_raw(0x1000),
            capacity,
            "test".to_string(),
        )
    }

    #[test]
    fn test_page_bump_allocation() {
        let mut page = test_page(64);

        assert_eq!(page.try_allocate(4).as_u64(), 0x1000);
        assert_eq!(page.try_allocate(8).as_u64(), 0x1004);
        assert_eq!(page.free_bytes(), 52);
        assert!(page.has_room(52));
        assert!(!page.has_room(53));
        assert!(!page.has_spare_room(52));
        assert!(page.check_integrity().is_ok());
    }

    #[test]
    fn test_page_translate() {
        let mut page = test_page(64);
        let address = page.try_allocate(8);

        assert_eq!(page.translate(address, 8).unwrap(), 0);
        assert_eq!(page.translate(address.offset(4).unwrap(), 4).unwrap(), 4);

        // behind the cursor, even though inside of the page
        assert!(matches!(
            page.translate(address.offset(8).unwrap(), 1),
            Err(PageFault::AccessViolation { .. })
        ));
        // reaching over the cursor
        assert!(matches!(
            page.translate(address.offset(4).unwrap(), 8),
            Err(PageFault::AccessViolation { .. })
        ));
        // outside of page
        assert!(matches!(
            page.translate(VirtualAddress::from_raw(0x2000), 1),
            Err(PageFault::AccessViolation { .. })
        ));
    }

    #[test]
    fn test_page_release_and_reuse() {
        let mut page = test_page(64);
        let first = page.try_allocate(8);
        let second = page.try_allocate(8);

        page.bytes_mut(0, 8).unwrap().fill(0xab);
        assert_eq!(page.release(first).unwrap(), 8);
        assert_eq!(page.bytes(0, 8).unwrap(), &[0u8; 8]);

        // released memory cannot be accessed or released twice
        assert!(page.translate(first, 1).is_err());
        assert!(page.release(first).is_err());
        // an address in the middle of an allocation cannot be released
        assert!(page.release(second.offset(1).unwrap()).is_err());

        // reuse the released range, cursor does not move
        assert_eq!(page.try_allocate(4), first);
        assert_eq!(page.free_bytes(), 48);
        assert!(page.translate(first, 4).is_ok());
        assert!(page.check_integrity().is_ok());
    }

    #[test]
    fn test_page_buffer_ownership() {
        let mut page = test_page(16);
        assert!(page.is_resident());

        let buffer = page.take_buffer().unwrap();
        assert!(!page.is_resident());
        assert!(page.bytes(0, 1).is_none());

        page.install_buffer(buffer);
        assert!(page.is_resident());
        assert!(page.check_integrity().is_ok());
    }
}
