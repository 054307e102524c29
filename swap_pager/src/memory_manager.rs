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

use std::sync::{Mutex, MutexGuard};

use log::{debug, info, trace, warn};

use crate::{
    modules::{
        eviction::{DefaultEvictionModule, EvictionModule},
        swap_store::SwapStoreModule,
    },
    page::PageId,
    page_fault::{PageFault, Result},
    page_info::{PageInfo, PagerStats},
    page_table::PageTable,
    page_value::PageValue,
    page_value_mut_ref::PageValueMutRef,
    pager_config::PagerConfig,
    virtual_address::{OwnerId, VirtualAddress},
};

/// A pool of fixed-size pages shared by many owners.
///
/// Pages are swapped out to `S` if more than `max_resident_pages` pages would be
/// resident and are faulted back in on access. `E` decides which page is swapped out.
///
/// Every public function holds one exclusive lock for its whole duration,
/// swap store I/O included.
pub struct MemoryManager<S: SwapStoreModule, E: EvictionModule = DefaultEvictionModule> {
    config: PagerConfig,
    inner: Mutex<MemoryManagerInner<S, E>>,
}

impl<S: SwapStoreModule, E: EvictionModule> MemoryManager<S, E> {
    pub fn new(config: PagerConfig, swap_store: S) -> Result<Self> {
        config.validate()?;

        info!(
            "Created memory manager with {} resident and {} total pages of {} bytes",
            config.max_resident_pages, config.max_total_pages, config.page_capacity
        );

        Ok(Self {
            config,
            inner: Mutex::new(MemoryManagerInner {
                config,
                page_table: PageTable::new(),
                swap_store,
                eviction: E::new(),
                evictions: 0,
                fault_ins: 0,
            }),
        })
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryManagerInner<S, E>>> {
        self.inner.lock().map_err(|_| PageFault::LockPoisoned)
    }

    /// Allocates `size` bytes for `owner` and returns their address.
    ///
    /// Free space in resident pages of `owner` is used first, then space in its swapped
    /// pages. Only if both fail, a new page is created.
    pub fn allocate(&self, size: usize, owner: OwnerId) -> Result<VirtualAddress> {
        self.lock()?.allocate(size, owner)
    }

    /// Reads the value at `address`, faulting its page in if necessary
    pub fn read<T: PageValue>(&self, address: VirtualAddress) -> Result<T> {
        let mut inner = self.lock()?;
        let (index, offset) = inner.translate(address, T::SIZE)?;
        inner.decode(index, offset, address)
    }

    /// Writes `value` to `address`, faulting its page in if necessary
    pub fn write<T: PageValue>(&self, address: VirtualAddress, value: &T) -> Result<()> {
        let mut inner = self.lock()?;
        let (index, offset) = inner.translate(address, T::SIZE)?;
        inner.encode(index, offset, address, value)
    }

    /// Reads the value at `address`, lets `function` modify it and writes it back.
    /// Returns the new value.
    pub fn update<T: PageValue, F: FnOnce(&mut T)>(
        &self,
        address: VirtualAddress,
        function: F,
    ) -> Result<T> {
        let mut inner = self.lock()?;
        let (index, offset) = inner.translate(address, T::SIZE)?;

        let mut value: T = inner.decode(index, offset, address)?;
        function(&mut value);
        inner.encode(index, offset, address, &value)?;

        Ok(value)
    }

    /// Returns a mutable reference to the value at `address`.
    ///
    /// The manager stays locked while the reference is alive, the value is written back
    /// once it is dropped. **Calling another function of this manager from the same
    /// thread while the reference is alive deadlocks.**
    pub fn access_mut<T: PageValue>(
        &self,
        address: VirtualAddress,
    ) -> Result<PageValueMutRef<'_, T, S, E>> {
        let mut inner = self.lock()?;
        let (index, offset) = inner.translate(address, T::SIZE)?;
        let value = inner.decode(index, offset, address)?;

        Ok(PageValueMutRef::new(inner, index, offset, value))
    }

    /// Frees the allocation that starts at `address`.
    ///
    /// The space can be reused by later allocations of the same owner.
    pub fn free_value(&self, address: VirtualAddress) -> Result<()> {
        self.lock()?.free_value(address)
    }

    /// Swaps out every resident page of `owner`
    pub fn unload_owner(&self, owner: OwnerId) -> Result<()> {
        self.lock()?.unload_owner(owner)
    }

    /// Removes every page of `owner` including its swapped data
    pub fn free_owner(&self, owner: OwnerId) -> Result<()> {
        self.lock()?.free_owner(owner)
    }

    /// Removes all pages including their swapped data
    pub fn free_all(&self) -> Result<()> {
        self.lock()?.free_all()
    }

    /// Snapshot of all pages, optionally ordered by owner
    pub fn list_pages(&self, order_by_owner: bool) -> Result<Vec<PageInfo>> {
        let inner = self.lock()?;
        let mut pages: Vec<PageInfo> = inner.page_table.iter().map(|page| page.info()).collect();
        if order_by_owner {
            pages.sort_by_key(|page| page.owner);
        }
        Ok(pages)
    }

    pub fn stats(&self) -> Result<PagerStats> {
        let inner = self.lock()?;
        Ok(PagerStats {
            resident_pages: inner.page_table.resident_count(),
            total_pages: inner.page_table.total_count(),
            evictions: inner.evictions,
            fault_ins: inner.fault_ins,
        })
    }

    /// Verifies the bookkeeping of all pages, returns a description of the first broken invariant
    pub fn check_integrity(&self) -> core::result::Result<(), String> {
        let inner = self.lock().map_err(|err| err.to_string())?;
        inner.page_table.check_integrity(&inner.config)
    }

    #[cfg(test)]
    pub(crate) fn with_swap_store<R, F: FnOnce(&S) -> R>(&self, function: F) -> R {
        let inner = self.lock().unwrap();
        function(&inner.swap_store)
    }

    #[cfg(test)]
    pub(crate) fn with_swap_store_mut<R, F: FnOnce(&mut S) -> R>(&self, function: F) -> R {
        let mut inner = self.lock().unwrap();
        function(&mut inner.swap_store)
    }
}

/// State guarded by the manager lock. Nothing in here locks again.
pub(crate) struct MemoryManagerInner<S: SwapStoreModule, E: EvictionModule> {
    config: PagerConfig,
    page_table: PageTable,
    swap_store: S,
    eviction: E,

    evictions: u64,
    fault_ins: u64,
}

impl<S: SwapStoreModule, E: EvictionModule> MemoryManagerInner<S, E> {
    fn allocate(&mut self, size: usize, owner: OwnerId) -> Result<VirtualAddress> {
        trace!("Allocate {} bytes for owner {}", size, owner);

        if size == 0 || size > self.config.page_capacity {
            warn!(
                "Cannot allocate {} bytes in pages of {} bytes",
                size, self.config.page_capacity
            );
            return Err(PageFault::InvalidSize {
                size,
                capacity: self.config.page_capacity,
            });
        }

        // STEP 1: resident pages of owner
        if let Some(index) = self.page_table.find_resident_with_room(owner, size) {
            return Ok(self.allocate_in(index, size));
        }

        // STEP 2: swapped pages of owner
        if let Some(index) = self.page_table.find_swapped_with_room(owner, size) {
            debug!(
                "Fault in page {} of owner {} to allocate {} bytes",
                self.page_table.get(index).id(),
                owner,
                size
            );
            self.fault_in(index)?;
            return Ok(self.allocate_in(index, size));
        }

        // STEP 3: new page
        if self.page_table.total_count() >= self.config.max_total_pages {
            warn!(
                "Cannot create a new page for owner {}, all {} pages are in use",
                owner, self.config.max_total_pages
            );
            return Err(PageFault::CapacityExceeded {
                max_total_pages: self.config.max_total_pages,
            });
        }
        if self.resident_budget_full() {
            self.evict_one(owner, None)?;
        }

        let index = self
            .page_table
            .create_page(owner, self.config.page_capacity);
        debug!(
            "Created page {} for owner {}",
            self.page_table.get(index).id(),
            owner
        );

        Ok(self.allocate_in(index, size))
    }

    fn allocate_in(&mut self, index: usize, size: usize) -> VirtualAddress {
        let page = self.page_table.get_mut(index);
        let address = page.try_allocate(size);
        self.eviction.page_accessed(page.id());

        trace!(
            "-> allocated {} bytes at {} (page {})",
            size,
            address,
            page.id()
        );
        address
    }

    /// Translates `address` for an access of `len` bytes to `(page index, offset)`.
    /// The page is resident afterwards.
    pub(crate) fn translate(
        &mut self,
        address: VirtualAddress,
        len: usize,
    ) -> Result<(usize, usize)> {
        trace!("Translate address {} ({} bytes)", address, len);

        let index = self
            .page_table
            .find_by_address(address)
            .ok_or(PageFault::AccessViolation { address })?;
        let offset = self.page_table.get(index).translate(address, len)?;

        self.fault_in(index)?;
        self.eviction.page_accessed(self.page_table.get(index).id());

        Ok((index, offset))
    }

    fn decode<T: PageValue>(
        &self,
        index: usize,
        offset: usize,
        address: VirtualAddress,
    ) -> Result<T> {
        self.page_table
            .get(index)
            .bytes(offset, T::SIZE)
            .map(T::decode)
            .ok_or(PageFault::AccessViolation { address })
    }

    fn encode<T: PageValue>(
        &mut self,
        index: usize,
        offset: usize,
        address: VirtualAddress,
        value: &T,
    ) -> Result<()> {
        let bytes = self
            .page_table
            .get_mut(index)
            .bytes_mut(offset, T::SIZE)
            .ok_or(PageFault::AccessViolation { address })?;
        value.encode(bytes);
        Ok(())
    }

    /// Raw bytes of a resident page, used by [`PageValueMutRef`] to write back its value
    pub(crate) fn bytes_mut(&mut self, index: usize, offset: usize, len: usize) -> Option<&mut [u8]> {
        self.page_table.get_mut(index).bytes_mut(offset, len)
    }

    fn free_value(&mut self, address: VirtualAddress) -> Result<()> {
        trace!("Free value at {}", address);

        let index = self
            .page_table
            .find_by_address(address)
            .ok_or(PageFault::AccessViolation { address })?;
        if !self.page_table.get(index).is_allocation_start(address) {
            warn!("No allocation starts at {}", address);
            return Err(PageFault::AccessViolation { address });
        }

        self.fault_in(index)?;
        let len = self.page_table.get_mut(index).release(address)?;

        trace!("-> reclaimed {} bytes", len);
        Ok(())
    }

    fn resident_budget_full(&self) -> bool {
        self.page_table.resident_count() >= self.config.max_resident_pages
    }

    /// Makes the page at `index` resident, swapping out another page if the budget is full.
    ///
    /// If this call fails, the page table is unchanged (except for an eviction that already
    /// completed).
    fn fault_in(&mut self, index: usize) -> Result<()> {
        let page = self.page_table.get(index);
        if page.is_resident() {
            return Ok(());
        }

        let id = page.id();
        let owner = page.owner();

        // restore first, a missing page must not cost another page its residency
        let mut buffer = vec![0u8; page.capacity()].into_boxed_slice();
        self.swap_store.restore(page.swap_name(), &mut buffer)?;

        if self.resident_budget_full() {
            self.evict_one(owner, Some(id))?;
        }

        self.page_table.mark_resident(index, buffer);
        self.fault_ins += 1;

        debug!("Faulted in page {} of owner {}", id, owner);
        Ok(())
    }

    /// Swaps out one page to make room for a page of `requester`. `protected` is never chosen.
    fn evict_one(&mut self, requester: OwnerId, protected: Option<PageId>) -> Result<()> {
        let candidates = self.page_table.eviction_candidates(protected);
        let victim = self
            .eviction
            .select_victim(&candidates, requester)
            .and_then(|choice| candidates.get(choice));

        match victim {
            Some(victim) => {
                debug!(
                    "Evict page {} of owner {} to make room for owner {}",
                    victim.id, victim.owner, requester
                );
                self.evict(victim.index)
            }
            None => {
                warn!(
                    "Resident budget of {} pages is full, but no page can be evicted for owner {}",
                    self.config.max_resident_pages, requester
                );
                Err(PageFault::EvictionImpossible {
                    max_resident_pages: self.config.max_resident_pages,
                })
            }
        }
    }

    /// Writes the page at `index` to the swap store and releases its buffer
    fn evict(&mut self, index: usize) -> Result<()> {
        let page = self.page_table.get(index);
        let Some(buffer) = page.buffer() else {
            // already swapped
            return Ok(());
        };

        self.swap_store.persist(page.swap_name(), buffer)?;
        self.page_table.mark_swapped(index);
        self.evictions += 1;

        Ok(())
    }

    fn unload_owner(&mut self, owner: OwnerId) -> Result<()> {
        let pages = self.page_table.resident_pages_of(owner);
        debug!("Unload {} resident pages of owner {}", pages.len(), owner);

        for index in pages {
            self.evict(index)?;
        }
        Ok(())
    }

    fn free_owner(&mut self, owner: OwnerId) -> Result<()> {
        let pages = self.page_table.remove_owner(owner);
        info!("Freed {} pages of owner {}", pages.len(), owner);

        self.purge_pages(pages.iter().map(|page| (page.id(), page.swap_name())))
    }

    fn free_all(&mut self) -> Result<()> {
        let pages = self.page_table.clear();
        info!("Freed all {} pages", pages.len());

        self.purge_pages(pages.iter().map(|page| (page.id(), page.swap_name())))
    }

    /// Deletes swapped data of removed pages. All pages are purged even if one fails,
    /// the first error is returned.
    fn purge_pages<'a, I: Iterator<Item = (PageId, &'a str)>>(&mut self, pages: I) -> Result<()> {
        let mut result = Ok(());

        for (id, swap_name) in pages {
            self.eviction.page_removed(id);

            if let Err(err) = self.swap_store.purge(swap_name) {
                warn!("Could not purge swapped data of page {}: {}", id, err);
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        result
    }
}
