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

use core::ops::{Deref, DerefMut};
use std::sync::MutexGuard;

use crate::{
    memory_manager::MemoryManagerInner,
    modules::{eviction::EvictionModule, swap_store::SwapStoreModule},
    page_value::PageValue,
};

/// Mutable access to a value inside of a page, see [`MemoryManager::access_mut`](crate::MemoryManager::access_mut).
///
/// Holds the manager lock, so the page stays resident until this reference is dropped.
/// Modifications are written back to the page on drop.
pub struct PageValueMutRef<'a, T: PageValue, S: SwapStoreModule, E: EvictionModule> {
    inner: MutexGuard<'a, MemoryManagerInner<S, E>>,
    index: usize,
    offset: usize,
    value: T,
}

impl<'a, T: PageValue, S: SwapStoreModule, E: EvictionModule> PageValueMutRef<'a, T, S, E> {
    pub(crate) fn new(
        inner: MutexGuard<'a, MemoryManagerInner<S, E>>,
        index: usize,
        offset: usize,
        value: T,
    ) -> Self {
        Self {
            inner,
            index,
            offset,
            value,
        }
    }
}

impl<T: PageValue, S: SwapStoreModule, E: EvictionModule> Deref for PageValueMutRef<'_, T, S, E> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: PageValue, S: SwapStoreModule, E: EvictionModule> DerefMut
    for PageValueMutRef<'_, T, S, E>
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

impl<T: PageValue, S: SwapStoreModule, E: EvictionModule> Drop for PageValueMutRef<'_, T, S, E> {
    fn drop(&mut self) {
        // page cannot be evicted while the lock is held, so it is still resident
        match self.inner.bytes_mut(self.index, self.offset, T::SIZE) {
            Some(bytes) => self.value.encode(bytes),
            None => debug_assert!(false, "page {} is not resident anymore", self.index),
        }
    }
}
