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

mod clock;
mod default;

pub use clock::ClockEvictionModule;
pub use default::DefaultEvictionModule;

use crate::{page::PageId, virtual_address::OwnerId};

/// A resident page that could be swapped out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionCandidate {
    pub(crate) index: usize,
    pub(crate) id: PageId,
    pub(crate) owner: OwnerId,
}

impl EvictionCandidate {
    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }
}

/// Decides which resident page is swapped out if the resident budget is full
pub trait EvictionModule {
    /// Creates a new eviction module object
    fn new() -> Self;

    /// Picks the page that should be evicted to make room for a page of `requester`.
    ///
    /// `candidates` contains all resident pages that may be evicted in page table order.
    /// Returns the index into `candidates`, or `None` if no page should be evicted.
    fn select_victim(&mut self, candidates: &[EvictionCandidate], requester: OwnerId)
        -> Option<usize>;

    /// Called every time a page is allocated from or accessed
    fn page_accessed(&mut self, _page: PageId) {}

    /// Called once a page was removed from the page table
    fn page_removed(&mut self, _page: PageId) {}
}

#[cfg(test)]
pub(crate) mod test {
    use super::{EvictionCandidate, EvictionModule};
    use crate::{page::PageId, OwnerId};

    pub(crate) fn candidates(owners: &[u64]) -> Vec<EvictionCandidate> {
        owners
            .iter()
            .enumerate()
            .map(|(i, owner)| EvictionCandidate {
                index: i,
                id: PageId(i as u64),
                owner: OwnerId::new(*owner),
            })
            .collect()
    }

    /// Checks the behavior every eviction module has to share
    pub(crate) fn test_eviction_module_common<E: EvictionModule>() {
        let mut module = E::new();
        assert_eq!(module.select_victim(&[], OwnerId::new(1)), None);

        // only own pages left: one of them has to be evicted
        let choice = module
            .select_victim(&candidates(&[1, 1]), OwnerId::new(1))
            .unwrap();
        assert!(choice < 2);

        // a foreign page is always preferred
        for _ in 0..4 {
            let list = candidates(&[1, 2, 1, 3]);
            let choice = module.select_victim(&list, OwnerId::new(1)).unwrap();
            assert_ne!(list[choice].owner(), OwnerId::new(1));
        }
    }
}
