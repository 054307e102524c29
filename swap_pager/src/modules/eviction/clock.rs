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

use std::collections::HashSet;

use super::{EvictionCandidate, EvictionModule};
use crate::{page::PageId, virtual_address::OwnerId};

/// Second chance (clock) eviction.
///
/// Pages that were accessed since the hand passed them last get another
/// chance. Pages of other owners are still preferred over the requester's own.
pub struct ClockEvictionModule {
    /// Page that was evicted last, the hand continues behind it
    hand: Option<PageId>,

    /// Pages that were accessed since the hand passed them
    referenced: HashSet<PageId>,
}

impl EvictionModule for ClockEvictionModule {
    fn new() -> Self {
        Self {
            hand: None,
            referenced: HashSet::new(),
        }
    }

    fn select_victim(
        &mut self,
        candidates: &[EvictionCandidate],
        requester: OwnerId,
    ) -> Option<usize> {
        let foreign: Vec<usize> = (0..candidates.len())
            .filter(|&i| candidates[i].owner != requester)
            .collect();
        let ring = if foreign.is_empty() {
            (0..candidates.len()).collect()
        } else {
            foreign
        };
        if ring.is_empty() {
            return None;
        }

        // candidates are ordered by creation, so ids are increasing
        let start = match self.hand {
            Some(hand) => ring
                .iter()
                .position(|&i| candidates[i].id > hand)
                .unwrap_or(0),
            None => 0,
        };

        // after one full round every reference bit is cleared
        for step in 0..=ring.len() {
            let index = ring[(start + step) % ring.len()];
            let id = candidates[index].id;

            if self.referenced.remove(&id) {
                continue;
            }

            self.hand = Some(id);
            return Some(index);
        }

        None
    }

    fn page_accessed(&mut self, page: PageId) {
        self.referenced.insert(page);
    }

    fn page_removed(&mut self, page: PageId) {
        self.referenced.remove(&page);
    }
}
