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

use super::{EvictionCandidate, EvictionModule};
use crate::virtual_address::OwnerId;

/// Evicts the first page of another owner. If the requester owns all
/// resident pages, its own first page is evicted.
// completely stateless
pub struct DefaultEvictionModule;

impl EvictionModule for DefaultEvictionModule {
    fn new() -> Self {
        Self
    }

    fn select_victim(
        &mut self,
        candidates: &[EvictionCandidate],
        requester: OwnerId,
    ) -> Option<usize> {
        candidates
            .iter()
            .position(|candidate| candidate.owner != requester)
            .or_else(|| candidates.iter().position(|candidate| candidate.owner == requester))
    }
}

#[cfg(test)]
mod test {
    use super::DefaultEvictionModule;
    use crate::{
        modules::eviction::{
            test::{candidates, test_eviction_module_common},
            EvictionModule,
        },
        OwnerId,
    };

    #[test]
    fn test_default_eviction_module_common() {
        test_eviction_module_common::<DefaultEvictionModule>();
    }

    #[test]
    fn test_default_eviction_module_order() {
        let mut module = DefaultEvictionModule::new();

        assert_eq!(
            module.select_victim(&candidates(&[3, 3, 2, 1]), OwnerId::new(3)),
            Some(2)
        );
        assert_eq!(
            module.select_victim(&candidates(&[3, 3]), OwnerId::new(3)),
            Some(0)
        );
    }
}
