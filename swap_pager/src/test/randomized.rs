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

use std::collections::HashMap;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::{get_test_manager, get_test_manager_with, small_config};
use crate::{
    modules::{eviction::EvictionModule, swap_store::MemorySwapStoreModule},
    MemoryManager, OwnerId, PagerConfig, VirtualAddress,
};

const OWNERS: u64 = 4;

/// Applies random operations and compares every value against a shadow copy
fn run_random_operations<E: EvictionModule>(
    manager: &MemoryManager<MemorySwapStoreModule, E>,
    seed: u64,
    iterations: usize,
) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut shadow: HashMap<VirtualAddress, (OwnerId, u64)> = HashMap::new();

    for _ in 0..iterations {
        let owner = OwnerId::new(rng.gen_range(0..OWNERS));

        match rng.gen_range(0..100) {
            0..=39 => {
                let size = [8, 16, 32, 100][rng.gen_range(0..4)];
                let value: u64 = rng.gen();
                let address = manager.allocate(size, owner).unwrap();
                manager.write(address, &value).unwrap();
                assert!(shadow.insert(address, (owner, value)).is_none());
            }
            40..=64 => {
                if let Some((address, (_, value))) = pick(&mut rng, &shadow) {
                    assert_eq!(manager.read::<u64>(address).unwrap(), value);
                }
            }
            65..=79 => {
                if let Some((address, _)) = pick(&mut rng, &shadow) {
                    manager.free_value(address).unwrap();
                    shadow.remove(&address);
                    assert!(manager.read::<u8>(address).is_err());
                }
            }
            80..=96 => {
                manager.unload_owner(owner).unwrap();
            }
            _ => {
                manager.free_owner(owner).unwrap();
                shadow.retain(|_, (value_owner, _)| *value_owner != owner);
            }
        }

        manager.check_integrity().unwrap();
        assert!(manager.stats().unwrap().resident_pages <= manager.config().max_resident_pages);
    }

    for (address, (_, value)) in shadow.iter() {
        assert_eq!(manager.read::<u64>(*address).unwrap(), *value);
    }
}

fn pick(
    rng: &mut SmallRng,
    shadow: &HashMap<VirtualAddress, (OwnerId, u64)>,
) -> Option<(VirtualAddress, (OwnerId, u64))> {
    if shadow.is_empty() {
        return None;
    }
    // HashMap order is random, sort to stay reproducible
    let mut addresses: Vec<_> = shadow.keys().copied().collect();
    addresses.sort();
    let address = addresses[rng.gen_range(0..addresses.len())];
    Some((address, shadow[&address]))
}

#[test]
fn test_random_operations_default_eviction() {
    let manager = get_test_manager(small_config(3, 256));
    run_random_operations(&manager, 0x5eed, 2000);
}

#[test]
fn test_random_operations_clock_eviction() {
    let manager = get_test_manager_with::<crate::modules::eviction::ClockEvictionModule>(
        small_config(2, 256),
    );
    run_random_operations(&manager, 42, 2000);
}

#[test]
fn test_random_operations_small_pages() {
    let manager = get_test_manager(
        PagerConfig::default()
            .with_page_capacity(128)
            .with_max_resident_pages(2)
            .with_max_total_pages(1024),
    );
    run_random_operations(&manager, 7, 1000);
}
