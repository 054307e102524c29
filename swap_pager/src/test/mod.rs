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

use env_logger::{Builder, Env};

use crate::{
    modules::{
        eviction::EvictionModule,
        swap_store::{test::get_test_store, FileSwapStoreModule, MemorySwapStoreModule},
    },
    MemoryManager, PagerConfig,
};

mod randomized;

pub(crate) fn init_test_logger() {
    let _ = Builder::from_env(Env::default()).is_test(true).try_init();
}

pub(crate) fn get_test_manager(config: PagerConfig) -> MemoryManager<MemorySwapStoreModule> {
    init_test_logger();
    MemoryManager::new(config, MemorySwapStoreModule::new()).unwrap()
}

pub(crate) fn get_test_manager_with<E: EvictionModule>(
    config: PagerConfig,
) -> MemoryManager<MemorySwapStoreModule, E> {
    init_test_logger();
    MemoryManager::new(config, MemorySwapStoreModule::new()).unwrap()
}

pub(crate) fn get_file_test_manager(
    test_name: &str,
    config: PagerConfig,
) -> MemoryManager<FileSwapStoreModule> {
    init_test_logger();
    MemoryManager::new(config, get_test_store(test_name)).unwrap()
}

/// Small config whose limits are reached quickly
pub(crate) fn small_config(max_resident_pages: usize, max_total_pages: usize) -> PagerConfig {
    PagerConfig::default()
        .with_max_resident_pages(max_resident_pages)
        .with_max_total_pages(max_total_pages)
}
