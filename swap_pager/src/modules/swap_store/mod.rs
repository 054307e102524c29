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

mod file_storage;
mod memory;

pub use file_storage::FileSwapStoreModule;
pub use memory::MemorySwapStoreModule;

use crate::page_fault::Result;

/// Persistent storage for swapped out pages.
///
/// Pages are always written and read as a whole, the length of an artifact
/// is implicitly the page capacity.
pub trait SwapStoreModule {
    /// Writes `src` under `name`, replacing any previous content
    fn persist(&mut self, name: &str, src: &[u8]) -> Result<()>;

    /// Reads the bytes stored under `name` into `dest`, which has to be exactly as big
    /// as the persisted data.
    ///
    /// Fails with [`PageFault::StoreMiss`](crate::PageFault::StoreMiss) if nothing was persisted under `name`.
    /// If this call fails, it could be that already some data was written to `dest`.
    fn restore(&mut self, name: &str, dest: &mut [u8]) -> Result<()>;

    /// Deletes the artifact stored under `name`. Deleting a missing artifact is not an error.
    fn purge(&mut self, name: &str) -> Result<()>;

    /// Returns `true` if something is stored under `name`
    fn contains(&self, name: &str) -> bool;
}

#[cfg(test)]
pub(crate) mod test {
    use std::{env::temp_dir, fs::remove_dir_all};

    use super::{FileSwapStoreModule, SwapStoreModule};
    use crate::PageFault;

    /// File store in a fresh directory, leftovers of aborted runs are removed first
    pub(crate) fn get_test_store(test_name: &str) -> FileSwapStoreModule {
        let directory = temp_dir().join(format!("swap_pager_{}", test_name));
        let _ = remove_dir_all(&directory);
        FileSwapStoreModule::new(directory).unwrap()
    }

    fn gen_number(i: usize) -> u8 {
        (i * 3 + (i % 3) * 7 + (i % 11) * 51) as u8
    }

    pub(super) const SWAP_STORE_TEST_PAGE_SIZE: usize = 1024;

    /// test if persist saves all data and restore brings all of it back
    pub(super) fn test_swap_store_round_trip<T: SwapStoreModule>(mut module: T) {
        let mut pages = vec![];
        for page in 0..8 {
            let data: Vec<u8> = (0..SWAP_STORE_TEST_PAGE_SIZE)
                .map(|i| gen_number(i + page * 13))
                .collect();
            module.persist(&format!("page{}", page), &data).unwrap();
            pages.push(data);
        }

        for (page, data) in pages.iter().enumerate() {
            let mut restored = [0u8; SWAP_STORE_TEST_PAGE_SIZE];
            module.restore(&format!("page{}", page), &mut restored).unwrap();
            assert_eq!(&restored[..], &data[..], "page {} was not restored", page);
        }
    }

    pub(super) fn test_swap_store_overwrite<T: SwapStoreModule>(mut module: T) {
        module.persist("page", &[1u8; SWAP_STORE_TEST_PAGE_SIZE]).unwrap();
        module.persist("page", &[2u8; SWAP_STORE_TEST_PAGE_SIZE]).unwrap();

        let mut restored = [0u8; SWAP_STORE_TEST_PAGE_SIZE];
        module.restore("page", &mut restored).unwrap();
        assert!(restored.iter().all(|x| *x == 2));
    }

    pub(super) fn test_swap_store_miss_and_purge<T: SwapStoreModule>(mut module: T) {
        let mut restored = [0u8; SWAP_STORE_TEST_PAGE_SIZE];
        assert!(matches!(
            module.restore("unknown", &mut restored),
            Err(PageFault::StoreMiss { .. })
        ));
        assert!(!module.contains("unknown"));

        // purging something that does not exist is fine
        module.purge("unknown").unwrap();

        module.persist("page", &restored).unwrap();
        assert!(module.contains("page"));
        module.purge("page").unwrap();
        assert!(!module.contains("page"));
        assert!(matches!(
            module.restore("page", &mut restored),
            Err(PageFault::StoreMiss { .. })
        ));
    }
}
