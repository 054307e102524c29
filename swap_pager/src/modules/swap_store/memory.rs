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

use std::{
    collections::HashMap,
    io::{Error, ErrorKind},
};

use super::SwapStoreModule;
use crate::page_fault::{PageFault, Result};

/// Keeps swapped pages in RAM. Nothing survives the module.
#[derive(Default)]
pub struct MemorySwapStoreModule {
    pages: HashMap<String, Box<[u8]>>,
}

impl MemorySwapStoreModule {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    /// Amount of currently stored pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl SwapStoreModule for MemorySwapStoreModule {
    fn persist(&mut self, name: &str, src: &[u8]) -> Result<()> {
        self.pages.insert(name.to_string(), src.into());
        Ok(())
    }

    fn restore(&mut self, name: &str, dest: &mut [u8]) -> Result<()> {
        let data = self
            .pages
            .get(name)
            .ok_or_else(|| PageFault::store_miss(name))?;

        if data.len() != dest.len() {
            return Err(PageFault::store_io(
                name,
                Error::new(
                    ErrorKind::InvalidData,
                    format!("stored {} bytes, expected {}", data.len(), dest.len()),
                ),
            ));
        }

        dest.copy_from_slice(data);
        Ok(())
    }

    fn purge(&mut self, name: &str) -> Result<()> {
        self.pages.remove(name);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.pages.contains_key(name)
    }
}

#[cfg(test)]
mod test {
    use super::MemorySwapStoreModule;
    use crate::{
        modules::swap_store::{
            test::{
                test_swap_store_miss_and_purge, test_swap_store_overwrite,
                test_swap_store_round_trip,
            },
            SwapStoreModule,
        },
        PageFault,
    };

    #[test]
    fn test_memory_swap_store_round_trip() {
        test_swap_store_round_trip(MemorySwapStoreModule::new());
    }

    #[test]
    fn test_memory_swap_store_overwrite() {
        test_swap_store_overwrite(MemorySwapStoreModule::new());
    }

    #[test]
    fn test_memory_swap_store_miss_and_purge() {
        test_swap_store_miss_and_purge(MemorySwapStoreModule::new());
    }

    #[test]
    fn test_memory_swap_store_size_mismatch() {
        let mut store = MemorySwapStoreModule::new();
        store.persist("page", &[1u8; 8]).unwrap();

        let mut dest = [0u8; 16];
        assert!(matches!(
            store.restore("page", &mut dest),
            Err(PageFault::StoreIo { .. })
        ));
    }
}
