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

use static_assertions::const_assert;

use crate::page_fault::{PageFault, Result};

pub const DEFAULT_PAGE_CAPACITY: usize = 1 << 10;
pub const DEFAULT_MAX_RESIDENT_PAGES: usize = 16;
pub const DEFAULT_MAX_TOTAL_PAGES: usize = 64;

const_assert!(DEFAULT_PAGE_CAPACITY > 0);
const_assert!(DEFAULT_MAX_RESIDENT_PAGES <= DEFAULT_MAX_TOTAL_PAGES);

/// Limits of a [`MemoryManager`](crate::MemoryManager)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PagerConfig {
    /// Size of every page in bytes
    pub page_capacity: usize,

    /// How many pages can be resident at the same time
    pub max_resident_pages: usize,

    /// How many pages can exist at all (resident and swapped)
    pub max_total_pages: usize,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            max_resident_pages: DEFAULT_MAX_RESIDENT_PAGES,
            max_total_pages: DEFAULT_MAX_TOTAL_PAGES,
        }
    }
}

impl PagerConfig {
    pub const fn with_page_capacity(mut self, page_capacity: usize) -> Self {
        self.page_capacity = page_capacity;
        self
    }

    pub const fn with_max_resident_pages(mut self, max_resident_pages: usize) -> Self {
        self.max_resident_pages = max_resident_pages;
        self
    }

    pub const fn with_max_total_pages(mut self, max_total_pages: usize) -> Self {
        self.max_total_pages = max_total_pages;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_capacity == 0 {
            return Err(PageFault::InvalidConfig(
                "page_capacity has to be at least one byte".to_string(),
            ));
        }
        if u64::try_from(self.page_capacity).is_err() {
            return Err(PageFault::InvalidConfig(format!(
                "page_capacity of {} bytes is too big",
                self.page_capacity
            )));
        }
        if self.max_resident_pages == 0 {
            return Err(PageFault::InvalidConfig(
                "max_resident_pages has to be at least one".to_string(),
            ));
        }
        if self.max_total_pages == 0 {
            return Err(PageFault::InvalidConfig(
                "max_total_pages has to be at least one".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a configuration from json. Missing fields keep their default value.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self> {
        let config: PagerConfig =
            serde_json::from_str(text).map_err(|err| PageFault::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
