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
    collections::HashSet,
    fs::{create_dir_all, remove_dir, remove_file, File},
    io::{Error, ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use super::SwapStoreModule;
use crate::page_fault::{PageFault, Result};

/// Stores every page in its own file `<directory>/<name>.page`
pub struct FileSwapStoreModule {
    directory: PathBuf,

    /// directory did not exist before, remove it again on drop
    created_directory: bool,

    /// names written by this module, save for deleting files later
    written: HashSet<String>,
}

impl FileSwapStoreModule {
    /// Creates a new swap store inside of `directory`. The directory is created if necessary.
    pub fn new<P: Into<PathBuf>>(directory: P) -> std::io::Result<Self> {
        let directory = directory.into();
        let created_directory = !directory.exists();
        create_dir_all(&directory)?;

        Ok(Self {
            directory,
            created_directory,
            written: HashSet::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.page", name))
    }
}

impl SwapStoreModule for FileSwapStoreModule {
    fn persist(&mut self, name: &str, src: &[u8]) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path_of(name))
            .map_err(|err| PageFault::store_io(name, err))?;
        file.write_all(src)
            .map_err(|err| PageFault::store_io(name, err))?;

        self.written.insert(name.to_string());
        Ok(())
    }

    fn restore(&mut self, name: &str, dest: &mut [u8]) -> Result<()> {
        let mut file = match File::open(self.path_of(name)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(PageFault::store_miss(name))
            }
            Err(err) => return Err(PageFault::store_io(name, err)),
        };

        let len = file
            .metadata()
            .map_err(|err| PageFault::store_io(name, err))?
            .len();
        if len != dest.len() as u64 {
            return Err(PageFault::store_io(
                name,
                Error::new(
                    ErrorKind::InvalidData,
                    format!("stored {} bytes, expected {}", len, dest.len()),
                ),
            ));
        }

        file.read_exact(dest)
            .map_err(|err| PageFault::store_io(name, err))
    }

    fn purge(&mut self, name: &str) -> Result<()> {
        self.written.remove(name);

        match remove_file(self.path_of(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PageFault::store_io(name, err)),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.path_of(name).exists()
    }
}

impl Drop for FileSwapStoreModule {
    fn drop(&mut self) {
        for name in self.written.iter() {
            let _ = remove_file(self.path_of(name));
        }

        if self.created_directory {
            // only succeeds if nobody else put files in there
            let _ = remove_dir(&self.directory);
        }
    }
}
