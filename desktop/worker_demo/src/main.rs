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

use std::{env, env::temp_dir, fs, process::ExitCode, thread};

use env_logger::{Builder, Env};
use log::error;
use rand_xoshiro::{
    rand_core::{RngCore, SeedableRng},
    Xoshiro256PlusPlus,
};
use swap_pager::{
    modules::swap_store::FileSwapStoreModule, MemoryManager, OwnerId, PageFault, PagerConfig,
};

const WORKERS: u64 = 20;
const ITERATIONS: usize = 100;

fn load_config() -> Result<PagerConfig, String> {
    match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .map_err(|err| format!("could not read config {}: {}", path, err))?;
            PagerConfig::from_json(&text).map_err(|err| err.to_string())
        }
        None => Ok(PagerConfig::default()),
    }
}

/// Allocates `ITERATIONS` random numbers of one owner and checks that they read back unchanged
fn run_worker(manager: &MemoryManager<FileSwapStoreModule>, worker: u64) -> Result<u64, PageFault> {
    let owner = OwnerId::new(worker);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(worker);
    let mut values = Vec::with_capacity(ITERATIONS);

    for _ in 0..ITERATIONS {
        let value = rng.next_u32() % 100 + 1;
        let address = manager.allocate(core::mem::size_of::<u32>(), owner)?;
        manager.write(address, &value)?;
        values.push((address, value));
    }

    let mut sum = 0;
    for (address, value) in values {
        let stored: u32 = manager.read(address)?;
        if stored != value {
            error!(
                "Worker {} read {} at {}, but wrote {}",
                worker, stored, address, value
            );
        }
        sum += stored as u64;
    }

    manager.unload_owner(owner)?;
    Ok(sum)
}

fn main() -> ExitCode {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Warn)
        .format_module_path(false)
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let store = match FileSwapStoreModule::new(temp_dir().join("worker_demo_swap")) {
        Ok(store) => store,
        Err(err) => {
            error!("Could not create swap directory: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let manager: MemoryManager<FileSwapStoreModule> = match MemoryManager::new(config, store) {
        Ok(manager) => manager,
        Err(err) => {
            error!("Could not create memory manager: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let results: Vec<(u64, Result<u64, PageFault>)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|worker| {
                let manager = &manager;
                (worker, scope.spawn(move || run_worker(manager, worker)))
            })
            .collect();

        handles
            .into_iter()
            .map(|(worker, handle)| {
                let result = handle.join().unwrap_or(Err(PageFault::LockPoisoned));
                (worker, result)
            })
            .collect()
    });

    let mut failed = false;
    for (worker, result) in results {
        match result {
            Ok(sum) => println!("Worker {:>2} finished, sum = {}", worker, sum),
            Err(err) => {
                error!("Worker {} failed: {}", worker, err);
                failed = true;
            }
        }
    }

    match (manager.list_pages(true), manager.stats()) {
        (Ok(pages), Ok(stats)) => {
            for page in pages.iter() {
                println!("{}", page);
            }
            println!(
                "{} pages ({} resident), {} evictions, {} fault-ins",
                stats.total_pages, stats.resident_pages, stats.evictions, stats.fault_ins
            );
        }
        (Err(err), _) | (_, Err(err)) => {
            error!("Could not list pages: {}", err);
            failed = true;
        }
    }

    if let Err(err) = manager.free_all() {
        error!("Could not free pages: {}", err);
        failed = true;
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
