//! Deterministic laptop fixtures shared by unit tests.

use uuid::Uuid;

use crate::domain::laptop::{
    Cpu, Gpu, Keyboard, KeyboardLayout, Laptop, Memory, Panel, Resolution, Screen, Storage,
    StorageDriver, Weight,
};

/// A fully populated laptop with a fresh identity.
pub fn sample_laptop() -> Laptop {
    Laptop {
        id: Uuid::new_v4().to_string(),
        brand: "Dell".to_string(),
        name: "XPS 13".to_string(),
        cpu: Cpu {
            brand: "Intel".to_string(),
            name: "Core i7-1185G7".to_string(),
            cores: 4,
            threads: 8,
            min_ghz: 3.0,
            max_ghz: 4.8,
        },
        memory: Memory::gigabytes(16),
        gpus: vec![Gpu {
            brand: "NVIDIA".to_string(),
            name: "GTX 1660-Ti".to_string(),
            min_ghz: 1.0,
            max_ghz: 1.5,
            memory: Memory::gigabytes(4),
        }],
        storages: vec![
            Storage {
                driver: StorageDriver::Ssd,
                memory: Memory::gigabytes(256),
            },
            Storage {
                driver: StorageDriver::Hdd,
                memory: Memory::gigabytes(1024),
            },
        ],
        screen: Screen {
            size_inch: 13.4,
            resolution: Resolution {
                width: 1920,
                height: 1200,
            },
            panel: Panel::Ips,
            multitouch: true,
        },
        keyboard: Keyboard {
            layout: KeyboardLayout::Qwerty,
            backlit: true,
        },
        weight: Some(Weight::WeightKg(1.2)),
        price_usd: 1999.0,
        release_year: 2021,
        updated_at: None,
    }
}

/// A laptop with a fresh identity and the given search-relevant specs.
pub fn laptop_with(price_usd: f64, cores: u32, min_ghz: f64, ram: Memory) -> Laptop {
    let mut laptop = sample_laptop();
    laptop.price_usd = price_usd;
    laptop.cpu.cores = cores;
    laptop.cpu.threads = cores * 2;
    laptop.cpu.min_ghz = min_ghz;
    laptop.cpu.max_ghz = min_ghz + 1.0;
    laptop.memory = ram;
    laptop
}
