//! Conversions between wire messages and domain types.
//!
//! Decoding is lenient the same way protobuf itself is: a missing
//! sub-message becomes the domain default and an unrecognized enum value
//! becomes `Unknown`.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;

use super::proto;
use crate::domain::filter::Filter;
use crate::domain::image::{ImageInfo, UploadImageMessage};
use crate::domain::laptop::{
    Cpu, Gpu, Keyboard, KeyboardLayout, Laptop, Memory, MemoryUnit, Panel, Resolution, Screen,
    Storage, StorageDriver, Weight,
};
use crate::domain::rating::{RatingRequest, RatingSummary};

// =============================================================================
// Enumerations
// =============================================================================

const fn memory_unit_from_proto(unit: proto::memory::Unit) -> MemoryUnit {
    match unit {
        proto::memory::Unit::Unknown => MemoryUnit::Unknown,
        proto::memory::Unit::Bit => MemoryUnit::Bit,
        proto::memory::Unit::Byte => MemoryUnit::Byte,
        proto::memory::Unit::Megabyte => MemoryUnit::Megabyte,
        proto::memory::Unit::Gigabyte => MemoryUnit::Gigabyte,
        proto::memory::Unit::Terabyte => MemoryUnit::Terabyte,
    }
}

const fn memory_unit_to_proto(unit: MemoryUnit) -> proto::memory::Unit {
    match unit {
        MemoryUnit::Unknown => proto::memory::Unit::Unknown,
        MemoryUnit::Bit => proto::memory::Unit::Bit,
        MemoryUnit::Byte => proto::memory::Unit::Byte,
        MemoryUnit::Megabyte => proto::memory::Unit::Megabyte,
        MemoryUnit::Gigabyte => proto::memory::Unit::Gigabyte,
        MemoryUnit::Terabyte => proto::memory::Unit::Terabyte,
    }
}

const fn driver_from_proto(driver: proto::storage::Driver) -> StorageDriver {
    match driver {
        proto::storage::Driver::Unknown => StorageDriver::Unknown,
        proto::storage::Driver::Hdd => StorageDriver::Hdd,
        proto::storage::Driver::Ssd => StorageDriver::Ssd,
    }
}

const fn driver_to_proto(driver: StorageDriver) -> proto::storage::Driver {
    match driver {
        StorageDriver::Unknown => proto::storage::Driver::Unknown,
        StorageDriver::Hdd => proto::storage::Driver::Hdd,
        StorageDriver::Ssd => proto::storage::Driver::Ssd,
    }
}

const fn panel_from_proto(panel: proto::screen::Panel) -> Panel {
    match panel {
        proto::screen::Panel::Unknown => Panel::Unknown,
        proto::screen::Panel::Ips => Panel::Ips,
        proto::screen::Panel::Oled => Panel::Oled,
    }
}

const fn panel_to_proto(panel: Panel) -> proto::screen::Panel {
    match panel {
        Panel::Unknown => proto::screen::Panel::Unknown,
        Panel::Ips => proto::screen::Panel::Ips,
        Panel::Oled => proto::screen::Panel::Oled,
    }
}

const fn layout_from_proto(layout: proto::keyboard::Layout) -> KeyboardLayout {
    match layout {
        proto::keyboard::Layout::Unknown => KeyboardLayout::Unknown,
        proto::keyboard::Layout::Qwerty => KeyboardLayout::Qwerty,
        proto::keyboard::Layout::Qwertz => KeyboardLayout::Qwertz,
        proto::keyboard::Layout::Azerty => KeyboardLayout::Azerty,
    }
}

const fn layout_to_proto(layout: KeyboardLayout) -> proto::keyboard::Layout {
    match layout {
        KeyboardLayout::Unknown => proto::keyboard::Layout::Unknown,
        KeyboardLayout::Qwerty => proto::keyboard::Layout::Qwerty,
        KeyboardLayout::Qwertz => proto::keyboard::Layout::Qwertz,
        KeyboardLayout::Azerty => proto::keyboard::Layout::Azerty,
    }
}

// =============================================================================
// Components
// =============================================================================

impl From<proto::Memory> for Memory {
    fn from(memory: proto::Memory) -> Self {
        Self::new(memory.value, memory_unit_from_proto(memory.unit()))
    }
}

impl From<Memory> for proto::Memory {
    fn from(memory: Memory) -> Self {
        Self {
            value: memory.value,
            unit: memory_unit_to_proto(memory.unit).into(),
        }
    }
}

fn memory_or_default(memory: Option<proto::Memory>) -> Memory {
    memory.map(Memory::from).unwrap_or_default()
}

impl From<proto::Cpu> for Cpu {
    fn from(cpu: proto::Cpu) -> Self {
        Self {
            brand: cpu.brand,
            name: cpu.name,
            cores: cpu.cores,
            threads: cpu.threads,
            min_ghz: cpu.min_ghz,
            max_ghz: cpu.max_ghz,
        }
    }
}

impl From<Cpu> for proto::Cpu {
    fn from(cpu: Cpu) -> Self {
        Self {
            brand: cpu.brand,
            name: cpu.name,
            cores: cpu.cores,
            threads: cpu.threads,
            min_ghz: cpu.min_ghz,
            max_ghz: cpu.max_ghz,
        }
    }
}

impl From<proto::Gpu> for Gpu {
    fn from(gpu: proto::Gpu) -> Self {
        Self {
            brand: gpu.brand,
            name: gpu.name,
            min_ghz: gpu.min_ghz,
            max_ghz: gpu.max_ghz,
            memory: memory_or_default(gpu.memory),
        }
    }
}

impl From<Gpu> for proto::Gpu {
    fn from(gpu: Gpu) -> Self {
        Self {
            brand: gpu.brand,
            name: gpu.name,
            min_ghz: gpu.min_ghz,
            max_ghz: gpu.max_ghz,
            memory: Some(gpu.memory.into()),
        }
    }
}

impl From<proto::Storage> for Storage {
    fn from(storage: proto::Storage) -> Self {
        Self {
            driver: driver_from_proto(storage.driver()),
            memory: memory_or_default(storage.memory),
        }
    }
}

impl From<Storage> for proto::Storage {
    fn from(storage: Storage) -> Self {
        Self {
            driver: driver_to_proto(storage.driver).into(),
            memory: Some(storage.memory.into()),
        }
    }
}

impl From<proto::Screen> for Screen {
    fn from(screen: proto::Screen) -> Self {
        let resolution = screen.resolution.unwrap_or_default();
        Self {
            size_inch: screen.size_inch,
            resolution: Resolution {
                width: resolution.width,
                height: resolution.height,
            },
            panel: panel_from_proto(screen.panel()),
            multitouch: screen.multitouch,
        }
    }
}

impl From<Screen> for proto::Screen {
    fn from(screen: Screen) -> Self {
        Self {
            size_inch: screen.size_inch,
            resolution: Some(proto::Resolution {
                width: screen.resolution.width,
                height: screen.resolution.height,
            }),
            panel: panel_to_proto(screen.panel).into(),
            multitouch: screen.multitouch,
        }
    }
}

impl From<proto::Keyboard> for Keyboard {
    fn from(keyboard: proto::Keyboard) -> Self {
        Self {
            layout: layout_from_proto(keyboard.layout()),
            backlit: keyboard.backlit,
        }
    }
}

impl From<Keyboard> for proto::Keyboard {
    fn from(keyboard: Keyboard) -> Self {
        Self {
            layout: layout_to_proto(keyboard.layout).into(),
            backlit: keyboard.backlit,
        }
    }
}

// =============================================================================
// Laptop
// =============================================================================

fn timestamp_to_datetime(ts: &Timestamp) -> Option<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos).ok()?;
    DateTime::from_timestamp(ts.seconds, nanos)
}

fn datetime_to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: i32::try_from(dt.timestamp_subsec_nanos()).unwrap_or(i32::MAX),
    }
}

impl From<proto::Laptop> for Laptop {
    fn from(laptop: proto::Laptop) -> Self {
        Self {
            id: laptop.id,
            brand: laptop.brand,
            name: laptop.name,
            cpu: laptop.cpu.map(Cpu::from).unwrap_or_default(),
            memory: memory_or_default(laptop.memory),
            gpus: laptop.gpus.into_iter().map(Gpu::from).collect(),
            storages: laptop.storages.into_iter().map(Storage::from).collect(),
            screen: laptop.screen.map(Screen::from).unwrap_or_default(),
            keyboard: laptop.keyboard.map(Keyboard::from).unwrap_or_default(),
            weight: laptop.weight.map(|weight| match weight {
                proto::laptop::Weight::WeightKg(kg) => Weight::WeightKg(kg),
                proto::laptop::Weight::WeightLb(lb) => Weight::WeightLb(lb),
            }),
            price_usd: laptop.price_usd,
            release_year: laptop.release_year,
            updated_at: laptop.updated_at.as_ref().and_then(timestamp_to_datetime),
        }
    }
}

impl From<Laptop> for proto::Laptop {
    fn from(laptop: Laptop) -> Self {
        Self {
            id: laptop.id,
            brand: laptop.brand,
            name: laptop.name,
            cpu: Some(laptop.cpu.into()),
            memory: Some(laptop.memory.into()),
            gpus: laptop.gpus.into_iter().map(proto::Gpu::from).collect(),
            storages: laptop
                .storages
                .into_iter()
                .map(proto::Storage::from)
                .collect(),
            screen: Some(laptop.screen.into()),
            keyboard: Some(laptop.keyboard.into()),
            weight: laptop.weight.map(|weight| match weight {
                Weight::WeightKg(kg) => proto::laptop::Weight::WeightKg(kg),
                Weight::WeightLb(lb) => proto::laptop::Weight::WeightLb(lb),
            }),
            price_usd: laptop.price_usd,
            release_year: laptop.release_year,
            updated_at: laptop.updated_at.map(datetime_to_timestamp),
        }
    }
}

impl From<proto::Filter> for Filter {
    fn from(filter: proto::Filter) -> Self {
        Self {
            max_price_usd: filter.max_price_usd,
            min_cpu_cores: filter.min_cpu_cores,
            min_cpu_ghz: filter.min_cpu_ghz,
            min_ram: filter.min_ram.map(Memory::from),
        }
    }
}

impl From<Filter> for proto::Filter {
    fn from(filter: Filter) -> Self {
        Self {
            max_price_usd: filter.max_price_usd,
            min_cpu_cores: filter.min_cpu_cores,
            min_cpu_ghz: filter.min_cpu_ghz,
            min_ram: filter.min_ram.map(proto::Memory::from),
        }
    }
}

// =============================================================================
// Streaming Messages
// =============================================================================

/// A request without data reads as an empty chunk, so it is rejected as
/// the opening message and ignored afterwards.
impl From<proto::UploadImageRequest> for UploadImageMessage {
    fn from(request: proto::UploadImageRequest) -> Self {
        match request.data {
            Some(proto::upload_image_request::Data::Info(info)) => Self::Info(ImageInfo {
                laptop_id: info.laptop_id,
                image_type: info.image_type,
            }),
            Some(proto::upload_image_request::Data::ChunkData(chunk)) => Self::Chunk(chunk),
            None => Self::Chunk(Vec::new()),
        }
    }
}

impl From<proto::RateLaptopRequest> for RatingRequest {
    fn from(request: proto::RateLaptopRequest) -> Self {
        Self {
            laptop_id: request.laptop_id,
            score: request.score,
        }
    }
}

impl From<RatingSummary> for proto::RateLaptopResponse {
    fn from(summary: RatingSummary) -> Self {
        Self {
            laptop_id: summary.laptop_id,
            rated_count: summary.rated_count,
            average_score: summary.average_score,
        }
    }
}
