//! Laptop Catalog Types
//!
//! Domain types for the device records held by the catalog. These types are
//! transport-agnostic: the gRPC layer converts its wire messages into them
//! and back.
//!
//! # Ownership
//!
//! Every type here derives `Clone`, which copies field by field and shares
//! no mutable state with the source. The catalog store relies on this: it
//! keeps its own copy of every saved laptop and hands out fresh copies on
//! every read, so a caller can never mutate what the store holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Memory
// =============================================================================

/// Unit of a memory or storage size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoryUnit {
    /// Unit was not supplied or not recognized.
    #[default]
    Unknown,
    /// Bits.
    Bit,
    /// Bytes.
    Byte,
    /// Megabytes.
    Megabyte,
    /// Gigabytes.
    Gigabyte,
    /// Terabytes.
    Terabyte,
}

impl MemoryUnit {
    /// Get the unit name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Bit => "bit",
            Self::Byte => "byte",
            Self::Megabyte => "megabyte",
            Self::Gigabyte => "gigabyte",
            Self::Terabyte => "terabyte",
        }
    }
}

/// A memory size expressed as a value and a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Memory {
    /// Magnitude in `unit`.
    pub value: u64,
    /// Unit of `value`.
    pub unit: MemoryUnit,
}

impl Memory {
    /// Create a memory size.
    #[must_use]
    pub const fn new(value: u64, unit: MemoryUnit) -> Self {
        Self { value, unit }
    }

    /// Shorthand for a size in gigabytes.
    #[must_use]
    pub const fn gigabytes(value: u64) -> Self {
        Self::new(value, MemoryUnit::Gigabyte)
    }

    /// Shorthand for a size in megabytes.
    #[must_use]
    pub const fn megabytes(value: u64) -> Self {
        Self::new(value, MemoryUnit::Megabyte)
    }
}

impl std::fmt::Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit.as_str())
    }
}

// =============================================================================
// Components
// =============================================================================

/// Central processing unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cpu {
    /// Manufacturer, e.g. "Intel".
    pub brand: String,
    /// Model name.
    pub name: String,
    /// Physical core count.
    pub cores: u32,
    /// Hardware thread count.
    pub threads: u32,
    /// Base clock in GHz.
    pub min_ghz: f64,
    /// Boost clock in GHz.
    pub max_ghz: f64,
}

/// Graphics processing unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Gpu {
    /// Manufacturer, e.g. "NVIDIA".
    pub brand: String,
    /// Model name.
    pub name: String,
    /// Base clock in GHz.
    pub min_ghz: f64,
    /// Boost clock in GHz.
    pub max_ghz: f64,
    /// Dedicated video memory.
    pub memory: Memory,
}

/// Storage driver technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageDriver {
    /// Not supplied.
    #[default]
    Unknown,
    /// Spinning disk.
    Hdd,
    /// Solid state drive.
    Ssd,
}

/// A storage device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Storage {
    /// Driver technology.
    pub driver: StorageDriver,
    /// Capacity.
    pub memory: Memory,
}

/// Screen resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    /// Horizontal pixels.
    pub width: u32,
    /// Vertical pixels.
    pub height: u32,
}

/// Screen panel technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Panel {
    /// Not supplied.
    #[default]
    Unknown,
    /// In-plane switching LCD.
    Ips,
    /// Organic LED.
    Oled,
}

/// Display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Screen {
    /// Diagonal size in inches.
    pub size_inch: f32,
    /// Native resolution.
    pub resolution: Resolution,
    /// Panel technology.
    pub panel: Panel,
    /// Whether the screen accepts touch input.
    pub multitouch: bool,
}

/// Keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyboardLayout {
    /// Not supplied.
    #[default]
    Unknown,
    /// QWERTY.
    Qwerty,
    /// QWERTZ.
    Qwertz,
    /// AZERTY.
    Azerty,
}

/// Keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keyboard {
    /// Key layout.
    pub layout: KeyboardLayout,
    /// Whether keys are backlit.
    pub backlit: bool,
}

/// Laptop weight in one of two units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weight {
    /// Kilograms.
    WeightKg(f64),
    /// Pounds.
    WeightLb(f64),
}

// =============================================================================
// Laptop
// =============================================================================

/// A device record in the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Laptop {
    /// Catalog identity (UUID). Empty until the service assigns one.
    pub id: String,
    /// Manufacturer.
    pub brand: String,
    /// Model name.
    pub name: String,
    /// Processor.
    pub cpu: Cpu,
    /// Installed RAM.
    pub memory: Memory,
    /// Graphics cards.
    pub gpus: Vec<Gpu>,
    /// Storage devices.
    pub storages: Vec<Storage>,
    /// Display.
    pub screen: Screen,
    /// Keyboard.
    pub keyboard: Keyboard,
    /// Weight, if known. Serialized inline as `weight_kg` or `weight_lb`.
    #[serde(flatten)]
    pub weight: Option<Weight>,
    /// Price in USD.
    pub price_usd: f64,
    /// Release year.
    pub release_year: i32,
    /// Last time the record was updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Laptop {
    /// Whether the record already carries an identity.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_laptop() -> Laptop {
        Laptop {
            id: "2b0f3c0e-8a51-4a7c-9d2b-6c1f4f0c9e11".to_string(),
            brand: "Lenovo".to_string(),
            name: "Thinkpad X1".to_string(),
            cpu: Cpu {
                brand: "Intel".to_string(),
                name: "Core i7-1165G7".to_string(),
                cores: 4,
                threads: 8,
                min_ghz: 2.8,
                max_ghz: 4.7,
            },
            memory: Memory::gigabytes(16),
            gpus: vec![Gpu {
                brand: "NVIDIA".to_string(),
                name: "RTX 3050".to_string(),
                min_ghz: 1.2,
                max_ghz: 1.7,
                memory: Memory::gigabytes(4),
            }],
            storages: vec![Storage {
                driver: StorageDriver::Ssd,
                memory: Memory::gigabytes(512),
            }],
            screen: Screen {
                size_inch: 14.0,
                resolution: Resolution {
                    width: 1920,
                    height: 1080,
                },
                panel: Panel::Ips,
                multitouch: false,
            },
            keyboard: Keyboard {
                layout: KeyboardLayout::Qwerty,
                backlit: true,
            },
            weight: Some(Weight::WeightKg(1.3)),
            price_usd: 2100.0,
            release_year: 2021,
            updated_at: None,
        }
    }

    #[test]
    fn clone_is_independent() {
        let original = sample_laptop();
        let mut copy = original.clone();

        copy.gpus[0].name = "changed".to_string();
        copy.storages.clear();
        copy.cpu.cores = 99;

        assert_eq!(original.gpus[0].name, "RTX 3050");
        assert_eq!(original.storages.len(), 1);
        assert_eq!(original.cpu.cores, 4);
    }

    #[test]
    fn has_id() {
        let mut laptop = sample_laptop();
        assert!(laptop.has_id());
        laptop.id.clear();
        assert!(!laptop.has_id());
    }

    #[test]
    fn memory_display() {
        assert_eq!(Memory::gigabytes(16).to_string(), "16 gigabyte");
        assert_eq!(Memory::megabytes(4096).to_string(), "4096 megabyte");
    }

    #[test]
    fn weight_serializes_with_unit_tag() {
        let json = serde_json::to_string(&Weight::WeightKg(1.5)).unwrap();
        assert_eq!(json, r#"{"weight_kg":1.5}"#);
    }

    #[test]
    fn enums_serialize_as_names() {
        assert_eq!(
            serde_json::to_string(&MemoryUnit::Gigabyte).unwrap(),
            "\"GIGABYTE\""
        );
        assert_eq!(
            serde_json::to_string(&StorageDriver::Ssd).unwrap(),
            "\"SSD\""
        );
    }
}
