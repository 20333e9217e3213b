//! Search Filter
//!
//! Stateless predicate deciding whether a laptop qualifies for a search.
//!
//! # Memory Normalization
//!
//! Memory sizes are compared in a common bit base using fixed shifts:
//!
//! | Unit | Factor |
//! |------|--------|
//! | bit | 1 |
//! | byte | 2^3 |
//! | megabyte | 2^23 |
//! | gigabyte | 2^33 |
//! | terabyte | 2^43 |
//! | unknown | 0 |
//!
//! These are binary multiples: a "megabyte" here is 2^20 bytes. Do not
//! change the factors; existing filters and records compare against them.

use serde::{Deserialize, Serialize};

use super::laptop::{Laptop, Memory, MemoryUnit};

/// Search criteria. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Filter {
    /// Highest acceptable price in USD.
    pub max_price_usd: f64,
    /// Fewest acceptable CPU cores.
    pub min_cpu_cores: u32,
    /// Lowest acceptable CPU base clock in GHz.
    pub min_cpu_ghz: f64,
    /// Smallest acceptable RAM. `None` means no minimum.
    pub min_ram: Option<Memory>,
}

/// Shift applied to a value of `unit` to express it in bits.
const fn bit_shift(unit: MemoryUnit) -> Option<u32> {
    match unit {
        MemoryUnit::Bit => Some(0),
        MemoryUnit::Byte => Some(3),
        MemoryUnit::Megabyte => Some(23),
        MemoryUnit::Gigabyte => Some(33),
        MemoryUnit::Terabyte => Some(43),
        MemoryUnit::Unknown => None,
    }
}

/// Convert a memory size to bits.
///
/// Saturates at `u64::MAX` so the result stays monotonic in `value`.
#[must_use]
pub const fn to_bits(memory: &Memory) -> u64 {
    match bit_shift(memory.unit) {
        Some(shift) => memory.value.saturating_mul(1 << shift),
        None => 0,
    }
}

/// Check whether `laptop` satisfies every bound of `filter`.
#[must_use]
pub fn matches(filter: &Filter, laptop: &Laptop) -> bool {
    if laptop.price_usd > filter.max_price_usd {
        return false;
    }

    if laptop.cpu.cores < filter.min_cpu_cores {
        return false;
    }

    if laptop.cpu.min_ghz < filter.min_cpu_ghz {
        return false;
    }

    let min_ram_bits = filter.min_ram.as_ref().map_or(0, to_bits);
    to_bits(&laptop.memory) >= min_ram_bits
}

// =============================================================================
// Tests
// =============================================================================
