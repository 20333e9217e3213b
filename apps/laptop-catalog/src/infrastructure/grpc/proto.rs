//! Wire messages of `laptop.v1.LaptopService`.
//!
//! Messages are declared directly with prost derives; the service stubs
//! generated by `build.rs` refer to them by path.

// =============================================================================
// Components
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Memory {
    #[prost(uint64, tag = "1")]
    pub value: u64,
    #[prost(enumeration = "memory::Unit", tag = "2")]
    pub unit: i32,
}

pub mod memory {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Unit {
        Unknown = 0,
        Bit = 1,
        Byte = 2,
        Megabyte = 3,
        Gigabyte = 4,
        Terabyte = 5,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cpu {
    #[prost(string, tag = "1")]
    pub brand: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(uint32, tag = "3")]
    pub cores: u32,
    #[prost(uint32, tag = "4")]
    pub threads: u32,
    #[prost(double, tag = "5")]
    pub min_ghz: f64,
    #[prost(double, tag = "6")]
    pub max_ghz: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Gpu {
    #[prost(string, tag = "1")]
    pub brand: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(double, tag = "3")]
    pub min_ghz: f64,
    #[prost(double, tag = "4")]
    pub max_ghz: f64,
    #[prost(message, optional, tag = "5")]
    pub memory: ::core::option::Option<Memory>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Storage {
    #[prost(enumeration = "storage::Driver", tag = "1")]
    pub driver: i32,
    #[prost(message, optional, tag = "2")]
    pub memory: ::core::option::Option<Memory>,
}

pub mod storage {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Driver {
        Unknown = 0,
        Hdd = 1,
        Ssd = 2,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Resolution {
    #[prost(uint32, tag = "1")]
    pub width: u32,
    #[prost(uint32, tag = "2")]
    pub height: u32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Screen {
    #[prost(float, tag = "1")]
    pub size_inch: f32,
    #[prost(message, optional, tag = "2")]
    pub resolution: ::core::option::Option<Resolution>,
    #[prost(enumeration = "screen::Panel", tag = "3")]
    pub panel: i32,
    #[prost(bool, tag = "4")]
    pub multitouch: bool,
}

pub mod screen {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Panel {
        Unknown = 0,
        Ips = 1,
        Oled = 2,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct Keyboard {
    #[prost(enumeration = "keyboard::Layout", tag = "1")]
    pub layout: i32,
    #[prost(bool, tag = "2")]
    pub backlit: bool,
}

pub mod keyboard {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Layout {
        Unknown = 0,
        Qwerty = 1,
        Qwertz = 2,
        Azerty = 3,
    }
}

// =============================================================================
// Laptop
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Laptop {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub brand: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub cpu: ::core::option::Option<Cpu>,
    #[prost(message, optional, tag = "5")]
    pub memory: ::core::option::Option<Memory>,
    #[prost(message, repeated, tag = "6")]
    pub gpus: ::prost::alloc::vec::Vec<Gpu>,
    #[prost(message, repeated, tag = "7")]
    pub storages: ::prost::alloc::vec::Vec<Storage>,
    #[prost(message, optional, tag = "8")]
    pub screen: ::core::option::Option<Screen>,
    #[prost(message, optional, tag = "9")]
    pub keyboard: ::core::option::Option<Keyboard>,
    #[prost(oneof = "laptop::Weight", tags = "10, 11")]
    pub weight: ::core::option::Option<laptop::Weight>,
    #[prost(double, tag = "12")]
    pub price_usd: f64,
    #[prost(int32, tag = "13")]
    pub release_year: i32,
    #[prost(message, optional, tag = "14")]
    pub updated_at: ::core::option::Option<::prost_types::Timestamp>,
}

pub mod laptop {
    #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
    pub enum Weight {
        #[prost(double, tag = "10")]
        WeightKg(f64),
        #[prost(double, tag = "11")]
        WeightLb(f64),
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Filter {
    #[prost(double, tag = "1")]
    pub max_price_usd: f64,
    #[prost(uint32, tag = "2")]
    pub min_cpu_cores: u32,
    #[prost(double, tag = "3")]
    pub min_cpu_ghz: f64,
    #[prost(message, optional, tag = "4")]
    pub min_ram: ::core::option::Option<Memory>,
}

// =============================================================================
// Requests and Responses
// =============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateLaptopRequest {
    #[prost(message, optional, tag = "1")]
    pub laptop: ::core::option::Option<Laptop>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CreateLaptopResponse {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SearchLaptopRequest {
    #[prost(message, optional, tag = "1")]
    pub filter: ::core::option::Option<Filter>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchLaptopResponse {
    #[prost(message, optional, tag = "1")]
    pub laptop: ::core::option::Option<Laptop>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ImageInfo {
    #[prost(string, tag = "1")]
    pub laptop_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub image_type: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UploadImageRequest {
    #[prost(oneof = "upload_image_request::Data", tags = "1, 2")]
    pub data: ::core::option::Option<upload_image_request::Data>,
}

pub mod upload_image_request {
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum Data {
        #[prost(message, tag = "1")]
        Info(super::ImageInfo),
        #[prost(bytes = "vec", tag = "2")]
        ChunkData(::prost::alloc::vec::Vec<u8>),
    }
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct UploadImageResponse {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub size: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RateLaptopRequest {
    #[prost(string, tag = "1")]
    pub laptop_id: ::prost::alloc::string::String,
    #[prost(double, tag = "2")]
    pub score: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RateLaptopResponse {
    #[prost(string, tag = "1")]
    pub laptop_id: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub rated_count: u32,
    #[prost(double, tag = "3")]
    pub average_score: f64,
}

// =============================================================================
// Service Stubs
// =============================================================================

include!(concat!(env!("OUT_DIR"), "/laptop.v1.LaptopService.rs"));
