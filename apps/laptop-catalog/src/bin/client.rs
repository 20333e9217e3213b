//! Laptop Catalog Demo Client
//!
//! Exercises all four RPCs against a running catalog: creates a few
//! laptops, searches them, uploads an image for one and rates them.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin laptop-catalog-client
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_ADDR`: Server address (default: <http://127.0.0.1:50051>)
//! - `CATALOG_DEMO_IMAGE`: Image file to upload (default: a generated blob)
//! - `RUST_LOG`: Log level (default: info)

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use laptop_catalog::LaptopServiceClient;
use laptop_catalog::domain::laptop::{Cpu, Laptop, Memory, Storage, StorageDriver, Weight};
use laptop_catalog::proto::{
    self, CreateLaptopRequest, ImageInfo, RateLaptopRequest, SearchLaptopRequest,
    UploadImageRequest, upload_image_request::Data,
};
use tonic::transport::Channel;
use tonic::{Code, Request};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "http://127.0.0.1:50051";
const CALL_TIMEOUT: Duration = Duration::from_secs(5);
const CHUNK_SIZE: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("CATALOG_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let mut client = LaptopServiceClient::connect(addr.clone())
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;

    let mut ids = Vec::new();
    for (price, cores, ghz, ram_gb) in [
        (1299.0, 4, 2.4, 8),
        (2499.0, 8, 3.1, 32),
        (899.0, 2, 1.6, 4),
    ] {
        let laptop = demo_laptop(price, cores, ghz, ram_gb);
        if let Some(id) = create_laptop(&mut client, laptop).await? {
            ids.push(id);
        }
    }

    search_laptops(&mut client).await?;

    if let Some(first) = ids.first() {
        let image = match std::env::var("CATALOG_DEMO_IMAGE") {
            Ok(path) => load_image(Path::new(&path))?,
            Err(_) => (".jpg".to_string(), vec![0xAB; 3 * CHUNK_SIZE + 17]),
        };
        upload_image(&mut client, first, image).await?;
    }

    rate_laptops(&mut client, &ids).await?;

    Ok(())
}

fn demo_laptop(price: f64, cores: u32, ghz: f64, ram_gb: u64) -> proto::Laptop {
    Laptop {
        brand: "Lenovo".to_string(),
        name: format!("Thinkpad {cores}c"),
        cpu: Cpu {
            brand: "Intel".to_string(),
            name: "Core".to_string(),
            cores,
            threads: cores * 2,
            min_ghz: ghz,
            max_ghz: ghz + 1.2,
        },
        memory: Memory::gigabytes(ram_gb),
        storages: vec![Storage {
            driver: StorageDriver::Ssd,
            memory: Memory::gigabytes(512),
        }],
        weight: Some(Weight::WeightKg(1.4)),
        price_usd: price,
        release_year: 2022,
        ..Laptop::default()
    }
    .into()
}

async fn create_laptop(
    client: &mut LaptopServiceClient<Channel>,
    laptop: proto::Laptop,
) -> anyhow::Result<Option<String>> {
    let mut request = Request::new(CreateLaptopRequest {
        laptop: Some(laptop),
    });
    request.set_timeout(CALL_TIMEOUT);

    match client.create_laptop(request).await {
        Ok(response) => {
            let id = response.into_inner().id;
            tracing::info!(id = %id, "Created laptop");
            Ok(Some(id))
        }
        Err(status) if status.code() == Code::AlreadyExists => {
            tracing::info!("Laptop already exists");
            Ok(None)
        }
        Err(status) => Err(status).context("create laptop failed"),
    }
}

async fn search_laptops(client: &mut LaptopServiceClient<Channel>) -> anyhow::Result<()> {
    let filter = proto::Filter {
        max_price_usd: 3000.0,
        min_cpu_cores: 4,
        min_cpu_ghz: 2.0,
        min_ram: Some(Memory::gigabytes(8).into()),
    };
    tracing::info!(?filter, "Searching");

    let mut request = Request::new(SearchLaptopRequest {
        filter: Some(filter),
    });
    request.set_timeout(CALL_TIMEOUT);

    let mut stream = client
        .search_laptop(request)
        .await
        .context("search laptop failed")?
        .into_inner();

    let mut found = 0usize;
    while let Some(response) = stream.message().await.context("search stream failed")? {
        let Some(laptop) = response.laptop else {
            continue;
        };
        found += 1;
        tracing::info!(
            n = found,
            id = %laptop.id,
            name = %laptop.name,
            cores = laptop.cpu.as_ref().map_or(0, |cpu| cpu.cores),
            price_usd = laptop.price_usd,
            "Found laptop"
        );
    }
    tracing::info!(found, "Search finished");
    Ok(())
}

fn load_image(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let image_type = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    Ok((image_type, bytes))
}

async fn upload_image(
    client: &mut LaptopServiceClient<Channel>,
    laptop_id: &str,
    (image_type, bytes): (String, Vec<u8>),
) -> anyhow::Result<()> {
    let mut messages = vec![UploadImageRequest {
        data: Some(Data::Info(ImageInfo {
            laptop_id: laptop_id.to_string(),
            image_type,
        })),
    }];
    messages.extend(bytes.chunks(CHUNK_SIZE).map(|chunk| UploadImageRequest {
        data: Some(Data::ChunkData(chunk.to_vec())),
    }));

    let mut request = Request::new(tokio_stream::iter(messages));
    request.set_timeout(CALL_TIMEOUT);

    let response = client
        .upload_image(request)
        .await
        .context("upload image failed")?
        .into_inner();
    tracing::info!(id = %response.id, size = response.size, "Uploaded image");
    Ok(())
}

async fn rate_laptops(
    client: &mut LaptopServiceClient<Channel>,
    laptop_ids: &[String],
) -> anyhow::Result<()> {
    let requests: Vec<RateLaptopRequest> = laptop_ids
        .iter()
        .zip([8.0, 6.5, 9.0].into_iter().cycle())
        .map(|(laptop_id, score)| RateLaptopRequest {
            laptop_id: laptop_id.clone(),
            score,
        })
        .collect();

    let mut request = Request::new(tokio_stream::iter(requests));
    request.set_timeout(CALL_TIMEOUT);

    let mut replies = client
        .rate_laptop(request)
        .await
        .context("rate laptop failed")?
        .into_inner();

    while let Some(reply) = replies.message().await.context("rating stream failed")? {
        tracing::info!(
            laptop_id = %reply.laptop_id,
            rated_count = reply.rated_count,
            average_score = reply.average_score,
            "Rated laptop"
        );
    }
    Ok(())
}
