//! Build Script for Laptop Catalog
//!
//! Generates the `LaptopService` gRPC client and server stubs. Message types
//! are plain prost structs in `src/infrastructure/grpc/proto.rs`, so the
//! service is described with tonic's manual builder and no `protoc` or
//! `.proto` files are required.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let method = |name: &str, route: &str, input: &str, output: &str| {
        tonic_build::manual::Method::builder()
            .name(name)
            .route_name(route)
            .input_type(format!("crate::infrastructure::grpc::proto::{input}"))
            .output_type(format!("crate::infrastructure::grpc::proto::{output}"))
            .codec_path("tonic_prost::ProstCodec")
    };

    let service = tonic_build::manual::Service::builder()
        .name("LaptopService")
        .package("laptop.v1")
        .method(
            method(
                "create_laptop",
                "CreateLaptop",
                "CreateLaptopRequest",
                "CreateLaptopResponse",
            )
            .build(),
        )
        .method(
            method(
                "search_laptop",
                "SearchLaptop",
                "SearchLaptopRequest",
                "SearchLaptopResponse",
            )
            .server_streaming()
            .build(),
        )
        .method(
            method(
                "upload_image",
                "UploadImage",
                "UploadImageRequest",
                "UploadImageResponse",
            )
            .client_streaming()
            .build(),
        )
        .method(
            method(
                "rate_laptop",
                "RateLaptop",
                "RateLaptopRequest",
                "RateLaptopResponse",
            )
            .client_streaming()
            .server_streaming()
            .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
