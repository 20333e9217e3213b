//! gRPC Bidirectional Streaming Integration Tests
//!
//! Tests `RateLaptop` end to end: replies follow request order, concurrent
//! raters share one aggregate, and failures end the stream with a status.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Code, Request};
use tonic::transport::{Channel, Server};

use laptop_catalog::domain::laptop::Laptop;
use laptop_catalog::proto::{CreateLaptopRequest, RateLaptopRequest, RateLaptopResponse};
use laptop_catalog::{
    CatalogService, DiskImageStore, InMemoryLaptopStore, InMemoryRatingStore, LaptopServer,
    LaptopServiceClient, LaptopServiceServer,
};

/// Start a catalog server on a random port and return a connected client.
async fn setup_test_server() -> (LaptopServiceClient<Channel>, tokio::task::JoinHandle<()>) {
    let service = CatalogService::new(
        Arc::new(InMemoryLaptopStore::new()),
        Arc::new(DiskImageStore::new(std::env::temp_dir().join("laptop-catalog-tests"))),
        Arc::new(InMemoryRatingStore::new()),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server_handle = tokio::spawn(async move {
        Server::builder()
            .add_service(LaptopServiceServer::new(
                LaptopServer::new(service).with_stream_buffer(4),
            ))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    let client = LaptopServiceClient::connect(format!("http://{addr}"))
        .await
        .unwrap();

    (client, server_handle)
}

async fn create_laptop(client: &mut LaptopServiceClient<Channel>) -> String {
    let laptop = Laptop {
        brand: "Apple".to_string(),
        name: "MacBook Air".to_string(),
        price_usd: 1200.0,
        ..Laptop::default()
    };

    client
        .create_laptop(CreateLaptopRequest {
            laptop: Some(laptop.into()),
        })
        .await
        .unwrap()
        .into_inner()
        .id
}

fn rate(laptop_id: &str, score: f64) -> RateLaptopRequest {
    RateLaptopRequest {
        laptop_id: laptop_id.to_string(),
        score,
    }
}

/// Rate once on a fresh stream and return the single reply.
async fn rate_once(
    mut client: LaptopServiceClient<Channel>,
    laptop_id: String,
    score: f64,
) -> RateLaptopResponse {
    let mut replies = client
        .rate_laptop(tokio_stream::iter(vec![rate(&laptop_id, score)]))
        .await
        .unwrap()
        .into_inner();

    let reply = replies.message().await.unwrap().expect("one reply");
    assert!(replies.message().await.unwrap().is_none());
    reply
}

#[tokio::test]
async fn test_rate_replies_in_request_order() {
    let (mut client, handle) = setup_test_server().await;

    let first = create_laptop(&mut client).await;
    let second = create_laptop(&mut client).await;

    let requests = vec![
        rate(&first, 8.0),
        rate(&second, 3.0),
        rate(&first, 6.0),
        rate(&first, 10.0),
    ];
    let mut replies = client
        .rate_laptop(tokio_stream::iter(requests))
        .await
        .unwrap()
        .into_inner();

    let mut received = Vec::new();
    while let Some(reply) = timeout(Duration::from_secs(2), replies.message())
        .await
        .expect("timeout waiting for ratings")
        .unwrap()
    {
        received.push((reply.laptop_id, reply.rated_count, reply.average_score));
    }

    assert_eq!(
        received,
        vec![
            (first.clone(), 1, 8.0),
            (second, 1, 3.0),
            (first.clone(), 2, 7.0),
            (first, 3, 8.0),
        ]
    );

    handle.abort();
}

#[tokio::test]
async fn test_rate_replies_interleave_with_requests() {
    let (mut client, handle) = setup_test_server().await;

    let laptop_id = create_laptop(&mut client).await;
    let (tx, rx) = mpsc::channel(4);

    let mut replies = client
        .rate_laptop(ReceiverStream::new(rx))
        .await
        .unwrap()
        .into_inner();

    tx.send(rate(&laptop_id, 2.0)).await.unwrap();
    let reply = timeout(Duration::from_secs(2), replies.message())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!((reply.rated_count, reply.average_score), (1, 2.0));

    tx.send(rate(&laptop_id, 4.0)).await.unwrap();
    let reply = timeout(Duration::from_secs(2), replies.message())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!((reply.rated_count, reply.average_score), (2, 3.0));

    drop(tx);
    assert!(replies.message().await.unwrap().is_none());

    handle.abort();
}

#[tokio::test]
async fn test_concurrent_raters_share_aggregate() {
    let (mut client, handle) = setup_test_server().await;

    let laptop_id = create_laptop(&mut client).await;

    let (a, b) = tokio::join!(
        rate_once(client.clone(), laptop_id.clone(), 4.0),
        rate_once(client.clone(), laptop_id.clone(), 5.0),
    );

    let mut counts = [a.rated_count, b.rated_count];
    counts.sort_unstable();
    assert_eq!(counts, [1, 2]);

    let last = if a.rated_count == 2 { a } else { b };
    assert_eq!(last.average_score, 4.5);

    handle.abort();
}

#[tokio::test]
async fn test_rate_unknown_laptop_ends_stream_with_status() {
    let (mut client, handle) = setup_test_server().await;

    let known = create_laptop(&mut client).await;
    let unknown = uuid::Uuid::new_v4().to_string();

    let mut replies = client
        .rate_laptop(tokio_stream::iter(vec![
            rate(&known, 5.0),
            rate(&unknown, 5.0),
            rate(&known, 1.0),
        ]))
        .await
        .unwrap()
        .into_inner();

    let reply = replies.message().await.unwrap().unwrap();
    assert_eq!(reply.laptop_id, known);

    let status = replies.message().await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(status.message().contains(&unknown));

    handle.abort();
}

#[tokio::test]
async fn test_rate_empty_stream_ends_without_replies() {
    let (mut client, handle) = setup_test_server().await;

    let mut replies = client
        .rate_laptop(tokio_stream::iter(Vec::<RateLaptopRequest>::new()))
        .await
        .unwrap()
        .into_inner();

    assert!(replies.message().await.unwrap().is_none());

    handle.abort();
}

#[tokio::test]
async fn test_idle_rater_past_deadline_gets_deadline_exceeded() {
    let (mut client, handle) = setup_test_server().await;

    let laptop_id = create_laptop(&mut client).await;
    let (tx, rx) = mpsc::channel(4);

    let mut request = Request::new(ReceiverStream::new(rx));
    request.set_timeout(Duration::from_millis(200));
    let mut replies = client.rate_laptop(request).await.unwrap().into_inner();

    tx.send(rate(&laptop_id, 7.0)).await.unwrap();
    let reply = timeout(Duration::from_secs(2), replies.message())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(reply.rated_count, 1);

    // The request stream stays open but idle until the deadline passes.
    let status = timeout(Duration::from_secs(5), replies.message())
        .await
        .expect("deadline should end the stream")
        .unwrap_err();
    assert_eq!(status.code(), Code::DeadlineExceeded);

    drop(tx);
    handle.abort();
}
