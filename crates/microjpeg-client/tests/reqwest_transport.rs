//! `ApiClient` over the real reqwest transport, against mockito servers.

use std::time::Duration;

use microjpeg_client::{
    ApiClient, ClientConfig, ClientError, CompressOptions, EnhanceOptions, EnhanceScale,
    ResizeMode, TransportError,
};
use mockito::Matcher;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const AUTH: &str = "Basic YXBpOnRlc3QtYXBpLWtleQ==";

fn client_for(server: &mockito::ServerGuard) -> ApiClient {
    let config = ClientConfig::new("test-api-key").with_base_url(format!("{}/v1/", server.url()));
    ApiClient::from_config(config).unwrap()
}

fn compression_body(download_url: &str, count: u64) -> String {
    json!({
        "success": true,
        "result": {
            "downloadUrl": download_url,
            "originalSize": 1000,
            "compressedSize": 400,
            "savingsPercent": 60,
            "processingTime": 120
        },
        "compressionCount": count
    })
    .to_string()
}

#[tokio::test]
async fn multipart_compress_sends_auth_file_and_options() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/compress")
        .match_header("authorization", AUTH)
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="photo.jpg""#.to_string()),
            Matcher::Regex(r"(?i)content-type: image/jpeg".to_string()),
            Matcher::Regex("fake-jpeg-data".to_string()),
            Matcher::Regex("name=\"quality\"\r\n\r\n80\r\n".to_string()),
            Matcher::Regex("name=\"mode\"\r\n\r\nscaleheight\r\n".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(compression_body("https://cdn.test/out.jpg", 5))
        .create_async()
        .await;

    let client = client_for(&server);
    let options = CompressOptions::new()
        .quality(80)
        .resize_mode(ResizeMode::ScaleHeight);
    let envelope = client
        .compress_bytes(&b"fake-jpeg-data"[..], "photo.jpg", Some(&options))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(envelope.result.savings_percent, 60.0);
    assert_eq!(client.compression_count(), 5);
}

#[tokio::test]
async fn url_compress_sends_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/compress")
        .match_header("authorization", AUTH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "url": "https://example.com/cat.png",
            "format": "webp"
        })))
        .with_status(200)
        .with_body(compression_body("https://cdn.test/cat.webp", 9))
        .create_async()
        .await;

    let client = client_for(&server);
    let options = CompressOptions::new().output_format("webp");
    let envelope = client
        .compress_url("https://example.com/cat.png", Some(&options))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(envelope.compression_count, 9);
}

#[tokio::test]
async fn enhance_sends_scale_and_face_enhance() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/enhance")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("name=\"scale\"\r\n\r\n4\r\n".to_string()),
            Matcher::Regex("name=\"face_enhance\"\r\n\r\ntrue\r\n".to_string()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "result": {
                    "downloadUrl": "https://cdn.test/e.png",
                    "originalDimensions": {"width": 10, "height": 20},
                    "newDimensions": {"width": 40, "height": 80},
                    "processingTime": 50
                },
                "compressionCount": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let options = EnhanceOptions {
        scale: EnhanceScale::X4,
        face_enhance: true,
        ..EnhanceOptions::default()
    };
    let envelope = client
        .enhance_bytes(&b"img"[..], "face.png", Some(&options))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(envelope.result.new_dimensions.height, 80);
}

#[tokio::test]
async fn usage_error_is_normalized() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/usage")
        .match_header("authorization", AUTH)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"unauthorized","message":"Invalid API key"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.get_usage().await.unwrap_err();

    mock.assert_async().await;
    let api = err.api_error().expect("expected ApiError");
    assert_eq!(api.status_code, 401);
    assert_eq!(api.error_code, "unauthorized");
    assert!(api.is_unauthorized());
}

#[tokio::test]
async fn html_error_page_is_kept_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let page = "<html><body>Bad Gateway</body></html>";
    server
        .mock("POST", "/v1/remove-background")
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body(page)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .remove_background_bytes(&b"img"[..], "a.jpg", None)
        .await
        .unwrap_err();

    let api = err.api_error().expect("expected ApiError");
    assert_eq!(api.status_code, 502);
    assert_eq!(api.error_code, "unknown_error");
    assert_eq!(api.error_message, page);
}

#[tokio::test]
async fn artifact_download_without_credentials() {
    let mut server = mockito::Server::new_async().await;
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 256) as u8).collect();
    let mock = server
        .mock("GET", "/files/out.jpg")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(&payload)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    let url = format!("{}/files/out.jpg", server.url());

    let bytes = client.download(url.as_str()).await.unwrap();
    assert_eq!(bytes.len(), payload.len());

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.jpg");
    let written = client.save_to_file(url.as_str(), &output).await.unwrap();
    assert_eq!(written, payload.len() as u64);
    assert_eq!(tokio::fs::read(&output).await.unwrap(), payload);

    mock.assert_async().await;
}

#[tokio::test]
async fn artifact_not_found_is_transport_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/files/gone.jpg")
        .with_status(404)
        .with_body(r#"{"error":"not_found","message":"expired"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let url = format!("{}/files/gone.jpg", server.url());
    let err = client.download(url.as_str()).await.unwrap_err();

    match err {
        ClientError::Transport(TransportError::Status { status, .. }) => {
            assert_eq!(status.as_u16(), 404)
        }
        other => panic!("expected transport status error, got {:?}", other),
    }
}

/// One-shot HTTP server that answers a single request with `content_length`
/// declared and `chunks` written `gap` apart, then closes the connection.
async fn trickle_server(
    content_length: usize,
    chunks: Vec<&'static [u8]>,
    gap: Duration,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/octet-stream\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            content_length
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        for (i, chunk) in chunks.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(gap).await;
            }
            if socket.write_all(chunk).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }
        let _ = socket.shutdown().await;
    });

    format!("http://{}", addr)
}

fn client_with_timeout(base_url: &str, timeout: Duration) -> ApiClient {
    let config = ClientConfig::new("test-api-key")
        .with_base_url(format!("{}/v1", base_url))
        .with_timeout(timeout);
    ApiClient::from_config(config).unwrap()
}

const CHUNKS: [&[u8]; 3] = [b"0123456789", b"abcdefghij", b"ABCDEFGHIJ"];

#[tokio::test]
async fn slow_artifact_download_outlasting_timeout_completes() {
    let base = trickle_server(30, CHUNKS.to_vec(), Duration::from_millis(700)).await;
    let client = client_with_timeout(&base, Duration::from_secs(1));

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("slow.jpg");
    let url = format!("{}/files/slow.jpg", base);
    let written = client.save_to_file(url.as_str(), &output).await.unwrap();

    assert_eq!(written, 30);
    assert_eq!(
        tokio::fs::read(&output).await.unwrap(),
        b"0123456789abcdefghijABCDEFGHIJ"
    );
}

#[tokio::test]
async fn api_call_is_bounded_by_total_timeout() {
    let base = trickle_server(30, CHUNKS.to_vec(), Duration::from_millis(700)).await;
    let client = client_with_timeout(&base, Duration::from_secs(1));

    let err = client.get_usage().await.unwrap_err();
    match err {
        ClientError::Transport(TransportError::Request(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn truncated_artifact_body_is_transport_error() {
    let base = trickle_server(30, vec![&b"0123456789"[..]], Duration::ZERO).await;
    let client = client_with_timeout(&base, Duration::from_secs(10));

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cut.jpg");
    let url = format!("{}/files/cut.jpg", base);
    let err = client.save_to_file(url.as_str(), &output).await.unwrap_err();

    assert!(
        matches!(err, ClientError::Transport(TransportError::Io(_))),
        "expected transport IO error, got {:?}",
        err
    );
}
