//! `HttpBackend` against a local one-shot HTTP server.
//!
//! Each server accepts a single connection, records the raw request, and
//! answers with a canned status and body.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use extract_bench::error::{BenchError, GENERIC_EXTRACTION_FAILURE, GENERIC_NETWORK_FAILURE};
use extract_bench::testing::sample_form;
use extract_bench::{BenchBackend, ExtractRequest, FieldSchemaModel, HttpBackend};

/// Serve one response, returning the base URL and a handle yielding the raw request.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let headers = text[..header_end].to_ascii_lowercase();
        let body_len = buf.len() - (header_end + 4);

        let content_length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        match content_length {
            Some(len) if body_len >= len => break,
            Some(_) => continue,
            None if headers.contains("transfer-encoding: chunked") => {
                if text.ends_with("0\r\n\r\n") {
                    break;
                }
            }
            None => break,
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Client that ignores proxy environment variables so requests stay local.
fn backend(base_url: impl Into<String>) -> HttpBackend {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpBackend::new(base_url).with_client(client)
}

fn request() -> ExtractRequest {
    let mut fields = FieldSchemaModel::new();
    fields.add_named_field("invoice_number", Some("INV-001".into()));
    sample_form().into_request(fields.project()).unwrap()
}

const REPORT: &str = r#"{
    "document_name": "invoice.pdf",
    "timestamp": "2025-03-14T09:26:53",
    "results": [],
    "total_strategies": 0,
    "successful_extractions": 0,
    "failed_extractions": 0,
    "average_execution_time": 0.0
}"#;

#[tokio::test]
async fn test_extract_posts_multipart_and_decodes_report() {
    let (url, server) = serve_once("200 OK", "application/json", REPORT).await;
    let backend = backend(url);

    let report = backend.extract(&request()).await.unwrap();
    assert_eq!(report.document_name, "invoice.pdf");
    assert!(report.results.is_empty());

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /extract HTTP/1.1"));
    assert!(raw.contains("multipart/form-data; boundary="));
    assert!(raw.contains(r#"name="file"; filename="invoice.pdf""#));
    assert!(raw.contains("%PDF-1.4 test"));
    assert!(raw.contains(r#"name="provider""#));
    assert!(raw.contains(r#"name="max_concurrent""#));
    assert!(raw.contains(r#"{"invoice_number":"string"}"#));
    assert!(raw.contains(r#"{"invoice_number":"INV-001"}"#));
    assert!(!raw.contains(r#"name="model""#));
}

#[tokio::test]
async fn test_extract_single_posts_strategy_id() {
    let body = r#"{
        "strategy_id": "strategy_02",
        "strategy_name": "Structured Output",
        "success": true,
        "execution_time": 0.9,
        "extracted_data": {"invoice_number": "INV-001"}
    }"#;
    let (url, server) = serve_once("200 OK", "application/json", body).await;
    let backend = backend(url);

    let result = backend.extract_single(&request(), "strategy_02").await.unwrap();
    assert_eq!(result.strategy_name, "Structured Output");
    assert!(result.success);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /extract-single HTTP/1.1"));
    assert!(raw.contains(r#"name="strategy_id""#));
    assert!(raw.contains("strategy_02"));
    assert!(!raw.contains(r#"name="schema""#));
    assert!(!raw.contains(r#"name="max_concurrent""#));
}

#[tokio::test]
async fn test_bad_request_detail_is_surfaced() {
    let (url, _server) = serve_once(
        "400 Bad Request",
        "application/json",
        r#"{"detail": "Invalid provider: foo"}"#,
    )
    .await;
    let backend = backend(url);

    let err = backend.extract(&request()).await.unwrap_err();
    assert!(matches!(err, BenchError::Api { status: 400, .. }));
    assert_eq!(err.user_message(), "Invalid provider: foo");
}

#[tokio::test]
async fn test_html_error_page_is_generic() {
    let (url, _server) = serve_once(
        "502 Bad Gateway",
        "text/html",
        "<html><body>502 Bad Gateway</body></html>",
    )
    .await;
    let backend = backend(url);

    let err = backend.list_strategies().await.unwrap_err();
    assert!(matches!(err, BenchError::Api { status: 502, .. }));
    assert_eq!(err.user_message(), GENERIC_EXTRACTION_FAILURE);
}

#[tokio::test]
async fn test_malformed_success_body_is_parse_error() {
    let (url, _server) = serve_once("200 OK", "application/json", r#"{"document_name": 7"#).await;
    let backend = backend(url);

    let err = backend.extract(&request()).await.unwrap_err();
    assert!(matches!(err, BenchError::Parse(_)));
    assert_eq!(err.user_message(), GENERIC_EXTRACTION_FAILURE);
}

#[tokio::test]
async fn test_health_reads_status() {
    let (url, server) = serve_once("200 OK", "application/json", r#"{"status": "healthy"}"#).await;
    let backend = backend(url);

    assert_eq!(backend.health().await.unwrap(), "healthy");
    assert!(server.await.unwrap().starts_with("GET /health HTTP/1.1"));
}

#[tokio::test]
async fn test_refused_connection_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = backend(format!("http://{}", addr));
    let err = backend.list_strategies().await.unwrap_err();

    assert!(matches!(err, BenchError::Network(_)));
    assert_eq!(err.user_message(), GENERIC_NETWORK_FAILURE);
}
