use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use platform_api::{
    CredentialsInfo, LicenseRequest, MachineInfo, PlatformApi, PlatformApiConfig,
    PlatformApiError, PlatformClient, ProductInfo,
};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Clone)]
struct ScriptedResponse {
    status: u16,
    body: String,
}

fn respond(status: u16, body: &str) -> ScriptedResponse {
    ScriptedResponse {
        status,
        body: body.to_string(),
    }
}

#[derive(Debug, Clone)]
struct RecordedRequest {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

impl RecordedRequest {
    fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.headers
            .iter()
            .find(|line| line.to_ascii_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }
}

struct ScriptedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    async fn new(scripts: Vec<ScriptedResponse>) -> Self {
        let scripts = Arc::new(scripts);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener
            .local_addr()
            .expect("resolved local listener address");

        let handle = tokio::spawn({
            let requests = Arc::clone(&requests);
            async move {
                loop {
                    let (socket, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    serve_one(socket, &scripts, &requests).await;
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle,
        }
    }

    fn client(&self) -> PlatformClient {
        PlatformClient::new(PlatformApiConfig::new(&self.base_url)).expect("client should build")
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(
    mut socket: TcpStream,
    scripts: &[ScriptedResponse],
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let Ok(request) = read_request(&mut socket).await else {
        return;
    };

    let index = {
        let mut requests = requests.lock().expect("requests lock");
        requests.push(request);
        requests.len() - 1
    };
    let response = scripts
        .get(index)
        .cloned()
        .unwrap_or_else(|| respond(500, r#"{"error":"unexpected request"}"#));

    let head = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.body.len(),
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(response.body.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut raw = Vec::new();
    let mut buffer = [0_u8; 2048];

    let header_end = loop {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        raw.extend_from_slice(&buffer[..n]);
        if let Some(pos) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = head.split("\r\n").map(str::to_string);
    let request_line = lines.next().unwrap_or_default();
    let headers: Vec<String> = lines.collect();
    let content_length = headers
        .iter()
        .find_map(|line| {
            line.to_ascii_lowercase()
                .strip_prefix("content-length:")
                .and_then(|value| value.trim().parse::<usize>().ok())
        })
        .unwrap_or(0);

    let mut body = raw[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buffer[..n]);
    }

    Ok(RecordedRequest {
        request_line,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn license_request() -> LicenseRequest {
    LicenseRequest {
        product: ProductInfo {
            name: "localstack-pro".to_string(),
            version: "4.1.0".to_string(),
        },
        credentials: CredentialsInfo {
            token: "ls-token".to_string(),
        },
        machine: MachineInfo {
            hostname: "devbox".to_string(),
            platform: "linux".to_string(),
            platform_release: "6.1.0".to_string(),
        },
    }
}

#[tokio::test]
async fn create_auth_request_accepts_created_status() {
    let server = ScriptedServer::new(vec![respond(
        201,
        r#"{"id":"req-1","code":"ABCD-1234","exchange_token":"ex-1"}"#,
    )])
    .await;

    let request = server
        .client()
        .create_auth_request()
        .await
        .expect("auth request should be created");

    assert_eq!(request.id, "req-1");
    assert_eq!(request.code, "ABCD-1234");
    assert_eq!(request.exchange_token, "ex-1");
    assert_eq!(server.requests()[0].request_line, "POST /v1/auth/request HTTP/1.1");
}

#[tokio::test]
async fn create_auth_request_surfaces_status_and_body() {
    let server = ScriptedServer::new(vec![respond(503, "maintenance")]).await;

    let error = server
        .client()
        .create_auth_request()
        .await
        .expect_err("503 should fail");

    assert_matches!(
        &error,
        PlatformApiError::Status { status, body, .. }
            if *status == StatusCode::SERVICE_UNAVAILABLE && body == "maintenance"
    );
    assert_eq!(error.to_string(), "failed to create auth request: status 503");
}

#[tokio::test]
async fn confirmation_check_sends_exchange_token_as_query() {
    let server = ScriptedServer::new(vec![respond(200, r#"{"confirmed":false}"#)]).await;

    let confirmed = server
        .client()
        .check_auth_request_confirmed("req-1", "ex-1")
        .await
        .expect("check should succeed");

    assert!(!confirmed);
    assert_eq!(
        server.requests()[0].request_line,
        "GET /v1/auth/request/req-1?exchange_token=ex-1 HTTP/1.1"
    );
}

#[tokio::test]
async fn exchange_posts_token_and_returns_auth_token() {
    let server =
        ScriptedServer::new(vec![respond(200, r#"{"id":"req-1","auth_token":"bearer-xyz"}"#)])
            .await;

    let token = server
        .client()
        .exchange_auth_request("req-1", "ex-1")
        .await
        .expect("exchange should succeed");

    assert_eq!(token, "bearer-xyz");
    let recorded = &server.requests()[0];
    assert_eq!(
        recorded.request_line,
        "POST /v1/auth/request/req-1/exchange HTTP/1.1"
    );
    let body: serde_json::Value =
        serde_json::from_str(&recorded.body).expect("exchange body is JSON");
    assert_eq!(body, json!({"exchange_token": "ex-1"}));
}

#[tokio::test]
async fn license_token_lookup_forwards_bearer_and_accepts_202() {
    let server = ScriptedServer::new(vec![respond(202, r#"{"token":"ls-license"}"#)]).await;

    let token = server
        .client()
        .get_license_token("Bearer abc")
        .await
        .expect("license token should resolve");

    assert_eq!(token, "ls-license");
    let recorded = &server.requests()[0];
    assert_eq!(recorded.request_line, "GET /v1/license/credentials HTTP/1.1");
    assert_eq!(recorded.header("authorization").as_deref(), Some("Bearer abc"));
}

#[tokio::test]
async fn license_request_success_posts_full_payload() {
    let server = ScriptedServer::new(vec![respond(200, "{}")]).await;

    server
        .client()
        .get_license(&license_request())
        .await
        .expect("license should be granted");

    let recorded = &server.requests()[0];
    assert_eq!(recorded.request_line, "POST /v1/license/request HTTP/1.1");
    let body: serde_json::Value =
        serde_json::from_str(&recorded.body).expect("license body is JSON");
    assert_eq!(
        body,
        json!({
            "product": {"name": "localstack-pro", "version": "4.1.0"},
            "credentials": {"token": "ls-token"},
            "machine": {"hostname": "devbox", "platform": "linux", "platform_release": "6.1.0"}
        })
    );
}

#[tokio::test]
async fn license_rejections_map_to_user_facing_reasons() {
    let server =
        ScriptedServer::new(vec![respond(400, ""), respond(403, ""), respond(500, "")]).await;
    let client = server.client();

    let bad_request = client
        .get_license(&license_request())
        .await
        .expect_err("400 should be rejected");
    assert_eq!(
        bad_request.to_string(),
        "invalid token format, missing license assignment, or missing subscription"
    );

    let forbidden = client
        .get_license(&license_request())
        .await
        .expect_err("403 should be rejected");
    assert_eq!(
        forbidden.to_string(),
        "invalid, inactive, or expired authentication token or subscription"
    );

    let server_error = client
        .get_license(&license_request())
        .await
        .expect_err("500 should fail");
    assert_eq!(server_error.to_string(), "license request failed with status 500");
    assert_eq!(server_error.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let server = ScriptedServer::new(vec![respond(200, "not json")]).await;

    let error = server
        .client()
        .check_auth_request_confirmed("req-1", "ex-1")
        .await
        .expect_err("garbage body should fail");

    assert_matches!(error, PlatformApiError::Decode { operation: "check auth request", .. });
}
