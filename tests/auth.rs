use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use credential_store::{CredentialStore, CredentialStoreError, Keyring, AUTH_TOKEN_KEY};
use lstk::auth::{Auth, AuthError, AuthOptions, BrowserOpener, CALLBACK_PATH, ENTER_KEY};
use lstk::output::{Event, InputResponse, Severity, TuiSink, UserInputRequest};
use platform_api::{AuthRequest, LicenseRequest, PlatformApi, PlatformApiError};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const WEB_APP_URL: &str = "https://app.test.localstack.cloud";

#[derive(Default)]
struct FakePlatform {
    confirmed: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl FakePlatform {
    fn confirming() -> Self {
        Self {
            confirmed: true,
            ..Self::default()
        }
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn create_auth_request(&self) -> Result<AuthRequest, PlatformApiError> {
        self.record("create");
        Ok(AuthRequest {
            id: "test-auth-req-id".to_string(),
            code: "TEST123".to_string(),
            exchange_token: "test-exchange-token".to_string(),
        })
    }

    async fn check_auth_request_confirmed(
        &self,
        id: &str,
        exchange_token: &str,
    ) -> Result<bool, PlatformApiError> {
        assert_eq!((id, exchange_token), ("test-auth-req-id", "test-exchange-token"));
        self.record("check");
        Ok(self.confirmed)
    }

    async fn exchange_auth_request(
        &self,
        _id: &str,
        _exchange_token: &str,
    ) -> Result<String, PlatformApiError> {
        self.record("exchange");
        Ok("Bearer test-bearer-token".to_string())
    }

    async fn get_license_token(&self, bearer_token: &str) -> Result<String, PlatformApiError> {
        assert_eq!(bearer_token, "Bearer test-bearer-token");
        self.record("license-token");
        Ok("ls-license-token".to_string())
    }

    async fn get_license(&self, _request: &LicenseRequest) -> Result<(), PlatformApiError> {
        self.record("license");
        Ok(())
    }
}

#[derive(Default, Clone)]
struct RecordingKeyring {
    entries: Arc<Mutex<HashMap<String, String>>>,
    sets: Arc<AtomicUsize>,
    refuse_writes: bool,
}

impl RecordingKeyring {
    fn holding(token: &str) -> Self {
        let ring = Self::default();
        ring.entries
            .lock()
            .expect("entries lock")
            .insert(AUTH_TOKEN_KEY.to_string(), token.to_string());
        ring
    }

    fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    fn stored(&self) -> Option<String> {
        self.entries
            .lock()
            .expect("entries lock")
            .get(AUTH_TOKEN_KEY)
            .cloned()
    }
}

impl Keyring for RecordingKeyring {
    fn get(&self, key: &str) -> Result<String, CredentialStoreError> {
        self.entries
            .lock()
            .expect("entries lock")
            .get(key)
            .cloned()
            .ok_or_else(|| CredentialStoreError::not_found(key))
    }

    fn set(&self, key: &str, _label: &str, secret: &str) -> Result<(), CredentialStoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.refuse_writes {
            return Err(CredentialStoreError::corrupt("os", "keyring is locked"));
        }
        self.entries
            .lock()
            .expect("entries lock")
            .insert(key.to_string(), secret.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialStoreError> {
        self.entries
            .lock()
            .expect("entries lock")
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CredentialStoreError::not_found(key))
    }
}

#[derive(Default)]
struct RecordingBrowser {
    opened: Mutex<Vec<String>>,
}

impl BrowserOpener for RecordingBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        self.opened.lock().expect("opened lock").push(url.to_string());
        Ok(())
    }
}

struct Harness {
    auth: Auth,
    platform: Arc<FakePlatform>,
    ring: RecordingKeyring,
    browser: Arc<RecordingBrowser>,
    events: mpsc::UnboundedReceiver<Event>,
    seen: Vec<Event>,
    callback_addr: SocketAddr,
}

fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("probe listener should bind");
    listener.local_addr().expect("probe address")
}

fn harness(
    platform: FakePlatform,
    ring: RecordingKeyring,
    env_token: Option<&str>,
    interactive: bool,
) -> Harness {
    let platform = Arc::new(platform);
    let browser = Arc::new(RecordingBrowser::default());
    let (tx, events) = mpsc::unbounded_channel();
    let callback_addr = free_addr();

    let options = AuthOptions::new(WEB_APP_URL)
        .with_env_token(env_token.map(str::to_string))
        .with_interactive(interactive)
        .with_callback_addr(callback_addr);
    let auth = Auth::new(
        CredentialStore::with_keyring(ring.clone()),
        Arc::clone(&platform) as Arc<dyn PlatformApi>,
        Arc::new(TuiSink::new(tx)),
        options,
    )
    .with_browser(Arc::clone(&browser) as Arc<dyn BrowserOpener>);

    Harness {
        auth,
        platform,
        ring,
        browser,
        events,
        seen: Vec::new(),
        callback_addr,
    }
}

/// Plays the UI: records events until the next prompt arrives.
async fn next_request(
    events: &mut mpsc::UnboundedReceiver<Event>,
    seen: &mut Vec<Event>,
) -> UserInputRequest {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("prompt should arrive in time")
            .expect("event channel open");
        match event {
            Event::UserInputRequest(request) => return request,
            other => seen.push(other),
        }
    }
}

fn messages(harness: &mut Harness) -> Vec<(Severity, String)> {
    while let Ok(event) = harness.events.try_recv() {
        harness.seen.push(event);
    }
    harness
        .seen
        .iter()
        .filter_map(|event| match event {
            Event::Message { severity, text } => Some((*severity, text.clone())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn stored_token_wins_over_environment_and_login() {
    let mut harness = harness(
        FakePlatform::confirming(),
        RecordingKeyring::holding("ls-stored"),
        Some("ls-env"),
        true,
    );

    let token = harness
        .auth
        .get_token(&CancellationToken::new())
        .await
        .expect("stored token should resolve");

    assert_eq!(token, "ls-stored");
    assert!(harness.platform.calls().is_empty());
    assert!(harness.events.try_recv().is_err());
}

#[tokio::test]
async fn environment_token_is_used_when_store_is_empty() {
    let harness = harness(
        FakePlatform::confirming(),
        RecordingKeyring::default(),
        Some("ls-env"),
        false,
    );

    let token = harness
        .auth
        .get_token(&CancellationToken::new())
        .await
        .expect("env token should resolve");

    assert_eq!(token, "ls-env");
    assert!(harness.platform.calls().is_empty());
    assert_eq!(harness.ring.sets(), 0);
}

#[tokio::test]
async fn non_interactive_without_token_is_not_authenticated() {
    let harness = harness(
        FakePlatform::confirming(),
        RecordingKeyring::default(),
        Some(""),
        false,
    );

    let error = harness
        .auth
        .get_token(&CancellationToken::new())
        .await
        .expect_err("no token source should fail");

    assert_matches!(error, AuthError::NotAuthenticated);
    assert!(error.to_string().contains("LOCALSTACK_AUTH_TOKEN"));
    assert!(harness.platform.calls().is_empty());
}

#[tokio::test]
async fn cancelling_at_the_browser_prompt_aborts_the_login() {
    let mut harness = harness(
        FakePlatform::confirming(),
        RecordingKeyring::default(),
        None,
        true,
    );
    let cancel = CancellationToken::new();

    let Harness {
        auth,
        events,
        seen,
        ..
    } = &mut harness;
    let ui = async {
        let request = next_request(events, seen).await;
        assert_eq!(request.prompt, "Open browser now?");
        assert!(request.respond(InputResponse::cancelled()));
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(auth.get_token(&cancel), ui);

    assert_matches!(result, Err(AuthError::Cancelled));
    assert_eq!(harness.ring.sets(), 0);
    assert_eq!(harness.platform.calls(), vec!["create"]);
}

#[tokio::test]
async fn device_flow_resolves_license_token_and_persists_it() {
    let mut harness = harness(
        FakePlatform::confirming(),
        RecordingKeyring::default(),
        None,
        true,
    );
    let cancel = CancellationToken::new();

    let Harness {
        auth,
        events,
        seen,
        ..
    } = &mut harness;
    let ui = async {
        let open = next_request(events, seen).await;
        assert_eq!(open.prompt, "Open browser now?");
        let keys: Vec<&str> = open.options.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["y", "n"]);
        open.respond(InputResponse::selected("y"));

        let waiting = next_request(events, seen).await;
        assert_eq!(waiting.prompt, "Waiting for authentication...");
        waiting.respond(InputResponse::selected(ENTER_KEY));
    };
    let (result, ()) = tokio::join!(auth.get_token(&cancel), ui);

    assert_eq!(result.expect("login should succeed"), "ls-license-token");
    assert_eq!(harness.ring.sets(), 1);
    assert_eq!(harness.ring.stored().as_deref(), Some("ls-license-token"));
    assert_eq!(
        harness.platform.calls(),
        vec!["create", "check", "exchange", "license-token"]
    );
    assert_eq!(
        *harness.browser.opened.lock().expect("opened lock"),
        vec![format!("{WEB_APP_URL}/redirect?name=CLI")]
    );

    let highlights: Vec<String> = harness
        .seen
        .iter()
        .filter_map(|event| match event {
            Event::Highlight(text) => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        highlights,
        vec![format!("{WEB_APP_URL}/auth/request/test-auth-req-id")]
    );
    let messages = messages(&mut harness);
    assert!(messages.contains(&(Severity::Info, "Verification code: TEST123".to_string())));
    assert_eq!(
        messages.last(),
        Some(&(Severity::Success, "Login successful.".to_string()))
    );
}

#[tokio::test]
async fn unconfirmed_request_persists_nothing() {
    let mut harness = harness(
        FakePlatform::default(),
        RecordingKeyring::default(),
        None,
        true,
    );
    let cancel = CancellationToken::new();

    let Harness {
        auth,
        events,
        seen,
        ..
    } = &mut harness;
    let ui = async {
        next_request(events, seen)
            .await
            .respond(InputResponse::selected("n"));
        next_request(events, seen)
            .await
            .respond(InputResponse::selected(ENTER_KEY));
    };
    let (result, ()) = tokio::join!(auth.get_token(&cancel), ui);

    let error = result.expect_err("unconfirmed request should fail");
    assert_matches!(error, AuthError::NotConfirmed);
    assert_eq!(
        error.to_string(),
        "auth request not confirmed - please enter the code in the browser first"
    );
    assert_eq!(harness.ring.sets(), 0);
    assert!(harness.browser.opened.lock().expect("opened lock").is_empty());
}

#[tokio::test]
async fn browser_callback_completes_login_while_waiting() {
    let mut harness = harness(
        FakePlatform::confirming(),
        RecordingKeyring::default(),
        None,
        true,
    );
    let cancel = CancellationToken::new();
    let callback_url = format!(
        "http://{}{CALLBACK_PATH}?token=mock-token",
        harness.callback_addr
    );

    let Harness {
        auth,
        events,
        seen,
        ..
    } = &mut harness;
    let ui = async {
        next_request(events, seen)
            .await
            .respond(InputResponse::selected("n"));
        // Held unanswered so only the callback can finish the login.
        let waiting = next_request(events, seen).await;
        let response = reqwest::get(&callback_url)
            .await
            .expect("callback request should be served");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        waiting
    };
    let (result, _waiting) = tokio::join!(auth.get_token(&cancel), ui);

    assert_eq!(result.expect("callback login should succeed"), "mock-token");
    assert_eq!(harness.ring.sets(), 1);
    assert_eq!(harness.ring.stored().as_deref(), Some("mock-token"));
    assert_eq!(harness.platform.calls(), vec!["create"]);
}

#[tokio::test]
async fn cancelling_while_waiting_releases_the_callback_listener() {
    let mut harness = harness(
        FakePlatform::confirming(),
        RecordingKeyring::default(),
        None,
        true,
    );
    let cancel = CancellationToken::new();
    let callback_addr = harness.callback_addr;

    let Harness {
        auth,
        events,
        seen,
        ..
    } = &mut harness;
    let ui = async {
        next_request(events, seen)
            .await
            .respond(InputResponse::selected("n"));
        let waiting = next_request(events, seen).await;
        assert_eq!(waiting.prompt, "Waiting for authentication...");
        cancel.cancel();
        waiting
    };
    let (result, _waiting) = tokio::time::timeout(
        Duration::from_secs(5),
        async { tokio::join!(auth.get_token(&cancel), ui) },
    )
    .await
    .expect("cancellation should end the login");

    assert_matches!(result, Err(AuthError::Cancelled));
    assert_eq!(harness.ring.sets(), 0);
    assert_eq!(harness.ring.stored(), None);
    assert_eq!(harness.platform.calls(), vec!["create"]);
    TcpListener::bind(callback_addr).expect("callback address should be free again");
}

#[tokio::test]
async fn persist_failure_warns_and_still_returns_token() {
    let ring = RecordingKeyring {
        refuse_writes: true,
        ..RecordingKeyring::default()
    };
    let mut harness = harness(FakePlatform::confirming(), ring, None, true);
    let cancel = CancellationToken::new();

    let Harness {
        auth,
        events,
        seen,
        ..
    } = &mut harness;
    let ui = async {
        next_request(events, seen)
            .await
            .respond(InputResponse::selected("n"));
        next_request(events, seen)
            .await
            .respond(InputResponse::selected(ENTER_KEY));
    };
    let (result, ()) = tokio::join!(auth.get_token(&cancel), ui);

    assert_eq!(result.expect("login should succeed"), "ls-license-token");
    assert_eq!(harness.ring.sets(), 1);
    let warnings: Vec<String> = messages(&mut harness)
        .into_iter()
        .filter(|(severity, _)| *severity == Severity::Warning)
        .map(|(_, text)| text)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("could not store token in keyring: "));
}

#[tokio::test]
async fn logout_reports_whether_a_token_was_removed() {
    let mut harness = harness(
        FakePlatform::default(),
        RecordingKeyring::holding("ls-stored"),
        None,
        false,
    );

    harness.auth.logout().expect("first logout should succeed");
    harness.auth.logout().expect("second logout should succeed");

    assert_eq!(harness.ring.stored(), None);
    assert_eq!(
        messages(&mut harness),
        vec![
            (Severity::Success, "Logged out successfully.".to_string()),
            (Severity::Note, "Not currently logged in.".to_string()),
        ]
    );
}
