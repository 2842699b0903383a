//! Shared test helpers: a fake upstream user service and in-memory sources

use crate::server::{Resource, ShutdownSignal};
use crate::upstream::{UpstreamError, User, UserSource};
use async_trait::async_trait;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How long `/slow` on the fake upstream stalls before answering
pub const SLOW_DELAY: Duration = Duration::from_millis(500);

pub const USERS_JSON: &str = r#"[
    {"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "Sincere@april.biz",
     "phone": "1-770-736-8031 x56442", "website": "hildegard.org"},
    {"id": 2, "name": "Ervin Howell", "username": "Antonette", "email": "Shanna@melissa.tv"}
]"#;

pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Leanne Graham".to_string(),
            username: "Bret".to_string(),
            email: "Sincere@april.biz".to_string(),
        },
        User {
            id: 2,
            name: "Ervin Howell".to_string(),
            username: "Antonette".to_string(),
            email: "Shanna@melissa.tv".to_string(),
        },
    ]
}

/// Fake upstream serving:
/// - `/users` - a valid two-user array (with extra fields)
/// - `/empty` - `[]`
/// - `/partial` - records with missing and `null` fields
/// - `/malformed` - a body that is not JSON
/// - `/wrong-shape` - valid JSON that is not a user array
/// - `/slow` - the valid array after `SLOW_DELAY`
pub struct FakeUpstream {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/users", get(|| async { USERS_JSON }))
            .route("/empty", get(|| async { "[]" }))
            .route(
                "/partial",
                get(|| async { r#"[{"id": 3, "name": null, "username": "Samantha"}]"# }),
            )
            .route("/malformed", get(|| async { "not valid json" }))
            .route("/wrong-shape", get(|| async { r#"{"users": []}"# }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(SLOW_DELAY).await;
                    USERS_JSON
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let addr = listener.local_addr().expect("Fake upstream has no address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// URL on a local port nobody is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve port");
    let addr = listener.local_addr().expect("Reserved port has no address");
    drop(listener);
    format!("http://{}/users", addr)
}

/// In-memory source returning a fixed result
pub enum StaticSource {
    Users(Vec<User>),
    Failing(String),
}

#[async_trait]
impl UserSource for StaticSource {
    async fn fetch_users(&self) -> Result<Vec<User>, UpstreamError> {
        match self {
            StaticSource::Users(users) => Ok(users.clone()),
            StaticSource::Failing(msg) => Err(UpstreamError::Unreachable(msg.clone())),
        }
    }
}

/// Resource that counts how its releases ended
#[derive(Clone)]
pub struct TrackedResource {
    delay: Duration,
    done: Arc<AtomicUsize>,
    cancelled: Arc<AtomicUsize>,
}

impl TrackedResource {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            done: Arc::new(AtomicUsize::new(0)),
            cancelled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Resource for TrackedResource {
    fn name(&self) -> &str {
        "tracked"
    }

    async fn release(&self, mut cancel: ShutdownSignal) {
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {
                self.done.fetch_add(1, Ordering::SeqCst);
            }
            _ = cancel.wait() => {
                self.cancelled.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

/// Captures formatted tracing output for the current thread
///
/// Only events from tasks polled on the installing thread are seen, so use it
/// from the default current-thread `#[tokio::test]` runtime.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.buf.lock().expect("log buffer poisoned");
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Index of the first line containing `needle`
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines().iter().position(|line| line.contains(needle))
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .expect("log buffer poisoned")
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
