//! Mock share client for testing without real file servers
//!
//! Scripts the outcome of a session so probe and orchestration logic can be
//! exercised for every failure mode the classifier knows about.

use super::probes::TcpConnector;
use super::session::{DirectoryEntry, ShareClient, ShareSession};
use crate::models::ProbeRequest;
use crate::utils::ShareError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Simulation types to test different scenarios
#[derive(Debug, Clone)]
pub enum MockShareBehavior {
    /// Root listing succeeds with these entries
    Listing(Vec<DirectoryEntry>),
    /// Session setup fails before any listing
    ConnectFails(ShareError),
    /// Session is created but the listing fails
    ListFails(ShareError),
    /// Listing hangs for the given time before returning the entries
    Stall(Duration, Vec<DirectoryEntry>),
}

/// Authentication mode observed by the mock on `connect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedAuth {
    Anonymous,
    Ntlm { username: String },
}

pub struct MockShareClient {
    behavior: MockShareBehavior,
    connects: AtomicUsize,
    last_auth: Mutex<Option<ObservedAuth>>,
}

impl MockShareClient {
    pub fn new(behavior: MockShareBehavior) -> Self {
        Self {
            behavior,
            connects: AtomicUsize::new(0),
            last_auth: Mutex::new(None),
        }
    }

    pub fn with_listing(entries: Vec<DirectoryEntry>) -> Self {
        Self::new(MockShareBehavior::Listing(entries))
    }

    pub fn failing_connect(error: ShareError) -> Self {
        Self::new(MockShareBehavior::ConnectFails(error))
    }

    pub fn failing_list(error: ShareError) -> Self {
        Self::new(MockShareBehavior::ListFails(error))
    }

    /// How many sessions were requested
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn last_auth(&self) -> Option<ObservedAuth> {
        self.last_auth
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl ShareClient for MockShareClient {
    async fn connect(&self, request: &ProbeRequest) -> Result<Box<dyn ShareSession>, ShareError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let observed = if request.auth().is_anonymous() {
            ObservedAuth::Anonymous
        } else {
            ObservedAuth::Ntlm {
                username: request.auth().username().to_string(),
            }
        };
        *self
            .last_auth
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(observed);

        match &self.behavior {
            MockShareBehavior::ConnectFails(error) => Err(error.clone()),
            behavior => Ok(Box::new(MockShareSession {
                behavior: behavior.clone(),
            })),
        }
    }
}

struct MockShareSession {
    behavior: MockShareBehavior,
}

#[async_trait::async_trait]
impl ShareSession for MockShareSession {
    async fn list_root(&self) -> Result<Vec<DirectoryEntry>, ShareError> {
        match &self.behavior {
            MockShareBehavior::Listing(entries) => Ok(entries.clone()),
            MockShareBehavior::ListFails(error) => Err(error.clone()),
            MockShareBehavior::Stall(delay, entries) => {
                tokio::time::sleep(*delay).await;
                Ok(entries.clone())
            }
            MockShareBehavior::ConnectFails(error) => Err(error.clone()),
        }
    }
}

/// TCP connector for a host that never answers: the connect stays pending forever
pub struct StalledConnector;

#[async_trait::async_trait]
impl TcpConnector for StalledConnector {
    async fn connect(&self, _host: &str, _port: u16) -> std::io::Result<()> {
        std::future::pending().await
    }
}
