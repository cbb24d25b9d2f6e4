mod sse;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig, dao::session_store::SessionStore, error::ServiceError,
    services::hint_service::HintClient,
};

pub use self::sse::{SseHub, SseState};

/// Cheaply clonable handle to the shared application state.
pub type SharedState = Arc<AppState>;

const SSE_HUB_CAPACITY: usize = 16;

/// Central application state holding the store handle, realtime hubs, and
/// runtime configuration.
pub struct AppState {
    session_store: RwLock<Option<Arc<dyn SessionStore>>>,
    sse: SseState,
    degraded: watch::Sender<bool>,
    config: AppConfig,
    hints: HintClient,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let hints = HintClient::from_config(&config);
        Arc::new(Self {
            session_store: RwLock::new(None),
            sse: SseState::new(SSE_HUB_CAPACITY),
            degraded: degraded_tx,
            config,
            hints,
        })
    }

    /// Obtain a handle to the current session store, if one is installed.
    pub async fn session_store(&self) -> Option<Arc<dyn SessionStore>> {
        let guard = self.session_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the session store or fail with the degraded-mode error.
    pub async fn require_session_store(&self) -> Result<Arc<dyn SessionStore>, ServiceError> {
        self.session_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new session store implementation and leave degraded mode.
    pub async fn install_session_store(&self, store: Arc<dyn SessionStore>) {
        {
            let mut guard = self.session_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current session store and enter degraded mode.
    pub async fn clear_session_store(&self) {
        {
            let mut guard = self.session_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Realtime hub for one session, created on demand.
    pub fn session_events(&self, session_id: Uuid) -> Arc<SseHub> {
        self.sse.hub(session_id)
    }

    /// Drop the realtime hub of a purged session.
    pub fn drop_session_events(&self, session_id: Uuid) {
        self.sse.remove(session_id);
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Client for the external hint generation service.
    pub fn hints(&self) -> &HintClient {
        &self.hints
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}
