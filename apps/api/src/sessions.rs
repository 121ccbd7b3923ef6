//! Open editing sessions, one per resume.
//!
//! A session owns the resume's [`EditContext`], its drag state and the
//! autosave task that follows it. Sessions are opened lazily on first access.
//! They end on an explicit [`SessionRegistry::close`] or, once nobody has
//! touched them for the idle limit, through [`SessionRegistry::evict_idle`].
//! Both flush unsaved edits to the store before the session is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::editing::EditContext;
use crate::models::Document;
use crate::sections::drag::DragEngine;
use crate::store::{spawn_autosave, Autosave, ResumeStore, StoreError};

pub struct Session {
    pub id: Uuid,
    pub context: Arc<EditContext>,
    pub drag: Mutex<DragEngine>,
    autosave: Autosave,
    /// Milliseconds since the registry's epoch.
    last_access: AtomicU64,
}

impl Session {
    /// Saves edits the autosave task has not stored yet.
    pub async fn flush(&self, store: &dyn ResumeStore) -> Result<Option<i32>, StoreError> {
        self.autosave.flush(&self.context, store).await
    }
}

pub struct SessionRegistry {
    store: Arc<dyn ResumeStore>,
    debounce: Duration,
    epoch: Instant,
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn ResumeStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            epoch: Instant::now(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn ResumeStore> {
        &self.store
    }

    /// Stores `document` as a new resume and opens a session on it.
    pub async fn create(&self, document: Document) -> Result<Arc<Session>, StoreError> {
        let id = self.store.create(&document).await?;
        let session = self.start(id, document);
        self.sessions.write().await.insert(id, Arc::clone(&session));
        info!(resume_id = %id, "Created resume");
        Ok(session)
    }

    /// The open session for `id`, loading the resume from the store if needed.
    pub async fn open(&self, id: Uuid) -> Result<Arc<Session>, StoreError> {
        if let Some(session) = self.sessions.read().await.get(&id) {
            self.touch(session);
            return Ok(Arc::clone(session));
        }

        let document = self.store.load(id).await?;
        let mut sessions = self.sessions.write().await;
        // Another request may have opened it while we were loading.
        let session = sessions
            .entry(id)
            .or_insert_with(|| self.start(id, document))
            .clone();
        self.touch(&session);
        info!(resume_id = %id, "Opened editing session");
        Ok(session)
    }

    /// Flushes and ends the session for `id`. Returns `false` when none was
    /// open. A failed flush keeps the session open.
    pub async fn close(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get(&id).cloned() else {
            return Ok(false);
        };
        session.flush(self.store.as_ref()).await?;
        sessions.remove(&id);
        info!(resume_id = %id, "Closed editing session");
        Ok(true)
    }

    /// Flushes and ends every session idle for at least `max_idle` that no
    /// request is currently holding. Returns how many were ended.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = self.now_ms();
        let max_idle = max_idle.as_millis() as u64;
        let mut sessions = self.sessions.write().await;
        let idle: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, s)| Arc::strong_count(*s) == 1)
            .filter(|(_, s)| now.saturating_sub(s.last_access.load(Ordering::Relaxed)) >= max_idle)
            .map(|(id, _)| *id)
            .collect();

        let mut evicted = 0;
        for id in idle {
            let Some(session) = sessions.get(&id).cloned() else {
                continue;
            };
            match session.flush(self.store.as_ref()).await {
                Ok(_) => {
                    sessions.remove(&id);
                    evicted += 1;
                    debug!(resume_id = %id, "Evicted idle session");
                }
                Err(e) => warn!(resume_id = %id, error = %e, "Keeping idle session; flush failed"),
            }
        }
        if evicted > 0 {
            info!(evicted, open = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Periodically evicts sessions idle for `max_idle`. Stops once the
    /// registry is dropped.
    pub fn spawn_idle_sweeper(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let registry: Weak<SessionRegistry> = Arc::downgrade(self);
        let period = (max_idle / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                registry.evict_idle(max_idle).await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn start(&self, id: Uuid, document: Document) -> Arc<Session> {
        let context = Arc::new(EditContext::new(document));
        let autosave = spawn_autosave(id, &context, Arc::clone(&self.store), self.debounce);
        Arc::new(Session {
            id,
            context,
            drag: Mutex::new(DragEngine::new()),
            autosave,
            last_access: AtomicU64::new(self.now_ms()),
        })
    }

    fn touch(&self, session: &Session) {
        session.last_access.store(self.now_ms(), Ordering::Relaxed);
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
