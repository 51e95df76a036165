//! Application state for the plotmap server

use chrono::{DateTime, Utc};
use plot_api::{ApiError, EnquirySink, LayoutSource, ListingClient, SvgRelay, SvgSource};
use plot_config::PlotConfig;
use plot_viewer::PlotMapPage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One open plot-map page. Locked per request, never across an outbound fetch.
pub type View = Arc<Mutex<PlotMapPage>>;

struct OpenView {
    page: View,
    last_activity: DateTime<Utc>,
}

pub struct AppState {
    pub config: PlotConfig,
    /// Backs `/api/proxy-svg`
    pub relay: SvgRelay,
    pub layouts: Arc<dyn LayoutSource>,
    pub enquiries: Arc<dyn EnquirySink>,
    /// Where viewers read plot maps from (the relay itself when serving)
    pub svgs: Arc<dyn SvgSource>,
    views: RwLock<HashMap<Uuid, OpenView>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Production wiring: listing API client plus the outbound relay
    pub fn new(config: PlotConfig) -> Result<Self, ApiError> {
        let client = Arc::new(ListingClient::from_config(&config)?);
        let relay = SvgRelay::new(&config.user_agent);
        let svgs = Arc::new(relay.clone());
        Ok(Self::with_sources(config, relay, client.clone(), client, svgs))
    }

    pub fn with_sources(
        config: PlotConfig,
        relay: SvgRelay,
        layouts: Arc<dyn LayoutSource>,
        enquiries: Arc<dyn EnquirySink>,
        svgs: Arc<dyn SvgSource>,
    ) -> Self {
        Self {
            config,
            relay,
            layouts,
            enquiries,
            svgs,
            views: RwLock::new(HashMap::new()),
            started_at: Utc::now(),
        }
    }

    /// Store a new view, making room first if `max_views` are already open.
    pub async fn register_view(&self, id: Uuid, page: PlotMapPage) -> View {
        let view = Arc::new(Mutex::new(page));
        let displaced = {
            let mut views = self.views.write().await;
            let mut displaced = Vec::new();
            while !views.is_empty() && views.len() >= self.config.max_views.max(1) {
                let oldest = views
                    .iter()
                    .min_by_key(|(_, open)| open.last_activity)
                    .map(|(id, _)| *id);
                match oldest.and_then(|id| views.remove(&id)) {
                    Some(open) => displaced.push(open.page),
                    None => break,
                }
            }
            views.insert(
                id,
                OpenView {
                    page: view.clone(),
                    last_activity: Utc::now(),
                },
            );
            displaced
        };
        if !displaced.is_empty() {
            tracing::info!(
                count = displaced.len(),
                "view limit reached, dropped least recently used"
            );
        }
        leave_all(displaced).await;
        tracing::debug!(view = %id, "view opened");
        view
    }

    /// Look up a view and mark it active
    pub async fn view(&self, id: Uuid) -> Option<View> {
        let mut views = self.views.write().await;
        let open = views.get_mut(&id)?;
        open.last_activity = Utc::now();
        Some(open.page.clone())
    }

    pub async fn close_view(&self, id: Uuid) -> Option<View> {
        let removed = self.views.write().await.remove(&id).map(|open| open.page);
        if removed.is_some() {
            tracing::debug!(view = %id, "view closed");
        }
        removed
    }

    /// Drop views idle for at least `timeout`; returns how many went.
    pub async fn evict_idle(&self, timeout: chrono::Duration) -> usize {
        let now = Utc::now();
        let stale: Vec<View> = {
            let mut views = self.views.write().await;
            let ids: Vec<Uuid> = views
                .iter()
                .filter(|(_, open)| now.signed_duration_since(open.last_activity) >= timeout)
                .map(|(id, _)| *id)
                .collect();
            ids.iter()
                .filter_map(|id| views.remove(id))
                .map(|open| open.page)
                .collect()
        };
        let count = stale.len();
        leave_all(stale).await;
        if count > 0 {
            tracing::info!(count, "evicted idle views");
        }
        count
    }

    pub fn idle_timeout(&self) -> chrono::Duration {
        // chrono durations stop at i64::MAX milliseconds
        let secs = i64::try_from(self.config.view_idle_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        chrono::Duration::seconds(secs)
    }

    /// Sweep idle views every `every` for as long as the state lives.
    pub fn spawn_idle_sweep(
        self: &Arc<Self>,
        every: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        let state = Arc::downgrade(self);
        let timeout = self.idle_timeout();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(state) = state.upgrade() else { break };
                state.evict_idle(timeout).await;
            }
        })
    }

    pub async fn view_count(&self) -> usize {
        self.views.read().await.len()
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// Navigation away for pages no client will come back to
async fn leave_all(pages: Vec<View>) {
    for page in pages {
        page.lock().await.leave();
    }
}
