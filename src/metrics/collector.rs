//! Per-scrape collection pass
//!
//! Sequences fetch → reconcile → classify → emit → encode. Fetching happens
//! outside the cache lock; everything from reconciliation to encoding runs
//! inside it so concurrent scrapes never interleave slot updates.
//!
//! Overlapping scrapes may apply their snapshots out of fetch order. Each
//! pass reconciles against what it fetched, so a stale snapshot only holds
//! until the next scrape.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::time::TimeProvider;
use crate::engines::api::{EngineSlot, EngineSlotCache};
use crate::metrics::emitter::MetricsEmitter;
use crate::metrics::error::MetricsResult;
use crate::sast::api::{EngineDescriptor, SastApi, ScanSnapshot, TokenManager};
use crate::scans::api::{classify, resolve_engine, ClassifiedScan};

struct CollectorState {
    cache: EngineSlotCache,
    emitter: MetricsEmitter,
}

/// Process-wide scrape handler
pub struct Collector {
    api: Arc<dyn SastApi>,
    tokens: TokenManager,
    clock: Arc<dyn TimeProvider>,
    state: Mutex<CollectorState>,
}

impl Collector {
    pub fn new(
        api: Arc<dyn SastApi>,
        tokens: TokenManager,
        clock: Arc<dyn TimeProvider>,
    ) -> MetricsResult<Self> {
        Ok(Self {
            api,
            tokens,
            clock,
            state: Mutex::new(CollectorState {
                cache: EngineSlotCache::new(),
                emitter: MetricsEmitter::new()?,
            }),
        })
    }

    /// Run one collection pass and return the exposition text
    ///
    /// Upstream failures never fail the pass: they are logged and the pass
    /// publishes whatever is still known.
    pub async fn collect(&self) -> MetricsResult<String> {
        log::debug!("Collection pass started");

        let Some(engines) = self.fetch_engines().await else {
            let mut state = self.state.lock().await;
            state.cache.release_stale(&[]);
            let slots = state.cache.snapshot();
            state.emitter.emit(&slots, &[]);
            return state.emitter.render();
        };
        let scans = self.fetch_scans().await;
        let now = self.clock.now();

        let mut state = self.state.lock().await;
        let slots = state.cache.reconcile(&engines, &scans);
        let classified: Vec<ClassifiedScan> = scans
            .iter()
            .map(|scan| classify(scan, resolve_engine(scan, &engines), now))
            .collect();
        state.emitter.emit(&slots, &classified);

        log::debug!(
            "Collection pass finished: {} engine(s), {} slot(s), {} scan(s)",
            engines.len(),
            slots.len(),
            scans.len()
        );
        state.emitter.render()
    }

    /// Current slot cache contents
    pub async fn slots(&self) -> Vec<EngineSlot> {
        self.state.lock().await.cache.snapshot()
    }

    /// Fetch the engine list, re-authenticating once on error or empty list
    ///
    /// `None` means the engine snapshot is unavailable for this pass.
    async fn fetch_engines(&self) -> Option<Vec<EngineDescriptor>> {
        if let Some(engines) = self.try_list_engines().await {
            if !engines.is_empty() {
                return Some(engines);
            }
        }

        log::debug!("Engine list empty or unavailable, refreshing token");
        self.tokens.invalidate().await;
        match self.try_list_engines().await {
            Some(engines) if !engines.is_empty() => Some(engines),
            _ => {
                log::error!("No engines found to process");
                None
            }
        }
    }

    async fn try_list_engines(&self) -> Option<Vec<EngineDescriptor>> {
        let token = self.tokens.get_token().await?;
        match self.api.list_engines(&token).await {
            Ok(engines) => Some(engines),
            Err(e) => {
                log::error!("Failed to list engines: {}", e);
                None
            }
        }
    }

    /// Fetch the scan queue; any failure yields an empty queue
    async fn fetch_scans(&self) -> Vec<ScanSnapshot> {
        let Some(token) = self.tokens.get_token().await else {
            return Vec::new();
        };
        match self.api.list_scans_queue(&token).await {
            Ok(scans) => scans,
            Err(e) => {
                log::error!("Failed to list scans queue: {}", e);
                Vec::new()
            }
        }
    }
}
