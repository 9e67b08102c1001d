//! Metrics emitter
//!
//! Owns the Prometheus registry and the five gauge families. Every scrape
//! replaces all samples: the families are reset before the fresh slot and
//! scan results are recorded.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::engines::api::EngineSlot;
use crate::metrics::error::{MetricsError, MetricsResult};
use crate::scans::api::{ClassifiedScan, DurationKind};

pub const ENGINES_METRIC: &str = "checkmarx_sast_engines";
pub const SCANS_PULLING_METRIC: &str = "checkmarx_sast_scans_pulling";
pub const SCANS_QUEUED_METRIC: &str = "checkmarx_sast_scans_queued";
pub const SCANS_SCANNING_METRIC: &str = "checkmarx_sast_scans_scanning";
pub const SCANS_FULL_METRIC: &str = "checkmarx_sast_scans_full";

const SLOT_LABELS: [&str; 4] = ["engineId", "engineName", "slotIndex", "state"];
const SCAN_LABELS: [&str; 5] = ["scanId", "engineId", "engineName", "locMin", "locMax"];

/// Content type of the Prometheus text exposition format
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const BUFFER_CAP: usize = 64 * 1024;

/// Gauge families published on every scrape
pub struct MetricsEmitter {
    registry: Registry,
    engines: GaugeVec,
    pulling: GaugeVec,
    queued: GaugeVec,
    scanning: GaugeVec,
    full: GaugeVec,
}

impl MetricsEmitter {
    /// Build a private registry holding the exporter's gauge families
    pub fn new() -> MetricsResult<Self> {
        let registry = Registry::new();
        let engines = register_gauge(
            &registry,
            ENGINES_METRIC,
            "Checkmarx sast engines workload",
            &SLOT_LABELS,
        )?;
        let pulling = register_gauge(
            &registry,
            SCANS_PULLING_METRIC,
            "Checkmarx sast scans pulling workload in minutes",
            &SCAN_LABELS,
        )?;
        let queued = register_gauge(
            &registry,
            SCANS_QUEUED_METRIC,
            "Checkmarx sast scans queued workload in minutes",
            &SCAN_LABELS,
        )?;
        let scanning = register_gauge(
            &registry,
            SCANS_SCANNING_METRIC,
            "Checkmarx sast scans scanning workload in minutes",
            &SCAN_LABELS,
        )?;
        let full = register_gauge(
            &registry,
            SCANS_FULL_METRIC,
            "Checkmarx sast scans full workload in minutes",
            &SCAN_LABELS,
        )?;

        Ok(Self {
            registry,
            engines,
            pulling,
            queued,
            scanning,
            full,
        })
    }

    /// Replace every sample with the results of one collection pass
    pub fn emit(&self, slots: &[EngineSlot], scans: &[ClassifiedScan]) {
        self.reset();
        self.record_slots(slots);
        for scan in scans {
            self.record_scan(scan);
        }
    }

    /// Drop all samples from all families
    pub fn reset(&self) {
        for family in [
            &self.engines,
            &self.pulling,
            &self.queued,
            &self.scanning,
            &self.full,
        ] {
            family.reset();
        }
    }

    /// One 0/1 utilization sample per slot
    pub fn record_slots(&self, slots: &[EngineSlot]) {
        for slot in slots {
            let engine_id = slot.key.engine_id.to_string();
            let slot_index = slot.key.slot_index.to_string();
            let busy = if slot.state.is_busy() { 1.0 } else { 0.0 };
            self.engines
                .with_label_values(&[
                    engine_id.as_str(),
                    slot.engine_name.as_str(),
                    slot_index.as_str(),
                    slot.state.as_ref(),
                ])
                .set(busy);
        }
    }

    /// One sample per duration the classifier found for this scan
    pub fn record_scan(&self, scan: &ClassifiedScan) {
        let scan_id = scan.scan_id.to_string();
        let engine_id = scan.engine.engine_id.to_string();
        let min_loc = scan.engine.min_loc.to_string();
        let max_loc = scan.engine.max_loc.to_string();
        let labels = [
            scan_id.as_str(),
            engine_id.as_str(),
            scan.engine.engine_name.as_str(),
            min_loc.as_str(),
            max_loc.as_str(),
        ];

        for (kind, minutes) in scan.durations.present() {
            log::trace!("Scan {} {}: {:.2} min", scan_id, kind.as_ref(), minutes);
            self.family(kind).with_label_values(&labels).set(minutes);
        }
    }

    /// Encode the registry in the Prometheus text exposition format
    pub fn render(&self) -> MetricsResult<String> {
        let families = self.registry.gather();
        let mut buffer = Vec::with_capacity(BUFFER_CAP);
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| MetricsError::Encoding {
                message: e.to_string(),
            })?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding {
            message: e.to_string(),
        })
    }

    fn family(&self, kind: DurationKind) -> &GaugeVec {
        match kind {
            DurationKind::Pulling => &self.pulling,
            DurationKind::Queued => &self.queued,
            DurationKind::Scanning => &self.scanning,
            DurationKind::Full => &self.full,
        }
    }
}

fn register_gauge(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> MetricsResult<GaugeVec> {
    let gauge = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}
