//! Load and reset counters.
//!
//! Recorded through the `metrics` facade; the viewer service installs the
//! Prometheus exporter. Without a recorder these are no-ops.

use map_common::LayerSlot;
use metrics::counter;

pub const OUTCOME_INSTALLED: &str = "installed";
pub const OUTCOME_CLEARED: &str = "cleared";
pub const OUTCOME_SUPERSEDED: &str = "superseded";

/// Count one load attempt for `slot` by outcome.
pub fn record_load(slot: LayerSlot, outcome: &'static str) {
    counter!("layer_loads_total", "slot" => slot.as_str(), "outcome" => outcome).increment(1);
}

pub fn record_reset(removed: usize) {
    counter!("layer_resets_total").increment(1);
    counter!("layers_removed_total").increment(removed as u64);
}

pub fn record_listing(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("listing_fetches_total", "outcome" => outcome).increment(1);
}
