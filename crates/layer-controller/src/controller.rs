//! The layer controller.
//!
//! Every load runs fetch → decode → map mutation → viewport fit, in that
//! order. The controller lock is never held across the fetch or the decode,
//! so loads for different slots overlap freely.
//!
//! Each slot carries a generation number. A replacing load bumps it when
//! issued and installs its result only if no newer load, deselect or reset
//! has happened since; otherwise the result is dropped. Accumulating loads
//! (see [`LayerController::auto_load_all`]) capture the generation without
//! bumping it, so a reset discards whatever is still in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use map_common::{
    BoundingBox, CategorizedFiles, FileName, LayerSlot, OverlayStyles, ViewerError, ViewerResult,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::decode::{build_overlay, Overlay};
use crate::map::{LayerId, MapRenderer};
use crate::metrics;
use crate::selection::SelectionPanel;
use crate::source::DataSource;

/// How a successful load updates its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Remove every current occupant, then install the new layer
    Replace,
    /// Install the new layer next to the existing ones
    Accumulate,
}

/// A layer currently installed for a slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occupant {
    pub id: LayerId,
    pub file: FileName,
    pub bounds: Option<BoundingBox>,
    pub loaded_at: DateTime<Utc>,
}

/// Result of a single load. Failures are reported here, never raised.
#[derive(Debug)]
pub enum LoadOutcome {
    Installed(LayerId),
    /// Empty selection; the slot was cleared
    Cleared,
    /// Fetch or decode failed; the slot is unchanged
    Failed(ViewerError),
    /// A newer load, deselect or reset overtook this one
    Superseded,
}

impl LoadOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, LoadOutcome::Installed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadOutcome::Installed(_) => metrics::OUTCOME_INSTALLED,
            LoadOutcome::Cleared => metrics::OUTCOME_CLEARED,
            LoadOutcome::Failed(e) => e.kind(),
            LoadOutcome::Superseded => metrics::OUTCOME_SUPERSEDED,
        }
    }
}

/// Totals from [`LayerController::auto_load_all`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutoLoadSummary {
    pub installed: Vec<FileName>,
    pub failed: Vec<(FileName, String)>,
    pub superseded: usize,
}

impl AutoLoadSummary {
    fn merge(&mut self, other: AutoLoadSummary) {
        self.installed.extend(other.installed);
        self.failed.extend(other.failed);
        self.superseded += other.superseded;
    }
}

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    occupants: Vec<Occupant>,
}

enum PendingLoad {
    Cleared { removed: usize },
    Fetch { file: FileName, generation: u64 },
}

struct ControllerState<M, P> {
    map: M,
    panel: P,
    slots: [SlotState; 3],
    listing: CategorizedFiles,
}

impl<M: MapRenderer, P> ControllerState<M, P> {
    fn slot_mut(&mut self, slot: LayerSlot) -> &mut SlotState {
        &mut self.slots[slot.index()]
    }

    /// Start a replacing load: bump the slot's generation, and clear the slot
    /// right away when nothing is selected.
    fn begin_load(&mut self, slot: LayerSlot, selected: Option<FileName>) -> PendingLoad {
        let slot_state = self.slot_mut(slot);
        slot_state.generation += 1;
        let generation = slot_state.generation;

        match selected.filter(|name| !name.is_empty()) {
            Some(file) => PendingLoad::Fetch { file, generation },
            None => PendingLoad::Cleared {
                removed: self.clear_slot(slot),
            },
        }
    }

    /// Remove every occupant of `slot` from the map. Returns how many.
    fn clear_slot(&mut self, slot: LayerSlot) -> usize {
        let occupants = std::mem::take(&mut self.slots[slot.index()].occupants);
        for occupant in &occupants {
            self.map.remove_layer(occupant.id);
        }
        occupants.len()
    }
}

/// Owns the active overlays and keeps map and selection widgets in step.
pub struct LayerController<M, P> {
    source: Arc<dyn DataSource>,
    styles: OverlayStyles,
    next_id: AtomicU64,
    state: Mutex<ControllerState<M, P>>,
}

impl<M, P> LayerController<M, P>
where
    M: MapRenderer,
    P: SelectionPanel,
{
    pub fn new(source: Arc<dyn DataSource>, map: M, panel: P) -> Self {
        Self {
            source,
            styles: OverlayStyles::default(),
            next_id: AtomicU64::new(1),
            state: Mutex::new(ControllerState {
                map,
                panel,
                slots: Default::default(),
                listing: CategorizedFiles::default(),
            }),
        }
    }

    pub fn with_styles(mut self, styles: OverlayStyles) -> Self {
        self.styles = styles;
        self
    }

    // ------------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------------

    /// Fetch the listing and populate the widgets. A failed fetch is logged
    /// and leaves every widget empty.
    pub async fn refresh_listing(&self) -> CategorizedFiles {
        match self.source.list_files().await {
            Ok(names) => {
                metrics::record_listing(true);
                self.populate_selectable(names).await
            }
            Err(e) => {
                metrics::record_listing(false);
                warn!(error = %e, "Failed to load file list");
                self.populate_selectable(Vec::<FileName>::new()).await
            }
        }
    }

    /// Partition `names` by suffix and offer each list to its widget.
    pub async fn populate_selectable<I, N>(&self, names: I) -> CategorizedFiles
    where
        I: IntoIterator<Item = N>,
        N: Into<FileName>,
    {
        let files = CategorizedFiles::from_names(names);

        let mut state = self.state.lock().await;
        for slot in LayerSlot::ALL {
            state.panel.populate(slot, files.for_slot(slot));
        }
        state.listing = files.clone();
        drop(state);

        info!(
            raster = files.raster.len(),
            point = files.point.len(),
            contour = files.contour.len(),
            ignored = files.ignored.len(),
            "Populated layer selections"
        );
        files
    }

    /// The most recently populated listing.
    pub async fn listing(&self) -> CategorizedFiles {
        self.state.lock().await.listing.clone()
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Change the widget's choice and load it.
    ///
    /// The widget update and the generation bump share one lock, so the
    /// layer that ends up installed always matches the widget's final
    /// choice. Returns `None` when the widget does not offer `name`.
    #[instrument(skip(self))]
    pub async fn select_and_load(
        &self,
        slot: LayerSlot,
        name: Option<FileName>,
    ) -> Option<LoadOutcome> {
        let pending = {
            let mut state = self.state.lock().await;
            if !state.panel.select(slot, name) {
                return None;
            }
            let selected = state.panel.current_value(slot);
            state.begin_load(slot, selected)
        };
        Some(self.finish_load(slot, pending).await)
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Replace `slot`'s occupant with `selected`, or clear the slot when
    /// nothing (or an empty name) is selected.
    #[instrument(skip(self))]
    pub async fn load_layer(&self, slot: LayerSlot, selected: Option<FileName>) -> LoadOutcome {
        let pending = self.state.lock().await.begin_load(slot, selected);
        self.finish_load(slot, pending).await
    }

    async fn finish_load(&self, slot: LayerSlot, pending: PendingLoad) -> LoadOutcome {
        let outcome = match pending {
            PendingLoad::Cleared { removed } => {
                debug!(removed, "Selection cleared");
                LoadOutcome::Cleared
            }
            PendingLoad::Fetch { file, generation } => {
                let result = self.fetch_layer(slot, &file).await;
                self.apply(slot, file, generation, result, SlotPolicy::Replace)
                    .await
            }
        };
        metrics::record_load(slot, outcome.label());
        outcome
    }

    /// Load every categorized file in `names`, adding each as an extra layer.
    ///
    /// Slots load concurrently; files within a slot load in listing order,
    /// so the viewport ends on the last file that loaded. Failures are logged
    /// and skipped.
    pub async fn auto_load_all<I, N>(&self, names: I) -> AutoLoadSummary
    where
        I: IntoIterator<Item = N>,
        N: Into<FileName>,
    {
        let files = CategorizedFiles::from_names(names);
        let generations = {
            let state = self.state.lock().await;
            LayerSlot::ALL.map(|slot| state.slots[slot.index()].generation)
        };

        let results = join_all(LayerSlot::ALL.into_iter().map(|slot| {
            self.auto_load_slot(slot, files.for_slot(slot), generations[slot.index()])
        }))
        .await;

        let summary = results
            .into_iter()
            .fold(AutoLoadSummary::default(), |mut acc, part| {
                acc.merge(part);
                acc
            });

        info!(
            installed = summary.installed.len(),
            failed = summary.failed.len(),
            superseded = summary.superseded,
            "Auto-load finished"
        );
        summary
    }

    async fn auto_load_slot(
        &self,
        slot: LayerSlot,
        files: &[FileName],
        generation: u64,
    ) -> AutoLoadSummary {
        let mut summary = AutoLoadSummary::default();

        for file in files {
            let result = self.fetch_layer(slot, file).await;
            let outcome = self
                .apply(slot, file.clone(), generation, result, SlotPolicy::Accumulate)
                .await;
            metrics::record_load(slot, outcome.label());

            match outcome {
                LoadOutcome::Installed(_) => summary.installed.push(file.clone()),
                LoadOutcome::Failed(e) => summary.failed.push((file.clone(), e.to_string())),
                LoadOutcome::Superseded => summary.superseded += 1,
                LoadOutcome::Cleared => {}
            }
        }
        summary
    }

    /// Fetch and decode `file`. Decoding runs on the blocking pool.
    async fn fetch_layer(&self, slot: LayerSlot, file: &FileName) -> ViewerResult<Overlay> {
        let body = self.source.fetch(file).await?;
        let styles = self.styles.clone();
        let file = file.clone();

        tokio::task::spawn_blocking(move || build_overlay(slot, &file, &body, &styles))
            .await
            .map_err(|e| ViewerError::Decode(format!("decode task failed: {}", e)))?
    }

    /// Install a load result, unless it has gone stale.
    async fn apply(
        &self,
        slot: LayerSlot,
        file: FileName,
        generation: u64,
        result: ViewerResult<Overlay>,
        policy: SlotPolicy,
    ) -> LoadOutcome {
        let overlay = match result {
            Ok(overlay) => overlay,
            Err(e) => {
                warn!(slot = %slot, file = %file, error = %e, "Failed to load layer");
                return LoadOutcome::Failed(e);
            }
        };

        let mut state = self.state.lock().await;
        if state.slots[slot.index()].generation != generation {
            debug!(slot = %slot, file = %file, "Discarding stale load");
            return LoadOutcome::Superseded;
        }

        if policy == SlotPolicy::Replace {
            let removed = state.clear_slot(slot);
            if removed > 0 {
                debug!(slot = %slot, removed, "Removed previous occupant");
            }
        }

        let id = LayerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let bounds = overlay.bounds();
        state.map.add_layer(id, &overlay);
        match bounds.filter(BoundingBox::is_valid) {
            Some(bounds) => state.map.fit_bounds(bounds),
            None => warn!(
                slot = %slot,
                file = %file,
                "Layer has no renderable geometry, viewport unchanged"
            ),
        }

        state.slot_mut(slot).occupants.push(Occupant {
            id,
            file: file.clone(),
            bounds,
            loaded_at: Utc::now(),
        });

        info!(slot = %slot, file = %file, %id, "Layer installed");
        LoadOutcome::Installed(id)
    }

    // ------------------------------------------------------------------------
    // Reset and inspection
    // ------------------------------------------------------------------------

    /// Remove every layer and reset every widget to "none".
    pub async fn reset_all(&self) -> usize {
        let mut state = self.state.lock().await;
        let mut removed = 0;
        for slot in LayerSlot::ALL {
            state.slot_mut(slot).generation += 1;
            removed += state.clear_slot(slot);
            state.panel.reset_to_default(slot);
        }
        drop(state);

        metrics::record_reset(removed);
        info!(removed, "Reset all layers");
        removed
    }

    pub async fn occupants(&self, slot: LayerSlot) -> Vec<Occupant> {
        self.state.lock().await.slots[slot.index()].occupants.clone()
    }

    /// Run `f` against the map while holding the controller lock.
    pub async fn with_map<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.state.lock().await.map)
    }

    /// Run `f` against the selection panel while holding the controller lock.
    pub async fn with_panel<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.state.lock().await.panel)
    }
}
