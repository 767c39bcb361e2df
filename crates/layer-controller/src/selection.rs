//! Selection UI collaborator: one single-choice widget per slot.

use map_common::{FileName, LayerSlot};
use serde::Serialize;

/// Three independent single-choice widgets, each with an implicit "none"
/// entry that is selected by default.
pub trait SelectionPanel: Send {
    /// Replace the options of `slot`'s widget. The current choice is kept
    /// only if it is still offered.
    fn populate(&mut self, slot: LayerSlot, names: &[FileName]);

    fn current_value(&self, slot: LayerSlot) -> Option<FileName>;

    /// Choose `name` (or "none"). Returns `false` if `name` is not offered.
    fn select(&mut self, slot: LayerSlot, name: Option<FileName>) -> bool;

    fn reset_to_default(&mut self, slot: LayerSlot);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Widget {
    pub options: Vec<FileName>,
    pub selected: Option<FileName>,
}

/// In-memory selection panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionState {
    pub raster: Widget,
    pub point: Widget,
    pub contour: Widget,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(&self, slot: LayerSlot) -> &Widget {
        match slot {
            LayerSlot::Raster => &self.raster,
            LayerSlot::Point => &self.point,
            LayerSlot::Contour => &self.contour,
        }
    }

    fn widget_mut(&mut self, slot: LayerSlot) -> &mut Widget {
        match slot {
            LayerSlot::Raster => &mut self.raster,
            LayerSlot::Point => &mut self.point,
            LayerSlot::Contour => &mut self.contour,
        }
    }
}

impl SelectionPanel for SelectionState {
    fn populate(&mut self, slot: LayerSlot, names: &[FileName]) {
        let widget = self.widget_mut(slot);
        widget.options = names.to_vec();
        if let Some(selected) = &widget.selected {
            if !widget.options.contains(selected) {
                widget.selected = None;
            }
        }
    }

    fn current_value(&self, slot: LayerSlot) -> Option<FileName> {
        self.widget(slot).selected.clone()
    }

    fn select(&mut self, slot: LayerSlot, name: Option<FileName>) -> bool {
        let widget = self.widget_mut(slot);
        match name.filter(|n| !n.is_empty()) {
            None => {
                widget.selected = None;
                true
            }
            Some(name) if widget.options.contains(&name) => {
                widget.selected = Some(name);
                true
            }
            Some(_) => false,
        }
    }

    fn reset_to_default(&mut self, slot: LayerSlot) {
        self.widget_mut(slot).selected = None;
    }
}
