//! Facet toggle state.
//!
//! Two independent single-choice dimensions:
//! - wear: at most one wear selected
//! - flavour: StatTrak or Souvenir or neither
//!
//! Every transition preserves both exclusivity rules, so any sequence of
//! toggles leaves a valid state.

use crate::variant::Wear;
use serde::{Deserialize, Serialize};

/// A single toggle event coming from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Toggle {
    Wear(Wear),
    StatTrak,
    Souvenir,
}

/// Per-session facet selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    active_wear: Option<Wear>,
    stattrak_active: bool,
    souvenir_active: bool,
}

impl FilterState {
    /// All facets inactive.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn active_wear(&self) -> Option<Wear> {
        self.active_wear
    }

    #[inline]
    pub fn stattrak_active(&self) -> bool {
        self.stattrak_active
    }

    #[inline]
    pub fn souvenir_active(&self) -> bool {
        self.souvenir_active
    }

    /// No facet is active.
    pub fn is_default(&self) -> bool {
        self.active_wear.is_none() && !self.stattrak_active && !self.souvenir_active
    }

    /// Select `wear`, or clear the wear facet if `wear` is already selected.
    pub fn toggle_wear(&mut self, wear: Wear) {
        self.active_wear = if self.active_wear == Some(wear) {
            None
        } else {
            Some(wear)
        };
    }

    /// Flip StatTrak; turning it on turns Souvenir off.
    pub fn toggle_stattrak(&mut self) {
        if self.stattrak_active {
            self.stattrak_active = false;
        } else {
            self.stattrak_active = true;
            self.souvenir_active = false;
        }
    }

    /// Flip Souvenir; turning it on turns StatTrak off.
    pub fn toggle_souvenir(&mut self) {
        if self.souvenir_active {
            self.souvenir_active = false;
        } else {
            self.souvenir_active = true;
            self.stattrak_active = false;
        }
    }

    /// Apply a toggle event.
    pub fn apply(&mut self, toggle: Toggle) {
        match toggle {
            Toggle::Wear(wear) => self.toggle_wear(wear),
            Toggle::StatTrak => self.toggle_stattrak(),
            Toggle::Souvenir => self.toggle_souvenir(),
        }
    }

    /// Return to the default view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
