//! Display mode definition
//!
//! What the core draws, and whether it draws at all, is a function of the
//! current mode and an event.

use super::events::Event;

/// Display modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Static single placement (or background only)
    #[default]
    Idle,
    /// Marquee heads advancing on every tick
    Scrolling,
    /// Another subsystem owns the panel; the core keeps state but does not
    /// present
    ExternalContent,
}

impl DisplayMode {
    /// Check if animation ticks should run
    pub fn animates(&self) -> bool {
        matches!(self, DisplayMode::Scrolling)
    }

    /// Check if the core may push frames to the display
    pub fn presents(&self) -> bool {
        !matches!(self, DisplayMode::ExternalContent)
    }

    /// Process an event and return the next mode
    pub fn transition(self, event: Event) -> Self {
        use DisplayMode::*;
        use Event::*;

        match (self, event) {
            // New content always reclaims the panel
            (_, ShowScrolling) => Scrolling,
            (_, ShowStatic) => Idle,
            (_, Stop) => Idle,

            // Ownership
            (Idle | Scrolling, EnterExternal) => ExternalContent,
            (ExternalContent, ExitExternal) => Idle,

            // Default: stay in current mode
            _ => self,
        }
    }
}
