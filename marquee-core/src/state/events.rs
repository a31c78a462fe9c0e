//! Events that trigger display mode transitions

/// Events that can change the display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Content events
    /// A bitmap was committed with animation enabled
    ShowScrolling,
    /// A bitmap was committed without animation, or none is loaded
    ShowStatic,
    /// User stopped the animation
    Stop,

    // Ownership events
    /// Another subsystem takes over the panel
    EnterExternal,
    /// The other subsystem released the panel
    ExitExternal,
}

impl Event {
    /// Check if this event carries new core content
    pub fn is_content_event(&self) -> bool {
        matches!(self, Event::ShowScrolling | Event::ShowStatic | Event::Stop)
    }
}
