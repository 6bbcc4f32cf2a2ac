use glam::Vec3;

/// Overlay and prompt surfaces the host renders outside the 3D view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlay {
    HousePrompt,
    LetterModal,
    SleepOverlay,
    CardReveal,
    GrandFinale,
}

/// Presentation collaborator: overlays, captions, and ambient cosmetics.
///
/// Implementations hold no tour state and may be called repeatedly with the
/// same value (the snow toggle arrives every scroll tick). Cosmetic-only
/// hooks default to no-ops so headless hosts implement just the core three.
pub trait Presentation {
    fn set_overlay_visible(&mut self, overlay: Overlay, visible: bool);

    /// Caption for the waypoint the camera currently rests nearest to.
    fn set_waypoint_text(&mut self, title: &str, description: &str);

    fn set_snow_visible(&mut self, visible: bool);

    /// Pointer is over something clickable.
    fn set_hover_cursor(&mut self, _active: bool) {}

    /// Show the card-reveal overlay bound to a present's artwork.
    fn show_card(&mut self, _present_index: usize) {}

    /// Extended spin/pulse treatment on the special present's card.
    fn play_special_reveal(&mut self, _present_index: usize) {}

    /// Make the card's collect control clickable.
    fn expose_collect_control(&mut self) {}

    fn burst_particles(&mut self, _position: Vec3) {}
}
