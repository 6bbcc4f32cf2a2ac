use std::collections::BTreeSet;

use log::{debug, info};

use crate::animation::Countdown;

/// Seconds before an ordinary card exposes its collect control.
const COLLECT_DELAY_SECS: f32 = 1.0;
/// Seconds the special card's extended reveal runs before the collect
/// control appears.
const SPECIAL_REVEAL_SECS: f32 = 3.5;

/// Where the finale currently stands.
///
/// `Collected` never rests between calls: collect handling hides the
/// overlay and advances (or finishes) within one transition, so exactly one
/// present awaits input at any instant until the terminal `Finale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalePhase {
    Idle,
    Highlighting(usize),
    Opened(usize),
    Revealed(usize),
    Finale,
}

/// Orchestrator-facing side effect of a finale transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinaleEffect {
    /// Place the decorative character at its scripted spawn marker.
    SpawnCharacter,
    AllowPresent(String),
    StartPulse(String),
    StopPulse(String),
    /// Animate the present to zero scale.
    ShrinkPresent(String),
    /// Celebration bounce on the decorative character.
    Celebrate,
    ShowCard(usize),
    /// Extended spin/pulse/burst treatment for the special present.
    SpecialReveal(usize),
    ExposeCollect,
    HideCard,
    ShowGrandFinale,
}

/// End-of-tour present-opening flow.
///
/// Entered once from the navigation timeline's end-of-tour hand-off, then
/// driven by pointer messages routed through the orchestrator. Input is
/// accepted only in the phase that armed it, which is what prevents double
/// handling across iterations.
#[derive(Debug)]
pub struct PresentSequence {
    queue: Vec<String>,
    special_index: usize,
    phase: FinalePhase,
    opened: BTreeSet<String>,
    reveal_timer: Countdown,
}

impl PresentSequence {
    pub fn new(queue: Vec<String>, special_index: usize) -> Self {
        Self {
            queue,
            special_index,
            phase: FinalePhase::Idle,
            opened: BTreeSet::new(),
            reveal_timer: Countdown::new(COLLECT_DELAY_SECS),
        }
    }

    pub fn phase(&self) -> FinalePhase {
        self.phase
    }

    pub fn opened(&self) -> &BTreeSet<String> {
        &self.opened
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == FinalePhase::Finale
    }

    /// Enter the finale. Honored once, from `Idle`.
    pub fn begin(&mut self) -> Vec<FinaleEffect> {
        if self.phase != FinalePhase::Idle {
            return Vec::new();
        }
        if self.queue.is_empty() {
            self.phase = FinalePhase::Finale;
            return vec![FinaleEffect::ShowGrandFinale];
        }
        info!("finale begins: {} presents queued", self.queue.len());
        self.phase = FinalePhase::Highlighting(0);
        vec![
            FinaleEffect::SpawnCharacter,
            FinaleEffect::AllowPresent(self.queue[0].clone()),
            FinaleEffect::StartPulse(self.queue[0].clone()),
        ]
    }

    /// A present was clicked. Accepted only while highlighting that exact
    /// present; anything else is silently ignored.
    pub fn present_clicked(&mut self, name: &str) -> Vec<FinaleEffect> {
        let FinalePhase::Highlighting(i) = self.phase else {
            debug!("present click `{name}` ignored outside highlight phase");
            return Vec::new();
        };
        if self.queue[i] != name {
            debug!("present click `{name}` ignored, waiting on `{}`", self.queue[i]);
            return Vec::new();
        }

        self.phase = FinalePhase::Opened(i);
        self.opened.insert(name.to_string());
        info!("present `{name}` opened ({}/{})", self.opened.len(), self.queue.len());
        vec![
            FinaleEffect::StopPulse(name.to_string()),
            FinaleEffect::ShrinkPresent(name.to_string()),
            FinaleEffect::Celebrate,
            FinaleEffect::ShowCard(i),
        ]
    }

    /// The reveal card was clicked.
    pub fn card_clicked(&mut self) -> Vec<FinaleEffect> {
        let FinalePhase::Opened(i) = self.phase else {
            return Vec::new();
        };
        self.phase = FinalePhase::Revealed(i);
        if i == self.special_index {
            self.reveal_timer = Countdown::started(SPECIAL_REVEAL_SECS);
            vec![FinaleEffect::SpecialReveal(i)]
        } else {
            self.reveal_timer = Countdown::started(COLLECT_DELAY_SECS);
            Vec::new()
        }
    }

    /// Advance the reveal delay; exposes the collect control when it
    /// lapses.
    pub fn tick(&mut self, delta: f32) -> Vec<FinaleEffect> {
        if !matches!(self.phase, FinalePhase::Revealed(_)) {
            return Vec::new();
        }
        if self.reveal_timer.tick(delta) {
            vec![FinaleEffect::ExposeCollect]
        } else {
            Vec::new()
        }
    }

    /// The collect control was clicked: advance to the next present or
    /// finish the tour.
    pub fn collect_clicked(&mut self) -> Vec<FinaleEffect> {
        let FinalePhase::Revealed(i) = self.phase else {
            return Vec::new();
        };
        self.reveal_timer.cancel();
        let mut effects = vec![FinaleEffect::HideCard];

        let next = i + 1;
        if next < self.queue.len() {
            self.phase = FinalePhase::Highlighting(next);
            effects.push(FinaleEffect::AllowPresent(self.queue[next].clone()));
            effects.push(FinaleEffect::StartPulse(self.queue[next].clone()));
        } else {
            self.phase = FinalePhase::Finale;
            info!("all presents collected, grand finale");
            effects.push(FinaleEffect::ShowGrandFinale);
        }
        effects
    }
}
