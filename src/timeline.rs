use glam::{Quat, Vec3};
use log::{debug, info};

use crate::animation::Countdown;
use crate::config::TriggerIndices;
use crate::error::TourError;
use crate::math::Easing;
use crate::waypoints::Waypoint;

/// Progress half-window around the letter boundary that arms the letter stop.
const LETTER_WINDOW: f32 = 0.012;
/// Progress past which the finale hand-off fires.
const END_OF_TOUR: f32 = 0.99;
/// Segment indices interpolated linearly instead of eased. An authoring
/// choice table, not derivable from the waypoint data.
const LINEAR_SEGMENTS: &[usize] = &[4, 5, 12, 13];
/// Seconds from lights-out to the teleport jump.
const SLEEP_FADE_SECS: f32 = 2.0;
/// Seconds of darkness after the jump before control returns.
const SLEEP_DARK_SECS: f32 = 1.6;

/// Why scrolling is currently pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    DoorClosed,
    LetterPending,
    Sleeping,
}

/// Scroll-driven navigation state.
///
/// Owned by [`NavigationTimeline`]; other subsystems read it through
/// [`NavigationTimeline::state`] and mutate only via the explicit entry
/// points. The three booleans are monotonic latches: once true, nothing
/// resets them.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub progress: f32,
    pub current_index: usize,
    pub lock: Option<LockReason>,
    pub has_read_letter: bool,
    pub has_slept: bool,
    pub end_game_triggered: bool,
}

impl NavigationState {
    fn initial() -> Self {
        Self {
            progress: 0.0,
            current_index: 0,
            lock: None,
            has_read_letter: false,
            has_slept: false,
            end_game_triggered: false,
        }
    }
}

/// Interpolated camera pose on the tour path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

/// Side effect of a timeline step, applied by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEffect {
    /// The external scroll surface must mirror this progress value.
    SnapScroll(f32),
    Locked(LockReason),
    Unlocked(LockReason),
    SetWaypointText { index: usize },
    SetSnowVisible(bool),
    ShowHousePrompt,
    ForceDoorClosed,
    /// Make the letter clickable and start its highlight pulse.
    ArmLetter,
    ShowSleepOverlay,
    HideSleepOverlay,
    BeginFinale,
}

/// Result of one scroll tick.
#[derive(Debug, Clone)]
pub struct ScrollTick {
    pub index: usize,
    pub pose: Pose,
    pub effects: Vec<TimelineEffect>,
}

/// Sleep/teleport sub-state-machine: two timed stages on a cancellable
/// countdown. `FadingIn` ends with the jump to the wake boundary, `Dark`
/// ends with the unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SleepStage {
    FadingIn,
    Dark,
}

#[derive(Debug, Clone)]
struct SleepSequence {
    stage: SleepStage,
    timer: Countdown,
}

impl SleepSequence {
    fn start() -> Self {
        Self {
            stage: SleepStage::FadingIn,
            timer: Countdown::started(SLEEP_FADE_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Boundaries {
    door: f32,
    snow_stop: f32,
    letter: f32,
    sleep: f32,
    wake: f32,
}

impl Boundaries {
    /// Trigger boundaries follow the authoring convention of dividing by the
    /// waypoint count, so boundary `i` sits slightly before waypoint `i` on
    /// the camera path (which spans `count - 1` segments).
    fn new(count: usize, triggers: &TriggerIndices) -> Self {
        let at = |index: usize| index as f32 / count as f32;
        Self {
            door: at(triggers.door),
            snow_stop: at(triggers.snow_stop),
            letter: at(triggers.letter),
            sleep: at(triggers.sleep),
            wake: at(triggers.wake),
        }
    }
}

/// The scroll-to-camera-path state machine.
///
/// Converts a [0, 1] scroll progress into an interpolated pose over the
/// waypoint sequence and layers the story triggers on top. Trigger rules run
/// in a fixed order every tick; later rules observe locks taken earlier in
/// the same tick.
#[derive(Debug, Clone)]
pub struct NavigationTimeline {
    waypoints: Vec<Waypoint>,
    boundaries: Boundaries,
    state: NavigationState,
    sleep: Option<SleepSequence>,
}

impl NavigationTimeline {
    pub fn new(waypoints: Vec<Waypoint>, triggers: &TriggerIndices) -> Result<Self, TourError> {
        if waypoints.is_empty() {
            return Err(TourError::EmptyWaypointSet);
        }
        let boundaries = Boundaries::new(waypoints.len(), triggers);
        Ok(Self {
            waypoints,
            boundaries,
            state: NavigationState::initial(),
            sleep: None,
        })
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock.is_some()
    }

    pub fn waypoint(&self, index: usize) -> &Waypoint {
        &self.waypoints[index.min(self.waypoints.len() - 1)]
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    /// Drive the timeline from a scroll tick.
    ///
    /// Idempotent for repeated identical progress values: everything is
    /// derived from the effective (post-rule) progress, and while locked the
    /// incoming value is ignored entirely.
    pub fn on_scroll(&mut self, progress: f32, door_open: bool) -> ScrollTick {
        let incoming = progress.clamp(0.0, 1.0);
        if self.state.lock.is_none() {
            self.state.progress = incoming;
        }

        // Fixed rule order; do not reorder.
        let mut effects = Vec::new();
        self.door_rule(door_open, &mut effects);
        self.snow_rule(&mut effects);
        self.letter_rule(&mut effects);
        self.sleep_rule(&mut effects);
        self.end_of_tour_rule(&mut effects);

        let index = self.index_at(self.state.progress);
        self.state.current_index = index;
        effects.push(TimelineEffect::SetWaypointText { index });

        ScrollTick {
            index,
            pose: self.pose_at(self.state.progress),
            effects,
        }
    }

    /// Advance the sleep sequence timers.
    pub fn tick(&mut self, delta: f32) -> Vec<TimelineEffect> {
        let mut effects = Vec::new();
        let fired = match self.sleep.as_mut() {
            Some(sequence) => sequence.timer.tick(delta).then_some(sequence.stage),
            None => return effects,
        };

        match fired {
            Some(SleepStage::FadingIn) => {
                let wake = self.boundaries.wake;
                self.state.progress = wake;
                self.state.current_index = self.index_at(wake);
                if let Some(sequence) = self.sleep.as_mut() {
                    sequence.stage = SleepStage::Dark;
                    sequence.timer = Countdown::started(SLEEP_DARK_SECS);
                }
                debug!("sleep jump to progress {wake:.4}");
                effects.push(TimelineEffect::SnapScroll(wake));
            }
            Some(SleepStage::Dark) => {
                self.sleep = None;
                self.state.lock = None;
                info!("woke up, scroll released");
                effects.push(TimelineEffect::HideSleepOverlay);
                effects.push(TimelineEffect::Unlocked(LockReason::Sleeping));
            }
            None => {}
        }
        effects
    }

    /// Clear the lock. Called externally once the door finishes opening.
    pub fn unlock(&mut self) -> Vec<TimelineEffect> {
        match self.state.lock.take() {
            Some(reason) => {
                info!("unlocked ({reason:?})");
                vec![TimelineEffect::Unlocked(reason)]
            }
            None => Vec::new(),
        }
    }

    /// The letter modal was closed: latch it as read and release the stop.
    pub fn letter_closed(&mut self) -> Vec<TimelineEffect> {
        self.state.has_read_letter = true;
        if self.state.lock == Some(LockReason::LetterPending) {
            self.unlock()
        } else {
            Vec::new()
        }
    }

    /// Cancel pending sleep stages ahead of teardown.
    pub fn cancel_pending(&mut self) {
        self.sleep = None;
    }

    /// Nearest waypoint index for a progress value.
    pub fn index_at(&self, progress: f32) -> usize {
        let count = self.waypoints.len();
        let index = (progress.clamp(0.0, 1.0) * (count - 1) as f32).round() as usize;
        index.min(count - 1)
    }

    /// Evaluate the camera path: per-segment linear position and slerp
    /// orientation, eased per the authoring table.
    pub fn pose_at(&self, progress: f32) -> Pose {
        let count = self.waypoints.len();
        if count == 1 {
            let only = &self.waypoints[0];
            return Pose {
                position: only.position,
                orientation: only.orientation,
            };
        }

        let t = progress.clamp(0.0, 1.0) * (count - 1) as f32;
        let segment = (t.floor() as usize).min(count - 2);
        let easing = if LINEAR_SEGMENTS.contains(&segment) {
            Easing::Linear
        } else {
            Easing::EaseInOut
        };
        let u = easing.apply(t - segment as f32);

        let a = &self.waypoints[segment];
        let b = &self.waypoints[segment + 1];
        Pose {
            position: a.position.lerp(b.position, u),
            orientation: a.orientation.slerp(b.orientation, u).normalize(),
        }
    }

    fn door_rule(&mut self, door_open: bool, effects: &mut Vec<TimelineEffect>) {
        if self.state.lock.is_some() || door_open {
            return;
        }
        if self.state.progress >= self.boundaries.door {
            self.state.progress = self.boundaries.door;
            self.state.lock = Some(LockReason::DoorClosed);
            info!("door stop engaged at progress {:.4}", self.boundaries.door);
            effects.push(TimelineEffect::SnapScroll(self.boundaries.door));
            effects.push(TimelineEffect::Locked(LockReason::DoorClosed));
            effects.push(TimelineEffect::ShowHousePrompt);
        }
    }

    fn snow_rule(&self, effects: &mut Vec<TimelineEffect>) {
        // Continuous visibility function, not a latch.
        effects.push(TimelineEffect::SetSnowVisible(
            self.state.progress < self.boundaries.snow_stop,
        ));
    }

    fn letter_rule(&mut self, effects: &mut Vec<TimelineEffect>) {
        if self.state.lock.is_some() || self.state.has_read_letter {
            return;
        }
        if (self.state.progress - self.boundaries.letter).abs() <= LETTER_WINDOW {
            self.state.progress = self.boundaries.letter;
            self.state.lock = Some(LockReason::LetterPending);
            info!("letter stop engaged at progress {:.4}", self.boundaries.letter);
            effects.push(TimelineEffect::SnapScroll(self.boundaries.letter));
            effects.push(TimelineEffect::Locked(LockReason::LetterPending));
            effects.push(TimelineEffect::ArmLetter);
        }
    }

    fn sleep_rule(&mut self, effects: &mut Vec<TimelineEffect>) {
        if self.state.lock.is_some() || self.state.has_slept {
            return;
        }
        if self.state.progress >= self.boundaries.sleep {
            // Latch before any side effect: this guard re-runs every tick
            // while progress sits past the boundary.
            self.state.has_slept = true;
            self.state.lock = Some(LockReason::Sleeping);
            self.sleep = Some(SleepSequence::start());
            info!("sleep sequence started");
            effects.push(TimelineEffect::ForceDoorClosed);
            effects.push(TimelineEffect::Locked(LockReason::Sleeping));
            effects.push(TimelineEffect::ShowSleepOverlay);
        }
    }

    fn end_of_tour_rule(&mut self, effects: &mut Vec<TimelineEffect>) {
        if self.state.end_game_triggered {
            return;
        }
        if self.state.progress > END_OF_TOUR {
            // Latch first; the guard body would otherwise re-run every tick.
            self.state.end_game_triggered = true;
            info!("end of tour, handing off to the finale");
            effects.push(TimelineEffect::BeginFinale);
        }
    }
}

impl TimelineEffect {
    /// Progress carried by a `SnapScroll`, if that is what this is.
    pub fn snap_target(&self) -> Option<f32> {
        match self {
            TimelineEffect::SnapScroll(progress) => Some(*progress),
            _ => None,
        }
    }
}
