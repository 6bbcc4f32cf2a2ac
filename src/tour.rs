use log::{info, warn};

use crate::animation::{AnimationEvent, Animator, PRESENT_OPEN_SECS};
use crate::camera::Camera;
use crate::config::TourScript;
use crate::error::TourError;
use crate::picker::{InteractionPicker, InteractiveKind, InteractiveSet, Picked};
use crate::scene::SceneGraph;
use crate::sequencer::{FinaleEffect, FinalePhase, PresentSequence};
use crate::timeline::{LockReason, NavigationState, NavigationTimeline, Pose, TimelineEffect};
use crate::traits::{Overlay, Presentation, Renderer};
use crate::waypoints::extract_waypoints;

/// Seconds of the character's celebration bounce.
const CELEBRATE_SECS: f32 = 1.2;
/// Default viewport aspect until the host reports a size.
const DEFAULT_ASPECT: f32 = 16.0 / 9.0;

/// Outcome of a scroll or timer step the host must mirror onto its scroll
/// surface: when `snapped` is set, the surface's progress is overridden
/// programmatically.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollResponse {
    pub snapped: Option<f32>,
}

/// The assembled experience: environment, camera path, story triggers,
/// picking, and the finale, wired to one [`Presentation`] implementation.
///
/// Everything runs on the caller's thread; the host forwards scroll ticks,
/// pointer events, frame deltas, and overlay interactions, and mirrors any
/// snapped progress back onto its scroll surface.
pub struct Tour<P: Presentation> {
    scene: SceneGraph,
    camera: Camera,
    timeline: NavigationTimeline,
    picker: InteractionPicker,
    interactives: InteractiveSet,
    sequencer: PresentSequence,
    animator: Animator,
    script: TourScript,
    presentation: P,
}

impl<P: Presentation> Tour<P> {
    /// Assemble a tour. Fails with [`TourError::EmptyWaypointSet`] when the
    /// environment resolves none of the scripted waypoints; the scene then
    /// never leaves its loading state.
    pub fn new(scene: SceneGraph, script: TourScript, presentation: P) -> Result<Self, TourError> {
        let waypoints = extract_waypoints(&scene, &script.waypoints)?;
        info!("tour ready: {} of {} waypoints resolved", waypoints.len(), script.waypoints.len());

        let timeline = NavigationTimeline::new(waypoints, &script.triggers)?;
        let mut interactives = InteractiveSet::new();
        interactives.allow(&script.door_node, InteractiveKind::Door);

        let sequencer = PresentSequence::new(script.presents.clone(), script.special_present);

        let mut camera = Camera::new(DEFAULT_ASPECT);
        let start = timeline.pose_at(0.0);
        camera.set_pose(start.position, start.orientation);

        Ok(Self {
            scene,
            camera,
            timeline,
            picker: InteractionPicker::new(),
            interactives,
            sequencer,
            animator: Animator::new(),
            script,
            presentation,
        })
    }

    pub fn state(&self) -> &NavigationState {
        self.timeline.state()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn interactives(&self) -> &InteractiveSet {
        &self.interactives
    }

    pub fn finale_phase(&self) -> FinalePhase {
        self.sequencer.phase()
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// The door's idle highlight runs exactly while its stop holds the
    /// scroll.
    pub fn door_pulse_active(&self) -> bool {
        self.scene
            .find(&self.script.door_node)
            .map(|door| self.animator.is_pulsing(door))
            .unwrap_or(false)
    }

    /// Scroll tick from the host's scroll surface.
    pub fn on_scroll(&mut self, progress: f32) -> ScrollResponse {
        let door_open = self.interactives.is_door_open(&self.script.door_node);
        let tick = self.timeline.on_scroll(progress, door_open);
        self.apply_pose(tick.pose);
        self.apply_timeline_effects(tick.effects)
    }

    /// Pointer moved; returns (and forwards) the hover flag.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> bool {
        let hover = self
            .picker
            .pointer_move(&self.scene, &self.camera, &self.interactives, x, y);
        self.presentation.set_hover_cursor(hover);
        hover
    }

    /// Pointer click. Clicks that intersect nothing interactive change no
    /// state at all.
    pub fn on_click(&mut self, x: f32, y: f32) {
        let Some(picked) = self
            .picker
            .click(&self.scene, &self.camera, &self.interactives, x, y)
        else {
            return;
        };
        match picked.kind {
            InteractiveKind::Door => self.door_clicked(picked),
            InteractiveKind::Present => {
                let effects = self.sequencer.present_clicked(&picked.name);
                self.apply_finale_effects(effects);
            }
            InteractiveKind::Letter => self.letter_clicked(picked),
        }
    }

    /// Advance animations and pending timers by `delta` seconds.
    pub fn tick(&mut self, delta: f32) -> ScrollResponse {
        let mut response = ScrollResponse::default();

        for event in self.animator.advance(&mut self.scene, delta) {
            let AnimationEvent::DoorFinished { open, .. } = event;
            // Only a finished opening swing releases the door stop.
            if open && self.timeline.state().lock == Some(LockReason::DoorClosed) {
                let effects = self.timeline.unlock();
                merge(&mut response, self.apply_timeline_effects(effects));
            }
        }

        let effects = self.timeline.tick(delta);
        merge(&mut response, self.apply_timeline_effects(effects));

        let effects = self.sequencer.tick(delta);
        self.apply_finale_effects(effects);

        // Timers may have moved progress; keep the camera on the path.
        let pose = self.timeline.pose_at(self.timeline.state().progress);
        self.apply_pose(pose);
        response
    }

    /// Host wiring for the letter modal's close control.
    pub fn close_letter(&mut self) {
        self.presentation.set_overlay_visible(Overlay::LetterModal, false);
        let effects = self.timeline.letter_closed();
        self.apply_timeline_effects(effects);
    }

    /// Host wiring for a click on the reveal card.
    pub fn card_clicked(&mut self) {
        let effects = self.sequencer.card_clicked();
        self.apply_finale_effects(effects);
    }

    /// Host wiring for the card's collect control.
    pub fn collect_clicked(&mut self) {
        let effects = self.sequencer.collect_clicked();
        self.apply_finale_effects(effects);
    }

    /// Viewport resize; projection only, no tour state involved.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    /// Hand the frame to the opaque renderer.
    pub fn render<R: Renderer>(&self, renderer: &mut R) {
        renderer.draw_frame(&self.scene, &self.camera);
    }

    /// Cancel pending timers and animations ahead of host teardown so no
    /// late callback touches a dismantled scene.
    pub fn teardown(&mut self) {
        self.timeline.cancel_pending();
        self.animator.clear(&mut self.scene);
    }

    fn apply_pose(&mut self, pose: Pose) {
        self.camera.set_pose(pose.position, pose.orientation);
    }

    fn apply_timeline_effects(&mut self, effects: Vec<TimelineEffect>) -> ScrollResponse {
        let mut response = ScrollResponse::default();
        for effect in effects {
            match effect {
                TimelineEffect::SnapScroll(progress) => response.snapped = Some(progress),
                TimelineEffect::Locked(reason) => self.on_locked(reason),
                TimelineEffect::Unlocked(reason) => self.on_unlocked(reason),
                TimelineEffect::SetWaypointText { index } => {
                    let waypoint = self.timeline.waypoint(index);
                    self.presentation
                        .set_waypoint_text(&waypoint.title, &waypoint.description);
                }
                TimelineEffect::SetSnowVisible(visible) => {
                    self.presentation.set_snow_visible(visible);
                }
                TimelineEffect::ShowHousePrompt => {
                    self.presentation.set_overlay_visible(Overlay::HousePrompt, true);
                }
                TimelineEffect::ForceDoorClosed => {
                    // Hinge only; `is_open` survives so the door stop does
                    // not re-engage behind the sleeper.
                    if let Some(door) = self.scene.find(&self.script.door_node) {
                        self.animator.force_door_closed(&mut self.scene, door);
                    }
                }
                TimelineEffect::ArmLetter => self.arm_letter(),
                TimelineEffect::ShowSleepOverlay => {
                    self.presentation.set_overlay_visible(Overlay::SleepOverlay, true);
                }
                TimelineEffect::HideSleepOverlay => {
                    self.presentation.set_overlay_visible(Overlay::SleepOverlay, false);
                }
                TimelineEffect::BeginFinale => {
                    let effects = self.sequencer.begin();
                    self.apply_finale_effects(effects);
                }
            }
        }
        response
    }

    fn on_locked(&mut self, reason: LockReason) {
        if reason == LockReason::DoorClosed {
            if let Some(door) = self.scene.find(&self.script.door_node) {
                self.animator.start_pulse(&self.scene, door);
            }
        }
    }

    fn on_unlocked(&mut self, reason: LockReason) {
        match reason {
            LockReason::DoorClosed => {
                self.presentation.set_overlay_visible(Overlay::HousePrompt, false);
                if let Some(door) = self.scene.find(&self.script.door_node) {
                    self.animator.stop_pulse(&mut self.scene, door);
                }
            }
            // Usually stopped by the letter click; closing the modal without
            // one must not leave the highlight running.
            LockReason::LetterPending => {
                if let Some(letter) = self.scene.find(&self.script.letter_node) {
                    self.animator.stop_pulse(&mut self.scene, letter);
                }
            }
            LockReason::Sleeping => {}
        }
    }

    fn arm_letter(&mut self) {
        self.interactives.allow(&self.script.letter_node, InteractiveKind::Letter);
        match self.scene.find(&self.script.letter_node) {
            Some(letter) => self.animator.start_pulse(&self.scene, letter),
            None => warn!("letter node `{}` missing, highlight skipped", self.script.letter_node),
        }
    }

    fn door_clicked(&mut self, picked: Picked) {
        let open = self.interactives.toggle_door(&picked.name);
        self.animator.start_door(&self.scene, picked.node, open);
        info!("door `{}` swinging {}", picked.name, if open { "open" } else { "closed" });
    }

    fn letter_clicked(&mut self, picked: Picked) {
        self.animator.stop_pulse(&mut self.scene, picked.node);
        self.presentation.set_overlay_visible(Overlay::LetterModal, true);
    }

    fn apply_finale_effects(&mut self, effects: Vec<FinaleEffect>) {
        for effect in effects {
            match effect {
                FinaleEffect::SpawnCharacter => self.spawn_character(),
                FinaleEffect::AllowPresent(name) => {
                    self.interactives.allow(&name, InteractiveKind::Present);
                }
                FinaleEffect::StartPulse(name) => {
                    if let Some(node) = self.scene.find(&name) {
                        self.animator.start_pulse(&self.scene, node);
                    }
                }
                FinaleEffect::StopPulse(name) => {
                    if let Some(node) = self.scene.find(&name) {
                        self.animator.stop_pulse(&mut self.scene, node);
                    }
                }
                FinaleEffect::ShrinkPresent(name) => {
                    if let Some(node) = self.scene.find(&name) {
                        self.animator.scale_to(&self.scene, node, 0.0, PRESENT_OPEN_SECS);
                    }
                }
                FinaleEffect::Celebrate => {
                    if let Some(character) = self.scene.find(&self.script.character_node) {
                        self.animator
                            .start_timed_pulse(&self.scene, character, CELEBRATE_SECS);
                    }
                }
                FinaleEffect::ShowCard(index) => {
                    self.presentation.show_card(index);
                    self.presentation.set_overlay_visible(Overlay::CardReveal, true);
                }
                FinaleEffect::SpecialReveal(index) => {
                    self.presentation.play_special_reveal(index);
                    if let Some(node) = self
                        .script
                        .presents
                        .get(index)
                        .and_then(|name| self.scene.find(name))
                    {
                        let (position, _) = self.scene.world_transform(node);
                        self.presentation.burst_particles(position);
                    }
                }
                FinaleEffect::ExposeCollect => self.presentation.expose_collect_control(),
                FinaleEffect::HideCard => {
                    self.presentation.set_overlay_visible(Overlay::CardReveal, false);
                }
                FinaleEffect::ShowGrandFinale => {
                    self.presentation.set_overlay_visible(Overlay::GrandFinale, true);
                }
            }
        }
    }

    /// Move the decorative character to its scripted spawn marker.
    fn spawn_character(&mut self) {
        let Some(character) = self.scene.find(&self.script.character_node) else {
            warn!("character node `{}` missing, spawn skipped", self.script.character_node);
            return;
        };
        let Some(marker) = self.scene.find(&self.script.character_spawn) else {
            warn!("spawn marker `{}` missing, spawn skipped", self.script.character_spawn);
            return;
        };
        let (position, _) = self.scene.world_transform(marker);
        self.scene.set_local_translation(character, position);
    }
}

fn merge(into: &mut ScrollResponse, from: ScrollResponse) {
    if from.snapped.is_some() {
        into.snapped = from.snapped;
    }
}
