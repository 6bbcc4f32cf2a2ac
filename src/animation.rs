use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::math::Easing;
use crate::scene::{NodeId, SceneGraph};

/// Seconds the door takes to swing between rest and open.
pub const DOOR_SWING_SECS: f32 = 1.2;
/// Door-open angle about the hinge axis, degrees.
pub const DOOR_OPEN_ANGLE_DEG: f32 = -95.0;
/// Seconds a present takes to shrink away once opened.
pub const PRESENT_OPEN_SECS: f32 = 0.6;

const PULSE_HZ: f32 = 1.6;
const PULSE_GAIN: f32 = 0.12;

/// One-shot duration timer. Inert until started; cancellable.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl Countdown {
    /// Create inactive countdown.
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            active: false,
        }
    }

    /// Create and start in one step.
    pub fn started(duration: f32) -> Self {
        let mut countdown = Self::new(duration);
        countdown.start();
        countdown
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Discard the pending fire.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance; returns true exactly once, when the duration elapses.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += delta;
        if self.elapsed >= self.duration {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// Progress in [0, 1].
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).min(1.0)
    }
}

/// Eased scalar over a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(1e-3),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance; returns true when the tween just reached its end.
    pub fn advance(&mut self, delta: f32) -> bool {
        if self.is_finished() {
            return false;
        }
        self.elapsed += delta;
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn value(&self) -> f32 {
        let u = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * u
    }
}

/// Which local channel of a node a tween writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    HingeAngle,
    UniformScale,
}

/// Raised when a tween crosses its end; the orchestrator routes these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationEvent {
    DoorFinished { node: NodeId, open: bool },
}

#[derive(Debug, Clone, Copy)]
enum TweenOutcome {
    Door { open: bool },
    Silent,
}

#[derive(Debug)]
struct ActiveTween {
    node: NodeId,
    channel: Channel,
    tween: Tween,
    /// Scale the factor tween multiplies; unused by hinge tweens.
    rest_scale: Vec3,
    outcome: TweenOutcome,
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    rest_scale: Vec3,
    elapsed: f32,
    /// Auto-stop after this long; `None` pulses until stopped.
    remaining: Option<f32>,
}

/// Cooperative animation driver.
///
/// One tween per (node, channel): starting a new one replaces whatever is in
/// flight, so retargeting mid-swing never compounds. Pulses are stopped
/// explicitly (or expire) and always restore the rest scale they captured.
#[derive(Debug, Default)]
pub struct Animator {
    tweens: Vec<ActiveTween>,
    pulses: HashMap<NodeId, Pulse>,
    hinge_rest: HashMap<NodeId, Quat>,
    hinge_angle: HashMap<NodeId, f32>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swing a door to its open or closed angle from wherever it is now.
    pub fn start_door(&mut self, scene: &SceneGraph, node: NodeId, open: bool) {
        self.hinge_rest
            .entry(node)
            .or_insert_with(|| scene.local(node).rotation);
        let from = self.hinge_angle.get(&node).copied().unwrap_or(0.0);
        let to = if open {
            DOOR_OPEN_ANGLE_DEG.to_radians()
        } else {
            0.0
        };
        self.replace_tween(ActiveTween {
            node,
            channel: Channel::HingeAngle,
            tween: Tween::new(from, to, DOOR_SWING_SECS, Easing::EaseInOut),
            rest_scale: Vec3::ONE,
            outcome: TweenOutcome::Door { open },
        });
    }

    /// Put a door at its closed angle immediately, cancelling any swing.
    pub fn force_door_closed(&mut self, scene: &mut SceneGraph, node: NodeId) {
        self.tweens
            .retain(|active| !(active.node == node && active.channel == Channel::HingeAngle));
        if let Some(rest) = self.hinge_rest.get(&node) {
            scene.set_local_rotation(node, *rest);
        }
        self.hinge_angle.insert(node, 0.0);
    }

    /// Begin an endless highlight pulse. Already-pulsing nodes are left
    /// alone so the rest scale is captured exactly once.
    pub fn start_pulse(&mut self, scene: &SceneGraph, node: NodeId) {
        self.pulses.entry(node).or_insert(Pulse {
            rest_scale: scene.local(node).scale,
            elapsed: 0.0,
            remaining: None,
        });
    }

    /// Short self-expiring pulse (celebration bounce).
    pub fn start_timed_pulse(&mut self, scene: &SceneGraph, node: NodeId, seconds: f32) {
        self.pulses.entry(node).or_insert(Pulse {
            rest_scale: scene.local(node).scale,
            elapsed: 0.0,
            remaining: Some(seconds),
        });
    }

    /// Stop a pulse and restore the node's rest scale.
    pub fn stop_pulse(&mut self, scene: &mut SceneGraph, node: NodeId) {
        if let Some(pulse) = self.pulses.remove(&node) {
            scene.set_local_scale(node, pulse.rest_scale);
        }
    }

    pub fn is_pulsing(&self, node: NodeId) -> bool {
        self.pulses.contains_key(&node)
    }

    /// Tween a node's uniform scale towards `target` times its scale at
    /// start. Stop any pulse on the node first so the captured rest scale is
    /// the true one.
    pub fn scale_to(&mut self, scene: &SceneGraph, node: NodeId, target: f32, duration: f32) {
        self.replace_tween(ActiveTween {
            node,
            channel: Channel::UniformScale,
            tween: Tween::new(1.0, target, duration, Easing::EaseInOut),
            rest_scale: scene.local(node).scale,
            outcome: TweenOutcome::Silent,
        });
    }

    pub fn has_tween(&self, node: NodeId, channel: Channel) -> bool {
        self.tweens
            .iter()
            .any(|active| active.node == node && active.channel == channel)
    }

    /// Advance everything by `delta`, writing results into the scene.
    pub fn advance(&mut self, scene: &mut SceneGraph, delta: f32) -> Vec<AnimationEvent> {
        let mut events = Vec::new();

        for active in &mut self.tweens {
            let finished = active.tween.advance(delta);
            match active.channel {
                Channel::HingeAngle => {
                    let angle = active.tween.value();
                    let rest = self
                        .hinge_rest
                        .get(&active.node)
                        .copied()
                        .unwrap_or(Quat::IDENTITY);
                    scene.set_local_rotation(active.node, rest * Quat::from_rotation_y(angle));
                    self.hinge_angle.insert(active.node, angle);
                }
                Channel::UniformScale => {
                    scene.set_local_scale(active.node, active.rest_scale * active.tween.value());
                }
            }
            if finished {
                if let TweenOutcome::Door { open } = active.outcome {
                    events.push(AnimationEvent::DoorFinished {
                        node: active.node,
                        open,
                    });
                }
            }
        }
        self.tweens.retain(|active| !active.tween.is_finished());

        let mut expired = Vec::new();
        for (node, pulse) in &mut self.pulses {
            pulse.elapsed += delta;
            if let Some(remaining) = &mut pulse.remaining {
                *remaining -= delta;
                if *remaining <= 0.0 {
                    expired.push(*node);
                    continue;
                }
            }
            let wave = 0.5 * (1.0 - (std::f32::consts::TAU * PULSE_HZ * pulse.elapsed).cos());
            scene.set_local_scale(*node, pulse.rest_scale * (1.0 + PULSE_GAIN * wave));
        }
        for node in expired {
            self.stop_pulse(scene, node);
        }

        events
    }

    /// Cancel everything; pulsing nodes return to their rest scale.
    pub fn clear(&mut self, scene: &mut SceneGraph) {
        self.tweens.clear();
        let nodes: Vec<NodeId> = self.pulses.keys().copied().collect();
        for node in nodes {
            self.stop_pulse(scene, node);
        }
    }

    fn replace_tween(&mut self, tween: ActiveTween) {
        self.tweens
            .retain(|active| !(active.node == tween.node && active.channel == tween.channel));
        self.tweens.push(tween);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;
    use glam::Vec3;

    fn scene_with_node() -> (SceneGraph, NodeId) {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(Some("Door_001"), None, Transform::IDENTITY, None);
        (scene, node)
    }

    #[test]
    fn countdown_fires_once() {
        let mut timer = Countdown::new(1.0);
        assert!(!timer.tick(0.5), "inactive timer never fires");

        timer.start();
        assert!(!timer.tick(0.5));
        assert_eq!(timer.progress(), 0.5);
        assert!(timer.tick(0.6));
        assert!(!timer.tick(0.1), "spent timer stays quiet");
    }

    #[test]
    fn countdown_cancel_discards_pending_fire() {
        let mut timer = Countdown::started(1.0);
        timer.tick(0.5);
        timer.cancel();
        assert!(!timer.tick(10.0));
    }

    #[test]
    fn tween_reaches_target_exactly_once() {
        let mut tween = Tween::new(0.0, 2.0, 1.0, Easing::Linear);
        assert!(!tween.advance(0.5));
        assert!((tween.value() - 1.0).abs() < 1e-5);
        assert!(tween.advance(0.6));
        assert_eq!(tween.value(), 2.0);
        assert!(!tween.advance(0.1), "finished tween does not re-fire");
    }

    #[test]
    fn door_completion_reports_open_state() {
        let (mut scene, door) = scene_with_node();
        let mut animator = Animator::new();

        animator.start_door(&scene, door, true);
        let events = animator.advance(&mut scene, DOOR_SWING_SECS + 0.1);
        assert_eq!(
            events,
            vec![AnimationEvent::DoorFinished {
                node: door,
                open: true
            }]
        );

        let hinge = scene.local(door).rotation;
        let expected = Quat::from_rotation_y(DOOR_OPEN_ANGLE_DEG.to_radians());
        assert!(hinge.dot(expected).abs() > 0.999);
    }

    #[test]
    fn retargeting_a_door_replaces_the_swing() {
        let (mut scene, door) = scene_with_node();
        let mut animator = Animator::new();

        animator.start_door(&scene, door, true);
        animator.advance(&mut scene, 0.3);
        animator.start_door(&scene, door, false);

        assert!(animator.has_tween(door, Channel::HingeAngle));
        let events = animator.advance(&mut scene, DOOR_SWING_SECS + 0.1);
        assert_eq!(
            events,
            vec![AnimationEvent::DoorFinished {
                node: door,
                open: false
            }]
        );
        assert!(!animator.has_tween(door, Channel::HingeAngle));
    }

    #[test]
    fn stop_pulse_restores_rest_scale() {
        let (mut scene, node) = scene_with_node();
        let mut animator = Animator::new();

        animator.start_pulse(&scene, node);
        animator.advance(&mut scene, 0.2);
        assert!(animator.is_pulsing(node));
        assert!(scene.local(node).scale != Vec3::ONE);

        animator.stop_pulse(&mut scene, node);
        assert!(!animator.is_pulsing(node));
        assert_eq!(scene.local(node).scale, Vec3::ONE);
    }

    #[test]
    fn timed_pulse_expires_on_its_own() {
        let (mut scene, node) = scene_with_node();
        let mut animator = Animator::new();

        animator.start_timed_pulse(&scene, node, 0.5);
        animator.advance(&mut scene, 0.2);
        assert!(animator.is_pulsing(node));
        animator.advance(&mut scene, 0.4);
        assert!(!animator.is_pulsing(node));
        assert_eq!(scene.local(node).scale, Vec3::ONE);
    }

    #[test]
    fn clear_restores_everything() {
        let (mut scene, node) = scene_with_node();
        let mut animator = Animator::new();

        animator.start_pulse(&scene, node);
        animator.scale_to(&scene, node, 0.0, 1.0);
        animator.advance(&mut scene, 0.1);

        animator.clear(&mut scene);
        assert!(!animator.is_pulsing(node));
        assert!(!animator.has_tween(node, Channel::UniformScale));
        assert_eq!(scene.local(node).scale, Vec3::ONE);
    }
}
