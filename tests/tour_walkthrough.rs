//! End-to-end drive of the demo tour: scroll from the gate to the finale,
//! resolving every story stop the way a user would.

use tour_viewer::scenes::create_demo_scene;
use tour_viewer::sequencer::FinalePhase;
use tour_viewer::timeline::LockReason;
use tour_viewer::traits::{Overlay, Presentation};
use tour_viewer::{Tour, TourScript};

const TICK: f32 = 1.0 / 60.0;
const SCROLL_STEP: f32 = 1.0 / 400.0;

#[derive(Default)]
struct RecordingPresentation {
    overlay_events: Vec<(Overlay, bool)>,
    collect_exposed: bool,
    special_reveals: Vec<usize>,
    cards_shown: Vec<usize>,
}

impl Presentation for RecordingPresentation {
    fn set_overlay_visible(&mut self, overlay: Overlay, visible: bool) {
        self.overlay_events.push((overlay, visible));
    }

    fn set_waypoint_text(&mut self, _title: &str, _description: &str) {}

    fn set_snow_visible(&mut self, _visible: bool) {}

    fn show_card(&mut self, present_index: usize) {
        self.collect_exposed = false;
        self.cards_shown.push(present_index);
    }

    fn play_special_reveal(&mut self, present_index: usize) {
        self.special_reveals.push(present_index);
    }

    fn expose_collect_control(&mut self) {
        self.collect_exposed = true;
    }
}

fn click_node(tour: &mut Tour<RecordingPresentation>, name: &str) {
    let id = tour.scene().find(name).expect("node exists");
    let target = tour
        .scene()
        .subtree_bounds(id)
        .expect("node has geometry")
        .center();
    let (x, y) = tour
        .camera()
        .project(target)
        .unwrap_or_else(|| panic!("`{name}` should be in front of the camera"));
    assert!(
        tour.on_pointer_move(x, y),
        "`{name}` should report hover before the click"
    );
    tour.on_click(x, y);
}

fn tick_until(
    tour: &mut Tour<RecordingPresentation>,
    mut done: impl FnMut(&Tour<RecordingPresentation>) -> bool,
) -> Option<f32> {
    let mut snapped = None;
    for _ in 0..4000 {
        if done(tour) {
            return snapped;
        }
        let response = tour.tick(TICK);
        if response.snapped.is_some() {
            snapped = response.snapped;
        }
    }
    panic!("story beat never resolved");
}

#[test]
fn full_walkthrough_reaches_the_grand_finale() {
    let script = TourScript::builtin();
    let mut tour = Tour::new(
        create_demo_scene(),
        script.clone(),
        RecordingPresentation::default(),
    )
    .expect("demo tour assembles");

    let mut progress = 0.0f32;
    let mut door_was_locked = false;
    let mut slept = false;

    loop {
        if let Some(snapped) = tour.on_scroll(progress).snapped {
            progress = snapped;
        }

        match tour.state().lock {
            Some(LockReason::DoorClosed) => {
                door_was_locked = true;
                assert_eq!(progress, 4.0 / 18.0);
                click_node(&mut tour, &script.door_node);
                tick_until(&mut tour, |tour| tour.state().lock.is_none());
            }
            Some(LockReason::LetterPending) => {
                click_node(&mut tour, &script.letter_node);
                tour.close_letter();
            }
            Some(LockReason::Sleeping) => {
                slept = true;
                if let Some(snapped) =
                    tick_until(&mut tour, |tour| tour.state().lock.is_none())
                {
                    progress = snapped;
                }
            }
            None => {}
        }

        if progress >= 1.0 {
            break;
        }
        progress = (progress + SCROLL_STEP).min(1.0);
    }

    assert!(door_was_locked, "the tour must have stopped at the door");
    assert!(slept, "the tour must have run the sleep sequence");
    let state = tour.state();
    assert!(state.has_read_letter && state.has_slept && state.end_game_triggered);

    // Finale: open all four presents in order.
    for (i, present) in script.presents.iter().enumerate() {
        assert_eq!(tour.finale_phase(), FinalePhase::Highlighting(i));
        click_node(&mut tour, present);
        assert_eq!(tour.finale_phase(), FinalePhase::Opened(i));

        tour.card_clicked();
        tick_until(&mut tour, |tour| tour.presentation().collect_exposed);
        tour.collect_clicked();
    }

    assert_eq!(tour.finale_phase(), FinalePhase::Finale);
    assert_eq!(tour.presentation().cards_shown, vec![0, 1, 2, 3]);
    assert_eq!(
        tour.presentation().special_reveals,
        vec![script.special_present]
    );
    assert!(tour
        .presentation()
        .overlay_events
        .contains(&(Overlay::GrandFinale, true)));

    // Every present is on the allow-list and none was removed.
    for present in &script.presents {
        assert!(tour.interactives().contains(present));
    }
    assert!(tour.interactives().contains(&script.door_node));
    assert!(tour.interactives().contains(&script.letter_node));
}

#[test]
fn environment_without_cameras_aborts_activation() {
    use tour_viewer::scene::SceneGraph;

    let result = Tour::new(
        SceneGraph::new(),
        TourScript::builtin(),
        RecordingPresentation::default(),
    );
    assert!(matches!(result, Err(tour_viewer::TourError::EmptyWaypointSet)));
}

#[test]
fn clicking_a_present_before_the_finale_is_ignored() {
    let mut tour = Tour::new(
        create_demo_scene(),
        TourScript::builtin(),
        RecordingPresentation::default(),
    )
    .expect("demo tour assembles");

    // Walk to the end of the path with nothing armed yet: a present click
    // must do nothing because presents are not on the allow-list.
    let interactive_count = tour.interactives().len();
    let id = tour.scene().find("Present_001").expect("present exists");
    let (position, _) = tour.scene().world_transform(id);

    tour.on_scroll(0.0);
    if let Some((x, y)) = tour.camera().project(position) {
        tour.on_click(x, y);
    }
    assert_eq!(tour.interactives().len(), interactive_count);
    assert_eq!(tour.finale_phase(), FinalePhase::Idle);
}
