use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use log::{debug, info};

use tour_viewer::camera::Camera;
use tour_viewer::cli::Cli;
use tour_viewer::scene::SceneGraph;
use tour_viewer::scenes::DemoEnvironment;
use tour_viewer::loaders::GltfEnvironment;
use tour_viewer::sequencer::FinalePhase;
use tour_viewer::timeline::LockReason;
use tour_viewer::traits::{EnvironmentSource, Overlay, Presentation, Renderer};
use tour_viewer::{Tour, TourScript};

/// Frame step used while servicing animations and timers.
const TICK_SECS: f32 = 1.0 / 60.0;
/// Upper bound on tick loops so a wedged state fails loudly instead of
/// hanging.
const MAX_TICKS: usize = 4000;

/// Presentation that narrates to the log and remembers just enough to keep
/// the walkthrough honest.
#[derive(Default)]
struct ConsolePresentation {
    snow_visible: Option<bool>,
    collect_exposed: bool,
}

impl Presentation for ConsolePresentation {
    fn set_overlay_visible(&mut self, overlay: Overlay, visible: bool) {
        info!("overlay {overlay:?} -> {}", if visible { "shown" } else { "hidden" });
    }

    fn set_waypoint_text(&mut self, title: &str, description: &str) {
        debug!("caption: {title} - {description}");
    }

    fn set_snow_visible(&mut self, visible: bool) {
        if self.snow_visible != Some(visible) {
            self.snow_visible = Some(visible);
            info!("snowfall {}", if visible { "on" } else { "off" });
        }
    }

    fn show_card(&mut self, present_index: usize) {
        self.collect_exposed = false;
        info!("card reveal for present {present_index}");
    }

    fn play_special_reveal(&mut self, present_index: usize) {
        info!("special reveal for present {present_index}");
    }

    fn expose_collect_control(&mut self) {
        self.collect_exposed = true;
    }

    fn burst_particles(&mut self, position: Vec3) {
        info!("particle burst at {position}");
    }
}

/// Renderer stand-in: counts frames and logs the camera pose now and then.
#[derive(Default)]
struct TraceRenderer {
    frames: usize,
}

impl Renderer for TraceRenderer {
    fn draw_frame(&mut self, _scene: &SceneGraph, camera: &Camera) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            debug!("frame {}: camera at {}", self.frames, camera.position);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let script = match &cli.script {
        Some(path) => TourScript::from_json_file(path)?,
        None => TourScript::builtin(),
    };
    let scene = match &cli.asset {
        Some(path) => GltfEnvironment::new(path)
            .load()
            .context("loading environment asset")?,
        None => DemoEnvironment.load()?,
    };

    let mut tour = Tour::new(scene, script.clone(), ConsolePresentation::default())?;
    run_walkthrough(&mut tour, &script, cli.steps.max(50))?;
    tour.teardown();
    Ok(())
}

/// Drive the whole experience the way a user would: scroll to the end,
/// clicking and waiting wherever the story pins the camera.
fn run_walkthrough(
    tour: &mut Tour<ConsolePresentation>,
    script: &TourScript,
    steps: usize,
) -> Result<()> {
    let mut renderer = TraceRenderer::default();
    let mut progress = 0.0f32;
    let step = 1.0 / steps as f32;

    loop {
        let response = tour.on_scroll(progress);
        if let Some(snapped) = response.snapped {
            progress = snapped;
        }
        service_lock(tour, script, &mut progress)?;

        tour.render(&mut renderer);
        if progress >= 1.0 {
            break;
        }
        progress = (progress + step).min(1.0);
    }

    drive_finale(tour, script)?;
    info!(
        "walkthrough done after {} frames, finale phase {:?}",
        renderer.frames,
        tour.finale_phase()
    );
    Ok(())
}

/// Resolve whichever stop currently pins the scroll.
fn service_lock(
    tour: &mut Tour<ConsolePresentation>,
    script: &TourScript,
    progress: &mut f32,
) -> Result<()> {
    for _ in 0..MAX_TICKS {
        match tour.state().lock {
            None => return Ok(()),
            Some(LockReason::DoorClosed) => {
                info!("door is closed, knocking");
                click_node(tour, &script.door_node)?;
                wait_while(tour, progress, |tour| {
                    tour.state().lock == Some(LockReason::DoorClosed)
                })?;
            }
            Some(LockReason::LetterPending) => {
                info!("reading the letter");
                click_node(tour, &script.letter_node)?;
                tour.close_letter();
            }
            Some(LockReason::Sleeping) => {
                wait_while(tour, progress, |tour| {
                    tour.state().lock == Some(LockReason::Sleeping)
                })?;
            }
        }
    }
    anyhow::bail!("lock never cleared: {:?}", tour.state().lock)
}

/// Open every present in order and collect its card.
fn drive_finale(tour: &mut Tour<ConsolePresentation>, script: &TourScript) -> Result<()> {
    let mut progress = tour.state().progress;
    for present in &script.presents {
        anyhow::ensure!(
            matches!(tour.finale_phase(), FinalePhase::Highlighting(_)),
            "expected a highlighted present, found {:?}",
            tour.finale_phase()
        );
        click_node(tour, present)?;
        tour.card_clicked();
        wait_while(tour, &mut progress, |tour| {
            !tour.presentation().collect_exposed
        })?;
        tour.collect_clicked();
    }
    anyhow::ensure!(
        tour.finale_phase() == FinalePhase::Finale,
        "finale never reached: {:?}",
        tour.finale_phase()
    );
    Ok(())
}

/// Tick until `condition` stops holding, mirroring any snapped progress.
fn wait_while(
    tour: &mut Tour<ConsolePresentation>,
    progress: &mut f32,
    condition: impl Fn(&Tour<ConsolePresentation>) -> bool,
) -> Result<()> {
    for _ in 0..MAX_TICKS {
        if !condition(tour) {
            return Ok(());
        }
        let response = tour.tick(TICK_SECS);
        if let Some(snapped) = response.snapped {
            *progress = snapped;
        }
    }
    anyhow::bail!("timed out waiting for a story beat to resolve")
}

/// Click a node by projecting the center of its geometry through the
/// camera, the same path a real pointer event takes.
fn click_node(tour: &mut Tour<ConsolePresentation>, name: &str) -> Result<()> {
    let id = tour
        .scene()
        .find(name)
        .with_context(|| format!("node `{name}` missing from environment"))?;
    let target = match tour.scene().subtree_bounds(id) {
        Some(bounds) => bounds.center(),
        None => tour.scene().world_transform(id).0,
    };
    let (x, y) = tour
        .camera()
        .project(target)
        .with_context(|| format!("node `{name}` is behind the camera"))?;
    tour.on_pointer_move(x, y);
    tour.on_click(x, y);
    Ok(())
}
