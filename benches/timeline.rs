use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tour_viewer::config::TourScript;
use tour_viewer::scenes::create_demo_scene;
use tour_viewer::timeline::NavigationTimeline;
use tour_viewer::waypoints::extract_waypoints;

fn built_timeline() -> NavigationTimeline {
    let scene = create_demo_scene();
    let script = TourScript::builtin();
    let waypoints = extract_waypoints(&scene, &script.waypoints).expect("demo waypoints");
    NavigationTimeline::new(waypoints, &script.triggers).expect("non-empty set")
}

/// Benchmark: pose evaluation across the whole path
fn bench_pose_evaluation(c: &mut Criterion) {
    let timeline = built_timeline();

    c.bench_function("pose_at_sweep", |b| {
        b.iter(|| {
            let mut x = 0.0f32;
            for step in 0..100 {
                let progress = step as f32 / 99.0;
                let pose = timeline.pose_at(black_box(progress));
                x += pose.position.x;
            }
            black_box(x)
        })
    });
}

/// Benchmark: full scroll ticks with rule evaluation
fn bench_scroll_ticks(c: &mut Criterion) {
    c.bench_function("on_scroll_sweep", |b| {
        b.iter(|| {
            let mut timeline = built_timeline();
            for step in 0..100 {
                let progress = step as f32 / 99.0;
                black_box(timeline.on_scroll(black_box(progress), true));
            }
            black_box(timeline.state().current_index)
        })
    });
}

/// Benchmark: waypoint extraction from the demo environment
fn bench_waypoint_extraction(c: &mut Criterion) {
    let scene = create_demo_scene();
    let script = TourScript::builtin();

    c.bench_function("extract_waypoints", |b| {
        b.iter(|| {
            let waypoints =
                extract_waypoints(black_box(&scene), black_box(&script.waypoints)).unwrap();
            black_box(waypoints.len())
        })
    });
}

criterion_group!(
    benches,
    bench_pose_evaluation,
    bench_scroll_ticks,
    bench_waypoint_extraction,
);

criterion_main!(benches);
