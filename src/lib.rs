pub mod animation;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod loaders;
pub mod math;
pub mod picker;
pub mod scene;
pub mod scenes;
pub mod sequencer;
pub mod timeline;
pub mod tour;
pub mod traits;
pub mod waypoints;

pub use config::TourScript;
pub use error::TourError;
pub use sequencer::FinalePhase;
pub use timeline::{LockReason, NavigationState, NavigationTimeline, Pose};
pub use tour::{ScrollResponse, Tour};
