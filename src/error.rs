use thiserror::Error;

/// Failures surfaced while assembling or driving a tour.
///
/// Individual missing nodes are logged and skipped at the site that notices
/// them; only a tour with zero resolved waypoints refuses to start.
#[derive(Debug, Error)]
pub enum TourError {
    /// A named node the tour script references is absent from the environment.
    #[error("scene node `{0}` not found in environment")]
    MissingNode(String),

    /// None of the scripted waypoints resolved against the environment.
    #[error("no waypoints resolved from the environment")]
    EmptyWaypointSet,

    /// The environment asset could not be imported.
    #[error("environment asset unreadable: {0}")]
    AssetUnreadable(String),
}
