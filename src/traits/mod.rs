pub mod environment;
pub mod presentation;
pub mod renderer;

pub use environment::*;
pub use presentation::*;
pub use renderer::*;
