//! Render executor: the unit of work and the background dispatch loop.

pub mod dispatcher;
pub mod renderer;

pub use dispatcher::JobDispatcher;
pub use renderer::{ChartRenderer, RenderError};
