//! Rendering module
//!
//! Produces a backend-neutral draw list from the read-only frame snapshot.

pub mod palette;
pub mod shapes;

pub use shapes::{DrawCmd, DrawList, Fill, build_frame};
