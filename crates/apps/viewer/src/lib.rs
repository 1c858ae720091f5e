//! Viewer session: wires the state stores to the expression source, the
//! encoders and the scene controller, and derives the panel models the UI
//! renders.

pub mod error;
pub mod panels;
pub mod session;

pub use error::*;
pub use panels::*;
pub use session::*;
