pub mod bounds;
pub mod category_set;
pub mod color;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use category_set::*;
pub use color::*;
pub use time::*;
