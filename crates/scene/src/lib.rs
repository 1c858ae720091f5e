pub mod camera;
pub mod controller;
pub mod controls;
pub mod error;
pub mod hover;
pub mod labels;
pub mod layer;
pub mod picking;
pub mod point_size;
pub mod spatial;

pub use camera::*;
pub use controller::*;
pub use controls::*;
pub use error::*;
pub use hover::*;
pub use labels::*;
pub use layer::*;
pub use picking::*;
pub use point_size::*;
pub use spatial::*;
