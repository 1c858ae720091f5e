pub mod ease;
pub mod precision;
pub mod vec;

pub use ease::*;
pub use precision::*;
pub use vec::*;
