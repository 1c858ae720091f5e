pub mod analysis;
pub mod colormap;
pub mod encoding;
pub mod error;

pub use analysis::statistics::Statistics;
pub use colormap::*;
pub use encoding::*;
pub use error::*;
