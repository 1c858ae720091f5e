pub mod cell_table;
pub mod column;
pub mod error;
pub mod gene_values;
pub mod gzip;
pub mod manifest;
pub mod palette;
pub mod profile;
pub mod source;

pub use cell_table::*;
pub use column::*;
pub use error::*;
pub use gene_values::*;
pub use gzip::inflate;
pub use manifest::*;
pub use palette::*;
pub use profile::*;
pub use source::*;
