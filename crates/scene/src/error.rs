use thiserror::Error;

use crate::LayerTarget;

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("{attribute} list length ({got}) does not match point count ({expected})")]
    LengthMismatch {
        attribute: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("{0:?} layer does not exist for this dataset")]
    MissingLayer(LayerTarget),
}
