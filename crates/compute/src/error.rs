use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ComputeError {
    #[error("{what} has {got} values but the dataset has {expected} points")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("gene encoding needs at least one expression vector")]
    NoGenes,
}
