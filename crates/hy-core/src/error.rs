use thiserror::Error;

pub type HyResult<T> = Result<T, HyError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HyError {
    #[error("Epoch {epoch} is outside the representable calendar range")]
    EpochOutOfRange { epoch: i64 },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
