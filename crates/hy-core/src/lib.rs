//! hy-core: shared foundation for the HYSPLIT job translator.
//!
//! Contains:
//! - error (shared error types)
//! - numeric (ordering helpers)
//! - ids (typed identifiers for points)
//! - time (epoch to HYSPLIT calendar fields)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod time;

pub use error::{HyError, HyResult};
pub use ids::*;
pub use numeric::*;
pub use time::*;
