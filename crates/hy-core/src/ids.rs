use core::fmt;

/// Identifier of a source/receptor point as given in the job description.
///
/// Point ids are user-chosen integers; they are not dense indices.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PointId(pub i64);

impl PointId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for PointId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Debug for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PointId({})", self.0)
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
