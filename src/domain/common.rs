use crate::dates::LocalDay;
use crate::domain::records::RecordId;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> &RecordId;
}

/// A monetary record anchored to one calendar day.
pub trait DatedRecord: Identifiable {
    fn day(&self) -> LocalDay;

    /// Monetary value; non-finite values count as zero wherever it is summed.
    fn amount(&self) -> f64;

    fn description(&self) -> Option<&str>;
}
