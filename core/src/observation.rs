//! Read observations.

/// A single read's contribution to a pileup column.
///
/// An observation always carries a resolved base call: reads with a deletion or reference skip at
/// the column are represented by a [`PileupRead`](crate::pileup::PileupRead) without an
/// observation.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Observation {
    base: u8,
    barcode: Option<String>,
}

impl Observation {
    /// Creates a new observation.
    pub fn new(base: u8, barcode: Option<String>) -> Self {
        Self { base, barcode }
    }

    /// Returns the base call.
    pub fn base(&self) -> u8 {
        self.base
    }

    /// Returns the barcode, if any.
    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    /// Returns the base call and barcode.
    pub fn into_parts(self) -> (u8, Option<String>) {
        (self.base, self.barcode)
    }
}
