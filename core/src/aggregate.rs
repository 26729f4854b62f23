//! Barcode aggregation for a single pileup column.

use std::fmt;

use indexmap::IndexMap;

use crate::{barcode, Observation, Site};

/// Barcode counts for a single base call, in order of first appearance.
pub type BarcodeCounts = IndexMap<String, usize>;

/// The barcodes observed among the reads of a single pileup column at a site.
///
/// The aggregate keeps two views of the same observations: the number of observations per barcode
/// for each base call, and the total number of observations per barcode across all base calls.
/// Every inserted observation is counted exactly once in each view.
///
/// The number of distinct barcodes is counted per site across all base calls, so that a barcode
/// contributing reads with different base calls still counts once: the count reflects the number
/// of supporting fragments, not reads. The [`barcode::MISSING`] sentinel is never counted as a
/// distinct barcode.
#[derive(Clone, Debug)]
pub struct SiteAggregate<'a> {
    site: &'a Site,
    counts: IndexMap<u8, BarcodeCounts>,
    barcode_totals: BarcodeCounts,
    unique_barcodes: usize,
}

impl<'a> SiteAggregate<'a> {
    /// Creates a new, empty aggregate for a site.
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            counts: IndexMap::new(),
            barcode_totals: IndexMap::new(),
            unique_barcodes: 0,
        }
    }

    /// Returns the site of the aggregate.
    pub fn site(&self) -> &'a Site {
        self.site
    }

    /// Returns the number of observations per barcode for each base call.
    ///
    /// Both base calls and barcodes are ordered by first appearance.
    pub fn counts(&self) -> &IndexMap<u8, BarcodeCounts> {
        &self.counts
    }

    /// Returns the total number of observations per barcode, ordered by first appearance.
    pub fn barcode_totals(&self) -> &BarcodeCounts {
        &self.barcode_totals
    }

    /// Returns the number of distinct barcodes observed, not counting missing barcodes.
    pub fn unique_barcodes(&self) -> usize {
        self.unique_barcodes
    }

    /// Returns the number of observations inserted.
    pub fn depth(&self) -> usize {
        self.barcode_totals.values().sum()
    }

    /// Returns `true` if no observations have been inserted.
    pub fn is_empty(&self) -> bool {
        self.barcode_totals.is_empty()
    }

    /// Inserts an observation.
    ///
    /// A missing barcode is counted under the [`barcode::MISSING`] sentinel.
    pub fn insert(&mut self, observation: Observation) {
        let (base, barcode) = observation.into_parts();
        let barcode = barcode::resolve(barcode);

        if !barcode::is_missing(&barcode) && !self.barcode_totals.contains_key(&barcode) {
            self.unique_barcodes += 1;
        }

        *self
            .counts
            .entry(base)
            .or_default()
            .entry(barcode.clone())
            .or_insert(0) += 1;

        *self.barcode_totals.entry(barcode).or_insert(0) += 1;
    }

    /// Returns the barcode summary of the aggregate.
    ///
    /// The summary displays as `<barcode>,<count>` pairs joined by `;`, in order of first
    /// appearance. An empty aggregate displays as the empty string.
    pub fn summary(&self) -> Summary<'_> {
        Summary(&self.barcode_totals)
    }
}

impl<'a> Extend<Observation> for SiteAggregate<'a> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = Observation>,
    {
        iter.into_iter()
            .for_each(|observation| self.insert(observation))
    }
}

/// The barcode summary of a [`SiteAggregate`].
#[derive(Clone, Copy, Debug)]
pub struct Summary<'a>(&'a BarcodeCounts);

impl<'a> fmt::Display for Summary<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();

        if let Some((barcode, count)) = iter.next() {
            write!(f, "{barcode},{count}")?;

            for (barcode, count) in iter {
                write!(f, ";{barcode},{count}")?;
            }
        }

        Ok(())
    }
}
