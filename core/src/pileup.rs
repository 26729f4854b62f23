//! Pileup columns at sites.

use std::io;

use crate::{Observation, Site};

pub mod bam;
pub use bam::Bam;

pub mod cigar;

/// The call of a read at a single reference position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Call {
    /// The read has an aligned base at the position.
    Base(u8),
    /// The read has a deletion at the position.
    Deletion,
    /// The read skips the position, e.g. across an intron.
    RefSkip,
}

impl Call {
    /// Returns the base call, if resolved.
    pub fn base(&self) -> Option<u8> {
        match self {
            Call::Base(base) => Some(*base),
            Call::Deletion | Call::RefSkip => None,
        }
    }
}

/// A read as seen in a pileup column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PileupRead {
    call: Call,
    barcode: Option<String>,
}

impl PileupRead {
    /// Creates a new pileup read.
    pub fn new(call: Call, barcode: Option<String>) -> Self {
        Self { call, barcode }
    }

    /// Returns the call of the read at the column.
    pub fn call(&self) -> Call {
        self.call
    }

    /// Returns the barcode of the read, if any.
    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    /// Returns the observation of the read, or `None` if the read has no resolved base.
    pub fn observation(&self) -> Option<Observation> {
        self.call
            .base()
            .map(|base| Observation::new(base, self.barcode.clone()))
    }

    /// Converts the read into an observation, or `None` if the read has no resolved base.
    pub fn into_observation(self) -> Option<Observation> {
        let barcode = self.barcode;

        self.call
            .base()
            .map(|base| Observation::new(base, barcode))
    }
}

/// The reads overlapping a single reference position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Column {
    position: u64,
    reads: Vec<PileupRead>,
}

impl Column {
    /// Creates a new column at a 0-based position.
    pub fn new(position: u64, reads: Vec<PileupRead>) -> Self {
        Self { position, reads }
    }

    /// Returns the 0-based reference position of the column.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the reads in the column.
    pub fn reads(&self) -> &[PileupRead] {
        &self.reads
    }

    /// Returns the number of reads in the column, including those without a resolved base.
    pub fn depth(&self) -> usize {
        self.reads.len()
    }

    /// Returns an iterator over the observations of reads with a resolved base.
    pub fn observations(&self) -> impl Iterator<Item = Observation> + '_ {
        self.reads.iter().filter_map(PileupRead::observation)
    }

    /// Converts the column into an iterator over the observations of reads with a resolved base.
    pub fn into_observations(self) -> impl Iterator<Item = Observation> {
        self.reads
            .into_iter()
            .filter_map(PileupRead::into_observation)
    }
}

/// A source of pileup columns.
pub trait PileupSource {
    /// Returns the columns with at least one read within the span of a site, in order of position.
    ///
    /// Columns are truncated to the span of the site: no column outside `[start, end)` is returned.
    fn pileup(&mut self, site: &Site) -> io::Result<Vec<Column>>;
}

impl<S> PileupSource for &mut S
where
    S: PileupSource + ?Sized,
{
    fn pileup(&mut self, site: &Site) -> io::Result<Vec<Column>> {
        (**self).pileup(site)
    }
}

impl<S> PileupSource for Box<S>
where
    S: PileupSource + ?Sized,
{
    fn pileup(&mut self, site: &Site) -> io::Result<Vec<Column>> {
        (**self).pileup(site)
    }
}
