//! Pileup columns from an indexed BAM file.

use std::{
    collections::{BTreeMap, BTreeSet},
    ffi::OsString,
    fmt,
    fs::File,
    io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use noodles::{
    bam, bgzf,
    core::{position::Position, region::Interval},
    csi::{self, BinningIndex},
    sam::{
        self,
        alignment::record::{data::field::Value, Flags},
    },
};

use super::{
    cigar::{self, Locus},
    Call, Column, PileupRead, PileupSource,
};
use crate::Site;

pub use noodles::sam::alignment::record::data::field::Tag;

/// The default barcode tag.
pub const DEFAULT_TAG: Tag = Tag::new(b'B', b'X');

/// The default maximum number of reads per column.
pub const DEFAULT_DEPTH: NonZeroUsize = match NonZeroUsize::new(500) {
    Some(depth) => depth,
    None => unreachable!(),
};

/// A pileup source backed by an indexed BAM file.
///
/// Reads that are unmapped, secondary, QC-failed or duplicates never enter a column. The remaining
/// reads enter every column they cover in file order until the column reaches the maximum depth.
pub struct Bam {
    reader: bam::io::Reader<bgzf::Reader<File>>,
    index: Box<dyn BinningIndex + Send + Sync>,
    header: sam::Header,
    depth: NonZeroUsize,
    tag: Tag,
    record: bam::Record,
}

impl Bam {
    /// Returns a builder with default settings.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the maximum number of reads per column.
    pub fn depth(&self) -> NonZeroUsize {
        self.depth
    }

    /// Returns the barcode tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    fn reference_sequence_id(&self, chrom: &str) -> io::Result<usize> {
        self.header
            .reference_sequences()
            .get_index_of(chrom.as_bytes())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("contig '{chrom}' not found in BAM header"),
                )
            })
    }
}

impl PileupSource for Bam {
    fn pileup(&mut self, site: &Site) -> io::Result<Vec<Column>> {
        let reference_sequence_id = self.reference_sequence_id(site.chrom())?;

        if site.end() <= site.start() {
            return Ok(Vec::new());
        }

        let interval = interval(site.start(), site.end())?;

        let Self {
            reader,
            index,
            depth,
            tag,
            record,
            ..
        } = self;

        let chunks = index.query(reference_sequence_id, interval)?;
        let mut query = bam::io::Reader::from(csi::io::Query::new(reader.get_mut(), chunks));

        let mut columns: BTreeMap<u64, Vec<PileupRead>> = BTreeMap::new();
        let mut capped = BTreeSet::new();

        while query.read_record(record)? > 0 {
            if is_filtered(record.flags()) {
                continue;
            }

            let (Some(id), Some(alignment_start)) = (
                record.reference_sequence_id().transpose()?,
                record.alignment_start().transpose()?,
            ) else {
                continue;
            };

            let alignment_start = usize::from(alignment_start) as u64 - 1;

            if id != reference_sequence_id || alignment_start >= site.end() {
                continue;
            }

            let loci = cigar::loci(
                alignment_start,
                record.cigar().iter(),
                site.start()..site.end(),
            )?;

            if loci.is_empty() {
                continue;
            }

            let sequence = record.sequence();
            let mut barcode = None;

            for (position, locus) in loci {
                let reads = columns.entry(position).or_default();

                if reads.len() >= depth.get() {
                    capped.insert(position);
                    continue;
                }

                let call = match locus {
                    Locus::Aligned(offset) => Call::Base(sequence.get(offset).unwrap_or(b'N')),
                    Locus::Deletion => Call::Deletion,
                    Locus::RefSkip => Call::RefSkip,
                };

                let barcode = barcode
                    .get_or_insert_with(|| extract_barcode(&record.data(), *tag))
                    .clone();

                reads.push(PileupRead::new(call, barcode));
            }
        }

        for position in capped {
            log::warn!(
                "Column at '{}:{position}' reached maximum depth {depth}, remaining reads ignored.",
                site.chrom()
            );
        }

        Ok(columns
            .into_iter()
            .map(|(position, reads)| Column::new(position, reads))
            .collect())
    }
}

/// Returns the 1-based, closed interval corresponding to a 0-based, half-open span.
fn interval(start: u64, end: u64) -> io::Result<Interval> {
    let position = |x: u64| {
        usize::try_from(x)
            .ok()
            .and_then(|x| Position::try_from(x).ok())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("coordinate {x} out of range"),
                )
            })
    };

    Ok(Interval::from(position(start + 1)?..=position(end)?))
}

/// Returns `true` if a read with these flags should be excluded from pileups.
fn is_filtered(flags: Flags) -> bool {
    flags.is_unmapped() || flags.is_secondary() || flags.is_qc_fail() || flags.is_duplicate()
}

/// Extracts the barcode stored under `tag` from the data fields of a record.
///
/// A missing tag, a field that cannot be decoded, and a value of a non-textual type all yield
/// `None`.
pub fn extract_barcode(data: &bam::record::Data<'_>, tag: Tag) -> Option<String> {
    data.get(&tag)
        .and_then(|result| result.ok())
        .and_then(barcode_from_value)
}

fn barcode_from_value(value: Value<'_>) -> Option<String> {
    match value {
        Value::String(s) | Value::Hex(s) => Some(s.to_string()),
        Value::Character(c) => Some(char::from(c).to_string()),
        _ => None,
    }
}

/// Parses a two-character data field tag, such as `BX`.
pub fn parse_tag(s: &str) -> Result<Tag, ParseTagError> {
    match s.as_bytes() {
        &[a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphanumeric() => Ok(Tag::new(a, b)),
        _ => Err(ParseTagError(s.to_string())),
    }
}

/// An error associated with parsing a data field tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseTagError(String);

impl fmt::Display for ParseTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid tag '{}': expected a letter followed by a letter or digit",
            self.0
        )
    }
}

impl std::error::Error for ParseTagError {}

/// A BAM pileup source builder.
#[derive(Debug)]
pub struct Builder {
    depth: NonZeroUsize,
    tag: Tag,
    index: Option<PathBuf>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            tag: DEFAULT_TAG,
            index: None,
        }
    }
}

impl Builder {
    /// Opens the BAM file at the provided path together with its index.
    ///
    /// Unless set explicitly, the index is looked up at `<path>.bai`, falling back to the path with
    /// its extension replaced by `bai`.
    pub fn build_from_path<P>(self, path: P) -> io::Result<Bam>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        let index_path = match self.index {
            Some(index_path) => index_path,
            None => find_index(path).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!(
                        "no index found for BAM '{}' (create one with 'samtools index')",
                        path.display()
                    ),
                )
            })?,
        };

        log::info!("Reading BAM index from '{}'", index_path.display());
        let index = bam::bai::read(&index_path)?;

        log::info!("Reading BAM from '{}'", path.display());
        let mut reader = bam::io::Reader::new(File::open(path)?);
        let header = reader.read_header()?;

        log::debug!(
            "Found {} reference sequences in BAM header",
            header.reference_sequences().len()
        );

        Ok(Bam {
            reader,
            index: Box::new(index),
            header,
            depth: self.depth,
            tag: self.tag,
            record: bam::Record::default(),
        })
    }

    /// Sets the maximum number of reads per column.
    ///
    /// By default, this is [`DEFAULT_DEPTH`].
    pub fn set_depth(mut self, depth: NonZeroUsize) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the path to the BAM index.
    pub fn set_index<P>(mut self, index: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.index = Some(index.into());
        self
    }

    /// Sets the data field tag holding the barcode.
    ///
    /// By default, this is [`DEFAULT_TAG`].
    pub fn set_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }
}

fn find_index(path: &Path) -> Option<PathBuf> {
    let mut appended = OsString::from(path);
    appended.push(".bai");

    [PathBuf::from(appended), path.with_extension("bai")]
        .into_iter()
        .find(|candidate| candidate.is_file())
}
