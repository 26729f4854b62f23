//! Locating reference positions within alignments.

use std::{io, ops::Range};

use noodles::sam::alignment::record::cigar::{op::Kind, Op};

/// Where a reference position falls within an alignment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Locus {
    /// The position is aligned to the read base at this 0-based query offset.
    Aligned(usize),
    /// The position is deleted from the read.
    Deletion,
    /// The position is skipped by the read.
    RefSkip,
}

/// Returns the loci of the reference positions in `window` covered by an alignment starting at the
/// 0-based `start`, in reference order.
///
/// The CIGAR operations are walked once, and only positions inside the window are produced.
/// Insertions and clips do not cover any reference position.
pub fn loci<I>(start: u64, ops: I, window: Range<u64>) -> io::Result<Vec<(u64, Locus)>>
where
    I: IntoIterator<Item = io::Result<Op>>,
{
    let mut loci = Vec::new();

    let mut reference = start;
    let mut query = 0;

    for op in ops {
        if reference >= window.end {
            break;
        }

        let op = op?;
        let len = op.len();

        let (consumes_reference, consumes_query) = match op.kind() {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => (true, true),
            Kind::Insertion | Kind::SoftClip => (false, true),
            Kind::Deletion | Kind::Skip => (true, false),
            Kind::HardClip | Kind::Pad => (false, false),
        };

        if consumes_reference {
            let end = reference + len as u64;

            for position in reference.max(window.start)..end.min(window.end) {
                let locus = match op.kind() {
                    Kind::Deletion => Locus::Deletion,
                    Kind::Skip => Locus::RefSkip,
                    _ => Locus::Aligned(query + (position - reference) as usize),
                };

                loci.push((position, locus));
            }

            reference = end;
        }

        if consumes_query {
            query += len;
        }
    }

    Ok(loci)
}
