//! Writing aggregates.
//!
//! Each aggregate is written as a single line of four space-separated fields:
//!
//! ```text
//! <chrom> <start> <unique barcodes> <barcode summary>
//! ```
//!
//! The barcode summary is a `;`-separated list of `<barcode>,<count>` pairs, which is empty (leaving
//! a trailing space) when the column has no reads with a resolved base.

use std::io;

use crate::SiteAggregate;

/// The field separator.
pub const SEPARATOR: &str = " ";

/// Writes an aggregate as a single line.
pub fn write_aggregate<W>(writer: &mut W, aggregate: &SiteAggregate<'_>) -> io::Result<()>
where
    W: io::Write,
{
    let site = aggregate.site();

    writeln!(
        writer,
        "{chrom}{SEPARATOR}{start}{SEPARATOR}{unique}{SEPARATOR}{summary}",
        chrom = site.chrom(),
        start = site.start(),
        unique = aggregate.unique_barcodes(),
        summary = aggregate.summary(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{Observation, Site};

    fn write_to_string(aggregate: &SiteAggregate<'_>) -> String {
        let mut buf = Vec::new();
        write_aggregate(&mut buf, aggregate).expect("write to vec");
        String::from_utf8(buf).expect("valid utf8")
    }

    #[test]
    fn test_write_aggregate() {
        let site = Site::new("chr1", 100, 101, "A", "T");
        let mut aggregate = SiteAggregate::new(&site);
        aggregate.extend([
            Observation::new(b'A', Some(String::from("BX1"))),
            Observation::new(b'T', Some(String::from("BX2"))),
            Observation::new(b'T', Some(String::from("BX1"))),
        ]);

        assert_eq!(write_to_string(&aggregate), "chr1 100 2 BX1,2;BX2,1\n");
    }

    #[test]
    fn test_write_empty_aggregate() {
        let site = Site::new("chr3", 0, 1, "G", "C");
        let aggregate = SiteAggregate::new(&site);

        assert_eq!(write_to_string(&aggregate), "chr3 0 0 \n");
    }
}
