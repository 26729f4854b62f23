//! Driving sites through pileup and aggregation.

use std::{fmt, io};

use crate::{output, site, PileupSource, Site, SiteAggregate};

/// A runner counting barcodes at each site read from a site reader.
///
/// Sites are processed one at a time, in input order. For each site, every pileup column is
/// aggregated and written before the next site is read, and nothing is retained between sites.
pub struct Runner<I, S> {
    sites: I,
    source: S,
}

impl<I, S> Runner<I, S>
where
    I: Iterator<Item = Result<Site, site::reader::Error>>,
    S: PileupSource,
{
    /// Creates a new runner.
    pub fn new(sites: I, source: S) -> Self {
        Self { sites, source }
    }

    /// Processes all sites, writing one line per pileup column to the writer.
    ///
    /// The first error aborts the run. Lines written for earlier sites are kept.
    pub fn run<W>(&mut self, writer: &mut W) -> Result<Summary, Error>
    where
        W: io::Write,
    {
        let mut summary = Summary::default();

        for site in self.sites.by_ref() {
            let site = site?;
            summary.sites += 1;

            let columns = self.source.pileup(&site).map_err(|source| Error::Pileup {
                site: site.clone(),
                source,
            })?;

            log::debug!("Found {} column(s) at site '{site}'", columns.len());

            for column in columns {
                log::trace!(
                    "Column at '{}:{}' has depth {}",
                    site.chrom(),
                    column.position(),
                    column.depth()
                );

                let mut aggregate = SiteAggregate::new(&site);
                aggregate.extend(column.into_observations());

                output::write_aggregate(writer, &aggregate).map_err(Error::Write)?;
                summary.lines += 1;
            }
        }

        writer.flush().map_err(Error::Write)?;

        Ok(summary)
    }
}

/// A summary of a finished run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// The number of sites read.
    pub sites: usize,
    /// The number of lines written.
    pub lines: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} site(s), wrote {} line(s)",
            self.sites, self.lines
        )
    }
}

/// An error associated with a run.
#[derive(Debug)]
pub enum Error {
    /// A site could not be read.
    Site(site::reader::Error),
    /// Pileup columns could not be produced for a site.
    Pileup {
        /// The site being processed.
        site: Site,
        /// The underlying error.
        source: io::Error,
    },
    /// Output could not be written.
    Write(io::Error),
}

impl From<site::reader::Error> for Error {
    fn from(e: site::reader::Error) -> Self {
        Self::Site(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Site(e) => write!(f, "{e}"),
            Error::Pileup { site, .. } => write!(f, "failed to read alignments at site '{site}'"),
            Error::Write(_) => f.write_str("failed to write output"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Site(e) => std::error::Error::source(e),
            Error::Pileup { source, .. } => Some(source),
            Error::Write(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use crate::pileup::{Call, Column, PileupRead};

    /// An in-memory pileup source returning fixed columns per contig and start.
    #[derive(Default)]
    struct MockSource {
        columns: HashMap<(String, u64), Vec<Column>>,
        queried: Vec<Site>,
    }

    impl MockSource {
        fn with(mut self, chrom: &str, start: u64, reads: Vec<PileupRead>) -> Self {
            self.columns
                .entry((chrom.to_string(), start))
                .or_default()
                .push(Column::new(start, reads));
            self
        }
    }

    impl PileupSource for MockSource {
        fn pileup(&mut self, site: &Site) -> io::Result<Vec<Column>> {
            self.queried.push(site.clone());

            if site.chrom() == "chrUn" {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "unknown contig"));
            }

            Ok(self
                .columns
                .get(&(site.chrom().to_string(), site.start()))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn read(base: u8, barcode: Option<&str>) -> PileupRead {
        PileupRead::new(Call::Base(base), barcode.map(String::from))
    }

    fn run(sites: &str, source: &mut MockSource) -> (Result<Summary, Error>, String) {
        let mut output = Vec::new();
        let result = Runner::new(site::Reader::new(sites.as_bytes()), source).run(&mut output);

        (result, String::from_utf8(output).expect("valid utf8"))
    }

    #[test]
    fn test_repeated_barcode() {
        let mut source = MockSource::default().with(
            "chr1",
            100,
            vec![
                read(b'A', Some("BX1")),
                read(b'T', Some("BX2")),
                read(b'T', Some("BX1")),
            ],
        );

        let (result, output) = run("chr1 100 101 A T\n", &mut source);

        assert_eq!(result.unwrap(), Summary { sites: 1, lines: 1 });
        assert_eq!(output, "chr1 100 2 BX1,2;BX2,1\n");
    }

    #[test]
    fn test_missing_barcode() {
        let mut source = MockSource::default().with("chr1", 100, vec![read(b'A', None)]);

        let (result, output) = run("chr1 100 101 A T\n", &mut source);

        assert!(result.is_ok());
        assert_eq!(output, "chr1 100 0 NA,1\n");
    }

    #[test]
    fn test_unresolved_reads_are_excluded() {
        let mut source = MockSource::default().with(
            "chr1",
            100,
            vec![
                PileupRead::new(Call::Deletion, Some(String::from("BX3"))),
                read(b'G', Some("BX1")),
                PileupRead::new(Call::RefSkip, None),
            ],
        );

        let (_, output) = run("chr1 100 101 A G\n", &mut source);

        assert_eq!(output, "chr1 100 1 BX1,1\n");
    }

    #[test]
    fn test_column_with_only_deletions() {
        let mut source = MockSource::default().with(
            "chr1",
            100,
            vec![PileupRead::new(Call::Deletion, Some(String::from("BX3")))],
        );

        let (_, output) = run("chr1 100 101 A G\n", &mut source);

        assert_eq!(output, "chr1 100 0 \n");
    }

    #[test]
    fn test_sites_without_columns_write_nothing() {
        let mut source = MockSource::default().with("chr2", 5, vec![read(b'C', Some("BX9"))]);

        let (result, output) = run("chr1 100 101 A T\nchr2 5 6 C T\n", &mut source);

        assert_eq!(result.unwrap(), Summary { sites: 2, lines: 1 });
        assert_eq!(output, "chr2 5 1 BX9,1\n");
    }

    #[test]
    fn test_sites_in_input_order() {
        let mut source = MockSource::default()
            .with("chr1", 300, vec![read(b'A', Some("BX3"))])
            .with("chr1", 100, vec![read(b'A', Some("BX1"))])
            .with("chr1", 200, vec![read(b'A', Some("BX2"))]);

        let (_, output) = run(
            "chr1 300 301 A T\nchr1 100 101 A T\nchr1 200 201 A T\n",
            &mut source,
        );

        assert_eq!(
            output,
            "chr1 300 1 BX3,1\nchr1 100 1 BX1,1\nchr1 200 1 BX2,1\n"
        );
    }

    #[test]
    fn test_every_column_is_aggregated_separately() {
        let mut source = MockSource::default()
            .with("chr1", 100, vec![read(b'A', Some("BX1"))])
            .with("chr1", 100, vec![read(b'C', Some("BX1")), read(b'C', None)]);

        let (result, output) = run("chr1 100 102 AC TT\n", &mut source);

        assert_eq!(result.unwrap(), Summary { sites: 1, lines: 2 });
        assert_eq!(output, "chr1 100 1 BX1,1\nchr1 100 1 BX1,1;NA,1\n");
    }

    #[test]
    fn test_malformed_site_aborts() {
        let mut source = MockSource::default()
            .with("chr1", 100, vec![read(b'A', Some("BX1"))])
            .with("chr1", 300, vec![read(b'A', Some("BX3"))]);

        let (result, output) = run(
            "chr1 100 101 A T\nchr1 200 201 A\nchr1 300 301 A T\n",
            &mut source,
        );

        assert!(matches!(
            result,
            Err(Error::Site(site::reader::Error::Parse { line: 2, .. }))
        ));
        assert_eq!(output, "chr1 100 1 BX1,1\n");
        assert_eq!(source.queried, vec![Site::new("chr1", 100, 101, "A", "T")]);
    }

    #[test]
    fn test_pileup_error_aborts() {
        let mut source = MockSource::default().with("chr1", 100, vec![read(b'A', Some("BX1"))]);

        let (result, output) = run("chrUn 5 6 A T\nchr1 100 101 A T\n", &mut source);

        assert!(matches!(result, Err(Error::Pileup { ref site, .. }) if site.chrom() == "chrUn"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_error_messages_do_not_repeat_causes() {
        let mut source = MockSource::default();

        let (result, _) = run("chrUn 5 6 A T
", &mut source);
        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "failed to read alignments at site 'chrUn 5 6 A T'");
        assert_eq!(
            std::error::Error::source(&error).map(|e| e.to_string()).as_deref(),
            Some("unknown contig")
        );

        let (result, _) = run("chr1 5 x A T
", &mut source);
        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "malformed site on line 1");
        assert_eq!(
            std::error::Error::source(&error).map(|e| e.to_string()).as_deref(),
            Some("invalid end coordinate 'x'")
        );
    }

    #[test]
    fn test_empty_sites() {
        let mut source = MockSource::default();

        let (result, output) = run("", &mut source);

        assert_eq!(result.unwrap(), Summary::default());
        assert!(output.is_empty());
    }
}
