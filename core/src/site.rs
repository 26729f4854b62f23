//! Candidate variant sites.

use std::{fmt, num::ParseIntError, str::FromStr};

pub mod reader;
pub use reader::Reader;

/// The number of whitespace-separated fields in a site line.
pub const FIELDS: usize = 5;

/// A candidate variant site.
///
/// Coordinates are 0-based and half-open, so that a single-base site at the first position of a
/// contig spans `0..1`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Site {
    chrom: String,
    start: u64,
    end: u64,
    reference: String,
    alternate: String,
}

impl Site {
    /// Creates a new site.
    pub fn new<C, R, A>(chrom: C, start: u64, end: u64, reference: R, alternate: A) -> Self
    where
        C: Into<String>,
        R: Into<String>,
        A: Into<String>,
    {
        Self {
            chrom: chrom.into(),
            start,
            end,
            reference: reference.into(),
            alternate: alternate.into(),
        }
    }

    /// Returns the contig name.
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Returns the 0-based start coordinate.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns the 0-based, exclusive end coordinate.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Returns the reference allele.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the alternate allele.
    pub fn alternate(&self) -> &str {
        &self.alternate
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.chrom, self.start, self.end, self.reference, self.alternate
        )
    }
}

impl FromStr for Site {
    type Err = ParseSiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split_ascii_whitespace().collect::<Vec<_>>();

        let &[chrom, start, end, reference, alternate] = fields.as_slice() else {
            return Err(ParseSiteError::FieldCount {
                found: fields.len(),
            });
        };

        let parse_coordinate = |field: &'static str, value: &str| {
            value
                .parse::<u64>()
                .map_err(|source| ParseSiteError::InvalidCoordinate {
                    field,
                    value: value.to_string(),
                    source,
                })
        };

        Ok(Self::new(
            chrom,
            parse_coordinate("start", start)?,
            parse_coordinate("end", end)?,
            reference,
            alternate,
        ))
    }
}

/// An error associated with parsing a site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseSiteError {
    /// Line did not contain the expected number of fields.
    FieldCount {
        /// The number of fields found.
        found: usize,
    },
    /// Coordinate could not be parsed as an integer.
    InvalidCoordinate {
        /// The name of the field.
        field: &'static str,
        /// The raw field value.
        value: String,
        /// The underlying parse error.
        source: ParseIntError,
    },
}

impl fmt::Display for ParseSiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseSiteError::FieldCount { found } => write!(
                f,
                "expected {FIELDS} fields (chrom, start, end, ref, alt), found {found}"
            ),
            ParseSiteError::InvalidCoordinate { field, value, .. } => {
                write!(f, "invalid {field} coordinate '{value}'")
            }
        }
    }
}

impl std::error::Error for ParseSiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseSiteError::FieldCount { .. } => None,
            ParseSiteError::InvalidCoordinate { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_site() {
        assert_eq!(
            Site::from_str("chr1 100 101 A T"),
            Ok(Site::new("chr1", 100, 101, "A", "T"))
        );
    }

    #[test]
    fn test_parse_site_mixed_whitespace() {
        assert_eq!(
            Site::from_str("  chrX\t2000 \t2001  GA\tG\n"),
            Ok(Site::new("chrX", 2000, 2001, "GA", "G"))
        );
    }

    #[test]
    fn test_parse_site_too_few_fields() {
        assert_eq!(
            Site::from_str("chr1 100 101 A"),
            Err(ParseSiteError::FieldCount { found: 4 })
        );
    }

    #[test]
    fn test_parse_site_too_many_fields() {
        assert_eq!(
            Site::from_str("chr1 100 101 A T PASS"),
            Err(ParseSiteError::FieldCount { found: 6 })
        );
    }

    #[test]
    fn test_parse_site_blank() {
        assert_eq!(
            Site::from_str(""),
            Err(ParseSiteError::FieldCount { found: 0 })
        );
    }

    #[test]
    fn test_parse_site_invalid_coordinate() {
        let result = Site::from_str("chr1 100 1e3 A T");

        assert!(matches!(
            result,
            Err(ParseSiteError::InvalidCoordinate { field: "end", ref value, .. }) if value == "1e3"
        ));
    }

    #[test]
    fn test_coordinates_not_range_checked() {
        assert_eq!(
            Site::from_str("chr1 500 100 N N"),
            Ok(Site::new("chr1", 500, 100, "N", "N"))
        );
    }

    #[test]
    fn test_display_roundtrip() {
        let site = Site::new("chr2", 7, 8, "C", "A");

        assert_eq!(site.to_string(), "chr2 7 8 C A");
        assert_eq!(Site::from_str(&site.to_string()), Ok(site));
    }
}
