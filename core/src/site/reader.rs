//! Site reader.

use std::{fmt, io};

use super::{ParseSiteError, Site};

/// A site reader.
///
/// The reader lazily parses one site per line of the underlying reader, and is exhausted when the
/// underlying reader is. Every line must contain exactly five fields; blank lines are malformed.
pub struct Reader<R> {
    inner: R,
    buf: String,
    line: usize,
}

impl<R> Reader<R>
where
    R: io::BufRead,
{
    /// Creates a new site reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
            line: 0,
        }
    }

    /// Returns the number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// Reads the next site.
    ///
    /// Returns `Ok(None)` when the underlying reader is exhausted.
    pub fn read_site(&mut self) -> Result<Option<Site>, Error> {
        self.buf.clear();

        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;

        self.buf
            .parse()
            .map(Some)
            .map_err(|source| Error::Parse {
                line: self.line,
                source,
            })
    }
}

impl<R> Iterator for Reader<R>
where
    R: io::BufRead,
{
    type Item = Result<Site, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_site().transpose()
    }
}

/// An error associated with reading a site.
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(io::Error),
    /// A line could not be parsed as a site.
    Parse {
        /// The 1-based line number.
        line: usize,
        /// The parse error.
        source: ParseSiteError,
    },
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(_) => f.write_str("failed to read sites"),
            Error::Parse { line, .. } => write!(f, "malformed site on line {line}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Parse { source, .. } => Some(source),
        }
    }
}
