//! Input for reading sites.

use std::{
    env,
    fs::File,
    io::{self, IsTerminal as _},
    path::{Path, PathBuf},
};

use crate::site;

/// An input source for reading.
#[derive(Debug)]
pub enum Input {
    /// A path from which to read a file.
    Path(PathBuf),
    /// Stdin.
    Stdin,
}

impl Input {
    /// By default, creating an `Input` without a path checks that input is available via stdin,
    /// instead of hanging on an interactive terminal.
    ///
    /// In some contexts, e.g. testing, this can cause issues, and so it may be disabled by setting
    /// this environment variable, or by using [`Input::new_unchecked`].
    pub const ENV_KEY_DISABLE_CHECK: &'static str = "BXCOUNT_ALLOW_STDIN";

    /// Creates a new input source.
    ///
    /// A provided path is always used, whatever is connected to stdin.
    pub fn new(input: Option<PathBuf>) -> Result<Self, InputError> {
        let check = env::var(Self::ENV_KEY_DISABLE_CHECK).is_err();

        if input.is_none() && check && io::stdin().is_terminal() {
            Err(InputError::Neither)
        } else {
            Ok(Self::new_unchecked(input))
        }
    }

    /// Creates a new input source without checking that any data is available.
    pub fn new_unchecked(input: Option<PathBuf>) -> Self {
        if let Some(path) = input {
            Self::Path(path)
        } else {
            Self::Stdin
        }
    }

    /// Open the input for reading.
    pub fn open(&self) -> io::Result<Reader> {
        match self {
            Input::Path(path) => File::open(path).map(io::BufReader::new).map(Reader::File),
            Input::Stdin => Ok(Reader::Stdin(io::stdin().lock())),
        }
    }

    /// Open the input as a site reader.
    pub fn open_sites(&self) -> io::Result<site::Reader<Reader>> {
        self.open().map(site::Reader::new)
    }

    /// Returns the provided path if provided, otherwise `None`.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Input::Path(path) => Some(path.as_ref()),
            Input::Stdin => None,
        }
    }
}

/// A reader from either a file or stdin.
#[derive(Debug)]
pub enum Reader {
    /// A reader from a file.
    File(io::BufReader<File>),
    /// A reader stdin.
    Stdin(io::StdinLock<'static>),
}

impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Reader::File(reader) => reader.read(buf),
            Reader::Stdin(reader) => reader.read(buf),
        }
    }
}

impl io::BufRead for Reader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Reader::File(reader) => reader.fill_buf(),
            Reader::Stdin(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Reader::File(reader) => reader.consume(amt),
            Reader::Stdin(reader) => reader.consume(amt),
        }
    }
}

/// An error associated with choosing an input source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputError {
    /// Input was provided neither as a path nor via stdin.
    Neither,
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Neither => f.write_str("received no sites via file or stdin"),
        }
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unchecked() {
        assert!(matches!(Input::new_unchecked(None), Input::Stdin));

        let input = Input::new_unchecked(Some(PathBuf::from("sites.txt")));
        assert_eq!(input.as_path(), Some(Path::new("sites.txt")));
    }

    #[test]
    fn test_path_is_used_regardless_of_stdin() {
        let input = Input::new(Some(PathBuf::from("sites.txt")));

        assert!(matches!(input, Ok(Input::Path(ref path)) if path == Path::new("sites.txt")));
    }

    #[test]
    fn test_open_missing_path() {
        let input = Input::new_unchecked(Some(PathBuf::from("does/not/exist.txt")));

        assert_eq!(
            input.open().map(|_| ()).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
