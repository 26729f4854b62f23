#![deny(unsafe_code)]

use std::{
    fs::File,
    io::{self, Write},
    num::NonZeroUsize,
    path::PathBuf,
};

use anyhow::{Context, Error};

use clap::{ArgAction, Parser};

use bxcount_core::{
    pileup::{
        self,
        bam::{Tag, DEFAULT_DEPTH},
    },
    Runner,
};

pub(crate) mod utils;

const NAME: &str = env!("CARGO_BIN_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Count distinct linked-read barcodes at candidate variant sites.
///
/// For each site, reads overlapping the site in the input BAM are piled up, and the barcodes of
/// reads with a base call at the site are counted. One line is written per site, containing the
/// contig, the start coordinate, the number of distinct barcodes, and a `;`-separated list of
/// `barcode,count` pairs. Reads without a barcode are counted as `NA`.
#[derive(Debug, Parser)]
#[clap(name = NAME, version = VERSION, about)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input BAM.
    ///
    /// The BAM must be coordinate-sorted and indexed, with the index at `<FILE>.bai`.
    #[arg(short = 'i', long, value_name = "FILE")]
    input: PathBuf,

    /// Output file.
    ///
    /// If no file is provided, stdout will be used.
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Sites file.
    ///
    /// Each line should contain five whitespace-separated fields: chrom, start, end, ref, and alt,
    /// using 0-based, half-open coordinates. If no file is provided, stdin will be used.
    #[arg(short = 's', long, value_name = "FILE")]
    sites: Option<PathBuf>,

    /// Maximum read depth at site.
    #[arg(short = 'd', long, default_value_t = DEFAULT_DEPTH, value_name = "INT")]
    depth: NonZeroUsize,

    /// Barcode tag.
    ///
    /// The two-character tag of the read data field holding the barcode.
    #[arg(long, default_value = "BX", value_parser = pileup::bam::parse_tag, value_name = "TAG")]
    tag: Tag,

    /// Suppress log output.
    ///
    /// By default, warnings may be logged to stderr while running. Set this flag to silence all
    /// logging output.
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log output verbosity.
    ///
    /// Set this flag once to show information, twice to show debug information, and three times to
    /// show trace information.
    #[clap(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print CLI arguments for debugging.
    #[clap(long, hide = true, global = true)]
    debug: bool,
}

impl Cli {
    pub fn run(self) -> Result<(), Error> {
        if self.debug {
            eprintln!("{self:#?}");
        }

        let level = if self.quiet {
            log::LevelFilter::Off
        } else {
            match self.verbose {
                0 => log::LevelFilter::Warn,
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            }
        };

        match env_logger::Builder::new()
            .filter_level(level)
            .target(env_logger::Target::Stderr)
            .format(|buf, record| {
                let level = record.level().as_str().to_lowercase();
                let args = record.args();
                writeln!(buf, "[{NAME} {level:>5}] {args}")
            })
            .try_init()
        {
            Ok(()) => (),
            Err(e) => eprintln!("failed to setup logger: {e}"),
        }

        let input = utils::sites_input(self.sites)?;

        let source = pileup::Bam::builder()
            .set_depth(self.depth)
            .set_tag(self.tag)
            .build_from_path(&self.input)
            .with_context(|| {
                format!(
                    "Failed to open indexed BAM from provided path '{}'",
                    self.input.display()
                )
            })?;

        let sites = input.open_sites().with_context(|| match input.as_path() {
            Some(path) => format!("Failed to open sites from provided path '{}'", path.display()),
            None => String::from("Failed to open sites from stdin"),
        })?;

        let mut writer: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(io::BufWriter::new(File::create(path).with_context(
                || format!("Failed to create output file '{}'", path.display()),
            )?)),
            None => Box::new(io::BufWriter::new(io::stdout().lock())),
        };

        let summary = Runner::new(sites, source).run(&mut writer)?;
        log::info!("Finished: {summary}.");

        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.run() {
        Ok(()) => (),
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    }
}
