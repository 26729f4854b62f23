#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Per-site linked-read barcode counting.
//!
//! This serves as the core library implementation for the `bxcount` CLI, but can also be used as a
//! free-standing library for summarising barcode support at candidate variant sites.
//!
//! # Overview
//!
//! The core struct is a [`SiteAggregate`], which collects the [`Observation`]s of all reads in a
//! single pileup column at a [`Site`]. It tracks how often each barcode was seen for each base
//! call, how often each barcode was seen overall, and how many distinct barcodes were seen.
//! Reads without a barcode are counted under the [`barcode::MISSING`] sentinel, which never
//! contributes to the number of distinct barcodes.
//!
//! Sites are read with a [`site::Reader`], pileup columns are produced by a [`PileupSource`] such as
//! the BAM-backed [`pileup::Bam`], and a [`Runner`] drives the whole process one site at a time.
//!
//! # Example
//!
//! ```
//! use bxcount_core::{Observation, Site, SiteAggregate};
//!
//! let site: Site = "chr1 100 101 A T".parse().expect("valid site");
//!
//! let mut aggregate = SiteAggregate::new(&site);
//! aggregate.insert(Observation::new(b'A', Some(String::from("BX1"))));
//! aggregate.insert(Observation::new(b'T', Some(String::from("BX2"))));
//! aggregate.insert(Observation::new(b'T', Some(String::from("BX1"))));
//!
//! assert_eq!(aggregate.unique_barcodes(), 2);
//! assert_eq!(aggregate.summary().to_string(), "BX1,2;BX2,1");
//! ```

pub mod aggregate;
pub use aggregate::SiteAggregate;

pub mod barcode;

pub mod input;
pub use input::Input;

pub mod observation;
pub use observation::Observation;

pub mod output;

pub mod pileup;
pub use pileup::PileupSource;

pub mod run;
pub use run::Runner;

pub mod site;
pub use site::Site;
