//! Post-processing of analysis results.
//!
//! Results come out of a processor run as one set of observables per
//! dataset. Before plotting they are usually scaled to the luminosity of the
//! data ([`scale`], [`xsec`]) and many small datasets are merged into a few
//! named groups ([`grouping`], [`combine`]).

pub mod accumulator;
pub mod combine;
pub mod errors;
pub mod fileset;
pub mod grouping;
pub mod io;
pub mod scale;
pub mod xsec;

pub use accumulator::{Accumulator, DatasetResults, ResultSet};
pub use combine::combine_rename_results;
pub use errors::DataToolsError;
pub use fileset::{Fileset, FilesetEntry};
pub use grouping::GroupingMap;
pub use scale::scale_results;
pub use xsec::XSecScaler;
