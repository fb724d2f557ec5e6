//! # pkgvercmp
//!
//! A library for the bookkeeping side of distribution package maintenance: comparing
//! free-form package versions, reading the preamble of RPM spec files and deciding which
//! packages of an inventory lag behind an upstream distribution.
//!
//! # Example
//!
//! ```rust
//! use std::cmp::Ordering;
//!
//! use pkgvercmp::{ObservedVersion, SpecFile, UpgradeStatus, compare, decide_upgrade};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // digit runs compare by magnitude, `_` is the same as `.`
//! assert_eq!(Ordering::Less, compare("1.9", "1.10"));
//! assert_eq!(Ordering::Equal, compare("1_2_3", "1.2.3"));
//!
//! let spec = SpecFile::parse(
//!     "Name: zlib\n\
//!      %global upstream_version 1.3\n\
//!      Version: %{upstream_version}\n\
//!      Release: 2%{?dist}\n",
//! )?;
//! assert_eq!(ObservedVersion::Known("1.3"), spec.resolved_version());
//!
//! let status = decide_upgrade(
//!     spec.resolved_version(),
//!     ObservedVersion::from_cell(Some("1.3.1")),
//!     Some("Built"),
//! );
//! assert_eq!(UpgradeStatus::Upgrade { to: "1.3.1".to_string() }, status);
//! # Ok(())
//! # }
//! ```

#![allow(unknown_lints, clippy::uninlined_format_args)]

mod errors;
pub use crate::errors::*;

pub(crate) mod constants;
pub use crate::constants::*;

mod version;
pub use crate::version::*;

pub mod spec;
pub use crate::spec::{MacroTable, SourceLocation, SpecFile, SpecRepository};

pub mod analysis;
pub use crate::analysis::*;
