//! `flt` CLI library
//!
//! Core of the `flt` command-line helper for Flutter Android development. It builds
//! APKs under collision-free timestamped names and installs them on every connected
//! device at once.
//!
//! # Architecture
//!
//! The CLI is designed as a library with a terminal frontend:
//!
//! - **Library modules** (`android`, `process`, `project`, `config`) contain the core logic
//! - **Terminal frontend** (`cli/src/terminal/`) provides the user interface
//!
//! ## Key Concepts
//!
//! - **`resolve_apk`** - Picks the APK to install from the Flutter output directory
//! - **`Adb`** - A probed `adb` executable that lists devices and installs packages
//! - **`install_parallel`** - Fans an install out to every device and collects outcomes
//! - **`ProcessRunner`** - Launches external tools either interactively or captured
//! - **`FltError`** - Fatal conditions with remediation notes

#![allow(missing_docs)]

pub mod android;
pub mod config;
pub mod error;
pub mod output;
pub mod process;
pub mod project;
pub mod version;

pub use error::FltError;
