// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagelift-core — Shared types, configuration, and error definitions for the
// Pagelift document scanner.

pub mod config;
pub mod error;
pub mod types;

pub use config::ScanConfig;
pub use error::PageliftError;
pub use types::*;
