// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk eSCL — capability parsing, scan parameter negotiation, job
// submission and result polling against network scanners that speak eSCL
// (AirScan) over HTTP.

pub mod capabilities;
pub mod client;
pub mod info;
pub mod job;
pub mod negotiate;
pub mod settings;
pub mod status;
pub mod transport;
pub mod waiter;
pub mod xml;

#[cfg(test)]
mod testing;

pub use capabilities::ScannerCapabilities;
pub use client::EsclClient;
pub use info::ScannerInfo;
pub use job::{JobOrchestrator, ScanOutput};
pub use negotiate::negotiate;
pub use settings::ScanRequest;
pub use status::ScannerStatus;
pub use transport::{HttpTransport, ScannerTransport};
pub use waiter::{PollSchedule, TokioWaiter, Waiter};
