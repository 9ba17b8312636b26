// Blackoutbox Infrastructure - System Adapters
// Implements: SpoolerClient (CUPS lp/lpq), HealthProbe (HTTP HEAD)

pub mod cups_spooler;
pub mod http_probe;

pub use cups_spooler::{CupsSpooler, CupsSpoolerConfig};
pub use http_probe::HttpHealthProbe;
