pub mod client;
pub mod error;
pub mod metrics;
pub mod xmlrpc;

pub use client::{RoundupTracker, Tracker, CSV_COLUMNS};
pub use error::TrackerError;
pub use xmlrpc::XmlRpcValue;
