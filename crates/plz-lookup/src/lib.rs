pub mod config;
pub mod directory;
pub mod error;
pub mod lookup;
pub mod telemetry;

pub use directory::{AddressDirectory, LocalityRecord, OpenPlzClient, Page};
pub use lookup::{AddressLookupController, SearchState};
