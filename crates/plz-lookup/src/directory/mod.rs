//! Address directory access: the OpenPLZ record model and the HTTP client.

pub mod client;
pub mod model;

pub use client::{AddressDirectory, DirectoryError, OpenPlzClient};
pub use model::{InvalidPage, LocalityQuery, LocalityRecord, Page, RegionRef};
