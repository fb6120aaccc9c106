//! Deal inputs and deal file loading

mod params;
pub mod loader;

pub use params::DealParameters;
pub use loader::{load_deals, load_deals_from_reader, read_deals_unchecked, DealLoadError, DealRecord};

#[cfg(test)]
pub(crate) use params::tests::sample_deal;
