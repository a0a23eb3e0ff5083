pub mod client;
#[cfg(test)]
pub mod fake;
pub mod traits;
pub mod types;

pub use client::MeliClient;
pub use traits::MarketplaceApi;
