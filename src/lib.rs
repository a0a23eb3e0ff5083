//! Client for the MercadoLibre public API: paginated listing search enriched with
//! revenue, listing age and seller location, item visits, and category lookups.

pub mod api;
pub mod categories;
pub mod config;
pub mod error;
pub mod models;
pub mod progress;
pub mod search;
pub mod visits;

pub use api::{MarketplaceApi, MeliClient};
pub use categories::CategoryLookup;
pub use config::Config;
pub use error::{Result, ScoutError};
pub use models::{
    DisplayNames, EnrichedRow, ListingTable, RowErrorPolicy, SearchCriteria, SearchReport,
    SortColumn, TimeUnit, VisitWindow, VisitsTable,
};
pub use search::{MarketScout, Pagination};
