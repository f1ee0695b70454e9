// HTTP implementations of the provider gateways.

pub mod http;
pub mod mlb;
pub mod open_meteo;

pub use mlb::MlbStatsClient;
pub use open_meteo::OpenMeteoClient;
