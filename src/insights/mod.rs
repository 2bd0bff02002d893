//! Access to the WakaTime `insights/days` resource.
//!  - [client::HttpInsightsSource] performs a single authenticated request.
//!  - [fetcher::Fetcher] polls the source until the server reports fresh data.
//!  - [parser::parse_days] turns the heterogeneous day entries into an [parser::ActivitySeries].

pub mod client;
pub mod entities;
pub mod error;
pub mod fetcher;
pub mod parser;
