pub mod analytic_data_api;
pub mod chart_data;
pub mod data_service;
pub mod data_store;
pub mod fetcher;
pub mod productivity_pulse;
pub mod query_block;
pub mod row_conversion;
