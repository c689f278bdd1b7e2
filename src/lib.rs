pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod orchestrator;
pub mod review;
pub mod store;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_helpers;
