pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod images;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod state;
