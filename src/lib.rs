pub mod api;
pub mod config;
pub mod controllers;
pub mod domain;
pub mod session;
pub mod store;
