pub mod api;
pub mod bus;
pub mod config;
pub mod context;
pub mod enrich;
pub mod error;
pub mod gateway;
pub mod models;
pub mod repository;
pub mod seed;
pub mod service;
pub mod simulation;
pub mod ws;
