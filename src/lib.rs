// src/lib.rs

pub mod authz;
pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod events;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
