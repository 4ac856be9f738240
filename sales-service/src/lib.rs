//! Sales Service - Point-of-sale gateway over the ERP document store.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
