pub mod codec;
pub mod error;
pub mod record;
pub mod registry;
pub mod repo;
pub mod resolver;
pub mod seed;
pub mod service;

#[cfg(test)]
mod service_test;
