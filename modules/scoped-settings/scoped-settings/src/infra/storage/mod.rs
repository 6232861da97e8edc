//! Infrastructure storage layer - database persistence for scoped settings.
//!
//! ## Architecture
//!
//! This module contains ALL SeaORM-specific code and database operations:
//! - `entity/` - SeaORM entity definitions (setting records, path types)
//! - `mapper.rs` - Conversions between SeaORM models and domain records
//! - `sea_orm_repo.rs` - `SettingRepository` implementation
//! - `migrations/` - Database schema migrations
//!
//! Scope uniqueness is enforced by a unique index over
//! `(vendor, plugin, path, COALESCE(channel_code, ''), COALESCE(locale_code, ''))`,
//! so rows without a channel or locale collide like any other pair.

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod sea_orm_repo;

pub use sea_orm_repo::SeaOrmSettingRepository;
