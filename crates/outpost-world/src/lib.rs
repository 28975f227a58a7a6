//! Grid, tiles, and hazard registry for the Outpost cooperation game.
//!
//! This crate models the physical board: a square grid of tiles holding
//! resources, and a registry of hazard centers whose 3x3 neighbourhoods
//! form the static hazard zone.
//!
//! # Modules
//!
//! - [`error`] -- Error types for map construction and world mutation.
//! - [`tile`] -- A single grid cell and its resource state.
//! - [`hazard`] -- Hazard centers and their discovered/removed lifecycle.
//! - [`world_map`] -- The grid itself, with lookups and the mutation
//!   primitives the action resolver uses.
//! - [`map_rows`] -- Authored map rows and resource code parsing.
//! - [`baseline`] -- The immutable parsed world and its session factory.
//! - [`starting_map`] -- Built-in 10x10 map used when no file is configured.

pub mod baseline;
pub mod error;
pub mod hazard;
pub mod map_rows;
pub mod starting_map;
pub mod tile;
pub mod world_map;

// Re-export primary types at crate root.
pub use baseline::WorldBaseline;
pub use error::WorldError;
pub use hazard::HazardCenter;
pub use map_rows::{MapRow, parse_resource_code, rows_from_yaml};
pub use starting_map::starting_map;
pub use tile::Tile;
pub use world_map::WorldMap;
