//! Domain layer for the PPE compliance backend.
//!
//! Pure logic only: no I/O, no database, no HTTP. Reports are rendered to
//! in-memory bytes. Everything here is shared by
//! the repository layer (`ppewatch-db`) and the API server (`ppewatch-api`).

pub mod aggregation;
pub mod analysis;
pub mod error;
pub mod export;
pub mod ppe;
pub mod settings;
pub mod types;
