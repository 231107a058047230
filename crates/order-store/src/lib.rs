//! Persistence layer for orders and carts.
//!
//! Provides the [`OrderRepository`] trait with in-memory and PostgreSQL
//! implementations, listing queries with sorting and state filtering, and
//! the per-user [`CartStore`].

pub mod cart;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod repository;

pub use cart::{CartStore, InMemoryCartStore};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use query::{ListOptions, SortBy};
pub use repository::OrderRepository;
