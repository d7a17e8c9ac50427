//! # Adapters Layer (Hexagonal Architecture)
//!
//! Reference implementations of the outbound ports: the in-memory entry
//! repository, the client directory, and the tabular receipt source.

mod client_directory;
mod memory_repository;
mod receipt_source;

pub use client_directory::InMemoryClientDirectory;
pub use memory_repository::InMemoryEntryRepository;
pub use receipt_source::{ReceiptRow, TabularReceiptSource};
