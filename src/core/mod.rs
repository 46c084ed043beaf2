//! Core business logic module
//!
//! This module contains the ledger's core components:
//! - `registry` - Thread-safe account storage and registry operations
//! - `engine` - Applies ledger operations to a shared registry
//! - `batch_processor` - Concurrent, order-preserving replay of operation batches

pub mod batch_processor;
pub mod engine;
pub mod registry;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::LedgerEngine;
pub use registry::AccountRegistry;
