//! Persistence seam for Gavel.
//!
//! The domain layers never talk to a database directly. They go through
//! three traits:
//!
//! - [`Record`]: a type that can be stored, with its id type.
//! - [`Repository`]: find/list/save/delete for one record type.
//! - [`Storage`]: one repository per record type, bundled.
//!
//! [`MemoryStorage`] is the bundled implementation: five
//! [`MemoryRepository`]s behind `tokio::sync::RwLock`s.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod record;
mod repository;
mod storage;

pub use error::StoreError;
pub use memory::MemoryRepository;
pub use record::Record;
pub use repository::Repository;
pub use storage::{MemoryStorage, Storage};
