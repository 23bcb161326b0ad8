//! # filedex
//!
//! An embedded document store that keeps one file per record, with:
//! - The filename as a composite secondary index (no separate index files)
//! - Typed records through serde
//! - Upsert, point lookup, filtered bulk scan and filtered delete
//! - JSON or bincode payloads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                               │
//! │              save / find_one / find_all / delete             │
//! └──────────┬───────────────────┬───────────────────┬──────────┘
//!            │                   │                   │
//!            ▼                   ▼                   ▼
//!   ┌─────────────────┐  ┌───────────────┐   ┌───────────────┐
//!   │    Registry     │  │     Index     │   │     Codec     │
//!   │ (type → keys,   │  │ path → value  │   │ JSON/bincode  │
//!   │   directory)    │  │ value → token │   │   payloads    │
//!   └────────┬────────┘  │ token → name  │   └───────────────┘
//!            │           └───────────────┘
//!            ▼
//!   ┌─────────────────┐
//!   │     Storage     │
//!   │ (one directory  │
//!   │ per collection) │
//!   └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use filedex::{Document, Engine, IndexKey, Meta};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     meta: Meta,
//!     username: String,
//!     password: String,
//! }
//!
//! impl Document for User {}
//!
//! # fn main() -> filedex::Result<()> {
//! let mut engine = Engine::open_path(std::path::Path::new("db"))?;
//! engine.register(&User::default(), &["password", "username"])?;
//!
//! let mut user = User { username: "root".into(), password: "secret".into(), ..Default::default() };
//! engine.save(&mut user)?;
//!
//! let all: Vec<User> = engine.find_all(&[])?;
//! let same: User = engine.find_one(&[IndexKey::id(&user.meta.id)])?;
//! engine.delete(&User::default())?; // removes every user
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod document;
pub mod index;
pub mod storage;
pub mod registry;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FiledexError, Result};
pub use config::{Config, PayloadFormat};
pub use document::{Document, Meta, ID_PATH};
pub use engine::Engine;
pub use index::{IndexKey, IndexValue};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of filedex
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
