//! Session management and authorization for Gavel.
//!
//! This crate answers two questions for every guarded operation:
//!
//! 1. **Who is calling?** [`SessionManager`] issues tokens at login,
//!    resolves them back to a live [`Session`](gavel_protocol::Session),
//!    and revokes them at logout.
//! 2. **May they touch this?** [`AuthorizationGuard`] compares the
//!    session's user with the owner of the resource.
//!
//! Time comes from an injected [`Clock`] so expiry can be tested without
//! sleeping.
//!
//! ```text
//! Market Layer (above)  ← asks the guard before mutating an auction
//!     ↕
//! Session Layer (this crate)  ← identity and expiry
//!     ↕
//! Store Layer (below)  ← users and session records
//! ```

mod auth;
mod clock;
mod error;
mod manager;
mod session;

pub use auth::AuthorizationGuard;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::SessionConfig;
