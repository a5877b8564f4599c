//! Authentication module for managing the admin session.
//!
//! This module provides:
//! - `SessionManager`: token-based session lifecycle with local role
//!   re-verification and expiry enforcement
//! - `SessionStore`: injectable persistence for the three session entries
//! - `CredentialStore`: optional OS-level credential storage via keyring
//!
//! Session expiry is derived from the token's own `exp` claim when present,
//! otherwise a fixed 24-hour lifetime applies.

pub mod claims;
pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::CredentialStore;
pub use session::{AuthError, Navigation, SessionManager};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
