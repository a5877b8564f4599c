//! Data models for the produce-trading backend.
//!
//! This module contains the data structures used to represent
//! backend data including:
//!
//! - `UserRecap`, `Transaction`: registered users and their income/expense entries
//! - `LovItem`, `LovType`: reference catalog ("list of values") entries
//! - `Envelope`: the `{status, message, data}` wrapper every endpoint returns

pub mod envelope;
pub mod lov;
pub mod user;

pub use envelope::Envelope;
pub use lov::{LovItem, LovItemDraft, LovType};
pub use user::{Transaction, UserRecap, UserSortColumn};
