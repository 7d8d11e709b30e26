//! Generated by tablegen; do not edit.

pub mod converters;
pub mod utils;
pub mod user;
pub mod email;

pub use user::User;
pub use email::Email;
pub use utils::{DatabaseError, Numeric, Slot};
