//! Domain models for rolekeep.
//!
//! Users and organizations carry server-generated UUIDs. Permissions have
//! no identifier of their own; they are identified by [`PermissionKey`].
//!
//! [`PermissionKey`]: permission::PermissionKey

pub mod organization;
pub mod permission;
pub mod user;
