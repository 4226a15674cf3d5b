//! Resource identity model
//!
//! Handles, kinds, scopes, and inventory snapshots. A [`handle::ResourceHandle`]
//! identifies exactly one cloud object for the lifetime of one request;
//! a [`snapshot::InventorySnapshot`] is an immutable listing of handles for one
//! `(kind, scope)` pair.

pub mod handle;
pub mod kind;
pub mod scope;
pub mod snapshot;
