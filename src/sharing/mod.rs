//! Read grants from an entry's owner to other users.

pub mod handlers;
pub mod models;
pub mod reconcile;
pub mod repository;
