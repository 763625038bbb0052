//! Mood reports over a user's own labelled entries: the daily timeline of
//! dominant emotions and the 7-day mood index.

pub mod aggregate;
pub mod handlers;
pub mod models;
