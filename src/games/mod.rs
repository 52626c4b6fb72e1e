//! Board games hosted by the server.

pub mod rows;
