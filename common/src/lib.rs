//! Records and payloads shared between the campus server's HTTP layer and its
//! certificate core.

pub mod model;
pub mod requests;
pub mod responses;
