//! TCP transport layer.
//!
//! Internal module providing the single-exchange [`Connection`] handle used
//! by both the session initializer and the frame dispatcher. Connections are
//! throwaway: one per request, closed (by drop) as soon as a reply is seen or
//! the exchange is abandoned.

mod connection;

pub use connection::{Connection, MAX_FRAMED_PAYLOAD};
