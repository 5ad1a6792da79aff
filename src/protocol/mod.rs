//! Wire message construction and field extraction.
//!
//! The send path serializes request bodies with serde; the receive path is
//! deliberately *not* a parser. Session ids are pulled out of replies with a
//! literal substring search ([`extract_session_id`]) and frame-lookup replies
//! are treated as opaque bytes. This asymmetry matches the deployed service
//! contract and may yield wrong results on malformed input; that is documented
//! behavior, not a bug to fix here.

mod encode;
mod extract;

pub use encode::{InitRequest, LookupRequest};
pub use extract::extract_session_id;
