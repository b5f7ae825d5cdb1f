//! Remote layer: one authorised GET against the homework status endpoint per poll.

mod http;

pub use http::{DEFAULT_ENDPOINT, FetchError, RemoteClient};
