//! Adapters from foreign task sources into board requests.

pub mod external;
