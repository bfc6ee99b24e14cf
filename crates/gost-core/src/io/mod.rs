//! I/O primitives shared by the client and server halves.

mod relay;

pub use relay::{relay, Transferred};
