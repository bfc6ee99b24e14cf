//! Core constants and I/O primitives shared across gost crates.

pub mod defaults;
pub mod io;

pub use defaults::*;

/// Project name, as advertised on the wire.
pub const PROJECT_NAME: &str = "gost";
/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Value of the `Proxy-Agent` header: `gost/<version>`.
pub fn proxy_agent() -> String {
    format!("{PROJECT_NAME}/{VERSION}")
}
