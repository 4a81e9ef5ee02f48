pub mod config;
pub mod domain;
pub mod replay;
pub mod session;
pub mod srs;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
