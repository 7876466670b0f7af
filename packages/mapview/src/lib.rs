//! Live map client library.
//!
//! Follows the store's WebSocket stream, stages incoming points in a buffer and drains them on a
//! fixed interval into a trail view.

pub mod buffer;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod trail;

pub use buffer::PointBuffer;
pub use domain::{ReconnectPolicy, TrailPoint};
pub use error::ClientError;
pub use trail::TrailView;
