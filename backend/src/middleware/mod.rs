//! Request middleware shared by every HTTP and WebSocket route.

pub mod trace;

pub use trace::Trace;
