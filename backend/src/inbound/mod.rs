//! Inbound adapters that translate external requests into domain port calls
//! while keeping framework details at the edge.
//!
//! REST handlers live under [`http`]; the realtime notification stream lives
//! under [`ws`].

pub mod http;
pub mod ws;
