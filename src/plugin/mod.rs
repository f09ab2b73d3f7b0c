//! Host plugin transport.
//!
//! Wires the Initialize/GetMetadata/Close contract onto line-delimited
//! JSON-RPC over stdin/stdout. The transport is plumbing: it decodes the
//! host's generic configuration and hands it to the core (registry and
//! metadata service), then serializes the structured result back.

pub mod handler;
pub mod protocol;
pub mod server;

pub use handler::PluginHandler;
pub use protocol::{PluginRequest, PluginResponse};
pub use server::PluginStdioServer;
