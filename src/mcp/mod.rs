/// JSON-RPC front end for the habit tools
///
/// `protocol` holds the wire types and error codes, `server` reads requests
/// line by line and routes `tools/call` to the habit operations.

pub mod protocol;
pub mod server;

pub use server::McpServer;
