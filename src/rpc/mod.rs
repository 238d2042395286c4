//! JSON-RPC 2.0 envelope for the A2A task service.
//!
//! Every call is a POST of `{jsonrpc, id, method, params}`. Streaming methods
//! answer with SSE, the rest with a single JSON-RPC response.

mod envelope;
mod method;
pub mod params;

pub use envelope::{decode_response, RpcErrorObject, RpcRequest, JSONRPC_VERSION};
pub use method::RpcMethod;
pub use params::{list_params, message_params, parse_params, task_params};
