use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// JSON-RPC methods of the A2A task service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    SendMessage,
    SendStreamingMessage,
    GetTask,
    ListTasks,
    CancelTask,
    SubscribeToTask,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 6] = [
        RpcMethod::SendMessage,
        RpcMethod::SendStreamingMessage,
        RpcMethod::GetTask,
        RpcMethod::ListTasks,
        RpcMethod::CancelTask,
        RpcMethod::SubscribeToTask,
    ];

    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::SendMessage => "SendMessage",
            RpcMethod::SendStreamingMessage => "SendStreamingMessage",
            RpcMethod::GetTask => "GetTask",
            RpcMethod::ListTasks => "ListTasks",
            RpcMethod::CancelTask => "CancelTask",
            RpcMethod::SubscribeToTask => "SubscribeToTask",
        }
    }

    /// Whether the response is an SSE stream rather than a single JSON body.
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            RpcMethod::SendStreamingMessage | RpcMethod::SubscribeToTask
        )
    }

    /// Whether the call is a user turn that opens a new round.
    pub fn starts_round(&self) -> bool {
        matches!(self, RpcMethod::SendMessage | RpcMethod::SendStreamingMessage)
    }

    /// `Accept` header value for this method.
    pub fn accept(&self) -> &'static str {
        if self.is_streaming() {
            "text/event-stream"
        } else {
            "application/json"
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RpcMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RpcMethod::ALL
            .iter()
            .copied()
            .find(|method| method.as_str() == s.trim())
            .ok_or_else(|| ClientError::PayloadParse(format!("unknown method '{}'", s.trim())))
    }
}
