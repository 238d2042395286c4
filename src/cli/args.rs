//! Command-line argument parsing for a2a-probe.

use std::path::PathBuf;

use thiserror::Error;

use crate::rpc::RpcMethod;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Issue a call against the task service
    Run(RunOptions),
}

/// What to send.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// `SendMessage` with a text part
    Send(String),
    /// `SendStreamingMessage` with a text part
    Stream(String),
    /// `GetTask`
    Get(String),
    /// `ListTasks`
    List,
    /// `CancelTask`
    Cancel(String),
    /// `SubscribeToTask`
    Subscribe(String),
    /// History replay of a past task
    Restore(String),
    /// Any method with caller-provided JSON params
    Call { method: RpcMethod, params: String },
}

/// Options for [`CliCommand::Run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub action: Action,
    pub endpoint: Option<String>,
    pub task_id: Option<String>,
    pub context_id: Option<String>,
    pub config_path: Option<PathBuf>,
    /// Print log entries as JSON lines
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
    #[error("'{0}' needs a value")]
    MissingValue(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(String),
    #[error("unknown method '{0}'")]
    UnknownMethod(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use a2a_probe::cli::args::{parse_args, Action, CliCommand};
///
/// let args = vec!["a2a-probe".to_string(), "list".to_string()];
/// match parse_args(args.into_iter()).unwrap() {
///     CliCommand::Run(options) => assert_eq!(options.action, Action::List),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut endpoint = None;
    let mut task_id = None;
    let mut context_id = None;
    let mut config_path = None;
    let mut json = false;
    let mut positional = Vec::new();

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--json" => json = true,
            "--endpoint" => endpoint = Some(value(&mut args, &arg)?),
            "--task" => task_id = Some(value(&mut args, &arg)?),
            "--context" => context_id = Some(value(&mut args, &arg)?),
            "--config" => config_path = Some(PathBuf::from(value(&mut args, &arg)?)),
            _ if arg.starts_with("--") => return Err(ArgsError::UnknownFlag(arg)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = positional.next().ok_or(ArgsError::MissingCommand)?;
    let mut arg = |name: &str| {
        positional
            .next()
            .ok_or_else(|| ArgsError::MissingArgument(name.to_string()))
    };

    let action = match command.as_str() {
        "send" => Action::Send(arg("send")?),
        "stream" => Action::Stream(arg("stream")?),
        "get" => Action::Get(arg("get")?),
        "list" => Action::List,
        "cancel" => Action::Cancel(arg("cancel")?),
        "subscribe" => Action::Subscribe(arg("subscribe")?),
        "restore" => Action::Restore(arg("restore")?),
        "call" => {
            let method_name = arg("call")?;
            let method = method_name
                .parse::<RpcMethod>()
                .map_err(|_| ArgsError::UnknownMethod(method_name))?;
            let params = arg("call").unwrap_or_else(|_| "{}".to_string());
            Action::Call { method, params }
        }
        _ => return Err(ArgsError::UnknownCommand(command)),
    };

    Ok(CliCommand::Run(RunOptions {
        action,
        endpoint,
        task_id,
        context_id,
        config_path,
        json,
    }))
}

fn value<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Result<String, ArgsError> {
    args.next()
        .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
}
