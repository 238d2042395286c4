//! Version and usage output.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = "\
Usage: a2a-probe [OPTIONS] <COMMAND>

Commands:
  send <text>            SendMessage and print the reply
  stream <text>          SendStreamingMessage and print streamed output
  get <task>             GetTask
  list                   ListTasks
  cancel <task>          CancelTask
  subscribe <task>       SubscribeToTask and print streamed output
  restore <task>         Load a past task into the session and print it
  call <Method> [json]   Any JSON-RPC method with raw params

Options:
  --endpoint <url>       JSON-RPC endpoint (env A2A_PROBE_ENDPOINT)
  --task <id>            Task id to continue
  --context <id>         Context id to continue
  --config <path>        Config file (default <config_dir>/a2a-probe/config.json)
  --json                 Print log entries to stderr as JSON lines
  -V, --version          Print version
  -h, --help             Print this help

Press Ctrl-C to abort an active call.";

/// Handle the --version command.
pub fn handle_version_command() -> ! {
    println!("a2a-probe {}", VERSION);
    std::process::exit(0)
}

/// Handle the --help command.
pub fn handle_help_command() -> ! {
    println!("{}", USAGE);
    std::process::exit(0)
}
