//! Executes a parsed command against the task service.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tokio::sync::broadcast;

use super::args::{Action, RunOptions};
use crate::adapters::ReqwestHttpClient;
use crate::client::{A2aClient, CallOutcome};
use crate::config::ClientConfig;
use crate::debug::{create_effect_channel, Effect};
use crate::error::ClientError;
use crate::rpc::{list_params, task_params, RpcMethod};
use crate::session::RunStatistics;

const EFFECT_CHANNEL_CAPACITY: usize = 1024;

/// Run one command: issue the call, stream output to stdout, then print the
/// final statistics to stderr.
pub async fn run(options: RunOptions) -> Result<()> {
    let mut config = ClientConfig::load(options.config_path.as_deref())
        .wrap_err("Failed to load configuration")?;
    if let Some(endpoint) = &options.endpoint {
        config = config.with_endpoint(endpoint.as_str());
        config.validate()?;
    }
    tracing::debug!("Using endpoint {}", config.endpoint);

    let (effects_tx, effects_rx) = create_effect_channel(EFFECT_CHANNEL_CAPACITY);
    let client = A2aClient::new(ReqwestHttpClient::new(), Arc::new(config)).with_effects(effects_tx);
    if options.task_id.is_some() || options.context_id.is_some() {
        client.set_identity(
            options.task_id.as_deref().unwrap_or(""),
            options.context_id.as_deref().unwrap_or(""),
        );
    }

    let printer = tokio::spawn(print_effects(effects_rx, options.json));

    let cancel = client.cancel_handle();
    ctrlc::set_handler(move || {
        if !cancel.cancel() {
            std::process::exit(130);
        }
    })
    .wrap_err("Failed to install Ctrl-C handler")?;

    let result = match options.action {
        Action::Send(text) => client.send_text(RpcMethod::SendMessage, &text).await,
        Action::Stream(text) => client.send_text(RpcMethod::SendStreamingMessage, &text).await,
        Action::Get(id) => client.send(RpcMethod::GetTask, task_params(&id)).await,
        Action::List => client.send(RpcMethod::ListTasks, list_params()).await,
        Action::Cancel(id) => client.send(RpcMethod::CancelTask, task_params(&id)).await,
        Action::Subscribe(id) => client.send(RpcMethod::SubscribeToTask, task_params(&id)).await,
        Action::Call { method, params } => client.send_raw(method.as_str(), &params).await,
        Action::Restore(id) => {
            if client.restore(&id).await {
                Ok(CallOutcome::Completed { events: 0 })
            } else {
                drop(client);
                let _ = printer.await;
                return Err(eyre!("Could not restore task {}", id));
            }
        }
    };

    let stats = client.stats();
    let identity = client.identity();
    drop(client);
    let _ = printer.await;
    println!();

    if let Some(stats) = &stats {
        eprintln!("{}", summary(stats));
    }
    if !identity.is_empty() {
        eprintln!("task={} context={}", identity.task_id, identity.context_id);
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(error) => {
            eprintln!("{}", failure_line(&error));
            return Err(error.into());
        }
    };
    match outcome {
        CallOutcome::Aborted => eprintln!("aborted"),
        CallOutcome::Skipped => eprintln!("skipped: another call is active"),
        CallOutcome::Completed { .. } => {}
    }
    Ok(())
}

/// Consume effects until the client is dropped.
///
/// Output text is printed incrementally: when the selected round's text
/// extends what was printed, only the new suffix is written.
async fn print_effects(mut rx: broadcast::Receiver<Effect>, json: bool) {
    let mut printed = String::new();
    loop {
        let effect = match rx.recv().await {
            Ok(effect) => effect,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Dropped {} effects", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        match effect {
            Effect::Output { text, .. } => {
                let mut stdout = std::io::stdout().lock();
                match text.strip_prefix(printed.as_str()) {
                    Some(suffix) => {
                        let _ = write!(stdout, "{}", suffix);
                    }
                    None => {
                        let _ = write!(stdout, "\n{}", text);
                    }
                }
                let _ = stdout.flush();
                printed = text;
            }
            Effect::Log(entry) if json => {
                if let Ok(line) = serde_json::to_string(&entry) {
                    eprintln!("{}", line);
                }
            }
            Effect::Log(entry) => {
                tracing::debug!("[{:?}] {} {}", entry.stage, entry.title, entry.event_type);
            }
            Effect::Annotate { handle, duration_ms } if json => {
                eprintln!(r#"{{"annotate":{},"durationMs":{}}}"#, handle.0, duration_ms);
            }
            Effect::Annotate { .. } | Effect::Stats(_) => {}
        }
    }
}

/// Error code, category and what to try next.
fn failure_line(error: &ClientError) -> String {
    let category = error.category();
    format!(
        "{} ({}): {}",
        error.error_code(),
        category,
        category.recovery_hint()
    )
}

/// One-line statistics summary.
pub fn summary(stats: &RunStatistics) -> String {
    let elapsed = stats
        .elapsed(Utc::now())
        .map(|d| format!("{}ms", d.num_milliseconds()))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} http={} status={} events={} errors={} elapsed={}{}",
        stats.method,
        stats
            .http_status
            .map_or_else(|| "-".to_string(), |s| s.to_string()),
        stats.status.as_deref().unwrap_or("-"),
        stats.event_count,
        stats.error_count,
        elapsed,
        if stats.aborted { " aborted" } else { "" },
    )
}
