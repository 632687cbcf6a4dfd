//! Scripted in-memory CLI used by unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::client::CliBackend;
use crate::cancel::CancelToken;
use crate::error::{Result, SpaceFsError};

/// Canned reply for one recorded call.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Fail(String),
    Lines(Vec<String>),
}

type Handler = Box<dyn Fn(&[String]) -> Reply + Send + Sync>;

/// Records every argument vector and answers through a handler closure.
pub(crate) struct ScriptedCli {
    calls: Mutex<Vec<Vec<String>>>,
    handler: Handler,
}

impl ScriptedCli {
    pub(crate) fn new(handler: impl Fn(&[String]) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Recorded calls for one subcommand.
    pub(crate) fn calls_for(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.first().map(String::as_str) == Some(subcommand))
            .collect()
    }

    fn record(&self, args: &[String]) -> Reply {
        self.calls.lock().push(args.to_vec());
        (self.handler)(args)
    }
}

/// Value following `flag` in an argument vector.
pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[async_trait]
impl CliBackend for ScriptedCli {
    async fn invoke(&self, args: Vec<String>) -> Result<Value> {
        match self.record(&args) {
            Reply::Json(value) => Ok(value),
            Reply::Fail(message) => Err(SpaceFsError::CliExecution {
                code: Some(1),
                message,
            }),
            Reply::Lines(_) => Err(SpaceFsError::CliProtocol(
                "text output from a JSON-mode call".to_string(),
            )),
        }
    }

    async fn stream(
        &self,
        args: Vec<String>,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
        cancel: &CancelToken,
    ) -> Result<()> {
        match self.record(&args) {
            Reply::Lines(lines) => {
                for line in lines {
                    if cancel.is_cancelled() {
                        return Err(SpaceFsError::Cancelled);
                    }
                    on_line(&line);
                }
                Ok(())
            }
            Reply::Json(value) => {
                on_line(&value.to_string());
                Ok(())
            }
            Reply::Fail(message) => Err(SpaceFsError::CliExecution {
                code: Some(1),
                message,
            }),
        }
    }
}
