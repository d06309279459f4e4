use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::model::ChatModel;

/// One recorded [`ChatModel::invoke`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub prompt: String,
    pub temperature: f32,
}

/// A [`ChatModel`] that returns a fixed answer and records what it was sent.
#[derive(Debug)]
pub struct MockChatModel {
    name: String,
    reply: Option<String>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockChatModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { name: "mock".to_string(), reply: Some(reply.into()), invocations: Mutex::new(Vec::new()) }
    }

    /// A model whose every call fails with [`ModelError::Request`].
    pub fn failing() -> Self {
        Self { name: "mock".to_string(), reply: None, invocations: Mutex::new(Vec::new()) }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, prompt: &str, temperature: f32) -> Result<String> {
        if let Ok(mut calls) = self.invocations.lock() {
            calls.push(Invocation { prompt: prompt.to_string(), temperature });
        }
        self.reply.clone().ok_or_else(|| ModelError::Request {
            model: self.name.clone(),
            message: "mock failure".to_string(),
        })
    }
}
