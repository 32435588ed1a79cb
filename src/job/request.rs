use super::operation::OperationKind;
use crate::{Error, ErrorContext, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotifierType {
    #[serde(rename = "CALLBACK")]
    Callback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackNotifierData {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Completion notification the service sends when the job finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifierConfig {
    #[serde(rename = "type")]
    pub notifier_type: NotifierType,
    pub data: CallbackNotifierData,
}

impl NotifierConfig {
    pub fn callback(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::client_with_context(
                "Callback URL can not be empty",
                ErrorContext::new().with_field_path("notifiers.data.url"),
            ));
        }
        Ok(Self {
            notifier_type: NotifierType::Callback,
            data: CallbackNotifierData { url, headers: None },
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data
            .headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// An operation payload ready for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    kind: OperationKind,
    payload: Value,
    notifiers: Vec<NotifierConfig>,
}

impl JobRequest {
    pub fn new<T: Serialize>(kind: OperationKind, payload: &T) -> Result<Self> {
        Ok(Self {
            kind,
            payload: serde_json::to_value(payload)?,
            notifiers: Vec::new(),
        })
    }

    pub fn with_notifier(mut self, notifier: NotifierConfig) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Payload with `notifiers` merged in.
    pub fn to_body(&self) -> Result<Value> {
        if self.notifiers.is_empty() {
            return Ok(self.payload.clone());
        }
        let mut body = self.payload.clone();
        let Some(fields) = body.as_object_mut() else {
            return Err(Error::client_with_context(
                "notifiers require a JSON object payload",
                ErrorContext::new().with_field_path("payload"),
            ));
        };
        fields.insert("notifiers".to_string(), serde_json::to_value(&self.notifiers)?);
        Ok(body)
    }
}
