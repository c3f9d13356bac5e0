use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::model::{AuditEntry, FailedBan, Jail};
use crate::utils::errors::TransportError;

/// One call against the management endpoint. Serializes as a JSON object
/// whose `action` field is the discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Status,
    Read { jail: String },
    Write { jail: String, content: String },
    Delete { jail: String },
    Ban { jail: String, ip: String },
    Unban { jail: String, ip: String },
    #[serde(rename = "bulkban")]
    BulkBan { jail: String, ips: Vec<String> },
    Clear { jail: String },
    Reload,
    Audit { filter: String, limit: usize },
    AuditClear,
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::Status => "status",
            Request::Read { .. } => "read",
            Request::Write { .. } => "write",
            Request::Delete { .. } => "delete",
            Request::Ban { .. } => "ban",
            Request::Unban { .. } => "unban",
            Request::BulkBan { .. } => "bulkban",
            Request::Clear { .. } => "clear",
            Request::Reload => "reload",
            Request::Audit { .. } => "audit",
            Request::AuditClear => "audit_clear",
        }
    }
}

/// `{ success, message?, ...payload }` as returned for every action.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "truthy")]
    pub success: bool,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            payload: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    /// Parse a response body. Valid JSON that is not an object reads as an
    /// unsuccessful envelope without a message.
    pub fn from_body(body: &str) -> Result<Self, TransportError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        if !value.is_object() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| TransportError::InvalidBody(e.to_string()))
    }

    pub fn jails(&self) -> Vec<Jail> {
        match self.payload.get("jails") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match serde_json::from_value::<Jail>(item.clone()) {
                    Ok(jail) if jail.name.trim().is_empty() => {
                        log::warn!("Skipping jail entry without a name");
                        None
                    }
                    Ok(jail) => Some(jail),
                    Err(e) => {
                        log::warn!("Skipping malformed jail entry: {}", e);
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn content(&self) -> String {
        match self.payload.get("content") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn failed(&self) -> Vec<FailedBan> {
        match self.payload.get("failed") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value::<FailedBan>(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// `None` when the payload carries no entry array at all.
    pub fn entries(&self) -> Option<Vec<AuditEntry>> {
        match self.payload.get("entries") {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value::<AuditEntry>(item.clone()).ok())
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Request/response service the console talks to.
pub trait Backend: Send + Sync {
    fn call(&self, request: &Request) -> Result<Envelope, TransportError>;
}

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// JSON-over-POST client for the endpoint's `api.cgi`.
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpBackend {
    /// `timeout` bounds a whole request; `None` waits as long as the server does.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Backend for HttpBackend {
    fn call(&self, request: &Request) -> Result<Envelope, TransportError> {
        log::debug!("POST {} action={}", self.endpoint, request.action());

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if status.is_success() {
            return Envelope::from_body(&body);
        }
        // Error pages that still carry an envelope are reported through it.
        match Envelope::from_body(&body) {
            Ok(envelope) if !body.trim().is_empty() => Ok(envelope),
            _ => Err(TransportError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            }),
        }
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        _ => true,
    })
}

fn non_empty_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_carry_action_discriminator() {
        assert_eq!(
            serde_json::to_value(Request::Status).unwrap(),
            json!({ "action": "status" })
        );
        assert_eq!(
            serde_json::to_value(Request::BulkBan {
                jail: "sshd".to_string(),
                ips: vec!["1.2.3.4".to_string()],
            })
            .unwrap(),
            json!({ "action": "bulkban", "jail": "sshd", "ips": ["1.2.3.4"] })
        );
        assert_eq!(
            serde_json::to_value(Request::AuditClear).unwrap(),
            json!({ "action": "audit_clear" })
        );
        assert_eq!(
            serde_json::to_value(Request::Audit {
                filter: String::new(),
                limit: 200
            })
            .unwrap(),
            json!({ "action": "audit", "filter": "", "limit": 200 })
        );
    }

    #[test]
    fn action_name_matches_wire_tag() {
        let requests = [
            Request::Status,
            Request::Reload,
            Request::AuditClear,
            Request::Clear { jail: "a".to_string() },
            Request::Unban { jail: "a".to_string(), ip: "b".to_string() },
        ];
        for request in requests {
            let wire = serde_json::to_value(&request).unwrap();
            assert_eq!(wire["action"], request.action());
        }
    }

    #[test]
    fn envelope_exposes_payload() {
        let envelope = Envelope::from_body(
            r#"{"success":true,"jails":[{"name":"sshd","enabled":true,"curBan":1,"banIPs":["1.2.3.4"]},42]}"#,
        )
        .unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.message, None);
        let jails = envelope.jails();
        assert_eq!(jails.len(), 1);
        assert_eq!(jails[0].ban_ips, vec!["1.2.3.4"]);
    }

    #[test]
    fn unnamed_jails_are_skipped() {
        let envelope = Envelope::ok().with(
            "jails",
            json!([
                { "name": "", "enabled": true },
                { "enabled": true, "curBan": 3 },
                { "name": "  ", "enabled": false },
                { "name": "nginx", "enabled": true },
            ]),
        );
        let jails = envelope.jails();
        assert_eq!(jails.len(), 1);
        assert_eq!(jails[0].name, "nginx");
    }

    #[test]
    fn empty_message_counts_as_absent() {
        let envelope = Envelope::from_body(r#"{"success":false,"message":""}"#).unwrap();
        assert_eq!(envelope.message, None);
    }

    #[test]
    fn non_object_body_is_unsuccessful() {
        assert_eq!(Envelope::from_body("null").unwrap(), Envelope::default());
        assert!(matches!(
            Envelope::from_body("<html>"),
            Err(TransportError::InvalidBody(_))
        ));
    }

    #[test]
    fn failed_and_entries_accessors() {
        let envelope = Envelope::ok()
            .with("failed", json!([{ "ip": "5.6.7.8", "reason": "invalid" }, {}]))
            .with("entries", json!([{ "ts": "t", "action": "ban" }]));
        let failed = envelope.failed();
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].ip.as_deref(), Some("5.6.7.8"));
        assert_eq!(failed[1].ip, None);
        assert_eq!(envelope.entries().unwrap().len(), 1);
        assert_eq!(Envelope::ok().entries(), None);
    }
}
