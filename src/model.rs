use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::addresses::addresses_from_value;

/// One protected jail as reported by the `status` action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Jail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "curBan", default, deserialize_with = "lenient_count")]
    pub cur_ban: u64,
    #[serde(rename = "banIPs", default, deserialize_with = "address_list")]
    pub ban_ips: Vec<String>,
}

/// A row of the audit trail. Timestamps are shown as the backend wrote them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AuditEntry {
    pub fn headline(&self) -> String {
        format!("{} — {}", self.ts, self.action)
    }

    pub fn detail(&self) -> String {
        let mut out = String::new();
        if let Some(ref jail) = self.jail {
            out.push_str(&format!("jail={} ", jail));
        }
        if let Some(ref ip) = self.ip {
            out.push_str(&format!("ip={} ", ip));
        }
        if let Some(ref note) = self.note {
            out.push_str(note);
        }
        out
    }
}

/// Per-address failure reported by `bulkban`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FailedBan {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn address_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(addresses_from_value(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn jail_accepts_string_ban_list_and_count() {
        let jail: Jail = serde_json::from_value(json!({
            "name": "sshd",
            "enabled": true,
            "curBan": "2",
            "banIPs": "1.2.3.4 5.6.7.8"
        }))
        .unwrap();
        assert_eq!(jail.cur_ban, 2);
        assert_eq!(jail.ban_ips, vec!["1.2.3.4", "5.6.7.8"]);
    }

    #[test]
    fn jail_missing_fields_default() {
        let jail: Jail = serde_json::from_value(json!({ "name": "nginx" })).unwrap();
        assert!(!jail.enabled);
        assert_eq!(jail.cur_ban, 0);
        assert!(jail.ban_ips.is_empty());
    }

    #[test]
    fn audit_detail_skips_absent_fields() {
        let entry = AuditEntry {
            ts: "2025-01-02T03:04:05".to_string(),
            action: "ban".to_string(),
            jail: Some("sshd".to_string()),
            ip: None,
            note: Some("manual".to_string()),
        };
        assert_eq!(entry.detail(), "jail=sshd manual");
        assert_eq!(entry.headline(), "2025-01-02T03:04:05 — ban");
    }
}
