//! Persisted field map owned by the host framework.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ReconcilerConfig;

/// A single persisted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    List(Vec<String>),
}

/// How long Create and Delete may wait for a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(with = "crate::config::secs")]
    pub create: Duration,
    #[serde(with = "crate::config::secs")]
    pub delete: Duration,
}

impl From<&ReconcilerConfig> for Timeouts {
    fn from(config: &ReconcilerConfig) -> Self {
        Self {
            create: config.create_timeout,
            delete: config.delete_timeout,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from(&ReconcilerConfig::default())
    }
}

/// Field map plus identifier slot for one resource instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    id: String,
    fields: BTreeMap<String, FieldValue>,
    pub timeouts: Timeouts,
}

impl ResourceData {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            id: String::new(),
            fields: BTreeMap::new(),
            timeouts,
        }
    }

    /// Identifier slot; empty when the resource does not exist.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// String value of a field, `None` when unset or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// List value of a field, `None` when unset or not a list.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        match self.fields.get(key) {
            Some(FieldValue::List(l)) => Some(l),
            _ => None,
        }
    }

    pub fn set_str(&mut self, key: &str, value: impl Into<String>) {
        self.fields
            .insert(key.to_string(), FieldValue::String(value.into()));
    }

    pub fn set_list<I, S>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = values.into_iter().map(Into::into).collect();
        self.fields.insert(key.to_string(), FieldValue::List(list));
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let mut d = ResourceData::default();
        d.set_str("display_name", "lb1");
        d.set_list("subnet_ids", ["s1", "s2"]);

        assert_eq!(d.get_str("display_name"), Some("lb1"));
        assert_eq!(d.get_list("subnet_ids"), Some(&["s1".to_string(), "s2".to_string()][..]));
        // Wrong shape reads as unset.
        assert_eq!(d.get_str("subnet_ids"), None);
        assert_eq!(d.get_list("display_name"), None);
        assert_eq!(d.get_str("shape"), None);
    }

    #[test]
    fn test_serializes_untagged_values() {
        let mut d = ResourceData::new(Timeouts {
            create: Duration::from_secs(60),
            delete: Duration::from_secs(30),
        });
        d.set_id("ocid1.loadbalancer.1");
        d.set_str("shape", "100Mbps");
        d.set_list("ip_addresses", ["10.0.0.2"]);

        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["fields"]["shape"], "100Mbps");
        assert_eq!(json["fields"]["ip_addresses"][0], "10.0.0.2");
        assert_eq!(json["timeouts"]["create"], 60);

        let back: ResourceData = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}
