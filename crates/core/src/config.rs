//! Settings resolution.
//!
//! Precedence, lowest first: built-in defaults, the JSON settings file, then
//! the process environment for the `GOVC_*` allow-list. The environment is only
//! read, never written; resolved `GOVC_*` values are handed to the external
//! tool as its child environment (see [`Settings::govc_env`]).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::{GovmError, GovmResult};

/// Connection settings the external tool understands. Only these are taken
/// from the environment.
pub const GOVC_ENV_KEYS: [&str; 8] = [
    "GOVC_URL",
    "GOVC_USERNAME",
    "GOVC_PASSWORD",
    "GOVC_CERTIFICATE",
    "GOVC_PRIVATE_KEY",
    "GOVC_INSECURE",
    "GOVC_PERSIST_SESSION",
    "GOVC_MIN_API_VERSION",
];

const VM_PATH_KEY: &str = "vm-path";

/// Immutable, fully resolved settings shared by the whole process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Inventory root; listed names are relative to it.
    pub vm_path: String,
    /// Program invoked for inventory operations.
    pub govc_bin: PathBuf,
    govc: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AppKeys {
    #[serde(rename = "vm-path", skip_serializing_if = "Option::is_none")]
    vm_path: Option<String>,
    #[serde(rename = "govc-bin", skip_serializing_if = "Option::is_none")]
    govc_bin: Option<PathBuf>,
}

impl Default for AppKeys {
    fn default() -> Self {
        Self {
            vm_path: None,
            govc_bin: Some(PathBuf::from("govc")),
        }
    }
}

/// A `GOVC_*` value as it may appear in the JSON file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Flag(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Flag(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, letting the process environment win.
    pub fn load(path: impl AsRef<Path>) -> GovmResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`Settings::load`], with the environment lookup injected.
    ///
    /// A variable that is set but empty counts as unset.
    pub fn load_with<F>(path: impl AsRef<Path>, lookup: F) -> GovmResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(GovmError::configuration(format!(
                "settings file not found: {} (a JSON file with a `{VM_PATH_KEY}` key is required)",
                path.display()
            )));
        }

        let overrides: BTreeMap<&str, String> = GOVC_ENV_KEYS
            .iter()
            .filter_map(|key| {
                lookup(*key)
                    .filter(|v| !v.is_empty())
                    .map(|v| (*key, v))
            })
            .collect();

        let figment = Figment::from(Serialized::defaults(AppKeys::default()))
            .merge(Json::file(path))
            .merge(Serialized::defaults(overrides));

        let app: AppKeys = figment.extract().map_err(|e| {
            GovmError::configuration(format!("failed to read {}: {e}", path.display()))
        })?;

        let mut govc = BTreeMap::new();
        for key in GOVC_ENV_KEYS {
            if !figment.contains(key) {
                continue;
            }
            let value: Scalar = figment.extract_inner(key).map_err(|e| {
                GovmError::configuration(format!("invalid value for {key}: {e}"))
            })?;
            govc.insert(key, value.to_string());
        }

        let vm_path = app.vm_path.unwrap_or_else(|| {
            tracing::warn!(
                config = %path.display(),
                "no `{VM_PATH_KEY}` configured; listing the whole inventory"
            );
            String::new()
        });

        Ok(Self {
            vm_path,
            govc_bin: app.govc_bin.unwrap_or_else(|| PathBuf::from("govc")),
            govc,
        })
    }

    /// Resolved `GOVC_*` pairs, in allow-list key order.
    pub fn govc_env(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.govc.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn govc_value(&self, key: &str) -> Option<&str> {
        self.govc.get(key).map(String::as_str)
    }
}
