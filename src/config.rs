// ⚙️ Job Configuration - per-environment settings
//
// conf/sbdl.json holds one section per environment:
//
//   {
//     "LOCAL": { "enable.hive": "false", "hive.database": "warehouse/sbdl.db", ... },
//     "QA":    { ... },
//     "PROD":  { ... }
//   }

use crate::context::JobEnv;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "conf/sbdl.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Read from the SQLite warehouse instead of CSV files
    #[serde(rename = "enable.hive", with = "string_bool")]
    pub enable_hive: bool,

    /// Warehouse database file
    #[serde(rename = "hive.database")]
    pub hive_database: PathBuf,

    /// Directory holding accounts.csv, parties.csv, party_address.csv
    #[serde(rename = "data.dir", default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Drop accounts whose active_ind is not 1
    #[serde(rename = "account.filter.active_only", default)]
    pub active_accounts_only: bool,

    #[serde(rename = "kafka.topic", default = "default_topic")]
    pub kafka_topic: String,

    /// JSON-lines output file; stdout when absent
    #[serde(rename = "output.path", default)]
    pub output_path: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("test_data")
}

fn default_topic() -> String {
    "sbdl_kafka_cloud".to_string()
}

impl JobConfig {
    /// Built-in settings for local runs without a config file
    pub fn local_defaults() -> Self {
        JobConfig {
            enable_hive: false,
            hive_database: PathBuf::from("warehouse/sbdl.db"),
            data_dir: default_data_dir(),
            active_accounts_only: true,
            kafka_topic: default_topic(),
            output_path: None,
        }
    }

    /// Load the section for `env` from a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P, env: JobEnv) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_json(&content, env)
    }

    pub fn from_json(content: &str, env: JobEnv) -> Result<Self> {
        let mut sections: HashMap<String, JobConfig> =
            serde_json::from_str(content).context("Failed to parse config JSON")?;

        sections
            .remove(env.as_str())
            .with_context(|| format!("No configuration section for environment {}", env))
    }

    /// Config file if present, built-in defaults for LOCAL otherwise
    pub fn resolve(path: Option<&Path>, env: JobEnv) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path, env),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path, env)
                } else if env == JobEnv::Local {
                    Ok(Self::local_defaults())
                } else {
                    anyhow::bail!(
                        "No config file at {} and no built-in defaults for {}",
                        DEFAULT_CONFIG_PATH,
                        env
                    )
                }
            }
        }
    }
}

/// "true"/"false" strings, the way the properties-style config writes flags
mod string_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Text(String),
        }

        match Flag::deserialize(deserializer)? {
            Flag::Bool(value) => Ok(value),
            Flag::Text(text) => Ok(text.trim().eq_ignore_ascii_case("true")),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "LOCAL": {
            "enable.hive": "false",
            "hive.database": "warehouse/local.db",
            "data.dir": "test_data",
            "account.filter.active_only": true
        },
        "PROD": {
            "enable.hive": "true",
            "hive.database": "/data/sbdl.db",
            "kafka.topic": "sbdl_contracts",
            "output.path": "out/contracts.jsonl"
        }
    }"#;

    #[test]
    fn test_load_local_section() {
        let config = JobConfig::from_json(SAMPLE, JobEnv::Local).unwrap();
        assert!(!config.enable_hive);
        assert_eq!(config.hive_database, PathBuf::from("warehouse/local.db"));
        assert!(config.active_accounts_only);
        assert_eq!(config.kafka_topic, "sbdl_kafka_cloud");
        assert!(config.output_path.is_none());
    }

    #[test]
    fn test_load_prod_section() {
        let config = JobConfig::from_json(SAMPLE, JobEnv::Prod).unwrap();
        assert!(config.enable_hive);
        assert_eq!(config.kafka_topic, "sbdl_contracts");
        assert_eq!(config.data_dir, PathBuf::from("test_data"));
        assert!(!config.active_accounts_only);
        assert_eq!(config.output_path, Some(PathBuf::from("out/contracts.jsonl")));
    }

    #[test]
    fn test_missing_section_is_error() {
        let err = JobConfig::from_json(SAMPLE, JobEnv::Qa).unwrap_err();
        assert!(err.to_string().contains("QA"));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(JobConfig::from_json("{ not json", JobEnv::Local).is_err());
    }

    #[test]
    fn test_boolean_flag_accepted() {
        let json = r#"{"QA": {"enable.hive": true, "hive.database": "qa.db"}}"#;
        assert!(JobConfig::from_json(json, JobEnv::Qa).unwrap().enable_hive);
    }
}
