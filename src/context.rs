// 🎛️ Execution Context - explicit per-run handle passed to every stage
//
// Holds what a run needs beyond its input records: which environment it
// runs in, its run id, the event header constants and the clock used to
// stamp events.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const EVENT_TYPE: &str = "SBDL-Contract";
pub const MAJOR_SCHEMA_VERSION: u32 = 1;
pub const MINOR_SCHEMA_VERSION: u32 = 0;

// ============================================================================
// JOB ENVIRONMENT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobEnv {
    Local,
    Qa,
    Prod,
}

impl JobEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobEnv::Local => "LOCAL",
            JobEnv::Qa => "QA",
            JobEnv::Prod => "PROD",
        }
    }
}

impl fmt::Display for JobEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "LOCAL" => Ok(JobEnv::Local),
            "QA" => Ok(JobEnv::Qa),
            "PROD" => Ok(JobEnv::Prod),
            other => Err(anyhow!("Unknown job environment: {}", other)),
        }
    }
}

// ============================================================================
// EVENT HEADER TEMPLATE
// ============================================================================

/// Header values shared by every event of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTemplate {
    pub event_type: String,
    pub major_schema_version: u32,
    pub minor_schema_version: u32,
}

impl Default for HeaderTemplate {
    fn default() -> Self {
        HeaderTemplate {
            event_type: EVENT_TYPE.to_string(),
            major_schema_version: MAJOR_SCHEMA_VERSION,
            minor_schema_version: MINOR_SCHEMA_VERSION,
        }
    }
}

// ============================================================================
// EXECUTION CONTEXT
// ============================================================================

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub env: JobEnv,
    pub run_id: String,
    pub header: HeaderTemplate,
    /// Pinned processing time; wall clock when None
    fixed_now: Option<DateTime<Utc>>,
}

impl ExecutionContext {
    pub fn new(env: JobEnv) -> Self {
        ExecutionContext {
            env,
            run_id: format!("SBDL-{}", uuid::Uuid::new_v4()),
            header: HeaderTemplate::default(),
            fixed_now: None,
        }
    }

    /// Pin the processing clock (tests, replays)
    pub fn with_fixed_clock(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    /// Processing timestamp for the row being materialized
    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Fresh identifier, never reused within or across runs
    pub fn next_event_identifier(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_job_env_parsing() {
        assert_eq!("local".parse::<JobEnv>().unwrap(), JobEnv::Local);
        assert_eq!("QA".parse::<JobEnv>().unwrap(), JobEnv::Qa);
        assert_eq!("Prod".parse::<JobEnv>().unwrap(), JobEnv::Prod);
        assert!("staging".parse::<JobEnv>().is_err());
        assert_eq!(JobEnv::Prod.to_string(), "PROD");
    }

    #[test]
    fn test_run_id_prefix() {
        let ctx = ExecutionContext::new(JobEnv::Local);
        assert!(ctx.run_id.starts_with("SBDL-"));
        assert_ne!(ctx.run_id, ExecutionContext::new(JobEnv::Local).run_id);
    }

    #[test]
    fn test_header_defaults() {
        let ctx = ExecutionContext::new(JobEnv::Qa);
        assert_eq!(ctx.header.event_type, "SBDL-Contract");
        assert_eq!(ctx.header.major_schema_version, 1);
        assert_eq!(ctx.header.minor_schema_version, 0);
    }

    #[test]
    fn test_fixed_clock() {
        let pinned = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let ctx = ExecutionContext::new(JobEnv::Local).with_fixed_clock(pinned);
        assert_eq!(ctx.now(), pinned);
    }

    #[test]
    fn test_event_identifiers_unique() {
        let ctx = ExecutionContext::new(JobEnv::Local);
        assert_ne!(ctx.next_event_identifier(), ctx.next_event_identifier());
    }
}
