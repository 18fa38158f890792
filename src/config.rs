// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! Settings read once from the environment at startup.
//!
//! | Variable               | Meaning |
//! |------------------------|---------|
//! | `J_TOPIX_FIELD_NAME`   | Issue field holding the topix number (e.g. `customfield_10100`). |
//! | `J_JOB_FIELD_NAME`     | Issue field holding the job number. |
//! | `J_JIRA_URL`           | Base URL; `/activity`, `/rest/api/latest/issue` and `/browse` hang off it. |
//! | `J_EXCLUDE_CONFLUENCE` | Query fragment appended to the activity request (see `<base>/rest/activity-stream/1.0/config`). |
//! | `J_JIRA_TOKEN`         | Sent verbatim as the `Authorization` header. |
//! | `J_DEFAULT_USER`       | User reported when `-u` is not given. |
//! | `J_UTC_OFFSET_HOURS`   | Optional, default `-7`. Shift applied to the requested day. |
//! | `J_TIMEOUT_SECS`       | Optional, default `30`. Per-request timeout. |
//! | `J_MAX_PARENT_HOPS`    | Optional, default `16`. Longest parent chain followed when resolving fields. |

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

const DEFAULT_UTC_OFFSET_HOURS: i64 = -7;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_PARENT_HOPS: usize = 16;

#[derive(Clone, Debug)]
pub struct Config {
    pub topix_field: String,
    pub job_field: String,
    pub base_url: String,
    pub exclude_fragment: String,
    pub token: String,
    pub default_user: String,
    pub utc_offset_hours: i64,
    pub timeout: Duration,
    pub max_parent_hops: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Every missing required key is named in the error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing: Vec<&str> = Vec::new();
        let mut required = |key: &'static str| -> String {
            match lookup(key).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => v,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };
        let topix_field = required("J_TOPIX_FIELD_NAME");
        let job_field = required("J_JOB_FIELD_NAME");
        let base_url = required("J_JIRA_URL");
        let exclude_fragment = required("J_EXCLUDE_CONFLUENCE");
        let token = required("J_JIRA_TOKEN");
        let default_user = required("J_DEFAULT_USER");
        if !missing.is_empty() {
            return Err(Error::Configuration(format!(
                "missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        let utc_offset_hours = match lookup("J_UTC_OFFSET_HOURS") {
            Some(v) if !v.trim().is_empty() => {
                let hours: i64 = v.trim().parse().map_err(|_| {
                    Error::Configuration(format!("J_UTC_OFFSET_HOURS is not an integer: {}", v))
                })?;
                if !(-23..=23).contains(&hours) {
                    return Err(Error::Configuration(format!(
                        "J_UTC_OFFSET_HOURS out of range (-23..=23): {}",
                        hours
                    )));
                }
                hours
            }
            _ => DEFAULT_UTC_OFFSET_HOURS,
        };
        let timeout_secs = match lookup("J_TIMEOUT_SECS") {
            Some(v) if !v.trim().is_empty() => match v.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Configuration(format!(
                        "J_TIMEOUT_SECS must be a positive integer: {}",
                        v
                    )))
                }
            },
            _ => DEFAULT_TIMEOUT_SECS,
        };
        let max_parent_hops = match lookup("J_MAX_PARENT_HOPS") {
            Some(v) if !v.trim().is_empty() => v.trim().parse::<usize>().map_err(|_| {
                Error::Configuration(format!("J_MAX_PARENT_HOPS is not a count: {}", v))
            })?,
            _ => DEFAULT_MAX_PARENT_HOPS,
        };

        Ok(Config {
            topix_field,
            job_field,
            base_url: base_url.trim_end_matches('/').to_string(),
            exclude_fragment,
            token,
            default_user,
            utc_offset_hours,
            timeout: Duration::from_secs(timeout_secs),
            max_parent_hops,
        })
    }

    pub fn browse_url(&self, ticket: &str) -> String {
        format!("{}/browse/{}", self.base_url, ticket)
    }

    pub fn issue_url(&self, ticket: &str) -> String {
        format!("{}/rest/api/latest/issue/{}", self.base_url, ticket)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn sample_vars() -> HashMap<&'static str, String> {
        HashMap::from([
            ("J_TOPIX_FIELD_NAME", "customfield_100".to_string()),
            ("J_JOB_FIELD_NAME", "customfield_200".to_string()),
            ("J_JIRA_URL", "https://jira.example.com/".to_string()),
            ("J_EXCLUDE_CONFLUENCE", "streams=key+NOT+CONF".to_string()),
            ("J_JIRA_TOKEN", "Bearer abc".to_string()),
            ("J_DEFAULT_USER", "jdoe".to_string()),
        ])
    }

    pub(crate) fn sample_config() -> Config {
        let vars = sample_vars();
        Config::from_lookup(|k| vars.get(k).cloned()).unwrap()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let cfg = sample_config();
        assert_eq!(cfg.base_url, "https://jira.example.com");
        assert_eq!(cfg.utc_offset_hours, -7);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.token, "Bearer abc");
        assert_eq!(cfg.max_parent_hops, 16);
    }

    #[test]
    fn test_from_lookup_reports_every_missing_key() {
        let mut vars = sample_vars();
        vars.remove("J_JIRA_TOKEN");
        vars.insert("J_JOB_FIELD_NAME", "   ".to_string());
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(msg.contains("J_JIRA_TOKEN"), "{}", msg);
        assert!(msg.contains("J_JOB_FIELD_NAME"), "{}", msg);
        assert!(!msg.contains("J_DEFAULT_USER"), "{}", msg);
    }

    #[test]
    fn test_from_lookup_optional_overrides() {
        let mut vars = sample_vars();
        vars.insert("J_UTC_OFFSET_HOURS", "2".to_string());
        vars.insert("J_TIMEOUT_SECS", "5".to_string());
        vars.insert("J_MAX_PARENT_HOPS", "3".to_string());
        let cfg = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.max_parent_hops, 3);
        assert_eq!(cfg.utc_offset_hours, 2);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_rejects_bad_optionals() {
        let mut vars = sample_vars();
        vars.insert("J_UTC_OFFSET_HOURS", "east".to_string());
        assert!(Config::from_lookup(|k| vars.get(k).cloned()).is_err());
        let mut vars = sample_vars();
        vars.insert("J_UTC_OFFSET_HOURS", "30".to_string());
        assert!(Config::from_lookup(|k| vars.get(k).cloned()).is_err());
        let mut vars = sample_vars();
        vars.insert("J_TIMEOUT_SECS", "0".to_string());
        assert!(Config::from_lookup(|k| vars.get(k).cloned()).is_err());
        let mut vars = sample_vars();
        vars.insert("J_MAX_PARENT_HOPS", "-1".to_string());
        assert!(Config::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_urls() {
        let cfg = sample_config();
        assert_eq!(cfg.browse_url("ABC-1"), "https://jira.example.com/browse/ABC-1");
        assert_eq!(
            cfg.issue_url("ABC-1"),
            "https://jira.example.com/rest/api/latest/issue/ABC-1"
        );
    }
}
