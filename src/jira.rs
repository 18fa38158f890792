// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! Jira access: the activity-stream request, issue lookups, and the walk up the
//! parent chain that finds a ticket's topix and job numbers.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use url::form_urlencoded;

use crate::config::Config;
use crate::error::{Error, Result};

/// Page size requested from the activity stream. Only the first page is read.
const MAX_RESULTS: u32 = 100;

/// Placeholder topix number when no ticket in the chain carries one.
pub const MISSING: &str = "Missing";

static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+-\d+$").unwrap());

pub fn is_valid_ticket(ticket: &str) -> bool {
    TICKET_PATTERN.is_match(ticket)
}

/// The 24-hour span of activity to request, in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl QueryWindow {
    /// Midnight of `date` shifted by `offset_hours`, for one day.
    pub fn for_date(date: NaiveDate, offset_hours: i64) -> Self {
        let from = date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(offset_hours);
        QueryWindow {
            from,
            to: from + Duration::hours(24),
        }
    }
}

/// Builds the activity-stream URL for one user and window. The user name is
/// form-encoded so `+` or `&` in it cannot alter the query.
pub fn activity_url(config: &Config, user: &str, window: &QueryWindow) -> String {
    let user: String = form_urlencoded::byte_serialize(user.as_bytes()).collect();
    format!(
        "{}/activity?streams=user+IS+{}&streams=update-date+BETWEEN+{}+{}&maxResults={}&{}",
        config.base_url,
        user,
        window.from.timestamp_millis(),
        window.to.timestamp_millis(),
        MAX_RESULTS,
        config.exclude_fragment
    )
}

/// Where issue documents come from. The HTTP client is the real one.
pub trait IssueSource {
    fn fetch_issue(&self, ticket: &str) -> Result<Value>;
}

pub struct JiraClient<'a> {
    http: Client,
    config: &'a Config,
}

impl<'a> JiraClient<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(JiraClient { http, config })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        tracing::debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.config.token.as_str())
            .send()?
            .error_for_status()?;
        Ok(resp)
    }

    /// Raw feed document for `user` inside `window`.
    pub fn fetch_activity(&self, user: &str, window: &QueryWindow) -> Result<Vec<u8>> {
        let url = activity_url(self.config, user, window);
        let body = self.get(&url)?.bytes()?;
        tracing::debug!(bytes = body.len(), "activity feed received");
        Ok(body.to_vec())
    }
}

impl IssueSource for JiraClient<'_> {
    fn fetch_issue(&self, ticket: &str) -> Result<Value> {
        let url = self.config.issue_url(ticket);
        let body = self.get(&url)?.text()?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Network(format!("{} returned invalid JSON: {}", url, e)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueFields {
    pub topix_number: String,
    pub job_number: String,
}

impl IssueFields {
    fn new(topix_number: impl Into<String>, job_number: impl Into<String>) -> Self {
        IssueFields {
            topix_number: topix_number.into(),
            job_number: job_number.into(),
        }
    }

    /// Placeholder rendered when resolution failed.
    pub fn missing() -> Self {
        IssueFields::new(MISSING, "")
    }
}

/// Text of a JSON field: strings as-is, select-list options by their `value`,
/// null as empty, anything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => match map.get("value") {
            Some(Value::String(s)) => s.clone(),
            _ => value.to_string(),
        },
        Value::Array(_) => value.to_string(),
    }
}

fn field_text(issue: &Value, name: &str) -> String {
    issue
        .get("fields")
        .and_then(|f| f.get(name))
        .map(value_text)
        .unwrap_or_default()
}

/// Resolves topix/job numbers for a ticket, climbing to the parent while the
/// topix field is empty. The job number comes from the ticket that ends the walk.
pub struct FieldResolver<'a, S: IssueSource> {
    source: &'a S,
    topix_field: &'a str,
    job_field: &'a str,
    max_hops: usize,
}

impl<'a, S: IssueSource> FieldResolver<'a, S> {
    pub fn new(source: &'a S, config: &'a Config) -> Self {
        FieldResolver {
            source,
            topix_field: &config.topix_field,
            job_field: &config.job_field,
            max_hops: config.max_parent_hops,
        }
    }

    pub fn resolve(&self, ticket: &str) -> Result<IssueFields> {
        let mut chain: Vec<String> = Vec::new();
        let mut current = ticket.trim().to_string();
        loop {
            if !is_valid_ticket(&current) {
                return Ok(IssueFields::new(format!("Invalid ticket number {}", current), ""));
            }
            if chain.contains(&current) {
                chain.push(current);
                return Err(Error::Resolution {
                    ticket: ticket.to_string(),
                    reason: format!("parent chain loops: {}", chain.join(" -> ")),
                });
            }
            if chain.len() > self.max_hops {
                return Err(Error::Resolution {
                    ticket: ticket.to_string(),
                    reason: format!("parent chain longer than {} hops", self.max_hops),
                });
            }

            let issue = self.source.fetch_issue(&current)?;
            let topix = field_text(&issue, self.topix_field);
            let job = field_text(&issue, self.job_field);
            if !topix.trim().is_empty() {
                return Ok(IssueFields::new(topix, job));
            }
            let parent = issue
                .pointer("/fields/parent/key")
                .map(value_text)
                .unwrap_or_default();
            let parent = parent.trim();
            if parent.is_empty() {
                return Ok(IssueFields::new(MISSING, job));
            }
            tracing::debug!(ticket = %current, %parent, "topix empty, trying parent");
            chain.push(current);
            current = parent.to_string();
        }
    }
}
