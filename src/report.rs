// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! Plain-text report: one block per ticket, a date line whenever the date changes.

use std::io::Write;

use html2text::render::text_renderer::TrivialDecorator;

use crate::config::Config;
use crate::error::Result;
use crate::grouping::EntryGroups;
use crate::jira::{FieldResolver, IssueFields, IssueSource, QueryWindow};

const TICKET_RULE: &str = "================================================================";
const ENTRY_RULE: &str = "----------------------------------------------------------------";

/// Wrap width handed to the HTML converter; wide enough that lines are left alone.
const TEXT_WIDTH: usize = 1000;

/// Markup stripped to plain text; links keep their label only.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    html2text::from_read_with_decorator(html.as_bytes(), TEXT_WIDTH, TrivialDecorator::new())
        .trim()
        .to_string()
}

pub fn write_banner<W: Write>(out: &mut W, user: &str, window: &QueryWindow) -> Result<()> {
    writeln!(
        out,
        "Username: {} active from {} to {}",
        user,
        window.from.format("%d-%m-%Y %H:%M"),
        window.to.format("%d-%m-%Y %H:%M")
    )?;
    Ok(())
}

/// Writes every group in key order, resolving fields per ticket as it goes.
/// A ticket whose lookup fails is shown with placeholder numbers.
pub fn write_report<W: Write, S: IssueSource>(
    out: &mut W,
    groups: &EntryGroups,
    resolver: &FieldResolver<'_, S>,
    config: &Config,
) -> Result<()> {
    if groups.is_empty() && groups.skipped.is_empty() {
        writeln!(out, "No activity found.")?;
        return Ok(());
    }
    let mut date: Option<&str> = None;
    for (key, entries) in groups.iter() {
        if date != Some(key.date.as_str()) {
            writeln!(out, "{}", key.date)?;
            date = Some(key.date.as_str());
        }
        let fields = match resolver.resolve(&key.ticket) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    ticket = %key.ticket,
                    retryable = e.is_retryable(),
                    "field lookup failed: {}",
                    e
                );
                IssueFields::missing()
            }
        };
        writeln!(out, "{}", TICKET_RULE)?;
        writeln!(out, "{}\t{}", key.ticket, config.browse_url(&key.ticket))?;
        writeln!(
            out,
            "Topix number: {}\t Job number: {}",
            fields.topix_number, fields.job_number
        )?;
        for entry in entries {
            writeln!(out, "{}", ENTRY_RULE)?;
            writeln!(out, "{}", html_to_text(&entry.title))?;
            writeln!(out, "{}", ENTRY_RULE)?;
            let body = if entry.content_html.trim().is_empty() {
                &entry.summary
            } else {
                &entry.content_html
            };
            writeln!(out, "{}", html_to_text(body))?;
        }
    }
    if !groups.skipped.is_empty() {
        writeln!(
            out,
            "\nSkipped {} entries with malformed timestamps (run with -v for details).",
            groups.skipped.len()
        )?;
    }
    Ok(())
}
