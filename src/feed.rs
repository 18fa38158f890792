// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! Activity-stream feed decoding.
//!
//! The feed is Atom with activity-stream extensions. Only the parts the report
//! needs are read; everything else in the document is ignored:
//!
//! ```text
//! feed
//! └── entry*
//!     ├── id, title, summary, content, published, updated
//!     ├── activity:object { id, title }
//!     └── activity:target { id, title }
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityObject {
    pub id: String,
    pub title: String,
}

/// One activity as reported by the stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content_html: String,
    pub published: String,
    pub updated: String,
    pub object: ActivityObject,
    pub target: ActivityObject,
}

impl ActivityEntry {
    /// The ticket an entry belongs to: the target when present, else the object.
    pub fn ticket(&self) -> &str {
        let target = self.target.title.trim();
        if target.is_empty() {
            self.object.title.trim()
        } else {
            target
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Feed {
    pub id: String,
    pub title: String,
    pub entries: Vec<ActivityEntry>,
}

/// Element text; attributes such as `type="html"` are ignored.
#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawObject {
    #[serde(default)]
    id: Text,
    #[serde(default)]
    title: Text,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Text,
    #[serde(default)]
    title: Text,
    #[serde(default)]
    summary: Text,
    #[serde(default)]
    content: Text,
    #[serde(default)]
    published: Text,
    #[serde(default)]
    updated: Text,
    #[serde(rename = "activity:object", alias = "object", default)]
    objects: Vec<RawObject>,
    #[serde(rename = "activity:target", alias = "target", default)]
    targets: Vec<RawObject>,
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    #[serde(default)]
    id: Text,
    #[serde(default)]
    title: Text,
    #[serde(rename = "entry", default)]
    entries: Vec<RawEntry>,
}

impl From<RawObject> for ActivityObject {
    fn from(raw: RawObject) -> Self {
        ActivityObject {
            id: raw.id.value,
            title: raw.title.value,
        }
    }
}

/// Entries may carry several objects (e.g. a batch of attachments); the first one names the entry.
fn first_object(raw: Vec<RawObject>) -> ActivityObject {
    raw.into_iter().next().map(ActivityObject::from).unwrap_or_default()
}

impl From<RawEntry> for ActivityEntry {
    fn from(raw: RawEntry) -> Self {
        ActivityEntry {
            id: raw.id.value,
            title: raw.title.value,
            summary: raw.summary.value,
            content_html: raw.content.value,
            published: raw.published.value,
            updated: raw.updated.value,
            object: first_object(raw.objects),
            target: first_object(raw.targets),
        }
    }
}

/// Decodes a feed document. Field values are not validated; an empty title is fine.
pub fn parse_feed(body: &[u8]) -> Result<Feed> {
    let xml = std::str::from_utf8(body).map_err(|e| Error::Parse(e.to_string()))?;
    check_root(xml)?;
    let raw: RawFeed = quick_xml::de::from_str(xml).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(Feed {
        id: raw.id.value,
        title: raw.title.value,
        entries: raw.entries.into_iter().map(ActivityEntry::from).collect(),
    })
}

/// The deserializer does not look at the root name, so check it here.
fn check_root(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"feed" {
                    return Ok(());
                }
                return Err(Error::Parse(format!(
                    "expected <feed> root, found <{}>",
                    String::from_utf8_lossy(name.as_ref())
                )));
            }
            Ok(Event::Eof) => return Err(Error::Parse("empty document".to_string())),
            Ok(_) => {}
            Err(e) => return Err(Error::Parse(e.to_string())),
        }
    }
}
