//! Podcast RSS feed client
//!
//! Parses the Megaphone RSS feed with a streaming XML reader. Tag text may
//! be plain or CDATA. Channel-level fields are only taken from content that
//! precedes the first `<item>`, so per-episode tags are never mistaken for
//! show metadata.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};

use super::upstream::{Upstream, UpstreamError};

/// Default show feed
pub const PODCAST_FEED_URL: &str = "https://feeds.megaphone.fm/thelitmus";

const SOURCE: &str = "podcast-rss";

/// One episode of the show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub guid: String,
    pub title: String,
    /// Plain-text show notes
    pub description: String,
    /// Raw RFC 2822 date as published
    pub pub_date: String,
    pub published: Option<DateTime<Utc>>,
    /// `H:MM:SS` or `M:SS`
    pub duration: String,
    pub duration_seconds: u64,
    pub audio_url: String,
    pub audio_type: String,
    pub image: String,
    pub episode_number: Option<u32>,
}

/// Show metadata plus its most recent episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastFeed {
    pub title: String,
    pub description: String,
    pub author: String,
    pub link: String,
    pub image: String,
    pub episode_count: usize,
    pub episodes: Vec<Episode>,
}

/// Served when the feed cannot be loaded and nothing is cached
pub static FALLBACK: LazyLock<PodcastFeed> = LazyLock::new(|| PodcastFeed {
    title: "The Litmus Podcast".to_string(),
    description: "Crypto markets, explained.".to_string(),
    author: "The Litmus".to_string(),
    link: String::new(),
    image: String::new(),
    episode_count: 0,
    episodes: Vec::new(),
});

/// Client for the show's RSS feed
#[derive(Debug, Clone)]
pub struct PodcastClient {
    upstream: Upstream,
    feed_url: String,
    episode_limit: usize,
}

impl PodcastClient {
    pub fn new(upstream: Upstream, feed_url: impl Into<String>, episode_limit: usize) -> Self {
        Self {
            upstream,
            feed_url: feed_url.into(),
            episode_limit,
        }
    }

    /// Downloads and parses the feed
    pub async fn fetch_feed(&self) -> Result<PodcastFeed, UpstreamError> {
        let xml = self
            .upstream
            .text(SOURCE, self.upstream.get(&self.feed_url))
            .await?;
        parse_feed(&xml, self.episode_limit).map_err(|e| UpstreamError::Malformed {
            source_name: SOURCE,
            detail: e.to_string(),
        })
    }
}

#[derive(Debug, Default)]
struct EpisodeDraft {
    guid: String,
    title: String,
    description: String,
    summary: String,
    pub_date: String,
    duration: String,
    audio_url: String,
    audio_type: String,
    image: String,
    episode_number: String,
}

#[derive(Debug, Default)]
struct Channel {
    title: String,
    description: String,
    summary: String,
    author: String,
    link: String,
    itunes_image: String,
    image_url: String,
}

/// Parses an RSS document, keeping at most `limit` episodes
pub fn parse_feed(xml: &str, limit: usize) -> Result<PodcastFeed, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut channel = Channel::default();
    let mut seen_item = false;
    let mut current: Option<EpisodeDraft> = None;
    let mut drafts: Vec<EpisodeDraft> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = tag_name(&e);
                text.clear();
                if name == "item" {
                    seen_item = true;
                    current = Some(EpisodeDraft::default());
                }
                read_attributes(&e, &name, &stack, seen_item, &mut channel, current.as_mut());
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = tag_name(&e);
                read_attributes(&e, &name, &stack, seen_item, &mut channel, current.as_mut());
            }
            Event::Text(t) => {
                let decoded = t
                    .unescape()
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                text.push_str(&decoded);
            }
            Event::CData(c) => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    continue;
                };
                let parent = stack.last().map(String::as_str);
                let value = text.trim().to_string();
                text.clear();

                if name == "item" {
                    if let Some(draft) = current.take() {
                        drafts.push(draft);
                    }
                } else if let (Some(draft), Some("item")) = (current.as_mut(), parent) {
                    assign_item_field(draft, &name, value);
                } else if !seen_item {
                    assign_channel_field(&mut channel, &stack, &name, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let channel_image = if channel.itunes_image.is_empty() {
        channel.image_url.clone()
    } else {
        channel.itunes_image.clone()
    };

    let episodes: Vec<Episode> = drafts
        .into_iter()
        .take(limit)
        .map(|d| finish_episode(d, &channel_image))
        .collect();

    let description = if channel.description.is_empty() {
        strip_html(&channel.summary)
    } else {
        strip_html(&channel.description)
    };

    Ok(PodcastFeed {
        title: channel.title,
        description,
        author: channel.author,
        link: channel.link,
        image: channel_image,
        episode_count: episodes.len(),
        episodes,
    })
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Attribute-bearing tags: `enclosure` and `itunes:image`
fn read_attributes(
    e: &BytesStart<'_>,
    name: &str,
    stack: &[String],
    seen_item: bool,
    channel: &mut Channel,
    current: Option<&mut EpisodeDraft>,
) {
    let parent = stack.last().map(String::as_str);
    match (name, parent, current) {
        ("enclosure", Some("item"), Some(draft)) => {
            draft.audio_url = attribute(e, "url").unwrap_or_default();
            draft.audio_type = attribute(e, "type").unwrap_or_default();
        }
        ("itunes:image", Some("item"), Some(draft)) => {
            draft.image = attribute(e, "href").unwrap_or_default();
        }
        ("itunes:image", Some("channel"), _) if !seen_item => {
            channel.itunes_image = attribute(e, "href").unwrap_or_default();
        }
        _ => {}
    }
}

fn assign_item_field(draft: &mut EpisodeDraft, name: &str, value: String) {
    match name {
        "guid" => draft.guid = value,
        "title" => draft.title = value,
        "description" => draft.description = value,
        "itunes:summary" => draft.summary = value,
        "pubDate" => draft.pub_date = value,
        "itunes:duration" => draft.duration = value,
        "itunes:episode" => draft.episode_number = value,
        _ => {}
    }
}

/// `stack` holds the ancestors of `name` after it was popped
fn assign_channel_field(channel: &mut Channel, stack: &[String], name: &str, value: String) {
    let parent = stack.last().map(String::as_str);
    let grandparent = stack.len().checked_sub(2).map(|i| stack[i].as_str());
    match (name, parent, grandparent) {
        ("title", Some("channel"), _) => channel.title = value,
        ("description", Some("channel"), _) => channel.description = value,
        ("itunes:summary", Some("channel"), _) => channel.summary = value,
        ("itunes:author", Some("channel"), _) => channel.author = value,
        ("link", Some("channel"), _) => channel.link = value,
        ("url", Some("image"), Some("channel")) => channel.image_url = value,
        _ => {}
    }
}

fn finish_episode(d: EpisodeDraft, channel_image: &str) -> Episode {
    let duration_seconds = parse_duration(&d.duration);
    let notes = if d.description.is_empty() {
        &d.summary
    } else {
        &d.description
    };

    Episode {
        guid: if d.guid.is_empty() {
            d.audio_url.clone()
        } else {
            d.guid
        },
        title: if d.title.is_empty() {
            "?".to_string()
        } else {
            d.title
        },
        description: strip_html(notes),
        published: DateTime::parse_from_rfc2822(&d.pub_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        pub_date: d.pub_date,
        duration: format_duration(duration_seconds),
        duration_seconds,
        audio_url: d.audio_url,
        audio_type: d.audio_type,
        image: if d.image.is_empty() {
            channel_image.to_string()
        } else {
            d.image
        },
        episode_number: d.episode_number.trim().parse().ok(),
    }
}

/// Accepts `SS`, `MM:SS` or `HH:MM:SS`; anything else is 0
pub fn parse_duration(raw: &str) -> u64 {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() > 3 {
        return 0;
    }
    // Overflowing input is treated like any other unparseable duration
    parts
        .iter()
        .try_fold(0u64, |acc, p| {
            let n = p.trim().parse::<u64>().ok()?;
            acc.checked_mul(60)?.checked_add(n)
        })
        .unwrap_or(0)
}

/// `H:MM:SS` for an hour or more, otherwise `M:SS`
pub fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Elements whose boundaries separate words in rendered text
const BLOCK_TAGS: [&str; 12] = [
    "p", "br", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "blockquote", "tr",
];

/// Extracts the text of an HTML fragment and collapses whitespace
///
/// Entities are decoded by the parser; a bare `<` or `>` that does not
/// open a tag is kept as text.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());
    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if BLOCK_TAGS.contains(&e.name()) => text.push(' '),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
