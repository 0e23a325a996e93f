use chrono::{DateTime, Utc};
use feed_rs::model::Link;
use feed_rs::parser;
use html_escape::decode_html_entities;
use url::Url;

use crate::domain::{ParsedFeed, RawEntry};
use crate::fetcher::FetchCause;

const UNTITLED: &str = "(untitled)";

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS/Atom/JSON feed body.
    ///
    /// Entries whose link cannot be resolved to an absolute http(s) URL are
    /// dropped. Entries with no usable date get `fetched_at`. All timestamps
    /// are truncated to whole seconds, matching what the store keeps.
    pub fn normalize(
        &self,
        feed_url: &str,
        body: &[u8],
        fetched_at: DateTime<Utc>,
    ) -> Result<ParsedFeed, FetchCause> {
        let feed = parser::parse(body).map_err(|e| FetchCause::Parse(e.to_string()))?;

        let base = Url::parse(feed_url).ok();
        let fallback = whole_seconds(fetched_at);

        let title = feed
            .title
            .map(|t| decode_html_entities(&t.content).trim().to_string())
            .filter(|t| !t.is_empty());

        let total = feed.entries.len();
        let entries: Vec<RawEntry> = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let link = entry_link(base.as_ref(), &entry.links)?;

                let title = entry
                    .title
                    .map(|t| decode_html_entities(&t.content).trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNTITLED.to_string());

                let published_at = entry
                    .published
                    .or(entry.updated)
                    .map(whole_seconds)
                    .unwrap_or(fallback);

                Some(RawEntry {
                    title,
                    link,
                    published_at,
                })
            })
            .collect();

        if entries.len() < total {
            tracing::debug!(
                "Dropped {} entries without a usable link from {}",
                total - entries.len(),
                feed_url
            );
        }

        Ok(ParsedFeed { title, entries })
    }
}

/// The entry's own page: the first `alternate` (or untyped) link, then any
/// other link as a last resort.
fn entry_link(base: Option<&Url>, links: &[Link]) -> Option<String> {
    links
        .iter()
        .filter(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .chain(links.iter())
        .find_map(|l| resolve_link(base, &l.href))
}

fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(href).ok()?,
        Err(_) => return None,
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

fn whole_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.timestamp(), 0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test &amp; Feed</title>
    <link>https://example.com/</link>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>/posts/item2</link>
      <guid>item-2</guid>
    </item>
    <item>
      <title>No link here</title>
      <guid isPermaLink="false">item-3</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <id>urn:example:feed</id>
  <updated>2024-01-02T00:00:00Z</updated>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-01T12:30:45.750Z</updated>
  </entry>
  <entry>
    <link href="https://example.com/atom2"/>
    <id>atom-entry-2</id>
    <updated>2024-01-01T00:00:00Z</updated>
  </entry>
</feed>"#;

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rss() {
        let normalizer = Normalizer::new();
        let feed = normalizer
            .normalize(
                "https://example.com/feed.xml",
                RSS_SAMPLE.as_bytes(),
                fetched_at(),
            )
            .unwrap();

        assert_eq!(feed.title.as_deref(), Some("Test & Feed"));
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "Test Item 1");
        assert_eq!(feed.entries[0].link, "https://example.com/item1");
        assert_eq!(
            feed.entries[0].published_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_relative_link_resolved_against_feed_url() {
        let normalizer = Normalizer::new();
        let feed = normalizer
            .normalize(
                "https://example.com/blog/feed.xml",
                RSS_SAMPLE.as_bytes(),
                fetched_at(),
            )
            .unwrap();

        assert_eq!(feed.entries[1].link, "https://example.com/posts/item2");
    }

    #[test]
    fn test_missing_date_falls_back_to_fetch_time() {
        let normalizer = Normalizer::new();
        let feed = normalizer
            .normalize(
                "https://example.com/feed.xml",
                RSS_SAMPLE.as_bytes(),
                fetched_at(),
            )
            .unwrap();

        assert_eq!(feed.entries[1].published_at, fetched_at());
    }

    #[test]
    fn test_parse_atom() {
        let normalizer = Normalizer::new();
        let feed = normalizer
            .normalize(
                "https://example.com/feed.atom",
                ATOM_SAMPLE.as_bytes(),
                fetched_at(),
            )
            .unwrap();

        assert_eq!(feed.title.as_deref(), Some("Atom Test Feed"));
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "Atom Entry 1");
        // Sub-second precision is dropped.
        assert_eq!(
            feed.entries[0].published_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 45).unwrap()
        );
        assert_eq!(feed.entries[1].title, UNTITLED);
    }

    #[test]
    fn test_malformed_date_falls_back_to_fetch_time() {
        let body = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Dates</title>
  <item>
    <title>Bad date</title>
    <link>https://example.com/bad-date</link>
    <pubDate>not a date at all</pubDate>
  </item>
</channel></rss>"#;

        let feed = Normalizer::new()
            .normalize("https://example.com/feed.xml", body.as_bytes(), fetched_at())
            .unwrap();

        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].link, "https://example.com/bad-date");
        assert_eq!(feed.entries[0].published_at, fetched_at());
    }

    #[test]
    fn test_alternate_link_preferred_over_replies_and_edit() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Blog</title>
  <id>urn:example:blog</id>
  <updated>2024-01-02T00:00:00Z</updated>
  <entry>
    <id>tag:b.example.com,2024:post-1</id>
    <title>Post</title>
    <updated>2024-01-01T00:00:00Z</updated>
    <link rel="replies" type="application/atom+xml" href="https://b.example.com/feeds/1/comments/default"/>
    <link rel="edit" type="application/atom+xml" href="https://b.example.com/feeds/posts/default/1"/>
    <link rel="self" type="application/atom+xml" href="https://b.example.com/feeds/posts/default/1"/>
    <link rel="alternate" type="text/html" href="https://b.example.com/2024/01/post.html"/>
  </entry>
  <entry>
    <id>tag:b.example.com,2024:post-2</id>
    <title>Only replies</title>
    <updated>2024-01-01T00:00:00Z</updated>
    <link rel="replies" href="https://b.example.com/feeds/2/comments/default"/>
  </entry>
</feed>"#;

        let feed = Normalizer::new()
            .normalize("https://b.example.com/feeds/posts/default", body.as_bytes(), fetched_at())
            .unwrap();

        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].link, "https://b.example.com/2024/01/post.html");
        // No alternate link at all: fall back to whatever resolves.
        assert_eq!(feed.entries[1].link, "https://b.example.com/feeds/2/comments/default");
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize(
            "https://example.com/feed.xml",
            b"this is not a feed",
            fetched_at(),
        );
        assert!(matches!(result, Err(FetchCause::Parse(_))));
    }

    #[test]
    fn test_resolve_link_rejects_non_http() {
        let base = Url::parse("https://example.com/feed.xml").ok();
        assert_eq!(resolve_link(base.as_ref(), "mailto:someone@example.com"), None);
        assert_eq!(resolve_link(base.as_ref(), "   "), None);
        assert_eq!(resolve_link(None, "/relative"), None);
        assert_eq!(
            resolve_link(base.as_ref(), " https://example.com/a "),
            Some("https://example.com/a".to_string())
        );
    }
}
