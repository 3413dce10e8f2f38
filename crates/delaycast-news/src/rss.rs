//! Headline extraction from RSS 2.0 and Atom feeds.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::NewsError;

/// Titles of the feed's `<item>` (RSS) or `<entry>` (Atom) elements, in
/// document order, at most `limit`.
///
/// The channel/feed title, image titles and namespaced titles such as
/// `media:title` are not headlines and are skipped.
/// Titles are trimmed; empty ones are dropped. Text and CDATA are both accepted.
pub fn extract_headlines(xml: &str, limit: usize) -> Result<Vec<String>, NewsError> {
    let mut reader = Reader::from_str(xml);
    let mut headlines = Vec::new();
    let mut in_item = false;
    let mut item_titled = false;
    let mut title: Option<String> = None;

    while headlines.len() < limit {
        match reader.read_event().map_err(xml_error)? {
            // `media:title` and friends share the local name; only the plain
            // element is the headline, and only the first one per item.
            Event::Start(e) => match e.name().as_ref() {
                b"item" | b"entry" => {
                    in_item = true;
                    item_titled = false;
                }
                b"title" if in_item && !item_titled => {
                    item_titled = true;
                    title = Some(String::new());
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(buf) = title.as_mut() {
                    buf.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(c) => {
                if let Some(buf) = title.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"item" | b"entry" => in_item = false,
                b"title" => {
                    if let Some(text) = title.take() {
                        let text = collapse_whitespace(&text);
                        if !text.is_empty() {
                            headlines.push(text);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(headlines)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn xml_error(e: impl std::fmt::Display) -> NewsError {
    NewsError::Xml(e.to_string())
}
