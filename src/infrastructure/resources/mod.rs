//! Remote content: meetup events, the free ebook page and social links.
//!
//! Fetches are blocking and memoized with short TTLs, so command handlers can
//! call them repeatedly without hammering the remote ends.

use std::collections::BTreeMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::application::errors::{BotError, ConfigError};
use crate::application::services::book::BOOK_URL;
use crate::domain::entities::{Event, FreeBook};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::config::Config;
use crate::infrastructure::timezone::Gmt;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/51.0.2704.79 Safari/537.36";

const EVENTS_TTL: Duration = Duration::from_secs(60);
const BOOK_TTL: Duration = Duration::from_secs(600);
const LINKS_TTL: Duration = Duration::from_secs(3600);

/// Marker the promotion block carries on the page.
const DEAL_MARK: &str = "deal-of-the-day";

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<h2[^>]*>\s*([^<]+?)\s*</h2>").expect("valid title pattern"));
static COUNTDOWN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"data-countdown-to\s*=\s*"(\d+)""#).expect("valid countdown pattern")
});

#[derive(Debug, Deserialize)]
struct MeetupEvent {
    name: String,
    link: String,
    /// Event start as epoch milliseconds.
    time: i64,
}

/// Fetches and memoizes the remote content the command handlers need.
pub struct Resources {
    groups: Vec<String>,
    meetup_key: Option<String>,
    remote_url: Option<String>,
    tz: &'static Gmt,
    client: Client,
    events: TtlCache<usize, Vec<Event>>,
    book: TtlCache<&'static str, FreeBook>,
    links: TtlCache<&'static str, Vec<(String, String)>>,
}

impl Resources {
    pub fn new(config: &Config, tz: &'static Gmt) -> Result<Self, BotError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BotError::Network(e.to_string()))?;

        Ok(Self {
            groups: config.community.groups.clone(),
            meetup_key: config.events.meetup_key.clone(),
            remote_url: config.links.remote_url.clone(),
            tz,
            client,
            events: TtlCache::new(EVENTS_TTL),
            book: TtlCache::new(BOOK_TTL),
            links: TtlCache::new(LINKS_TTL),
        })
    }

    /// Upcoming events across all configured groups, ordered by start time.
    pub fn get_events(&self, list_size: usize) -> Result<Vec<Event>, BotError> {
        if let Some(events) = self.events.get(&list_size) {
            return Ok(events);
        }
        let events = self.fetch_meetup_events(list_size)?;
        self.events.insert(list_size, events.clone());
        Ok(events)
    }

    fn fetch_meetup_events(&self, list_size: usize) -> Result<Vec<Event>, BotError> {
        let key = self
            .meetup_key
            .as_deref()
            .ok_or(ConfigError::MissingField("events.meetup-key"))?;
        let page = list_size.to_string();

        let mut all_events = Vec::new();
        for group in &self.groups {
            let url = format!("https://api.meetup.com/{}/events", group);
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("key", key),
                    ("status", "upcoming"),
                    // filter the response to the fields the bot uses
                    ("only", "name,time,link"),
                    ("page", page.as_str()),
                ])
                .send()
                .map_err(|e| BotError::Network(e.to_string()))?;

            if !response.status().is_success() {
                return Err(BotError::Api(format!(
                    "meetup returned {} for {}",
                    response.status(),
                    group
                )));
            }

            let raw: Vec<MeetupEvent> = response
                .json()
                .map_err(|e| BotError::Parse(e.to_string()))?;
            for event in raw {
                // Meetup reports epoch milliseconds
                let Some(time) = self.tz.from_timestamp(event.time / 1000) else {
                    continue;
                };
                all_events.push(Event {
                    name: event.name,
                    link: event.link,
                    time,
                });
            }
        }

        all_events.sort_by_key(|event| event.time);
        Ok(all_events)
    }

    /// The free ebook currently announced on the promotion page, if the page
    /// still carries one the extractor recognizes.
    pub fn get_free_book(&self) -> Result<Option<FreeBook>, BotError> {
        if let Some(book) = self.book.get(&"book") {
            return Ok(Some(book));
        }

        let response = self
            .client
            .get(BOOK_URL)
            .send()
            .map_err(|e| BotError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BotError::Api(format!(
                "promotion page returned {}",
                response.status()
            )));
        }
        let html = response
            .text()
            .map_err(|e| BotError::Parse(e.to_string()))?;

        match extract_free_book(&html) {
            Some(book) => {
                self.book.insert("book", book.clone());
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    /// Drops the memoized book so the next call refetches the page.
    pub fn invalidate_book(&self) {
        self.book.invalidate(&"book");
    }

    /// Social links from the optional remote resources endpoint.
    ///
    /// Fetch problems are logged and reported as absence, the `/links` command
    /// degrades to its fallback text.
    pub fn get_social_links(&self) -> Option<Vec<(String, String)>> {
        if let Some(links) = self.links.get(&"links") {
            return Some(links);
        }

        let base = self.remote_url.as_deref()?;
        let url = format!("{}/social_links.json", base.trim_end_matches('/'));
        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(error = %error, "social links fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }

        let map: BTreeMap<String, String> = match response.json() {
            Ok(map) => map,
            Err(error) => {
                tracing::debug!(error = %error, "social links payload malformed");
                return None;
            }
        };

        let links: Vec<(String, String)> = map.into_iter().collect();
        self.links.insert("links", links.clone());
        Some(links)
    }
}

/// Pulls `{name, summary, expires}` out of the promotion page markup.
///
/// Returns `None` when the promotion block or any of its pieces is missing.
pub fn extract_free_book(html: &str) -> Option<FreeBook> {
    let deal = html.find(DEAL_MARK).map(|index| &html[index..])?;

    let title = TITLE_RE.captures(deal)?;
    let name = title.get(1)?.as_str().trim().to_string();
    if name.is_empty() {
        return None;
    }

    let countdown = COUNTDOWN_RE.captures(deal)?;
    let expires: i64 = countdown.get(1)?.as_str().parse().ok()?;

    // The summary is whatever text sits between the title and the countdown.
    let start = title.get(0)?.end();
    let end = countdown.get(0)?.start();
    let summary = deal
        .get(start..end)
        .map(|raw| collapse_whitespace(&strip_tags(raw)))
        .unwrap_or_default();

    Some(FreeBook {
        name,
        summary,
        expires,
    })
}

/// Drops everything between `<` and `>`, keeping the text nodes.
fn strip_tags(html: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
