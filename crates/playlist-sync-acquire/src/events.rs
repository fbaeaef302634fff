use anyhow::{Context, Result};
use playlist_sync_model::document::{Document, Entry, Record};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::types::Event;

pub const SITE_BASE: &str = "https://livetv.sx";

/// Concurrent event-page fetches.
pub const DEFAULT_WORKERS: usize = 10;

pub const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

const BROWSER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static BROADCAST_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"broadc(a|á)st").expect("valid regex"));
static ONCLICK_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cl\(this, '(.+?)'\)").expect("valid regex"));
static PLAYER_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/es/showvideo/\d+/|/es/webplayer/\d+/").expect("valid regex"));

/// Load the event list from a JSON array of `{name, time, url}`.
pub fn load_events(path: &str) -> Result<Vec<Event>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let events: Vec<Event> =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {path}"))?;
    tracing::info!(path = %path, events = events.len(), "Loaded events");
    Ok(events)
}

/// Fetch every event page with at most `workers` requests in flight and
/// build a playlist with one record per player link.
///
/// A page that fails to load is logged and contributes no links. Records
/// keep the order of the input events.
pub async fn scrape_events(events: Vec<Event>, base: &str, workers: usize) -> Result<Document> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::REFERER,
        format!("{base}/es/").parse().context("Invalid referer")?,
    );
    let client = reqwest::Client::builder()
        .user_agent(BROWSER_AGENT)
        .default_headers(headers)
        .timeout(PAGE_TIMEOUT)
        .build()?;

    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for (index, event) in events.iter().cloned().enumerate() {
        let client = client.clone();
        let permits = Arc::clone(&permits);
        let base = base.to_string();
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            let links = match fetch_page(&client, &event.url).await {
                Ok(html) => extract_player_links(&html, &base),
                Err(e) => {
                    tracing::warn!(url = %event.url, "Skipping event page: {e:#}");
                    Vec::new()
                }
            };
            (index, links)
        });
    }

    let mut found: Vec<(usize, Vec<String>)> = Vec::with_capacity(events.len());
    while let Some(joined) = tasks.join_next().await {
        found.push(joined.context("Event worker panicked")?);
    }
    found.sort_by_key(|(index, _)| *index);

    let mut records = Vec::new();
    for (index, links) in found {
        let event = &events[index];
        for (i, link) in links.into_iter().enumerate() {
            let label = format!("{} - {} (Link {})", event.time, event.name, i + 1);
            records.push(Record::clean(&label, link));
        }
    }

    tracing::info!(events = events.len(), links = records.len(), "Scraped player links");

    let mut doc = Document::from_records(records);
    doc.entries.insert(
        1,
        Entry::PassThrough(format!(
            "# generated {} from {} events",
            chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
            events.len()
        )),
    );
    Ok(doc)
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await.context("Failed to fetch page")?;
    let status = response.status();
    anyhow::ensure!(status.is_success(), "HTTP {status} for {url}");
    response.text().await.context("Failed to read response body")
}

/// Collect web-player links from an event page.
///
/// Broadcast tables are searched first: each row's `td.live` link, with the
/// real path taken from an `onclick="cl(this, '...')"` handler when present.
/// If that finds nothing, any `showvideo`/`webplayer` link on the page is
/// used. P2P links (`acestream:`, `sop:`) are never returned.
pub fn extract_player_links(html: &str, base: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table[class]").expect("valid selector");
    let row_sel = Selector::parse("tr").expect("valid selector");
    let cell_sel = Selector::parse("td.live").expect("valid selector");
    let link_sel = Selector::parse("a[href]").expect("valid selector");

    let mut links: Vec<String> = Vec::new();

    let broadcast_tables = document.select(&table_sel).filter(|t| {
        t.value()
            .attr("class")
            .is_some_and(|c| BROADCAST_CLASS.is_match(c))
    });
    for table in broadcast_tables {
        for row in table.select(&row_sel) {
            let Some(cell) = row.select(&cell_sel).next() else {
                continue;
            };
            let Some(link) = cell.select(&link_sel).next() else {
                continue;
            };
            if let Some(url) = player_url(link, base) {
                push_unique(&mut links, url);
            }
        }
    }

    if links.is_empty() {
        for link in document.select(&link_sel) {
            let href = link.value().attr("href").unwrap_or_default();
            if PLAYER_HREF.is_match(href) && !is_p2p(href) {
                push_unique(&mut links, absolute(href, base));
            }
        }
    }

    links
}

fn player_url(link: ElementRef<'_>, base: &str) -> Option<String> {
    let href = link.value().attr("href")?;
    if is_p2p(href) {
        return None;
    }
    match link.value().attr("onclick") {
        // A handler without a recognizable path yields nothing.
        Some(onclick) => ONCLICK_PATH
            .captures(onclick)
            .map(|c| format!("{}{}", base.trim_end_matches('/'), &c[1])),
        None => Some(absolute(href, base)),
    }
}

fn is_p2p(href: &str) -> bool {
    href.contains("acestream:") || href.contains("sop:")
}

fn absolute(href: &str, base: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base.trim_end_matches('/'), href)
    }
}

fn push_unique(links: &mut Vec<String>, url: String) {
    if !links.contains(&url) {
        links.push(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://livetv.sx";

    #[test]
    fn test_broadcast_table_links() {
        let html = r##"
        <html><body>
        <table class="lnktbj broadcast">
          <tr><td class="live"><a href="/es/webplayer/1/">Player 1</a></td></tr>
          <tr><td class="live"><a href="acestream://abc">Ace</a></td></tr>
          <tr><td class="live"><a href="#" onclick="return cl(this, '/es/showvideo/22/')">JS</a></td></tr>
          <tr><td class="live"><a href="https://other.example/p">Ext</a></td></tr>
          <tr><td>no live cell</td></tr>
        </table>
        </body></html>
        "##;
        let links = extract_player_links(html, BASE);
        assert_eq!(
            links,
            vec![
                "https://livetv.sx/es/webplayer/1/",
                "https://livetv.sx/es/showvideo/22/",
                "https://other.example/p",
            ]
        );
    }

    #[test]
    fn test_fallback_scan() {
        let html = r#"
        <html><body>
          <a href="/es/showvideo/7/">a</a>
          <a href="/es/showvideo/7/">dup</a>
          <a href="/es/news/1/">news</a>
          <a href="https://livetv.sx/es/webplayer/8/">b</a>
        </body></html>
        "#;
        let links = extract_player_links(html, BASE);
        assert_eq!(
            links,
            vec!["https://livetv.sx/es/showvideo/7/", "https://livetv.sx/es/webplayer/8/"]
        );
    }

    #[test]
    fn test_no_links() {
        assert!(extract_player_links("<html><body><p>nothing</p></body></html>", BASE).is_empty());
    }

    #[test]
    fn test_load_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(
            &path,
            r#"[{"name":"Arsenal - Chelsea","time":"20:45","url":"https://livetv.sx/es/eventinfo/1/"}]"#,
        )
        .unwrap();
        let events = load_events(path.to_str().unwrap()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time, "20:45");
    }

    #[tokio::test]
    async fn test_scrape_with_unreachable_pages() {
        let events = vec![Event {
            name: "Nowhere".to_string(),
            time: "00:00".to_string(),
            url: "http://127.0.0.1:9/never".to_string(),
        }];
        let doc = scrape_events(events, BASE, 2).await.unwrap();
        assert!(doc.has_header());
        assert_eq!(doc.records().count(), 0);
    }
}
