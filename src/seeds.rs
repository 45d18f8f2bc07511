//! Builds the concept seed file from Wikipedia's vital-article categories.
//!
//! Walks `Category:Wikipedia_level-N_vital_articles` through the MediaWiki
//! `categorymembers` API. Subcategories are followed, talk pages are mapped
//! back to their article, and the resulting titles are written as a
//! single-column CSV that `ConceptPool::load` reads.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DaydreamError, Result};

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
/// Wikimedia's API etiquette requires an identifying User-Agent.
pub const DEFAULT_USER_AGENT: &str = "daydream-seeds/0.1 (https://github.com/daydream/daydream)";

const NS_ARTICLE: i64 = 0;
const NS_TALK: i64 = 1;
const NS_CATEGORY: i64 = 14;
const TALK_PREFIX: &str = "Talk:";

pub fn vital_category(level: u8) -> String {
    format!("Category:Wikipedia_level-{}_vital_articles", level)
}

#[derive(Debug, Deserialize)]
pub struct MembersPage {
    #[serde(default)]
    pub query: Option<MembersQuery>,
    #[serde(default, rename = "continue")]
    pub cont: Option<Continuation>,
}

#[derive(Debug, Deserialize)]
pub struct MembersQuery {
    #[serde(default)]
    pub categorymembers: Vec<Member>,
}

#[derive(Debug, Deserialize)]
pub struct Member {
    pub ns: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct Continuation {
    pub cmcontinue: Option<String>,
}

/// What one page of category members contributes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Members {
    pub titles: Vec<String>,
    pub subcategories: Vec<String>,
    pub next: Option<String>,
}

/// Sort one API page into article titles, subcategories to visit and the
/// continuation token. Other namespaces are ignored.
pub fn collect_members(page: MembersPage) -> Members {
    let mut out = Members {
        next: page.cont.and_then(|c| c.cmcontinue).filter(|c| !c.is_empty()),
        ..Members::default()
    };
    for member in page.query.map(|q| q.categorymembers).unwrap_or_default() {
        match member.ns {
            NS_CATEGORY => out.subcategories.push(member.title),
            NS_TALK => {
                let title = member
                    .title
                    .strip_prefix(TALK_PREFIX)
                    .map(str::to_string)
                    .unwrap_or(member.title);
                out.titles.push(title);
            }
            NS_ARTICLE => out.titles.push(member.title),
            _ => {}
        }
    }
    out
}

pub struct SeedFetcher {
    client: reqwest::Client,
    api_url: String,
}

impl SeedFetcher {
    pub fn new(api_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| DaydreamError::config(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    async fn members_page(&self, category: &str, cont: Option<&str>) -> Result<MembersPage> {
        let mut params = vec![
            ("action", "query"),
            ("format", "json"),
            ("list", "categorymembers"),
            ("cmtitle", category),
            ("cmlimit", "500"),
            ("cmtype", "page|subcat"),
        ];
        if let Some(c) = cont {
            params.push(("cmcontinue", c));
        }
        let resp = self.client.get(&self.api_url).query(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DaydreamError::provider(format!(
                "categorymembers for {} failed ({}): {}",
                category, status, body
            )));
        }
        Ok(resp.json().await?)
    }

    /// Every title reachable from `root`. Each category is visited once, so
    /// cycles in the category graph terminate.
    pub async fn walk(&self, root: &str, titles: &mut BTreeSet<String>) -> Result<usize> {
        let mut queue = VecDeque::from([root.to_string()]);
        let mut visited: HashSet<String> = HashSet::new();
        let before = titles.len();

        while let Some(category) = queue.pop_front() {
            if !visited.insert(category.clone()) {
                continue;
            }
            let mut cont: Option<String> = None;
            loop {
                let page = self.members_page(&category, cont.as_deref()).await?;
                let members = collect_members(page);
                debug!(
                    category = %category,
                    titles = members.titles.len(),
                    subcategories = members.subcategories.len(),
                    "Fetched category page"
                );
                titles.extend(members.titles);
                queue.extend(
                    members
                        .subcategories
                        .into_iter()
                        .filter(|c| !visited.contains(c)),
                );
                match members.next {
                    Some(next) => cont = Some(next),
                    None => break,
                }
            }
        }

        info!(root, categories = visited.len(), "Walked category tree");
        Ok(titles.len() - before)
    }

    pub async fn fetch_levels(&self, levels: &[u8]) -> Result<BTreeSet<String>> {
        let mut titles = BTreeSet::new();
        for &level in levels {
            let added = self.walk(&vital_category(level), &mut titles).await?;
            info!(level, added, total = titles.len(), "Fetched vital articles");
        }
        Ok(titles)
    }
}

/// One title per row, quoted by the csv writer when needed.
pub fn write_seed_csv<'a, W: Write>(
    writer: W,
    titles: impl IntoIterator<Item = &'a String>,
) -> Result<usize> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    let mut count = 0;
    for title in titles {
        out.write_record([title.as_str()])?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

pub fn write_seed_file(path: impl AsRef<Path>, titles: &BTreeSet<String>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_seed_csv(file, titles)
}
