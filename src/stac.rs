use std::{path::PathBuf, time::Duration};

use reqwest::{
    blocking::{Client, Response},
    StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    archive::{resolve_local, SceneArchive},
    error::{Result, S1ArchError},
    filter::{FilterExpr, SearchFilter},
    retry::RetryPolicy,
};

const PAGE_LIMIT: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Scenes registered in a STAC API catalog whose assets point to local `.SAFE` directories.
#[derive(Debug)]
pub struct StacArchive {
    url: String,
    collections: Vec<String>,
    retry: RetryPolicy,
    client: Option<Client>,
}

#[derive(Debug, Deserialize)]
struct ItemCollection {
    #[serde(default)]
    features: Vec<Item>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: String,
    #[serde(default)]
    assets: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Link {
    rel: String,
    href: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
enum PageRequest {
    Get(String),
    Post(String, Value),
}

impl StacArchive {
    pub fn open(url: &str, collections: Vec<String>) -> Result<Self> {
        Self::open_with_policy(url, collections, RetryPolicy::default())
    }

    pub fn open_with_policy(url: &str, collections: Vec<String>, retry: RetryPolicy) -> Result<Self> {
        if collections.is_empty() {
            return Err(S1ArchError::Config(
                "at least one STAC collection is required".into(),
            ));
        }

        let url = url.trim_end_matches('/').to_owned();
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        retry.run("opening the catalog", || {
            let resp = client.get(&url).send().map_err(transport_error)?;
            check_status(resp).map(|_| ())
        })?;
        log::info!("Connected to catalog at: {} {:?}", url, collections);

        Ok(StacArchive {
            url,
            collections,
            retry,
            client: Some(client),
        })
    }

    fn search_body(&self, filter: &SearchFilter) -> Result<Value> {
        let expr = FilterExpr::build(filter)?;
        Ok(json!({
            "collections": self.collections,
            "filter": expr.to_cql2(),
            "filter-lang": "cql2-json",
            "limit": PAGE_LIMIT,
        }))
    }

    fn fetch_page(&self, client: &Client, request: &PageRequest) -> Result<ItemCollection> {
        let resp = match request {
            PageRequest::Get(url) => client.get(url).send(),
            PageRequest::Post(url, body) => client.post(url).json(body).send(),
        }
        .map_err(transport_error)?;

        let page = check_status(resp)?.json::<ItemCollection>().map_err(transport_error)?;
        Ok(page)
    }
}

impl SceneArchive for StacArchive {
    fn select(&self, filter: &SearchFilter) -> Result<Vec<PathBuf>> {
        let client = self.client.as_ref().ok_or(S1ArchError::ArchiveClosed)?;

        let mut request = PageRequest::Post(format!("{}/search", self.url), self.search_body(filter)?);
        let mut items: Vec<Item> = vec![];
        loop {
            let page = self
                .retry
                .run("searching the catalog", || self.fetch_page(client, &request))?;
            items.extend(page.features);

            match next_request(&page.links, &request) {
                Some(next) => request = next,
                None => break,
            }
        }
        log::debug!("Catalog search returned {} items", items.len());

        let locations = items
            .iter()
            .map(scene_location)
            .collect::<Result<Vec<_>>>()?;
        resolve_local(locations, filter.check_exist)
    }

    fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            log::info!("Closed catalog connection to {}", self.url);
        }
        Ok(())
    }
}

impl Drop for StacArchive {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("Error closing catalog connection: {}", err);
        }
    }
}

fn transport_error(err: reqwest::Error) -> S1ArchError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        S1ArchError::TransientCatalog(err.to_string())
    } else {
        S1ArchError::Http(err)
    }
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else if is_transient_status(status) {
        Err(S1ArchError::TransientCatalog(format!(
            "{} from {}",
            status,
            resp.url()
        )))
    } else {
        let url = resp.url().to_string();
        let message = resp.text().unwrap_or_default();
        Err(S1ArchError::Catalog {
            status: status.as_u16(),
            message: format!("{} : {}", url, message),
        })
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// The request for the page after `current`, if any. A `next` link that repeats the
/// current request ends the search.
fn next_request(links: &[Link], current: &PageRequest) -> Option<PageRequest> {
    let link = links.iter().find(|l| l.rel == "next")?;
    let is_post = link
        .method
        .as_deref()
        .map(|m| m.eq_ignore_ascii_case("POST"))
        .unwrap_or(false);

    let next = if is_post {
        let body = match (&link.body, current) {
            (Some(body), _) => body.clone(),
            (None, PageRequest::Post(_, body)) => body.clone(),
            (None, PageRequest::Get(_)) => Value::Null,
        };
        PageRequest::Post(link.href.clone(), body)
    } else {
        PageRequest::Get(link.href.clone())
    };

    if &next == current {
        log::warn!("Catalog repeats the current page as next page: {}", link.href);
        return None;
    }
    Some(next)
}

// the first asset of an item references a file inside the scene directory
fn scene_location(item: &Item) -> Result<PathBuf> {
    let href = item
        .assets
        .values()
        .next()
        .and_then(|asset| asset.get("href"))
        .and_then(|href| href.as_str())
        .ok_or_else(|| S1ArchError::InvalidSceneName {
            name: item.id.clone(),
            reason: "catalog item without asset href",
        })?;
    href_to_path(href)
}

fn href_to_path(href: &str) -> Result<PathBuf> {
    let end = href.find(".SAFE").ok_or_else(|| S1ArchError::InvalidSceneName {
        name: href.to_owned(),
        reason: "asset does not reference a .SAFE directory",
    })? + ".SAFE".len();

    let path = &href[..end];
    Ok(PathBuf::from(path.strip_prefix("file://").unwrap_or(path)))
}
