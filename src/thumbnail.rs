//! Thumbnail resolution and image fallback chains.
//!
//! Search results usually carry small thumbnails. [`resolve`] rewrites URLs
//! from CDNs we recognize to ask for a larger rendition, and picks a rotating
//! stock image when an article has no thumbnail at all.
//!
//! Because a rewritten URL may not exist, every card also gets an ordered
//! list of candidates ([`candidate_chain`]):
//!
//! 1. the resolved thumbnail (and the original, if it was rewritten)
//! 2. the secondary `thumbnail_small` field
//! 3. a logo for the article's domain
//! 4. a stock image matched on title keywords
//! 5. the static placeholder
//!
//! Candidates are tried strictly in order. [`first_loadable`] does this with
//! an [`ImageProbe`]; rendered markup does the same in the browser.

use crate::models::Article;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Rotating images for articles without a thumbnail, picked by `index % len`.
pub const FALLBACK_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1593941707882-a5bba14938c7?w=800&q=80",
    "https://images.unsplash.com/photo-1620714223084-8fcacc6dfd8d?w=800&q=80",
    "https://images.unsplash.com/photo-1581092160562-40aa08e78837?w=800&q=80",
    "https://images.unsplash.com/photo-1504384308090-c894fdcc538d?w=800&q=80",
    "https://images.unsplash.com/photo-1509391366360-2e959784a276?w=800&q=80",
];

const LOGO_SERVICE: &str = "https://logo.clearbit.com";
const TARGET_WIDTH: &str = "800";

/// Title keywords and the stock image shown for them. First match wins.
const KEYWORD_IMAGES: &[(&[&str], &str)] = &[
    (
        &["fire", "blaze", "explosion", "flames"],
        "https://images.unsplash.com/photo-1486551937199-baf066858de7?w=800&q=80",
    ),
    (
        &["recycl", "landfill", "waste"],
        "https://images.unsplash.com/photo-1532996122724-e3c354a0b15b?w=800&q=80",
    ),
    (
        &["e-bike", "ebike", "scooter", "electric vehicle", "ev "],
        "https://images.unsplash.com/photo-1571068316344-75bc76f77890?w=800&q=80",
    ),
    (
        &["solar", "grid", "storage", "energy"],
        "https://images.unsplash.com/photo-1509391366360-2e959784a276?w=800&q=80",
    ),
    (
        &["battery", "batteries", "lithium", "charging"],
        "https://images.unsplash.com/photo-1619641805634-b867f535071c?w=800&q=80",
    ),
];

/// A vendor-specific rewrite. Returns `None` when the URL is not the vendor's.
struct Rule {
    name: &'static str,
    apply: fn(&str) -> Option<String>,
}

const RULES: &[Rule] = &[
    Rule { name: "googleusercontent", apply: google_user_content },
    Rule { name: "ytimg", apply: youtube },
    Rule { name: "bbc", apply: bbc },
    Rule { name: "nytimes", apply: nytimes },
    Rule { name: "wordpress", apply: wordpress_uploads },
    Rule { name: "query-sized", apply: query_sized_cdn },
];

static GOOGLE_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://[a-z0-9.-]*googleusercontent\.com/[^=]+)=[swh]\d+[^/]*$").unwrap()
});
static YOUTUBE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://i\d?\.ytimg\.com/vi/[^/]+/)(?:default|mqdefault|sddefault)\.jpg").unwrap()
});
static BBC_WIDTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://ichef\.bbci\.co\.uk/(?:news|ace/standard|ace/ws|standard))/\d+/").unwrap()
});
static BBC_IC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://ichef\.bbci\.co\.uk/images/ic)/\d+x\d+/").unwrap());
static NYT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://static\d*\.nyt\.com/.+)-(?:thumbStandard|thumbLarge|articleInline|blog\d+|mediumThreeByTwo\d+)\.(jpg|png)")
        .unwrap()
});
static WP_UPLOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://.+/wp-content/uploads/.+?)-\d+x\d+(\.(?:jpe?g|png|webp|gif))(\?.*)?$").unwrap()
});

fn google_user_content(url: &str) -> Option<String> {
    let caps = GOOGLE_SIZE.captures(url)?;
    Some(format!("{}=w800-h450-p", &caps[1]))
}

fn youtube(url: &str) -> Option<String> {
    let caps = YOUTUBE.captures(url)?;
    Some(format!("{}hqdefault.jpg", &caps[1]))
}

fn bbc(url: &str) -> Option<String> {
    if let Some(caps) = BBC_WIDTH.captures(url) {
        return Some(BBC_WIDTH.replace(url, format!("{}/976/", &caps[1])).into_owned());
    }
    let caps = BBC_IC.captures(url)?;
    Some(BBC_IC.replace(url, format!("{}/976x549/", &caps[1])).into_owned())
}

fn nytimes(url: &str) -> Option<String> {
    let caps = NYT.captures(url)?;
    Some(NYT.replace(url, format!("{}-superJumbo.{}", &caps[1], &caps[2])).into_owned())
}

fn wordpress_uploads(url: &str) -> Option<String> {
    let caps = WP_UPLOAD.captures(url)?;
    Some(format!(
        "{}{}{}",
        &caps[1],
        &caps[2],
        caps.get(3).map(|m| m.as_str()).unwrap_or("")
    ))
}

/// imgix, Unsplash and Jetpack size images through query parameters.
fn query_sized_cdn(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let recognized = host.ends_with(".imgix.net")
        || host == "images.unsplash.com"
        || (host.ends_with(".wp.com") && host.starts_with('i'));
    if !recognized {
        return None;
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !matches!(k.as_ref(), "w" | "h" | "resize" | "fit"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut pairs = parsed.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("w", TARGET_WIDTH);
    }
    Some(parsed.to_string())
}

/// Upgrade a thumbnail URL, or pick a rotating fallback when there is none.
///
/// URLs that no rule recognizes are returned unchanged.
pub fn resolve(thumbnail: Option<&str>, index: usize) -> String {
    let Some(url) = thumbnail.map(str::trim).filter(|u| !u.is_empty()) else {
        return fallback_image(index).to_string();
    };

    for rule in RULES {
        if let Some(rewritten) = (rule.apply)(url) {
            debug!(rule = rule.name, from = url, to = %rewritten, "Rewrote thumbnail");
            return rewritten;
        }
    }
    url.to_string()
}

pub fn fallback_image(index: usize) -> &'static str {
    FALLBACK_IMAGES[index % FALLBACK_IMAGES.len()]
}

/// A logo for the domain of the article link.
pub fn logo_url(article: &Article) -> Option<String> {
    article
        .domain()
        .map(|domain| format!("{}/{}", LOGO_SERVICE, domain))
}

/// A stock image whose keywords appear in the article title.
pub fn keyword_image(title: &str) -> Option<&'static str> {
    let title = format!("{} ", title.to_lowercase());
    KEYWORD_IMAGES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
        .map(|(_, image)| *image)
}

/// Every image worth trying for the card at `index`, in order.
///
/// Always non-empty and always ends with `placeholder`.
pub fn candidate_chain(article: &Article, index: usize, placeholder: &str) -> Vec<String> {
    let original = article.thumbnail.as_deref().map(str::trim).filter(|u| !u.is_empty());

    let mut chain = vec![resolve(original, index)];
    chain.extend(original.map(str::to_string));
    chain.extend(
        article
            .thumbnail_small
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
    );
    chain.extend(logo_url(article));
    chain.extend(keyword_image(&article.title).map(str::to_string));
    chain.push(placeholder.to_string());

    chain.into_iter().unique().collect()
}

/// Something that can tell whether an image URL loads.
pub trait ImageProbe {
    async fn loads(&self, url: &str) -> bool;
}

/// Probes images with a `GET`, accepting 2xx responses with an `image/*` type.
#[derive(Debug, Clone)]
pub struct HttpImageProbe {
    client: Client,
    timeout: Duration,
}

impl HttpImageProbe {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(5),
        }
    }
}

impl ImageProbe for HttpImageProbe {
    #[instrument(level = "debug", skip(self))]
    async fn loads(&self, url: &str) -> bool {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Image request failed");
                return false;
            }
        };
        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("image/"));
        debug!(status = %response.status(), is_image, "Probed image");
        response.status().is_success() && is_image
    }
}

/// Try `candidates` in order and return the first one that loads.
///
/// Falls back to the last candidate (the placeholder) when none does.
pub async fn first_loadable<P: ImageProbe>(probe: &P, candidates: &[String]) -> Option<String> {
    for candidate in candidates {
        if probe.loads(candidate).await {
            return Some(candidate.clone());
        }
    }
    candidates.last().cloned()
}
