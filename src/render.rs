//! HTML rendering of article cards.
//!
//! Markup is built as strings with `write!`, one card per article, and
//! mounted into a single container element. Every interpolated value goes
//! through [`escape_html`].
//!
//! # Card layout
//!
//! ```text
//! div.news-card
//! ├── div > img            (thumbnail, with fallback chain)
//! └── div
//!     ├── span.news-source + span.news-date
//!     ├── h3.news-title
//!     ├── p.news-snippet
//!     └── a.news-link      ("Read Article")
//! ```

use crate::models::{Article, Tier};
use crate::query::live_search_url;
use crate::thumbnail::candidate_chain;
use crate::utils::{escape_html, parse_date};
use std::fmt::Write;

pub const DEFAULT_SNIPPET: &str = "Click to read more about this article.";
pub const DEFAULT_SOURCE: &str = "News Source";
pub const UNKNOWN_DATE: &str = "Recent";
pub const NO_RESULTS_MESSAGE: &str = "No news articles found. Please try again later.";

const CONTAINER_CLASS: &str = "grid md:grid-cols-3 gap-8";
const CARD_CLASS: &str = "news-card bg-dark rounded-xl overflow-hidden shadow-lg hover:scale-105 transition duration-500 border border-slate-800";

/// Advance to the next URL in `data-fallbacks` each time the image fails.
const IMAGE_ONERROR: &str = "var f=JSON.parse(this.dataset.fallbacks||'[]');if(f.length){this.dataset.fallbacks=JSON.stringify(f.slice(1));this.src=f[0];}else{this.onerror=null;}";

/// Format a free-form date as `Jan 5, 2025`, or `"Recent"` if it can't be parsed.
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Render a single card. `images` is the ordered candidate list; the first
/// entry is the initial `src`, the rest are tried on load failure.
pub fn render_card(article: &Article, images: &[String]) -> String {
    let (src, fallbacks) = match images.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => ("", &[][..]),
    };
    let fallbacks = serde_json::to_string(fallbacks).unwrap_or_else(|_| "[]".to_string());
    let snippet = article
        .snippet
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SNIPPET);
    let source = article.source_name().unwrap_or(DEFAULT_SOURCE);

    let mut html = String::new();
    writeln!(html, r#"<div class="{}">"#, CARD_CLASS).unwrap();
    writeln!(html, r#"  <div class="h-48 overflow-hidden">"#).unwrap();
    writeln!(
        html,
        r#"    <img src="{}" alt="{}" data-fallbacks="{}" onerror="{}" class="w-full h-full object-cover" loading="lazy">"#,
        escape_html(src),
        escape_html(&article.title),
        escape_html(&fallbacks),
        IMAGE_ONERROR
    )
    .unwrap();
    writeln!(html, "  </div>").unwrap();
    writeln!(html, r#"  <div class="p-6">"#).unwrap();
    writeln!(html, r#"    <div class="flex items-center mb-2">"#).unwrap();
    writeln!(
        html,
        r#"      <span class="news-source bg-primary/10 text-primary text-xs px-3 py-1 rounded-full">{}</span>"#,
        escape_html(source)
    )
    .unwrap();
    writeln!(
        html,
        r#"      <span class="news-date text-slate-500 text-xs ml-2">{}</span>"#,
        escape_html(&format_date(article.date.as_deref()))
    )
    .unwrap();
    writeln!(html, "    </div>").unwrap();
    writeln!(
        html,
        r#"    <h3 class="news-title text-xl font-bold mb-3 line-clamp-2">{}</h3>"#,
        escape_html(&article.title)
    )
    .unwrap();
    writeln!(
        html,
        r#"    <p class="news-snippet text-slate-400 mb-4 text-sm line-clamp-3">{}</p>"#,
        escape_html(snippet)
    )
    .unwrap();
    writeln!(
        html,
        r#"    <a class="news-link text-primary inline-flex items-center text-sm font-medium" href="{}" target="_blank" rel="noopener noreferrer">"#,
        escape_html(safe_href(&article.link))
    )
    .unwrap();
    writeln!(html, r#"      Read Article <i class="fas fa-arrow-right ml-2"></i>"#).unwrap();
    writeln!(html, "    </a>").unwrap();
    writeln!(html, "  </div>").unwrap();
    writeln!(html, "</div>").unwrap();
    html
}

/// The article link if it is an absolute `http(s)` URL, otherwise `"#"`.
fn safe_href(link: &str) -> &str {
    match url::Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => link,
        _ => "#",
    }
}

/// Build the image candidate list for every article, by position.
pub fn image_chains(articles: &[Article], placeholder: &str) -> Vec<Vec<String>> {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| candidate_chain(article, i, placeholder))
        .collect()
}

/// Render the container with one card per article, in order.
///
/// An empty list renders the "no articles found" message instead.
pub fn render_container(articles: &[Article], placeholder: &str, tier: Tier) -> String {
    render_container_with_images(articles, &image_chains(articles, placeholder), tier)
}

/// Like [`render_container`], with image candidates supplied by the caller.
///
/// `images[i]` belongs to `articles[i]`; a missing entry renders an empty `src`.
pub fn render_container_with_images(articles: &[Article], images: &[Vec<String>], tier: Tier) -> String {
    let mut html = String::new();
    writeln!(
        html,
        r#"<div id="news-container" class="{}" data-source="{}">"#,
        CONTAINER_CLASS, tier
    )
    .unwrap();

    if articles.is_empty() {
        html.push_str(&render_message(NO_RESULTS_MESSAGE));
    } else {
        for (i, article) in articles.iter().enumerate() {
            let chain = images.get(i).map(Vec::as_slice).unwrap_or(&[]);
            html.push_str(&render_card(article, chain));
        }
    }

    writeln!(html, "</div>").unwrap();
    html
}

/// A full-width message in place of the cards.
pub fn render_message(message: &str) -> String {
    format!(
        "<div class=\"news-message col-span-3 text-center py-8 text-slate-400\">{}</div>\n",
        escape_html(message)
    )
}

/// The "view all" link, pointing at the live results page for `term`.
pub fn render_view_all_link(term: &str) -> String {
    format!(
        "<a id=\"view-all-news\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"text-primary font-medium\">View all news <i class=\"fas fa-arrow-right ml-2\"></i></a>\n",
        escape_html(&live_search_url(term))
    )
}

/// Render a complete HTML document around an already rendered container.
pub fn render_page(term: &str, container: &str) -> String {
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>").unwrap();
    writeln!(html, r#"<html lang="en">"#).unwrap();
    writeln!(html, "<head>").unwrap();
    writeln!(html, r#"  <meta charset="utf-8">"#).unwrap();
    writeln!(html, r#"  <meta name="viewport" content="width=device-width, initial-scale=1">"#).unwrap();
    writeln!(html, "  <title>{} | Industry News</title>", escape_html(term)).unwrap();
    writeln!(html, "</head>").unwrap();
    writeln!(html, "<body>").unwrap();
    writeln!(html, r#"<section id="news" class="py-20 bg-darker">"#).unwrap();
    writeln!(html, r#"  <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">"#).unwrap();
    writeln!(html, r#"    <div class="text-center mb-16">"#).unwrap();
    writeln!(html, r#"      <span class="text-primary font-medium">LATEST UPDATES</span>"#).unwrap();
    writeln!(html, r#"      <h2 class="text-4xl font-bold mt-2">Industry News &amp; Insights</h2>"#).unwrap();
    writeln!(html, "    </div>").unwrap();
    html.push_str(container);
    writeln!(html, r#"    <div class="text-center mt-12">"#).unwrap();
    html.push_str(&render_view_all_link(term));
    writeln!(html, "    </div>").unwrap();
    writeln!(html, "  </div>").unwrap();
    writeln!(html, "</section>").unwrap();
    writeln!(html, "</body>").unwrap();
    writeln!(html, "</html>").unwrap();
    html
}
