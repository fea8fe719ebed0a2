//! Built-in sample articles shown when every network tier fails.

use crate::models::{Article, ArticleSource};

/// The fixed sample set, in display order.
pub fn sample_articles() -> Vec<Article> {
    vec![
        sample(
            "Firefighters Warn of Rising Lithium-Ion Battery Fires in Homes",
            "Fire departments report a sharp increase in residential fires linked to e-bikes, scooters and power tools.",
            "https://www.nfpa.org/news-blogs-and-articles",
            "NFPA",
            "2024-11-12",
        ),
        sample(
            "New Standards Target Thermal Runaway in Energy Storage Systems",
            "Updated safety codes require detection and suppression measures for large battery installations.",
            "https://www.ul.com/news",
            "UL Solutions",
            "2024-10-03",
        ),
        sample(
            "How to Safely Charge and Store E-Bike Batteries",
            "Experts recommend certified chargers, avoiding overnight charging and keeping batteries away from exits.",
            "https://www.cpsc.gov/Newsroom",
            "CPSC",
            "2024-09-18",
        ),
        sample(
            "Recycling Facilities Grapple With Battery-Related Fires",
            "Discarded lithium-ion cells are igniting in waste streams, prompting calls for dedicated collection points.",
            "https://www.epa.gov/newsreleases",
            "EPA",
            "2024-08-27",
        ),
    ]
}

fn sample(title: &str, snippet: &str, link: &str, source: &str, date: &str) -> Article {
    Article {
        title: title.to_string(),
        snippet: Some(snippet.to_string()),
        link: link.to_string(),
        source: Some(ArticleSource::Name(source.to_string())),
        date: Some(date.to_string()),
        thumbnail: None,
        thumbnail_small: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_articles_are_complete() {
        let articles = sample_articles();
        assert!(articles.len() >= 3);
        for article in &articles {
            assert!(!article.title.is_empty());
            assert!(url::Url::parse(&article.link).is_ok());
            assert!(article.source_name().is_some());
        }
    }
}
