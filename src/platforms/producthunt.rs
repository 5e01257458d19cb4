use reqwest::Url;
use scraper::ElementRef;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{
    error::CrawlError,
    models::{FetchedContent, Lead, PlatformId},
    platforms::{
        Extractor, Platform, last_segment, require_structure, resolve_href, search_url, text_of,
    },
};

const ORIGIN: &str = "https://www.producthunt.com";
const SEARCH_URL: &str = "https://www.producthunt.com/search";
const POST_SELECTOR: &str = r#"[class*="post"], [data-test="post"]"#;
const MAX_POSTS: usize = 20;
const FIXED_SCORE: i64 = 7;

/// Maker credited on one product card
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductMaker {
    pub name: String,
    pub username: String,
    pub profile_url: String,
    pub product_title: String,
}

pub fn score(_: &ProductMaker) -> i64 {
    FIXED_SCORE
}

/// Stable id derived from the maker's profile URL.
pub fn lead_id(profile_url: &str) -> String {
    let digest = hex::encode(Sha256::digest(profile_url.as_bytes()));
    format!("ph_{}", &digest[..16])
}

#[derive(Clone, Copy, Debug)]
pub struct ProductHunt;

impl ProductHunt {
    fn parse_post(&self, post: ElementRef) -> Option<ProductMaker> {
        let maker = post
            .select(sel!(r#"[class*="maker"], a[href*="/users/"]"#))
            .next()?;
        let profile_url = resolve_href(ORIGIN, maker.value().attr("href")?)?;

        let name = text_of(maker);
        let username = if name.is_empty() {
            last_segment(&profile_url)?.trim_start_matches('@').to_string()
        } else {
            name.clone()
        };
        if username.is_empty() {
            return None;
        }

        let product_title = post
            .select(sel!(r#"h3, [class*="title"]"#))
            .next()
            .map(text_of)
            .unwrap_or_default();

        Some(ProductMaker {
            name,
            username,
            profile_url,
            product_title,
        })
    }
}

impl Extractor for ProductHunt {
    type Raw = ProductMaker;

    fn extract(&self, content: &FetchedContent) -> Result<Vec<ProductMaker>, CrawlError> {
        let document = content.document();
        require_structure(self.id(), &document, POST_SELECTOR)?;

        let makers: Vec<ProductMaker> = document
            .select(sel!(POST_SELECTOR))
            .take(MAX_POSTS)
            .filter_map(|post| self.parse_post(post))
            .collect();

        log::info!("Found {} Product Hunt leads", makers.len());
        Ok(makers)
    }

    fn normalize(&self, maker: ProductMaker) -> Lead {
        let score = score(&maker);

        let mut lead = Lead::new(
            self.id(),
            lead_id(&maker.profile_url),
            maker.username,
            &maker.profile_url,
        );
        lead.name = maker.name;
        lead.social_links
            .insert("producthunt".to_string(), maker.profile_url);

        lead.metadata.extend([
            ("product_title".to_string(), Value::from(maker.product_title)),
            ("platform".to_string(), Value::from(self.id().key())),
        ]);

        lead.with_score(score)
    }
}

impl Platform for ProductHunt {
    fn id(&self) -> PlatformId {
        PlatformId::Producthunt
    }

    fn search_url(&self, keyword: &str, _: &[String]) -> Url {
        search_url(SEARCH_URL, &[("q", keyword)])
    }

    fn wait_selector(&self) -> Option<&'static str> {
        Some(POST_SELECTOR)
    }

    fn harvest(&self, content: &FetchedContent) -> Result<Vec<Lead>, CrawlError> {
        self.extract_leads(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(maker_href: &str, maker: &str, title: &str) -> String {
        format!(
            r#"<section data-test="post">
                <h3>{title}</h3>
                <a class="styles_maker" href="{maker_href}">{maker}</a>
            </section>"#
        )
    }

    fn page(cards: &[String]) -> FetchedContent {
        FetchedContent::Document(format!("<html><body>{}</body></html>", cards.join("")))
    }

    #[test]
    fn test_harvest() {
        let content = page(&[card("/@ada", "Ada Lovelace", "Engine")]);
        let leads = ProductHunt.harvest(&content).unwrap();
        assert_eq!(leads.len(), 1);

        let ada = &leads[0];
        assert_eq!(ada.name, "Ada Lovelace");
        assert_eq!(ada.username, "Ada Lovelace");
        assert_eq!(ada.profile_url, "https://www.producthunt.com/@ada");
        assert_eq!(ada.lead_score, 7);
        assert_eq!(ada.metadata["product_title"], "Engine");
        assert_eq!(ada.metadata["platform"], "producthunt");
        assert!(ada.lead_id.starts_with("ph_"));
    }

    #[test]
    fn test_lead_id_is_deterministic() {
        let a = lead_id("https://www.producthunt.com/@ada");
        assert_eq!(a, lead_id("https://www.producthunt.com/@ada"));
        assert_ne!(a, lead_id("https://www.producthunt.com/@bob"));
        assert_eq!(a.len(), "ph_".len() + 16);
    }

    #[test]
    fn test_username_falls_back_to_profile_handle() {
        let content = page(&[card("/@grace", "", "Compiler")]);
        let leads = ProductHunt.harvest(&content).unwrap();
        assert_eq!(leads[0].username, "grace");
        assert_eq!(leads[0].name, "");
    }

    #[test]
    fn test_skips_cards_without_maker_link() {
        let content = page(&[
            r#"<section data-test="post"><h3>No maker</h3></section>"#.to_string(),
            r#"<section data-test="post"><span class="maker-name">Anon</span></section>"#
                .to_string(),
            card("/users/linus", "Linus", "Kernel"),
        ]);
        let leads = ProductHunt.harvest(&content).unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].profile_url, "https://www.producthunt.com/users/linus");
    }

    #[test]
    fn test_missing_structure_is_timeout() {
        let content = FetchedContent::Document("<html><body></body></html>".to_string());
        assert!(matches!(
            ProductHunt.harvest(&content),
            Err(CrawlError::Timeout { platform: PlatformId::Producthunt, .. })
        ));
    }
}
