use crate::models::{PlatformId, SearchRequest};
use crate::platforms::lookup;

/// Expand platforms × keywords into search requests, platform-major.
///
/// Unknown platform identifiers are skipped. `locations` only narrows
/// platforms whose search API understands a location qualifier.
pub fn build_plan(
    platforms: &[String],
    keywords: &[String],
    locations: &[String],
) -> Vec<SearchRequest> {
    let mut plan = Vec::with_capacity(platforms.len() * keywords.len());

    for key in platforms {
        let Some(id) = PlatformId::from_key(key) else {
            log::debug!("Skipping unknown platform {:?}", key);
            continue;
        };
        let platform = lookup(id);

        for keyword in keywords {
            plan.push(SearchRequest::new(
                platform.search_url(keyword, locations),
                id,
                keyword.as_str(),
            ));
        }
        log::info!("Added {} URLs for {}", keywords.len(), id);
    }

    plan
}
