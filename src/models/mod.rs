pub mod content;
pub mod lead;
pub mod platform;
pub mod request;

pub use content::FetchedContent;
pub use lead::{Lead, ScrapedLead};
pub use platform::PlatformId;
pub use request::SearchRequest;
