pub mod browser;
pub mod consent;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod orchestrator;
pub mod persist;
pub mod registry;
pub mod relevance;
pub mod settings;

pub use browser::chromium::ChromiumBrowser;
pub use browser::{Browser, PageSession, SessionOptions};
pub use consent::{dismiss_consent, ConsentOutcome};
pub use error::{ScraperError, SearchError};
pub use extract::extract_listings;
pub use normalize::normalize_price;
pub use orchestrator::SearchService;
pub use persist::{spawn_persist_worker, ChannelPersist, PersistQueue};
pub use registry::{PlatformRegistry, PlatformScraper, ProfileScraper};
pub use relevance::{query_words, RelevanceFilter};
pub use settings::{ExtractionSettings, ScrapeTimeouts};
