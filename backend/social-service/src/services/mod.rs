pub mod analytics;
pub mod composer;
pub mod engagement;
pub mod feed;
pub mod profile;

pub use analytics::{AnalyticsService, AnalyticsView};
pub use composer::{ComposeDraft, ComposeOutcome, MediaFile, PostComposer};
pub use engagement::{EngagementOutcome, EngagementService};
pub use feed::FeedService;
pub use profile::{ProfileService, ProfileTab};
