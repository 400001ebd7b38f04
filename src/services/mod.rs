/// Service layer: reaction ledger, feed assembly, post submission,
/// upload storage and the video-metadata probe.
pub mod feed;
pub mod media_store;
pub mod posts;
pub mod reactions;
pub mod video_probe;

pub use feed::{FeedItem, FeedService};
pub use media_store::MediaStore;
pub use posts::{NewPost, PostService};
pub use reactions::ReactionService;
pub use video_probe::{ProbeError, VideoProbe};
