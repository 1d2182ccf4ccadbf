pub mod api;
pub mod error;
pub mod poller;
pub mod seed;
pub mod view;

pub use api::{LeaderboardClient, LeaderboardSource, Submission};
pub use error::{ClientError, Result};
pub use poller::Poller;
pub use view::{LeaderboardView, StatusKind, StatusMessage};
