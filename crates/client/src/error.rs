use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server could not be reached at all.
    #[error("Failed to fetch")]
    Network(#[source] reqwest::Error),

    #[error("Failed to fetch leaderboard")]
    LeaderboardUnavailable,

    /// Message returned by the server, shown as is.
    #[error("{0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Network(error)
        }
    }
}
