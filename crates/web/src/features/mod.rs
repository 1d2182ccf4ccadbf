pub mod leaderboard;
pub mod submissions;
