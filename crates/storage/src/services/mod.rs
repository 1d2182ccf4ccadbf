pub mod personal_best;
pub mod time_format;
