pub mod athlete_record;
pub mod gender;
pub mod segment;

pub use athlete_record::{AthleteRecord, NewAthleteRecord, RecordTiming};
pub use gender::Gender;
pub use segment::Segment;
