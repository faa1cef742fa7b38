pub mod clock;
pub mod day;
pub mod upload;
