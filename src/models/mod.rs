pub mod announcement;
pub mod application;
pub mod company;
pub mod cv;
pub mod external_job;
pub mod job;
pub mod question;
pub mod stats;
pub mod submission;
pub mod test_history;
