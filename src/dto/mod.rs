pub mod admin_dto;
pub mod application_dto;
pub mod aptitude_dto;
pub mod cv_dto;
pub mod envelope;
pub mod job_dto;
