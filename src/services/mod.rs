pub mod admin_service;
pub mod ai_service;
pub mod application_service;
pub mod backend_service;
pub mod company_service;
pub mod cv_service;
pub mod email_service;
pub mod external_jobs_service;
pub mod grading_service;
pub mod history_service;
pub mod job_service;
pub mod mock_data;
pub mod prompts;
pub mod quiz_parser;
pub mod report_service;
pub mod session_service;
pub mod student_service;
