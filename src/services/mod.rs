pub mod analyzer_service;
pub mod application_service;
pub mod calendar_service;
pub mod confirmation_service;
pub mod eligibility_service;
pub mod email_service;
pub mod slot_service;
pub mod token_service;
pub mod workflow_service;
