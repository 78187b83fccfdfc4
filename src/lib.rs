pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::{Config, JobRequirements};
use crate::services::analyzer_service::{LanguageModel, OpenAiClient, ResumeAnalyzer};
use crate::services::application_service::ApplicationService;
use crate::services::calendar_service::{CalendarApi, HttpCalendarClient};
use crate::services::confirmation_service::ConfirmationService;
use crate::services::eligibility_service::EligibilityEvaluator;
use crate::services::email_service::{EmailSender, EmailService, HttpEmailGateway};
use crate::services::slot_service::SlotGenerator;
use crate::services::token_service::TokenService;
use crate::services::workflow_service::WorkflowEngine;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub applications: Arc<ApplicationService>,
    pub workflow: Arc<WorkflowEngine>,
    pub confirmations: Arc<ConfirmationService>,
}

impl AppState {
    /// Wires the production collaborators (OpenAI, email gateway, calendar
    /// API) over one shared HTTP client.
    pub fn new(config: Config) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        let model: Arc<dyn LanguageModel> = Arc::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            http_client.clone(),
        ));
        let email: Arc<dyn EmailSender> = Arc::new(HttpEmailGateway::new(
            config.email_gateway_url.clone(),
            config.email_gateway_token.clone(),
            http_client.clone(),
        ));
        let calendar: Arc<dyn CalendarApi> = Arc::new(HttpCalendarClient::new(
            config.calendar_api_url.clone(),
            config.calendar_api_token.clone(),
            http_client,
        ));

        Self::with_collaborators(config, model, email, calendar)
    }

    /// Assembly seam for tests: the same wiring with injected collaborator
    /// implementations.
    pub fn with_collaborators(
        config: Config,
        model: Arc<dyn LanguageModel>,
        email: Arc<dyn EmailSender>,
        calendar: Arc<dyn CalendarApi>,
    ) -> Self {
        let requirements = JobRequirements::from_config(&config);
        let tokens = TokenService::new(&config.jwt_secret);
        let applications = Arc::new(ApplicationService::new());

        let workflow = WorkflowEngine::new(
            ResumeAnalyzer::new(model),
            EligibilityEvaluator::new(requirements.clone()),
            SlotGenerator::default(),
            tokens.clone(),
            EmailService::new(email, config.email_from.clone()),
            applications.clone(),
            requirements,
            config.base_url.clone(),
        );

        let confirmations = ConfirmationService::new(tokens, calendar, applications.clone());

        Self {
            config: Arc::new(config),
            applications,
            workflow: Arc::new(workflow),
            confirmations: Arc::new(confirmations),
        }
    }
}
