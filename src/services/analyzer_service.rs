use crate::config::JobRequirements;
use crate::error::{Error, Result};
use crate::models::application::ResumeAnalysis;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Port for the language-understanding collaborator. Takes a system and a
/// user prompt, returns the model's JSON object.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete_json(&self, system: &str, user: &str) -> anyhow::Result<JsonValue>;
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, client: Client) -> Self {
        Self { client, api_key }
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete_json(&self, system: &str, user: &str) -> anyhow::Result<JsonValue> {
        let payload = serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.2
        });

        let res = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API Error {}: {}", status, text));
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response format"))
    }
}

/// Turns extracted resume text into a structured analysis with a score in
/// [0, 1]. Collaborator failure is terminal for the application; no default
/// score is ever substituted.
#[derive(Clone)]
pub struct ResumeAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl ResumeAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn analyze(
        &self,
        resume_text: &str,
        cover_letter_text: Option<&str>,
        requirements: &JobRequirements,
    ) -> Result<ResumeAnalysis> {
        let system_prompt = r#"You are a Critical and Unbiased Senior HR Specialist.
Analyze the candidate's resume against the position requirements.

Rules:
1. BE STRICT. Score reflects how well the professional background fits the requirements.
2. Extract only skills that are actually evidenced in the resume text.
3. Summarize education and experience in one or two sentences each.

Return JSON:
{
  "skills": ["skill", ...],
  "education": "<summary>",
  "experience": "<summary>",
  "score": <0.0-1.0>,
  "education_score": <0.0-1.0>,
  "cover_letter_score": <0.0-1.0, only when a cover letter is provided>
}"#;

        let user_content = serde_json::json!({
            "requirements": {
                "must_have_skills": requirements.must_have_skills,
                "preferred_skills": requirements.preferred_skills,
                "min_experience": requirements.min_experience,
            },
            "resume": resume_text,
            "cover_letter": cover_letter_text,
        });

        let user = serde_json::to_string(&user_content)?;

        let raw = self
            .model
            .complete_json(system_prompt, &user)
            .await
            .map_err(|e| {
                tracing::error!("Resume analysis call failed: {:?}", e);
                Error::AnalysisFailed(e.to_string())
            })?;

        let mut analysis: ResumeAnalysis = serde_json::from_value(raw)
            .map_err(|e| Error::AnalysisFailed(format!("malformed analysis payload: {}", e)))?;

        analysis.score = analysis.score.clamp(0.0, 1.0);
        analysis.education_score = analysis.education_score.map(|s| s.clamp(0.0, 1.0));
        analysis.cover_letter_score = analysis.cover_letter_score.map(|s| s.clamp(0.0, 1.0));
        if cover_letter_text.is_none() {
            analysis.cover_letter_score = None;
        }

        tracing::info!(
            score = analysis.score,
            skills = analysis.skills.len(),
            "resume analysis complete"
        );
        Ok(analysis)
    }
}
