use crate::config::JobRequirements;
use crate::models::application::ResumeAnalysis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityDecision {
    pub should_interview: bool,
    pub reasons: Vec<String>,
}

/// Applies the job-requirement rules to an analysis. Pure and deterministic:
/// identical inputs always produce identical decisions.
#[derive(Clone)]
pub struct EligibilityEvaluator {
    requirements: JobRequirements,
}

impl EligibilityEvaluator {
    pub fn new(requirements: JobRequirements) -> Self {
        Self { requirements }
    }

    /// Rules, in order: an empty skill set always rejects; the overall score
    /// must meet the threshold (inclusive); at least `min_must_have_count`
    /// must-have skills have to be present (minimum-overlap policy, not
    /// all-or-nothing); an education score, when computed, has its own bar.
    pub fn evaluate(&self, analysis: &ResumeAnalysis) -> EligibilityDecision {
        let req = &self.requirements;
        let mut reasons = Vec::new();
        let mut rejected = false;

        if analysis.skills.is_empty() {
            rejected = true;
            reasons.push("no skills were extracted from the resume".to_string());
        }

        if analysis.score < req.min_score_threshold {
            rejected = true;
            reasons.push(format!(
                "overall score {:.2} is below the minimum threshold {:.2}",
                analysis.score, req.min_score_threshold
            ));
        } else {
            reasons.push(format!(
                "overall score {:.2} meets the minimum threshold {:.2}",
                analysis.score, req.min_score_threshold
            ));
        }

        let matched = matched_must_haves(&analysis.skills, &req.must_have_skills);
        if matched.len() < req.min_must_have_count {
            rejected = true;
            reasons.push(format!(
                "only {} of {} must-have skills present (minimum {})",
                matched.len(),
                req.must_have_skills.len(),
                req.min_must_have_count
            ));
        } else {
            reasons.push(format!("must-have skills matched: {}", matched.join(", ")));
        }

        if let Some(education_score) = analysis.education_score {
            if education_score < req.education_threshold {
                rejected = true;
                reasons.push(format!(
                    "education score {:.2} is below the threshold {:.2}",
                    education_score, req.education_threshold
                ));
            }
        }

        EligibilityDecision {
            should_interview: !rejected,
            reasons,
        }
    }
}

fn matched_must_haves(skills: &[String], must_have: &[String]) -> Vec<String> {
    must_have
        .iter()
        .filter(|required| {
            skills
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(required.trim()))
        })
        .cloned()
        .collect()
}
