use serde::{Deserialize, Serialize};

use crate::models::skill::{SkillMetadata, SkillRecord};

/// One submission from the profile flow, handed to the results flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    /// Snapshot of the profile at submission time.
    pub skills: Vec<SkillRecord>,
    pub description: String,
    pub top_k: u32,
}

/// A required skill as reported by the recommendation service.
/// Names and levels are free strings on this side of the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSkill {
    pub skill_name: String,
    pub level: String,
    pub months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// 1-based, assigned by the service. Never re-sorted.
    pub rank: u32,
    pub project_id: String,
    pub score: f64,
    pub description: String,
    pub required_skills: Vec<ProjectSkill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub employee_skills: Vec<SkillMetadata>,
    pub employee_description: String,
    pub project_skills: Vec<ProjectSkill>,
    pub project_description: String,
    pub score: f64,
}

impl AnalysisRequest {
    /// Pairs the submitted profile with one recommended project.
    pub fn for_recommendation(
        request: &RecommendationRequest,
        result: &RecommendationResult,
    ) -> Self {
        Self {
            employee_skills: request.skills.iter().map(SkillRecord::metadata).collect(),
            employee_description: request.description.clone(),
            project_skills: result.required_skills.clone(),
            project_description: result.description.clone(),
            score: result.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub fitness_evaluation: String,
    pub recommended_courses: String,
}
