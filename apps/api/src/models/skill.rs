use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed catalog of skills a profile can list.
/// Serialized as the exact display strings the inference service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillName {
    Python,
    #[serde(rename = "AI and Machine learning")]
    AiAndMachineLearning,
    Git,
    MongoDB,
    #[serde(rename = "SQL")]
    Sql,
    Docker,
    Excel,
    Javascript,
    #[serde(rename = "Cloud Platform")]
    CloudPlatform,
}

impl SkillName {
    pub const ALL: [SkillName; 9] = [
        SkillName::Python,
        SkillName::AiAndMachineLearning,
        SkillName::Git,
        SkillName::MongoDB,
        SkillName::Sql,
        SkillName::Docker,
        SkillName::Excel,
        SkillName::Javascript,
        SkillName::CloudPlatform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillName::Python => "Python",
            SkillName::AiAndMachineLearning => "AI and Machine learning",
            SkillName::Git => "Git",
            SkillName::MongoDB => "MongoDB",
            SkillName::Sql => "SQL",
            SkillName::Docker => "Docker",
            SkillName::Excel => "Excel",
            SkillName::Javascript => "Javascript",
            SkillName::CloudPlatform => "Cloud Platform",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    Basic,
    CollegeResearch,
    Professional,
    Other,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Basic,
        SkillLevel::CollegeResearch,
        SkillLevel::Professional,
        SkillLevel::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Basic => "Basic",
            SkillLevel::CollegeResearch => "CollegeResearch",
            SkillLevel::Professional => "Professional",
            SkillLevel::Other => "Other",
        }
    }
}

/// A single skill on the user's profile. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: Uuid,
    pub skill_name: SkillName,
    pub level: SkillLevel,
    pub months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SkillRecord {
    pub fn metadata(&self) -> SkillMetadata {
        SkillMetadata {
            skill_name: self.skill_name,
            level: self.level,
            months: self.months,
        }
    }
}

/// Everything the user supplies for a new skill; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDraft {
    pub skill_name: SkillName,
    pub level: SkillLevel,
    pub months: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// The `{skill_name, level, months}` shape sent to the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillMetadata {
    pub skill_name: SkillName,
    pub level: SkillLevel,
    pub months: u32,
}
