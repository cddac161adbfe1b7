use serde::{Deserialize, Serialize};

use crate::core::error::{FxError, FxResult};

/// One orb in the skill universe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub category: String,
    /// Proficiency 0..=100; drives orb size and glow.
    #[serde(default = "default_level")]
    pub level: u8,
}

fn default_level() -> u8 {
    50
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillCatalog {
    skills: Vec<Skill>,
    categories: Vec<String>,
}

impl SkillCatalog {
    pub fn from_json(json: &str) -> FxResult<Self> {
        let skills: Vec<Skill> =
            serde_json::from_str(json).map_err(|e| FxError::InvalidSkillData(e.to_string()))?;
        Self::new(skills)
    }

    pub fn new(skills: Vec<Skill>) -> FxResult<Self> {
        let mut categories: Vec<String> = Vec::new();
        for skill in &skills {
            if skill.name.trim().is_empty() {
                return Err(FxError::InvalidSkillData("skill name is empty".into()));
            }
            if skill.level > 100 {
                return Err(FxError::InvalidSkillData(format!(
                    "{}: level {} is above 100",
                    skill.name, skill.level
                )));
            }
            if !categories.iter().any(|c| c == &skill.category) {
                categories.push(skill.category.clone());
            }
        }
        Ok(Self { skills, categories })
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Categories in first-seen order; index = orbit ring.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn category_index(&self, category: &str) -> usize {
        self.categories.iter().position(|c| c == category).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
