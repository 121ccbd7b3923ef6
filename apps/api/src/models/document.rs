use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::section::SectionList;
use crate::models::{new_item_id, List};
use crate::record_node;

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

record_node!(PersonalInfo {
    "fullName" => full_name,
    "email" => email,
    "phone" => phone,
    "location" => location,
    "title" => title,
    "summary" => summary,
    "photo" => photo,
    "linkedin" => linkedin,
    "github" => github,
    "portfolio" => portfolio,
    "twitter" => twitter,
    "website" => website,
});

// ────────────────────────────────────────────────────────────────────────────
// Fixed-shape lists
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
}

record_node!(Experience {
    "id" => id,
    "company" => company,
    "position" => position,
    "location" => location,
    "startDate" => start_date,
    "endDate" => end_date,
    "current" => current,
    "description" => description,
    "bulletPoints" => bullet_points,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(default)]
    pub honors: Vec<String>,
    #[serde(default)]
    pub coursework: Vec<String>,
}

record_node!(Education {
    "id" => id,
    "school" => school,
    "degree" => degree,
    "field" => field,
    "location" => location,
    "startDate" => start_date,
    "endDate" => end_date,
    "gpa" => gpa,
    "honors" => honors,
    "coursework" => coursework,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// 1–10 for rating bars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

record_node!(Skill {
    "id" => id,
    "name" => name,
    "level" => level,
    "category" => category,
});

/// Legacy free-text section, kept for documents written before `dynamicSections`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSection {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub items: Vec<String>,
}

record_node!(CustomSection {
    "id" => id,
    "title" => title,
    "content" => content,
    "items" => items,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// e.g. "150% of target".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
}

record_node!(Achievement {
    "id" => id,
    "title" => title,
    "description" => description,
    "date" => date,
    "metric" => metric,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strength {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

record_node!(Strength {
    "id" => id,
    "title" => title,
    "description" => description,
    "icon" => icon,
});

// ────────────────────────────────────────────────────────────────────────────
// Root
// ────────────────────────────────────────────────────────────────────────────

/// The resume being edited. This exact shape is what the store saves and loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub personal_info: Arc<PersonalInfo>,
    #[serde(default = "default_true")]
    pub include_social_links: bool,
    #[serde(default)]
    pub experience: List<Experience>,
    #[serde(default)]
    pub education: List<Education>,
    #[serde(default)]
    pub skills: List<Skill>,
    #[serde(default)]
    pub sections: List<CustomSection>,
    #[serde(default)]
    pub dynamic_sections: SectionList,
    #[serde(default)]
    pub achievements: List<Achievement>,
    #[serde(default)]
    pub strengths: List<Strength>,
}

fn default_true() -> bool {
    true
}

impl Default for Document {
    fn default() -> Self {
        Self {
            personal_info: Arc::default(),
            include_social_links: true,
            experience: Arc::default(),
            education: Arc::default(),
            skills: Arc::default(),
            sections: Arc::default(),
            dynamic_sections: SectionList::default(),
            achievements: Arc::default(),
            strengths: Arc::default(),
        }
    }
}

record_node!(Document {
    "personalInfo" => personal_info,
    "includeSocialLinks" => include_social_links,
    "experience" => experience,
    "education" => education,
    "skills" => skills,
    "sections" => sections,
    "dynamicSections" => dynamic_sections,
    "achievements" => achievements,
    "strengths" => strengths,
});

impl Document {
    /// True when every top-level subtree of `other` is the very same allocation as
    /// in `self`, i.e. an edit produced no new nodes.
    pub fn shares_all(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.personal_info, &other.personal_info)
            && self.include_social_links == other.include_social_links
            && Arc::ptr_eq(&self.experience, &other.experience)
            && Arc::ptr_eq(&self.education, &other.education)
            && Arc::ptr_eq(&self.skills, &other.skills)
            && Arc::ptr_eq(&self.sections, &other.sections)
            && self.dynamic_sections.ptr_eq(&other.dynamic_sections)
            && Arc::ptr_eq(&self.achievements, &other.achievements)
            && Arc::ptr_eq(&self.strengths, &other.strengths)
    }
}
