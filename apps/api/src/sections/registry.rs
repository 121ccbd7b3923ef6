//! Section registry: one table entry per section tag.
//!
//! The table answers everything the editor needs to know about a tag: its
//! palette label, whether it may appear more than once, how to build a fresh
//! section, and what a freshly added item looks like. Renderers go through
//! [`dispatch`], the only place that matches on the section payload.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::new_item_id;
use crate::models::section::{
    Award, Certification, CustomItem, Language, Patent, PortfolioLink, Project, Publication,
    Section, SectionData, SectionList, SectionType, Speaking, Volunteer,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSpec {
    #[serde(rename = "type")]
    pub tag: SectionType,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// Only `custom` may be added more than once.
    pub repeatable: bool,
    #[serde(skip)]
    default_item: fn(&str) -> Value,
}

pub static REGISTRY: [SectionSpec; 10] = [
    SectionSpec {
        tag: SectionType::Certifications,
        title: "Certifications",
        icon: "🏅",
        description: "Professional certifications and licenses",
        repeatable: false,
        default_item: |month| {
            json!({
                "name": "Certification Name",
                "issuer": "Issuing Organization",
                "date": month,
            })
        },
    },
    SectionSpec {
        tag: SectionType::Languages,
        title: "Languages",
        icon: "🌐",
        description: "Spoken languages and proficiency",
        repeatable: false,
        default_item: |_| json!({ "language": "Language", "proficiency": "Intermediate" }),
    },
    SectionSpec {
        tag: SectionType::Projects,
        title: "Projects",
        icon: "🚀",
        description: "Personal, open-source or academic projects",
        repeatable: false,
        default_item: |_| {
            json!({
                "name": "Project Name",
                "description": "Project description",
                "techStack": [],
            })
        },
    },
    SectionSpec {
        tag: SectionType::Awards,
        title: "Awards & Honors",
        icon: "🏆",
        description: "Recognition, prizes and honors",
        repeatable: false,
        default_item: |month| {
            json!({
                "title": "Award Title",
                "issuer": "Issuing Organization",
                "date": month,
            })
        },
    },
    SectionSpec {
        tag: SectionType::Volunteer,
        title: "Volunteer Experience",
        icon: "🤝",
        description: "Community and volunteer work",
        repeatable: false,
        default_item: |month| {
            json!({
                "organization": "Organization Name",
                "role": "Role",
                "startDate": month,
                "endDate": month,
                "current": false,
                "description": "Description of volunteer work",
            })
        },
    },
    SectionSpec {
        tag: SectionType::Publications,
        title: "Publications",
        icon: "📚",
        description: "Papers, articles and books",
        repeatable: false,
        default_item: |month| {
            json!({
                "title": "Publication Title",
                "publisher": "Publisher",
                "date": month,
            })
        },
    },
    SectionSpec {
        tag: SectionType::Speaking,
        title: "Speaking",
        icon: "🎤",
        description: "Talks, panels and workshops",
        repeatable: false,
        default_item: |month| {
            json!({
                "event": "Event Name",
                "topic": "Talk Topic",
                "date": month,
                "location": "Location",
            })
        },
    },
    SectionSpec {
        tag: SectionType::Patents,
        title: "Patents",
        icon: "💡",
        description: "Granted and pending patents",
        repeatable: false,
        default_item: |month| {
            json!({
                "title": "Patent Title",
                "patentNumber": "US-XXXXXXX",
                "date": month,
                "status": "Pending",
            })
        },
    },
    SectionSpec {
        tag: SectionType::Portfolio,
        title: "Portfolio",
        icon: "🔗",
        description: "Links to your work online",
        repeatable: false,
        default_item: |_| json!({ "platform": "Platform Name", "url": "https://" }),
    },
    SectionSpec {
        tag: SectionType::Custom,
        title: "Custom Section",
        icon: "✏️",
        description: "Free-form section with your own title",
        repeatable: true,
        default_item: |_| json!({ "title": "Item Title", "content": "" }),
    },
];

pub fn spec(tag: SectionType) -> &'static SectionSpec {
    let index = SectionType::ALL
        .iter()
        .position(|t| *t == tag)
        .unwrap_or_default();
    &REGISTRY[index]
}

impl SectionSpec {
    /// A new, enabled section of this tag with no items.
    pub fn new_section(&self, order: u32) -> Section {
        Section {
            id: new_item_id(),
            section_type: self.tag,
            order,
            enabled: true,
            title: self.title.to_string(),
            data: Arc::new(SectionData::empty(self.tag)),
        }
    }

    /// The item appended by "add item", dated to the current month.
    pub fn default_item(&self) -> Value {
        let month = Utc::now().format("%Y-%m").to_string();
        self.default_item_for_month(&month)
    }

    pub fn default_item_for_month(&self, month: &str) -> Value {
        let mut item = (self.default_item)(month);
        if let Value::Object(fields) = &mut item {
            fields.insert("id".to_string(), Value::String(new_item_id()));
        }
        item
    }
}

/// Palette entry: a registry row plus whether it can be added to `sections` now.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    #[serde(flatten)]
    pub spec: &'static SectionSpec,
    pub available: bool,
}

pub fn palette(sections: &SectionList) -> Vec<PaletteEntry> {
    REGISTRY
        .iter()
        .map(|spec| PaletteEntry {
            spec,
            available: spec.repeatable || !sections.contains_type(spec.tag),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer dispatch
// ────────────────────────────────────────────────────────────────────────────

/// One method per section tag. Adding a tag adds a method here, which every
/// renderer then has to supply.
pub trait SectionVisitor {
    type Output;

    fn certifications(&mut self, section: &Section, items: &[Arc<Certification>]) -> Self::Output;
    fn languages(&mut self, section: &Section, items: &[Arc<Language>]) -> Self::Output;
    fn projects(&mut self, section: &Section, items: &[Arc<Project>]) -> Self::Output;
    fn awards(&mut self, section: &Section, items: &[Arc<Award>]) -> Self::Output;
    fn volunteer(&mut self, section: &Section, items: &[Arc<Volunteer>]) -> Self::Output;
    fn publications(&mut self, section: &Section, items: &[Arc<Publication>]) -> Self::Output;
    fn speaking(&mut self, section: &Section, items: &[Arc<Speaking>]) -> Self::Output;
    fn patents(&mut self, section: &Section, items: &[Arc<Patent>]) -> Self::Output;
    fn portfolio(&mut self, section: &Section, items: &[Arc<PortfolioLink>]) -> Self::Output;
    fn custom(
        &mut self,
        section: &Section,
        content: &str,
        items: &[Arc<CustomItem>],
    ) -> Self::Output;
}

pub fn dispatch<V: SectionVisitor>(section: &Section, visitor: &mut V) -> V::Output {
    match section.data.as_ref() {
        SectionData::Certifications { items } => visitor.certifications(section, items),
        SectionData::Languages { items } => visitor.languages(section, items),
        SectionData::Projects { items } => visitor.projects(section, items),
        SectionData::Awards { items } => visitor.awards(section, items),
        SectionData::Volunteer { items } => visitor.volunteer(section, items),
        SectionData::Publications { items } => visitor.publications(section, items),
        SectionData::Speaking { items } => visitor.speaking(section, items),
        SectionData::Patents { items } => visitor.patents(section, items),
        SectionData::Portfolio { items } => visitor.portfolio(section, items),
        SectionData::Custom { content, items } => visitor.custom(section, content, items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::node::decode;

    #[test]
    fn test_registry_covers_every_tag_in_order() {
        for (spec, tag) in REGISTRY.iter().zip(SectionType::ALL) {
            assert_eq!(spec.tag, tag);
            assert_eq!(super::spec(tag).tag, tag);
        }
    }

    #[test]
    fn test_only_custom_repeats() {
        let repeatable: Vec<SectionType> = REGISTRY
            .iter()
            .filter(|s| s.repeatable)
            .map(|s| s.tag)
            .collect();
        assert_eq!(repeatable, vec![SectionType::Custom]);
    }

    #[test]
    fn test_new_sections_are_consistent_and_empty() {
        for tag in SectionType::ALL {
            let section = spec(tag).new_section(3);
            assert_eq!(section.section_type, tag);
            assert_eq!(section.data.section_type(), tag);
            assert_eq!(section.item_count(), 0);
            assert_eq!(section.order, 3);
            assert!(section.enabled);
        }
    }

    #[test]
    fn test_default_items_fit_their_section() {
        let month = "2024-05";
        let certification: Certification =
            decode(&spec(SectionType::Certifications).default_item_for_month(month)).unwrap();
        assert_eq!(certification.name, "Certification Name");
        assert_eq!(certification.date, "2024-05");
        let language: Language =
            decode(&spec(SectionType::Languages).default_item_for_month(month)).unwrap();
        assert_eq!(language.proficiency, "Intermediate");
        let patent: Patent =
            decode(&spec(SectionType::Patents).default_item_for_month(month)).unwrap();
        assert_eq!(patent.patent_number, "US-XXXXXXX");
        assert_eq!(patent.status, "Pending");
        let link: PortfolioLink =
            decode(&spec(SectionType::Portfolio).default_item_for_month(month)).unwrap();
        assert_eq!(link.url, "https://");
        let custom: CustomItem =
            decode(&spec(SectionType::Custom).default_item_for_month(month)).unwrap();
        assert!(!custom.id.is_empty());
    }

    #[test]
    fn test_default_item_ids_are_fresh() {
        let spec = spec(SectionType::Projects);
        assert_ne!(spec.default_item()["id"], spec.default_item()["id"]);
    }

    #[test]
    fn test_palette_marks_added_tags_unavailable() {
        let sections = SectionList::from_sections([
            spec(SectionType::Awards).new_section(0),
            spec(SectionType::Custom).new_section(0),
        ]);
        let palette = palette(&sections);
        let available = |tag| palette.iter().find(|e| e.spec.tag == tag).unwrap().available;
        assert!(!available(SectionType::Awards));
        assert!(available(SectionType::Custom));
        assert!(available(SectionType::Patents));
    }

    struct CountItems;

    impl SectionVisitor for CountItems {
        type Output = (SectionType, usize);

        fn certifications(&mut self, s: &Section, i: &[Arc<Certification>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn languages(&mut self, s: &Section, i: &[Arc<Language>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn projects(&mut self, s: &Section, i: &[Arc<Project>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn awards(&mut self, s: &Section, i: &[Arc<Award>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn volunteer(&mut self, s: &Section, i: &[Arc<Volunteer>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn publications(&mut self, s: &Section, i: &[Arc<Publication>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn speaking(&mut self, s: &Section, i: &[Arc<Speaking>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn patents(&mut self, s: &Section, i: &[Arc<Patent>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn portfolio(&mut self, s: &Section, i: &[Arc<PortfolioLink>]) -> Self::Output {
            (s.section_type, i.len())
        }
        fn custom(&mut self, s: &Section, _: &str, i: &[Arc<CustomItem>]) -> Self::Output {
            (s.section_type, i.len())
        }
    }

    #[test]
    fn test_dispatch_reaches_matching_method() {
        for tag in SectionType::ALL {
            let section = spec(tag).new_section(0);
            assert_eq!(dispatch(&section, &mut CountItems), (tag, 0));
        }
    }
}
