//! Polymorphic resume sections (`dynamicSections`).
//!
//! # Invariants
//! - Tag consistency: `section.data.type == section.type`. The deserializer
//!   refuses records that break it and the accessor refuses writes to either tag.
//! - Order density: after any structural edit of a [`SectionList`], the `order`
//!   values are exactly `0..len` in list order.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{new_item_id, List};
use crate::path::node::{decode, snapshot};
use crate::path::{Edit, Node, NodeFault, Segment};
use crate::record_node;

// ────────────────────────────────────────────────────────────────────────────
// Type tag
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Certifications,
    Languages,
    Projects,
    Awards,
    Volunteer,
    Publications,
    Speaking,
    Patents,
    Portfolio,
    Custom,
}

impl SectionType {
    pub const ALL: [SectionType; 10] = [
        SectionType::Certifications,
        SectionType::Languages,
        SectionType::Projects,
        SectionType::Awards,
        SectionType::Volunteer,
        SectionType::Publications,
        SectionType::Speaking,
        SectionType::Patents,
        SectionType::Portfolio,
        SectionType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Certifications => "certifications",
            SectionType::Languages => "languages",
            SectionType::Projects => "projects",
            SectionType::Awards => "awards",
            SectionType::Volunteer => "volunteer",
            SectionType::Publications => "publications",
            SectionType::Speaking => "speaking",
            SectionType::Patents => "patents",
            SectionType::Portfolio => "portfolio",
            SectionType::Custom => "custom",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section type '{0}'")]
pub struct UnknownSectionType(pub String);

impl FromStr for SectionType {
    type Err = UnknownSectionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownSectionType(s.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Items
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

record_node!(Certification {
    "id" => id,
    "name" => name,
    "issuer" => issuer,
    "date" => date,
    "expiryDate" => expiry_date,
    "credentialId" => credential_id,
    "url" => url,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub language: String,
    /// Native, Fluent, Professional, Intermediate, Basic...
    #[serde(default)]
    pub proficiency: String,
}

record_node!(Language {
    "id" => id,
    "language" => language,
    "proficiency" => proficiency,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
}

record_node!(Project {
    "id" => id,
    "name" => name,
    "description" => description,
    "techStack" => tech_stack,
    "startDate" => start_date,
    "endDate" => end_date,
    "url" => url,
    "githubUrl" => github_url,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

record_node!(Award {
    "id" => id,
    "title" => title,
    "issuer" => issuer,
    "date" => date,
    "description" => description,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

record_node!(Volunteer {
    "id" => id,
    "organization" => organization,
    "role" => role,
    "startDate" => start_date,
    "endDate" => end_date,
    "current" => current,
    "description" => description,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

record_node!(Publication {
    "id" => id,
    "title" => title,
    "publisher" => publisher,
    "date" => date,
    "url" => url,
    "description" => description,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaking {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

record_node!(Speaking {
    "id" => id,
    "event" => event,
    "topic" => topic,
    "date" => date,
    "location" => location,
    "url" => url,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patent {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub patent_number: String,
    #[serde(default)]
    pub date: String,
    /// Pending, Granted or Published.
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

record_node!(Patent {
    "id" => id,
    "title" => title,
    "patentNumber" => patent_number,
    "date" => date,
    "status" => status,
    "description" => description,
    "url" => url,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioLink {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

record_node!(PortfolioLink {
    "id" => id,
    "platform" => platform,
    "url" => url,
    "description" => description,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomItem {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

record_node!(CustomItem {
    "id" => id,
    "title" => title,
    "content" => content,
});

// ────────────────────────────────────────────────────────────────────────────
// Section payload (tagged union)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SectionData {
    Certifications {
        #[serde(default)]
        items: List<Certification>,
    },
    Languages {
        #[serde(default)]
        items: List<Language>,
    },
    Projects {
        #[serde(default)]
        items: List<Project>,
    },
    Awards {
        #[serde(default)]
        items: List<Award>,
    },
    Volunteer {
        #[serde(default)]
        items: List<Volunteer>,
    },
    Publications {
        #[serde(default)]
        items: List<Publication>,
    },
    Speaking {
        #[serde(default)]
        items: List<Speaking>,
    },
    Patents {
        #[serde(default)]
        items: List<Patent>,
    },
    Portfolio {
        #[serde(default)]
        items: List<PortfolioLink>,
    },
    Custom {
        #[serde(default)]
        content: String,
        #[serde(default)]
        items: List<CustomItem>,
    },
}

/// Expands `$body` once per list-carrying variant with `$items` bound to the list,
/// and `$wrap` to a constructor that puts a list of the same type back.
macro_rules! with_items {
    ($data:expr, |$items:ident, $wrap:ident| $body:expr) => {
        match $data {
            SectionData::Certifications { items: $items } => {
                let $wrap = |items| SectionData::Certifications { items };
                $body
            }
            SectionData::Languages { items: $items } => {
                let $wrap = |items| SectionData::Languages { items };
                $body
            }
            SectionData::Projects { items: $items } => {
                let $wrap = |items| SectionData::Projects { items };
                $body
            }
            SectionData::Awards { items: $items } => {
                let $wrap = |items| SectionData::Awards { items };
                $body
            }
            SectionData::Volunteer { items: $items } => {
                let $wrap = |items| SectionData::Volunteer { items };
                $body
            }
            SectionData::Publications { items: $items } => {
                let $wrap = |items| SectionData::Publications { items };
                $body
            }
            SectionData::Speaking { items: $items } => {
                let $wrap = |items| SectionData::Speaking { items };
                $body
            }
            SectionData::Patents { items: $items } => {
                let $wrap = |items| SectionData::Patents { items };
                $body
            }
            SectionData::Portfolio { items: $items } => {
                let $wrap = |items| SectionData::Portfolio { items };
                $body
            }
            SectionData::Custom {
                content,
                items: $items,
            } => {
                let $wrap = |items| SectionData::Custom {
                    content: content.clone(),
                    items,
                };
                $body
            }
        }
    };
}

impl SectionData {
    /// Empty payload for `tag`. New sections start with no items.
    pub fn empty(tag: SectionType) -> Self {
        match tag {
            SectionType::Certifications => SectionData::Certifications { items: Arc::default() },
            SectionType::Languages => SectionData::Languages { items: Arc::default() },
            SectionType::Projects => SectionData::Projects { items: Arc::default() },
            SectionType::Awards => SectionData::Awards { items: Arc::default() },
            SectionType::Volunteer => SectionData::Volunteer { items: Arc::default() },
            SectionType::Publications => SectionData::Publications { items: Arc::default() },
            SectionType::Speaking => SectionData::Speaking { items: Arc::default() },
            SectionType::Patents => SectionData::Patents { items: Arc::default() },
            SectionType::Portfolio => SectionData::Portfolio { items: Arc::default() },
            SectionType::Custom => SectionData::Custom {
                content: String::new(),
                items: Arc::default(),
            },
        }
    }

    pub fn section_type(&self) -> SectionType {
        match self {
            SectionData::Certifications { .. } => SectionType::Certifications,
            SectionData::Languages { .. } => SectionType::Languages,
            SectionData::Projects { .. } => SectionType::Projects,
            SectionData::Awards { .. } => SectionType::Awards,
            SectionData::Volunteer { .. } => SectionType::Volunteer,
            SectionData::Publications { .. } => SectionType::Publications,
            SectionData::Speaking { .. } => SectionType::Speaking,
            SectionData::Patents { .. } => SectionType::Patents,
            SectionData::Portfolio { .. } => SectionType::Portfolio,
            SectionData::Custom { .. } => SectionType::Custom,
        }
    }

    pub fn item_count(&self) -> usize {
        with_items!(self, |items, _wrap| items.len())
    }
}

impl Node for SectionData {
    const KIND: &'static str = "record";

    fn lookup(&self, path: &[Segment]) -> Option<Value> {
        let Some((head, rest)) = path.split_first() else {
            return snapshot(self);
        };
        match (head, self) {
            (Segment::Field(name), _) if name.as_ref() == "type" => {
                rest.is_empty().then(|| Value::from(self.section_type().as_str()))
            }
            (Segment::Field(name), _) if name.as_ref() == "items" => {
                with_items!(self, |items, _wrap| items.lookup(rest))
            }
            (Segment::Field(name), SectionData::Custom { content, .. })
                if name.as_ref() == "content" =>
            {
                content.lookup(rest)
            }
            _ => None,
        }
    }

    fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault> {
        let Some((head, rest)) = path.split_first() else {
            let Edit::Set(value) = edit else {
                return Err(NodeFault::WrongKind {
                    edit: edit.name(),
                    found: Self::KIND,
                });
            };
            let next: SectionData = decode(value)?;
            if next.section_type() != self.section_type() {
                return Err(NodeFault::TagLocked("type".to_string()));
            }
            return Ok(next);
        };
        match (head, self) {
            (Segment::Field(name), _) if name.as_ref() == "type" => {
                Err(NodeFault::TagLocked("type".to_string()))
            }
            (Segment::Field(name), _) if name.as_ref() == "items" => {
                with_items!(self, |items, wrap| Ok(wrap(items.rebuild(rest, edit)?)))
            }
            (Segment::Field(name), SectionData::Custom { content, items })
                if name.as_ref() == "content" =>
            {
                Ok(SectionData::Custom {
                    content: content.rebuild(rest, edit)?,
                    items: Arc::clone(items),
                })
            }
            _ => Err(NodeFault::missing(head)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("section '{id}' is tagged '{section_type}' but carries '{data_type}' data")]
pub struct TagMismatch {
    pub id: String,
    pub section_type: SectionType,
    pub data_type: SectionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SectionRecord")]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub order: u32,
    pub enabled: bool,
    pub title: String,
    pub data: Arc<SectionData>,
}

/// Wire form of a section before the tag check.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SectionRecord {
    #[serde(default = "new_item_id")]
    id: String,
    #[serde(rename = "type")]
    section_type: SectionType,
    #[serde(default)]
    order: u32,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    title: String,
    data: SectionData,
}

fn enabled_by_default() -> bool {
    true
}

impl TryFrom<SectionRecord> for Section {
    type Error = TagMismatch;

    fn try_from(record: SectionRecord) -> Result<Self, Self::Error> {
        let data_type = record.data.section_type();
        if data_type != record.section_type {
            return Err(TagMismatch {
                id: record.id,
                section_type: record.section_type,
                data_type,
            });
        }
        Ok(Section {
            id: record.id,
            section_type: record.section_type,
            order: record.order,
            enabled: record.enabled,
            title: record.title,
            data: Arc::new(record.data),
        })
    }
}

impl Section {
    pub fn item_count(&self) -> usize {
        self.data.item_count()
    }
}

impl Node for Section {
    const KIND: &'static str = "record";

    fn lookup(&self, path: &[Segment]) -> Option<Value> {
        let Some((head, rest)) = path.split_first() else {
            return snapshot(self);
        };
        let Segment::Field(name) = head else {
            return None;
        };
        match name.as_ref() {
            "id" => self.id.lookup(rest),
            "type" => rest
                .is_empty()
                .then(|| Value::from(self.section_type.as_str())),
            "order" => self.order.lookup(rest),
            "enabled" => self.enabled.lookup(rest),
            "title" => self.title.lookup(rest),
            "data" => self.data.lookup(rest),
            _ => None,
        }
    }

    fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault> {
        let Some((head, rest)) = path.split_first() else {
            let Edit::Set(value) = edit else {
                return Err(NodeFault::WrongKind {
                    edit: edit.name(),
                    found: Self::KIND,
                });
            };
            let next: Section = decode(value)?;
            if next.section_type != self.section_type {
                return Err(NodeFault::TagLocked("type".to_string()));
            }
            return Ok(next);
        };
        let Segment::Field(name) = head else {
            return Err(NodeFault::missing(head));
        };
        let mut next = self.clone();
        match name.as_ref() {
            "id" => next.id = self.id.rebuild(rest, edit)?,
            "type" => return Err(NodeFault::TagLocked("type".to_string())),
            "order" => next.order = self.order.rebuild(rest, edit)?,
            "enabled" => next.enabled = self.enabled.rebuild(rest, edit)?,
            "title" => next.title = self.title.rebuild(rest, edit)?,
            "data" => next.data = self.data.rebuild(rest, edit)?,
            _ => return Err(NodeFault::missing(head)),
        }
        Ok(next)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ordered section list
// ────────────────────────────────────────────────────────────────────────────

/// `dynamicSections`: a persistent list that keeps `order` dense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionList(List<Section>);

impl SectionList {
    /// Builds a list and assigns `order` from position.
    pub fn from_sections(sections: impl IntoIterator<Item = Section>) -> Self {
        let list = SectionList(Arc::new(sections.into_iter().map(Arc::new).collect()));
        list.reindexed()
    }

    pub fn ptr_eq(&self, other: &SectionList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|s| s.id == id)
    }

    pub fn contains_type(&self, tag: SectionType) -> bool {
        self.0.iter().any(|s| s.section_type == tag)
    }

    /// `order` values in list order.
    pub fn orders(&self) -> Vec<u32> {
        self.0.iter().map(|s| s.order).collect()
    }

    /// True when `order` equals the list position for every section.
    pub fn is_dense(&self) -> bool {
        self.0
            .iter()
            .enumerate()
            .all(|(i, s)| s.order as usize == i)
    }

    /// Sections sorted by `order`, ties kept in list order.
    pub fn sorted_by_order(&self) -> Vec<Arc<Section>> {
        let mut sorted = self.0.to_vec();
        sorted.sort_by_key(|s| s.order);
        sorted
    }

    fn same_sections(&self, other: &SectionList) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }

    /// Reassigns every `order` to its list position. Sections already in place
    /// keep their allocation.
    pub fn reindexed(&self) -> SectionList {
        if self.is_dense() {
            return self.clone();
        }
        let sections = self
            .0
            .iter()
            .enumerate()
            .map(|(i, s)| with_order(s, i as u32))
            .collect();
        SectionList(Arc::new(sections))
    }
}

fn with_order(section: &Arc<Section>, order: u32) -> Arc<Section> {
    if section.order == order {
        return Arc::clone(section);
    }
    let mut next = (**section).clone();
    next.order = order;
    Arc::new(next)
}

impl Deref for SectionList {
    type Target = [Arc<Section>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Node for SectionList {
    const KIND: &'static str = "list";

    fn lookup(&self, path: &[Segment]) -> Option<Value> {
        self.0.lookup(path)
    }

    /// `order` always equals the list position afterwards, whatever the edit
    /// wrote. An edit whose only effect was on `order` leaves the list as it was.
    fn rebuild(&self, path: &[Segment], edit: &Edit<'_>) -> Result<Self, NodeFault> {
        let next = SectionList(self.0.rebuild(path, edit)?);
        if path.is_empty() {
            if let Edit::Append(_) = edit {
                let mut sections = next.0.to_vec();
                let last_order = sections.len().saturating_sub(1) as u32;
                if let Some(last) = sections.last_mut() {
                    *last = with_order(last, last_order);
                }
                return Ok(SectionList(Arc::new(sections)));
            }
        }
        let next = next.reindexed();
        if next.same_sections(self) {
            return Ok(self.clone());
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(id: &str, tag: SectionType, order: u32) -> Section {
        Section {
            id: id.to_string(),
            section_type: tag,
            order,
            enabled: true,
            title: tag.as_str().to_string(),
            data: Arc::new(SectionData::empty(tag)),
        }
    }

    #[test]
    fn test_section_type_round_trips_through_str() {
        for tag in SectionType::ALL {
            assert_eq!(tag.as_str().parse::<SectionType>().unwrap(), tag);
            assert_eq!(serde_json::to_value(tag).unwrap(), json!(tag.as_str()));
        }
        assert!("references".parse::<SectionType>().is_err());
    }

    #[test]
    fn test_empty_data_matches_tag() {
        for tag in SectionType::ALL {
            let data = SectionData::empty(tag);
            assert_eq!(data.section_type(), tag);
            assert_eq!(data.item_count(), 0);
        }
    }

    #[test]
    fn test_section_wire_shape() {
        let value = serde_json::to_value(section("s1", SectionType::Languages, 0)).unwrap();
        assert_eq!(value["type"], json!("languages"));
        assert_eq!(value["data"]["type"], json!("languages"));
        assert_eq!(value["data"]["items"], json!([]));
    }

    #[test]
    fn test_mismatched_tags_rejected_on_load() {
        let err = serde_json::from_value::<Section>(json!({
            "id": "s1",
            "type": "awards",
            "order": 0,
            "enabled": true,
            "title": "Awards",
            "data": { "type": "patents", "items": [] }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("tagged 'awards'"));
    }

    #[test]
    fn test_custom_section_defaults() {
        let parsed: Section = serde_json::from_value(json!({
            "type": "custom",
            "data": { "type": "custom", "content": "Hello" }
        }))
        .unwrap();
        assert!(parsed.enabled);
        assert_eq!(parsed.item_count(), 0);
        assert_eq!(parsed.lookup(&[Segment::Field("data".into()), Segment::Field("content".into())]), Some(json!("Hello")));
    }

    #[test]
    fn test_type_fields_are_write_locked() {
        let s = section("s1", SectionType::Awards, 0);
        let set = json!("patents");
        assert_eq!(
            s.rebuild(&[Segment::Field("type".into())], &Edit::Set(&set)),
            Err(NodeFault::TagLocked("type".to_string()))
        );
        assert_eq!(
            s.rebuild(
                &[Segment::Field("data".into()), Segment::Field("type".into())],
                &Edit::Set(&set)
            ),
            Err(NodeFault::TagLocked("type".to_string()))
        );
        let other = json!({ "type": "patents", "items": [] });
        assert_eq!(
            s.rebuild(&[Segment::Field("data".into())], &Edit::Set(&other)),
            Err(NodeFault::TagLocked("type".to_string()))
        );
    }

    #[test]
    fn test_content_only_exists_on_custom() {
        let s = section("s1", SectionType::Awards, 0);
        let path = [Segment::Field("data".into()), Segment::Field("content".into())];
        assert_eq!(s.lookup(&path), None);
        assert_eq!(
            s.rebuild(&path, &Edit::Set(&json!("x"))),
            Err(NodeFault::Missing("content".to_string()))
        );
    }

    #[test]
    fn test_append_continues_dense_order() {
        let list = SectionList::from_sections([
            section("a", SectionType::Awards, 0),
            section("b", SectionType::Patents, 0),
        ]);
        assert_eq!(list.orders(), vec![0, 1]);
        let added = serde_json::to_value(section("c", SectionType::Custom, 99)).unwrap();
        let next = list.rebuild(&[], &Edit::Append(&added)).unwrap();
        assert_eq!(next.orders(), vec![0, 1, 2]);
        assert!(Arc::ptr_eq(&list[0], &next[0]));
    }

    #[test]
    fn test_remove_reindexes_everything() {
        let list = SectionList(Arc::new(vec![
            Arc::new(section("a", SectionType::Awards, 0)),
            Arc::new(section("b", SectionType::Patents, 5)),
            Arc::new(section("c", SectionType::Custom, 5)),
        ]));
        let next = list.rebuild(&[], &Edit::Remove(0)).unwrap();
        assert_eq!(next.orders(), vec![0, 1]);
        assert_eq!(next[0].id, "b");
    }

    #[test]
    fn test_order_writes_cannot_break_density() {
        let list = SectionList::from_sections([
            section("a", SectionType::Awards, 0),
            section("b", SectionType::Patents, 1),
        ]);
        let path = [Segment::Index(1), Segment::Field("order".into())];
        let next = list.rebuild(&path, &Edit::Set(&json!(0))).unwrap();
        assert_eq!(next.orders(), vec![0, 1]);
        assert!(next.ptr_eq(&list));

        let replacement = json!({
            "id": "b", "type": "patents", "order": 7, "enabled": false, "title": "Patents",
            "data": { "type": "patents", "items": [] }
        });
        let next = list.rebuild(&[Segment::Index(1)], &Edit::Set(&replacement)).unwrap();
        assert_eq!(next.orders(), vec![0, 1]);
        assert!(!next[1].enabled);
        assert!(Arc::ptr_eq(&list[0], &next[0]));
    }

    #[test]
    fn test_title_edit_shares_other_sections() {
        let list = SectionList::from_sections([
            section("a", SectionType::Awards, 0),
            section("b", SectionType::Custom, 1),
        ]);
        let path = [Segment::Index(1), Segment::Field("title".into())];
        let next = list.rebuild(&path, &Edit::Set(&json!("Notes"))).unwrap();
        assert_eq!(next[1].title, "Notes");
        assert!(Arc::ptr_eq(&list[0], &next[0]));
        assert!(next.is_dense());
    }
}
