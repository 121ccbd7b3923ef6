//! Markdown export of a resume.
//!
//! Fixed sections come first in a fixed order, then the enabled dynamic
//! sections sorted by `order`. Empty sections are left out.
//!
//! The header, experience, education and skills are read through the scope's
//! widgets, so dates and placeholders display exactly as in the editor. The
//! remaining lists and the dynamic sections read the typed snapshot directly.

use std::fmt::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::editing::widgets::{format_month, PRESENT};
use crate::editing::EditScope;
use crate::models::section::{
    Award, Certification, CustomItem, Language, Patent, PortfolioLink, Project, Publication,
    Section, Speaking, Volunteer,
};
use crate::models::Document;
use crate::sections::{dispatch, SectionVisitor};

pub fn render_markdown(scope: &EditScope) -> String {
    let doc = scope.document();
    let mut md = String::new();

    let header = scope.field("personalInfo");
    let name = header.text("fullName");
    md.push_str(&format!("# {}\n\n", name.display("Untitled Resume")));
    let title = header.text("title");
    if !title.value().is_empty() {
        md.push_str(&format!("**{}**\n\n", title.value()));
    }
    let contact = contact_line(doc);
    if !contact.is_empty() {
        md.push_str(&format!("{contact}\n\n"));
    }
    let summary = header.text("summary");
    if !summary.value().is_empty() {
        md.push_str(&format!("## Summary\n\n{}\n\n", summary.value()));
    }

    render_experience(&mut md, scope);
    render_education(&mut md, scope);
    render_skills(&mut md, scope);
    render_highlights(&mut md, doc);

    for section in doc.dynamic_sections.sorted_by_order() {
        if !section.enabled || (section.item_count() == 0 && !has_custom_content(&section)) {
            continue;
        }
        md.push_str(&dispatch(&section, &mut MarkdownSection));
    }

    md
}

fn contact_line(doc: &Document) -> String {
    let info = &doc.personal_info;
    let mut parts: Vec<&str> = [&info.email, &info.phone, &info.location]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if doc.include_social_links {
        parts.extend(
            [&info.linkedin, &info.github, &info.portfolio, &info.twitter, &info.website]
                .into_iter()
                .filter_map(|link| link.as_deref())
                .filter(|s| !s.is_empty()),
        );
    }
    parts.join(" | ")
}

fn date_range(start: String, end: String) -> String {
    match (start, end) {
        (s, e) if s.is_empty() && e.is_empty() => String::new(),
        (s, e) if e.is_empty() => s,
        (s, e) if s.is_empty() => e,
        (s, e) => format!("{s} – {e}"),
    }
}

fn render_experience(md: &mut String, scope: &EditScope) {
    let count = scope.document().experience.len();
    if count == 0 {
        return;
    }
    md.push_str("## Experience\n\n");
    let entries = scope.field("experience");
    for i in 0..count {
        let exp = entries.index(i);
        let _ = writeln!(
            md,
            "### {} — {}",
            exp.text("position").value(),
            exp.text("company").value()
        );
        let dates = date_range(exp.date("startDate").display(), exp.end_date("endDate").display());
        let location = exp.text("location");
        let place = location.value();
        match (dates.is_empty(), place.is_empty()) {
            (true, true) => {}
            (false, true) => {
                let _ = writeln!(md, "*{dates}*");
            }
            (true, false) => {
                let _ = writeln!(md, "*{place}*");
            }
            (false, false) => {
                let _ = writeln!(md, "*{dates} · {place}*");
            }
        }
        md.push('\n');
        let bullets = exp.list("bulletPoints");
        for bullet in bullets.items().iter().filter_map(Value::as_str) {
            if !bullet.trim().is_empty() {
                let _ = writeln!(md, "- {}", bullet.trim());
            }
        }
        md.push('\n');
    }
}

fn render_education(md: &mut String, scope: &EditScope) {
    let count = scope.document().education.len();
    if count == 0 {
        return;
    }
    md.push_str("## Education\n\n");
    let entries = scope.field("education");
    for i in 0..count {
        let edu = entries.index(i);
        let (degree, field) = (edu.text("degree"), edu.text("field"));
        let degree = [degree.value(), field.value()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(md, "### {}", edu.text("school").value());
        if !degree.is_empty() {
            let _ = writeln!(md, "{degree}");
        }
        let dates = date_range(edu.date("startDate").display(), edu.date("endDate").display());
        if !dates.is_empty() {
            let _ = writeln!(md, "*{dates}*");
        }
        let gpa = edu.text("gpa");
        if !gpa.value().is_empty() {
            let _ = writeln!(md, "- **GPA:** {}", gpa.value());
        }
        for (label, name) in [("Honors", "honors"), ("Coursework", "coursework")] {
            let list = edu.list(name);
            let entries: Vec<&str> = list.items().iter().filter_map(Value::as_str).collect();
            if !entries.is_empty() {
                let _ = writeln!(md, "- **{label}:** {}", entries.join(", "));
            }
        }
        md.push('\n');
    }
}

fn render_skills(md: &mut String, scope: &EditScope) {
    let tags = scope.tags("skills");
    let names: Vec<&str> = tags.names().filter(|n| !n.is_empty()).collect();
    if names.is_empty() {
        return;
    }
    let _ = write!(md, "## Skills\n\n{}\n\n", names.join(" · "));
}

fn render_highlights(md: &mut String, doc: &Document) {
    if !doc.achievements.is_empty() {
        md.push_str("## Achievements\n\n");
        for a in doc.achievements.iter() {
            let metric = a
                .metric
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default();
            let _ = writeln!(md, "- **{}**{metric}: {}", a.title, a.description);
        }
        md.push('\n');
    }
    if !doc.strengths.is_empty() {
        md.push_str("## Strengths\n\n");
        for s in doc.strengths.iter() {
            let _ = writeln!(md, "- **{}**: {}", s.title, s.description);
        }
        md.push('\n');
    }
    for legacy in doc.sections.iter() {
        let _ = write!(md, "## {}\n\n", legacy.title);
        if !legacy.content.is_empty() {
            let _ = write!(md, "{}\n\n", legacy.content);
        }
        for item in &legacy.items {
            let _ = writeln!(md, "- {item}");
        }
        if !legacy.items.is_empty() {
            md.push('\n');
        }
    }
}

fn has_custom_content(section: &Section) -> bool {
    matches!(
        section.data.as_ref(),
        crate::models::SectionData::Custom { content, .. } if !content.trim().is_empty()
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Dynamic sections
// ────────────────────────────────────────────────────────────────────────────

struct MarkdownSection;

fn heading(section: &Section) -> String {
    format!("## {}\n\n", section.title)
}

fn suffix(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .map(|p| format!(" · {p}"))
        .collect()
}

impl SectionVisitor for MarkdownSection {
    type Output = String;

    fn certifications(&mut self, section: &Section, items: &[Arc<Certification>]) -> String {
        let mut md = heading(section);
        for c in items {
            let date = format_month(&c.date);
            let _ = writeln!(
                md,
                "- **{}**{}",
                c.name,
                suffix(&[Some(c.issuer.as_str()), Some(date.as_str()), c.credential_id.as_deref()])
            );
        }
        md.push('\n');
        md
    }

    fn languages(&mut self, section: &Section, items: &[Arc<Language>]) -> String {
        let mut md = heading(section);
        for l in items {
            let _ = writeln!(md, "- **{}**{}", l.language, suffix(&[Some(l.proficiency.as_str())]));
        }
        md.push('\n');
        md
    }

    fn projects(&mut self, section: &Section, items: &[Arc<Project>]) -> String {
        let mut md = heading(section);
        for p in items {
            let _ = writeln!(md, "### {}", p.name);
            if !p.description.is_empty() {
                let _ = writeln!(md, "{}", p.description);
            }
            if !p.tech_stack.is_empty() {
                let _ = writeln!(md, "- **Stack:** {}", p.tech_stack.join(", "));
            }
            for link in [p.url.as_deref(), p.github_url.as_deref()].into_iter().flatten() {
                if !link.is_empty() {
                    let _ = writeln!(md, "- <{link}>");
                }
            }
            md.push('\n');
        }
        md
    }

    fn awards(&mut self, section: &Section, items: &[Arc<Award>]) -> String {
        let mut md = heading(section);
        for a in items {
            let date = format_month(&a.date);
            let _ = writeln!(md, "- **{}**{}", a.title, suffix(&[Some(a.issuer.as_str()), Some(date.as_str())]));
        }
        md.push('\n');
        md
    }

    fn volunteer(&mut self, section: &Section, items: &[Arc<Volunteer>]) -> String {
        let mut md = heading(section);
        for v in items {
            let _ = writeln!(md, "### {} — {}", v.role, v.organization);
            let dates = date_range(
                format_month(&v.start_date),
                if v.current {
                    PRESENT.to_string()
                } else {
                    format_month(&v.end_date)
                },
            );
            if !dates.is_empty() {
                let _ = writeln!(md, "*{dates}*");
            }
            if let Some(description) = v.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = writeln!(md, "{description}");
            }
            md.push('\n');
        }
        md
    }

    fn publications(&mut self, section: &Section, items: &[Arc<Publication>]) -> String {
        let mut md = heading(section);
        for p in items {
            let date = format_month(&p.date);
            let _ = writeln!(
                md,
                "- **{}**{}",
                p.title,
                suffix(&[Some(p.publisher.as_str()), Some(date.as_str()), p.url.as_deref()])
            );
        }
        md.push('\n');
        md
    }

    fn speaking(&mut self, section: &Section, items: &[Arc<Speaking>]) -> String {
        let mut md = heading(section);
        for s in items {
            let date = format_month(&s.date);
            let _ = writeln!(
                md,
                "- **{}**{}",
                s.topic,
                suffix(&[Some(s.event.as_str()), s.location.as_deref(), Some(date.as_str())])
            );
        }
        md.push('\n');
        md
    }

    fn patents(&mut self, section: &Section, items: &[Arc<Patent>]) -> String {
        let mut md = heading(section);
        for p in items {
            let date = format_month(&p.date);
            let _ = writeln!(
                md,
                "- **{}**{}",
                p.title,
                suffix(&[Some(p.patent_number.as_str()), Some(p.status.as_str()), Some(date.as_str())])
            );
        }
        md.push('\n');
        md
    }

    fn portfolio(&mut self, section: &Section, items: &[Arc<PortfolioLink>]) -> String {
        let mut md = heading(section);
        for link in items {
            let _ = writeln!(md, "- **{}**: <{}>", link.platform, link.url);
        }
        md.push('\n');
        md
    }

    fn custom(&mut self, section: &Section, content: &str, items: &[Arc<CustomItem>]) -> String {
        let mut md = heading(section);
        if !content.trim().is_empty() {
            let _ = write!(md, "{}\n\n", content.trim());
        }
        for item in items {
            match item.title.as_deref().filter(|t| !t.is_empty()) {
                Some(title) => {
                    let _ = writeln!(md, "- **{title}**: {}", item.content);
                }
                None => {
                    let _ = writeln!(md, "- {}", item.content);
                }
            }
        }
        if !items.is_empty() {
            md.push('\n');
        }
        md
    }
}
