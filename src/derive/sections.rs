//! Section matrix: which sections each skill category must carry.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::descriptor::SkillDescriptor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionRow {
    pub skills: Vec<String>,
    /// Union of the members' required sections, first occurrence order
    pub required_sections: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionMatrix {
    pub categories: BTreeMap<String, SectionRow>,
}

impl SectionMatrix {
    /// Build from descriptors sorted by name.
    #[must_use]
    pub fn build(skills: &[SkillDescriptor]) -> Self {
        let mut categories: BTreeMap<String, SectionRow> = BTreeMap::new();
        for skill in skills {
            let row = categories.entry(skill.category.clone()).or_default();
            row.skills.push(skill.name.clone());
            for section in &skill.required_sections {
                if !row.required_sections.contains(section) {
                    row.required_sections.push(section.clone());
                }
            }
        }
        Self { categories }
    }
}
