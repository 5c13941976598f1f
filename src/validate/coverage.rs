//! Every skill must belong to at least one registered group.

use serde_json::json;

use crate::core::descriptor::SkillDescriptor;
use crate::core::diagnostics::Diagnostic;
use crate::core::presets::Membership;
use crate::error::ErrorCode;

#[must_use]
pub fn check(skills: &[SkillDescriptor], membership: &Membership) -> Vec<Diagnostic> {
    skills
        .iter()
        .filter(|skill| !membership.covers(&skill.presets))
        .map(|skill| {
            let message = if skill.presets.is_empty() {
                "skill declares no presets".to_string()
            } else {
                format!(
                    "none of the declared presets [{}] is registered",
                    skill.presets.join(", ")
                )
            };
            Diagnostic::error(ErrorCode::PresetCoverage, &skill.name, message)
                .with_path(&skill.source)
                .with_context(json!({ "presets": skill.presets }))
        })
        .collect()
}
