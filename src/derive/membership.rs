//! Group membership in both directions.
//!
//! Inheritance moves membership two different ways, and the two are kept
//! as separate operations:
//!
//! - [`RosterBuilder::upward_members`]: a skill declaring preset X belongs
//!   to every preset in X's closure. A skill declaring `backend` (which
//!   inherits `core`) is a member of `core`.
//! - [`RosterBuilder::team_members`]: building for team T pulls in every
//!   skill whose declared preset lies in T's closure. Building `backend`
//!   pulls in skills declaring `core`.
//!
//! A roster is the union of the two. Groups marked `includes_all` contain
//! every skill.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::core::descriptor::{RelationKind, SkillDescriptor};
use crate::core::presets::Membership;
use crate::derive::matrix::{HandoffEdge, SkillMatrix};

/// Computes member sets for groups over a fixed skill list.
pub struct RosterBuilder<'a> {
    skills: &'a [SkillDescriptor],
    membership: &'a Membership,
}

impl<'a> RosterBuilder<'a> {
    #[must_use]
    pub const fn new(skills: &'a [SkillDescriptor], membership: &'a Membership) -> Self {
        Self { skills, membership }
    }

    fn all_skills(&self) -> BTreeSet<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Skills whose declared presets resolve up into `group`.
    #[must_use]
    pub fn upward_members(&self, group: &str) -> BTreeSet<String> {
        if self.membership.includes_all(group) {
            return self.all_skills();
        }
        self.skills
            .iter()
            .filter(|s| self.membership.resolve_declared(&s.presets).contains(group))
            .map(|s| s.name.clone())
            .collect()
    }

    /// Skills pulled in when building for `team`: every skill declaring a
    /// preset in `team`'s closure. Inheriting an includes-all group pulls in
    /// every skill.
    #[must_use]
    pub fn team_members(&self, team: &str) -> BTreeSet<String> {
        let closure = self.membership.closure(team);
        if closure.iter().any(|p| self.membership.includes_all(p)) {
            return self.all_skills();
        }
        self.skills
            .iter()
            .filter(|s| s.presets.iter().any(|p| closure.contains(p)))
            .map(|s| s.name.clone())
            .collect()
    }

    /// Union of upward and team membership.
    #[must_use]
    pub fn roster(&self, group: &str) -> BTreeSet<String> {
        let mut members = self.upward_members(group);
        members.extend(self.team_members(group));
        debug!(group, members = members.len(), "computed roster");
        members
    }

    /// One roster per registered group, in name order.
    #[must_use]
    pub fn rosters(&self) -> Vec<Roster> {
        self.membership
            .graph()
            .nodes()
            .map(|node| Roster {
                group: node.name.clone(),
                description: node.description.clone(),
                includes_all: node.includes_all,
                skills: self.roster(&node.name).into_iter().collect(),
            })
            .collect()
    }
}

/// Member list of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    pub group: String,
    pub description: String,
    pub includes_all: bool,
    /// Sorted by name
    pub skills: Vec<String>,
}

/// Phase-ordered view of one roster plus its internal handoffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    pub group: String,
    pub description: String,
    /// `(phase, skills)` in configured phase order; phases outside the
    /// configured order follow alphabetically
    pub phases: Vec<(String, Vec<String>)>,
    /// Document handoffs with both ends in the roster
    pub handoffs: Vec<HandoffEdge>,
    /// Declared return paths with both ends in the roster
    pub return_paths: Vec<HandoffEdge>,
}

impl Pipeline {
    #[must_use]
    pub fn build(
        roster: &Roster,
        skills: &[SkillDescriptor],
        matrix: &SkillMatrix,
        phase_order: &[String],
    ) -> Self {
        let members: BTreeSet<&str> = roster.skills.iter().map(String::as_str).collect();

        let mut phases: Vec<(String, Vec<String>)> = Vec::new();
        for phase in phase_order {
            let names = phase_members(matrix, phase, &members);
            if !names.is_empty() {
                phases.push((phase.clone(), names));
            }
        }
        for phase in matrix.phases.keys() {
            if phase_order.contains(phase) {
                continue;
            }
            let names = phase_members(matrix, phase, &members);
            if !names.is_empty() {
                phases.push((phase.clone(), names));
            }
        }

        let handoffs = matrix
            .handoffs
            .iter()
            .filter(|e| members.contains(e.from.as_str()) && members.contains(e.to.as_str()))
            .cloned()
            .collect();

        let mut return_paths = Vec::new();
        for skill in skills.iter().filter(|s| members.contains(s.name.as_str())) {
            for relation in skill.relations(RelationKind::ReturnPath) {
                if members.contains(relation.skill.as_str()) {
                    return_paths.push(HandoffEdge::new(
                        &skill.name,
                        &relation.skill,
                        RelationKind::ReturnPath,
                    ));
                }
            }
        }

        Self {
            group: roster.group.clone(),
            description: roster.description.clone(),
            phases,
            handoffs,
            return_paths,
        }
    }
}

fn phase_members(matrix: &SkillMatrix, phase: &str, members: &BTreeSet<&str>) -> Vec<String> {
    matrix
        .phases
        .get(phase)
        .map(|names| {
            names
                .iter()
                .filter(|n| members.contains(n.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}
