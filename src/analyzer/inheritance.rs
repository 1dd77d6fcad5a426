//! Parent branch discovery and `Inherit` increment resolution

use crate::analyzer::context::CalculationContext;
use crate::config::EffectiveConfiguration;
use crate::domain::branch::normalize_branch_name;
use crate::domain::{BranchGroup, VersionField};
use crate::error::{GitSemverError, Result};
use crate::git::Repository;
use crate::warnings::CalculationWarning;
use git2::Oid;
use std::collections::HashSet;
use tracing::debug;

/// A branch another branch could have been created from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentBranch {
    pub name: String,
    pub tip: Oid,
    pub merge_base: Oid,
    /// Commits between the merge base and the child tip
    pub distance: u64,
    pub group: BranchGroup,
    /// The parent already contains the child tip
    pub contains_child: bool,
}

/// Possible parents of a branch, best first.
///
/// Branches that do not already contain the child tip come first; within each
/// half the nearest merge base wins, then group priority, then name. Branches
/// with unrelated history are left out.
pub fn parent_candidates<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    branch_name: &str,
    tip: Oid,
) -> Result<Vec<ParentBranch>> {
    let mut candidates = Vec::new();

    for branch in &ctx.branches {
        let name = normalize_branch_name(&branch.name);
        if name == branch_name {
            continue;
        }
        let Some(merge_base) = ctx.repo().merge_base(branch.tip, tip)? else {
            continue;
        };

        candidates.push(ParentBranch {
            name: name.to_string(),
            tip: branch.tip,
            merge_base,
            distance: ctx.graph.distance(Some(merge_base), tip)?,
            group: ctx.resolver.resolve(name).group,
            contains_child: ctx.graph.is_ancestor(tip, branch.tip)?,
        });
    }

    candidates.sort_by(|a, b| {
        a.contains_child
            .cmp(&b.contains_child)
            .then_with(|| a.distance.cmp(&b.distance))
            .then_with(|| a.group.cmp(&b.group))
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(candidates)
}

fn default_increment<R: Repository>(ctx: &CalculationContext<'_, R>) -> VersionField {
    ctx.config
        .defaults
        .increment
        .and_then(|i| i.as_field())
        .unwrap_or(VersionField::Patch)
}

/// Resolve a branch's increment, following `Inherit` through its parents.
///
/// Each step moves to the best parent not yet visited. A branch whose only
/// parents were already visited, or a chain longer than the configured
/// depth, is a cycle.
pub fn resolve_increment<R: Repository>(
    ctx: &CalculationContext<'_, R>,
    branch: &EffectiveConfiguration,
    tip: Oid,
) -> Result<VersionField> {
    if let Some(field) = branch.increment.as_field() {
        return Ok(field);
    }
    if let Some(field) = ctx.increments.borrow().get(&branch.branch_name) {
        return Ok(*field);
    }

    let mut chain = vec![branch.branch_name.clone()];
    let mut visited: HashSet<String> = chain.iter().cloned().collect();
    let mut current_name = branch.branch_name.clone();
    let mut current_tip = tip;

    let field = loop {
        if chain.len() > ctx.config.max_inherit_depth {
            return Err(GitSemverError::cycle(chain));
        }

        let candidates = parent_candidates(ctx, &current_name, current_tip)?;
        let Some(parent) = candidates.iter().find(|p| !visited.contains(&p.name)) else {
            if let Some(first) = candidates.first() {
                chain.push(first.name.clone());
                return Err(GitSemverError::cycle(chain));
            }
            ctx.warn(CalculationWarning::ParentBranchNotFound {
                branch: current_name.clone(),
            });
            break default_increment(ctx);
        };

        debug!(child = %current_name, parent = %parent.name, "following inherited increment");
        visited.insert(parent.name.clone());
        chain.push(parent.name.clone());

        let effective = ctx.resolver.resolve(&parent.name);
        if let Some(field) = effective.increment.as_field() {
            break field;
        }
        current_name = parent.name.clone();
        current_tip = parent.tip;
    };

    ctx.increments
        .borrow_mut()
        .insert(branch.branch_name.clone(), field);
    Ok(field)
}
