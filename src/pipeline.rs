//! Resolve → rescale → derive.
//!
//! [`augment`] never touches the source table: it clones it into a working
//! table and hands that by value through each stage.

use tracing::{debug, info};

use crate::metrics::derive_metrics;
use crate::roles::{resolve_roles, ResolvedRoles, Role, RoleAliases};
use crate::scale::{normalize_percent, ScaleOptions};
use crate::table::Table;

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub aliases: RoleAliases,
    pub scale: ScaleOptions,
}

/// Analysis-ready table plus what the pipeline learned about it.
#[derive(Debug, Clone)]
pub struct Augmented {
    pub table: Table,
    pub roles: ResolvedRoles,
    /// True when the execution percent column was rescaled from fractions.
    pub percent_rescaled: bool,
}

impl Augmented {
    pub fn column(&self, role: Role) -> Option<&str> {
        self.roles.get(role)
    }
}

pub fn augment(source: &Table, options: &PipelineOptions) -> Augmented {
    let roles = resolve_roles(&source.headers(), &options.aliases);
    for (role, header) in roles.iter() {
        debug!(role = %role, header, "resolved column");
    }
    let unresolved = roles.unresolved();
    if !unresolved.is_empty() {
        info!(
            unresolved = ?unresolved.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            "some columns were not found"
        );
    }

    let working = source.clone();
    let (working, percent_rescaled) = match roles.get(Role::ExecutionPercent) {
        Some(column) => normalize_percent(working, column, &options.scale),
        None => (working, false),
    };
    if percent_rescaled {
        info!("execution percent stored as fractions; rescaled to 0-100");
    }
    let table = derive_metrics(working, &roles);

    Augmented {
        table,
        roles,
        percent_rescaled,
    }
}
