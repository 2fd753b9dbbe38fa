//! Semantic column roles and header resolution.
//!
//! Workbooks from different years and offices name the same field differently
//! ("PIM", "Presupuesto Institucional Modificado", "pim 2021", ...). Each [`Role`]
//! carries an ordered list of aliases; [`resolve_roles`] maps every role to at
//! most one actual header.
//!
//! Matching is case-insensitive on trimmed headers:
//!
//! 1. An alias equal to a header wins outright. All aliases are tried for an
//!    exact match before any substring scan, so an exact hit is never shadowed
//!    by an earlier alias that merely appears inside another header.
//! 2. Otherwise aliases are tried in order, and for each one the headers are
//!    scanned in their original order for the first that contains the alias.
//!
//! When two headers are equal after trimming and lowercasing, the exact index
//! keeps the last one. Substring scans still visit every header in order.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Entity,
    GovernmentType,
    InitialBudget,
    ModifiedBudget,
    ExecutionPercent,
    Population,
    ScorePim,
    ScoreExecution,
    ScorePopulation,
    TotalScore,
    Rank,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Entity,
        Role::GovernmentType,
        Role::InitialBudget,
        Role::ModifiedBudget,
        Role::ExecutionPercent,
        Role::Population,
        Role::ScorePim,
        Role::ScoreExecution,
        Role::ScorePopulation,
        Role::TotalScore,
        Role::Rank,
    ];

    /// Key used in the `[roles]` config section.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Entity => "entity",
            Role::GovernmentType => "government_type",
            Role::InitialBudget => "initial_budget",
            Role::ModifiedBudget => "modified_budget",
            Role::ExecutionPercent => "execution_percent",
            Role::Population => "population",
            Role::ScorePim => "score_pim",
            Role::ScoreExecution => "score_execution",
            Role::ScorePopulation => "score_population",
            Role::TotalScore => "total_score",
            Role::Rank => "rank",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        let name = name.trim().to_lowercase();
        Role::ALL.into_iter().find(|r| r.as_str() == name)
    }

    /// Human label used in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Role::Entity => "Entity",
            Role::GovernmentType => "Government type",
            Role::InitialBudget => "PIA",
            Role::ModifiedBudget => "PIM",
            Role::ExecutionPercent => "Execution %",
            Role::Population => "Population",
            Role::ScorePim => "Score PIM",
            Role::ScoreExecution => "Score execution",
            Role::ScorePopulation => "Score population",
            Role::TotalScore => "Total score",
            Role::Rank => "Rank",
        }
    }

    pub fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Role::Entity => &[
                "gobierno",
                "entidad",
                "municipalidad",
                "gobierno local",
                "nombre",
                "region",
                "unidad",
            ],
            Role::GovernmentType => &[
                "tipo",
                "nivel de gobierno",
                "tipo gobierno",
                "gobierno regional",
                "gobierno local",
            ],
            Role::InitialBudget => &["pia", "presupuesto inicial de apertura"],
            Role::ModifiedBudget => &["pim", "presupuesto institucional modificado"],
            Role::ExecutionPercent => &["avance %", "avance%", "avance", "ejecución", "ejecucion"],
            Role::Population => &["población", "poblacion", "hab", "habitantes"],
            Role::ScorePim => &["puntaje pim", "punt pim", "score pim"],
            Role::ScoreExecution => &["puntaje avance", "punt avance", "score avance"],
            Role::ScorePopulation => &["puntaje población", "punt poblacion", "score poblacion"],
            Role::TotalScore => &[
                "total",
                "puntaje total",
                "score total",
                "orden presupuestal total",
            ],
            Role::Rank => &["orden presupuestal", "ranking", "posicion", "posición"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered candidate aliases for every role.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAliases {
    aliases: BTreeMap<Role, Vec<String>>,
}

impl Default for RoleAliases {
    fn default() -> Self {
        let aliases = Role::ALL
            .into_iter()
            .map(|role| {
                let list = role
                    .default_aliases()
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                (role, list)
            })
            .collect();
        Self { aliases }
    }
}

impl RoleAliases {
    /// Replace the aliases of a role.
    pub fn with_role(mut self, role: Role, aliases: Vec<String>) -> Self {
        self.aliases.insert(role, aliases);
        self
    }

    pub fn get(&self, role: Role) -> &[String] {
        self.aliases.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Case-insensitive index over a header list.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    exact: HashMap<String, String>,
    ordered: Vec<(String, String)>,
}

impl HeaderIndex {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut index = HeaderIndex::default();
        for header in headers {
            let original = header.as_ref();
            let key = original.trim().to_lowercase();
            // Last duplicate wins.
            index.exact.insert(key.clone(), original.to_string());
            index.ordered.push((key, original.to_string()));
        }
        index
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// First header matching the candidates, see the module docs for precedence.
    pub fn find<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&str> {
        let normalized: Vec<String> = candidates
            .iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        if let Some(hit) = normalized.iter().find_map(|c| self.exact.get(c)) {
            return Some(hit.as_str());
        }
        normalized.iter().find_map(|c| {
            self.ordered
                .iter()
                .find(|(key, _)| key.contains(c.as_str()))
                .map(|(_, original)| original.as_str())
        })
    }
}

/// Find the header matching one candidate list.
pub fn find_column<H: AsRef<str>, C: AsRef<str>>(headers: &[H], candidates: &[C]) -> Option<String> {
    HeaderIndex::new(headers).find(candidates).map(str::to_string)
}

/// Role → header mapping. Roles without a match are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRoles {
    columns: BTreeMap<Role, String>,
}

impl ResolvedRoles {
    pub fn get(&self, role: Role) -> Option<&str> {
        self.columns.get(&role).map(String::as_str)
    }

    pub fn is_resolved(&self, role: Role) -> bool {
        self.columns.contains_key(&role)
    }

    pub fn insert(&mut self, role: Role, header: impl Into<String>) {
        self.columns.insert(role, header.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &str)> {
        self.columns.iter().map(|(r, h)| (*r, h.as_str()))
    }

    pub fn unresolved(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|r| !self.columns.contains_key(r))
            .collect()
    }

    /// First resolved role of the list, with its header.
    pub fn first_of(&self, roles: &[Role]) -> Option<(Role, &str)> {
        roles
            .iter()
            .find_map(|r| self.get(*r).map(|header| (*r, header)))
    }
}

/// Resolve every role against the header list.
pub fn resolve_roles<S: AsRef<str>>(headers: &[S], aliases: &RoleAliases) -> ResolvedRoles {
    let index = HeaderIndex::new(headers);
    let mut resolved = ResolvedRoles::default();
    for role in Role::ALL {
        if let Some(header) = index.find(aliases.get(role)) {
            resolved.insert(role, header);
        }
    }
    resolved
}
