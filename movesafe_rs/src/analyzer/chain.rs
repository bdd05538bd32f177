//! Causal chain explaining why a type degrades to copying.
//!
//! Rules are evaluated in a fixed order at every level; the first one that
//! matches wins:
//!
//! 1. a user-provided move constructor classified as throwing (root cause,
//!    recursion stops),
//! 2. the first data member whose type degrades,
//! 3. the first non-virtual base whose type degrades.
//!
//! Every level starts with a "defined here" step for the current type. Rules
//! 2 and 3 recurse into the offending type until [`MAX_RECURSION_DEPTH`];
//! past that the chain simply ends.

use serde::Serialize;

use super::predicate::{first_throwing_base, first_throwing_member, throwing_user_move_constructor};
use crate::diagnostics::{Diagnostic, VECTOR_PESSIMIZATION, templates};
use crate::oracle::ExceptionOracle;
use crate::query::TypeQuery;
use crate::types::{SourceLocation, TypeId};

/// Number of levels explained below the queried type, the queried type
/// being level 1.
pub const MAX_RECURSION_DEPTH: usize = 3;

/// What a "may throw" step blames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Origin {
    Member { name: String },
    Base,
}

/// One link of the explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CausalStep {
    /// Locator for the type being explained at this level
    DefinedHere {
        type_name: String,
        location: SourceLocation,
    },
    /// Root cause: a throwing user-provided move constructor
    ThrowingMoveConstructor { location: SourceLocation },
    /// A member or base whose type degrades
    MayThrow {
        origin: Origin,
        type_name: String,
        location: SourceLocation,
    },
}

impl CausalStep {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::DefinedHere { location, .. }
            | Self::ThrowingMoveConstructor { location }
            | Self::MayThrow { location, .. } => location,
        }
    }

    pub fn to_note(&self) -> Diagnostic {
        match self {
            Self::DefinedHere {
                type_name,
                location,
            } => Diagnostic::note(
                VECTOR_PESSIMIZATION,
                location.clone(),
                templates::DEFINED_HERE,
                vec![type_name.clone()],
            ),
            Self::ThrowingMoveConstructor { location } => Diagnostic::note(
                VECTOR_PESSIMIZATION,
                location.clone(),
                templates::THROWING_MOVE_CTOR,
                Vec::new(),
            ),
            Self::MayThrow {
                type_name,
                location,
                ..
            } => Diagnostic::note(
                VECTOR_PESSIMIZATION,
                location.clone(),
                templates::MAY_THROW,
                vec![type_name.clone()],
            ),
        }
    }
}

/// Steps in top-down order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Chain {
    pub steps: Vec<CausalStep>,
    /// The depth bound cut the explanation short. No step marks this.
    pub truncated: bool,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of member/base blame steps.
    pub fn may_throw_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, CausalStep::MayThrow { .. }))
            .count()
    }
}

/// Append the explanation for `ty` at `depth` to `chain`.
pub(crate) fn explain(
    types: &dyn TypeQuery,
    oracle: &dyn ExceptionOracle,
    ty: TypeId,
    depth: usize,
    max_depth: usize,
    chain: &mut Chain,
) {
    let Some(record) = types.definition(ty) else {
        return;
    };
    let type_name = record.display_name();
    tracing::debug!("explaining {} at depth {}", type_name, depth);

    chain.steps.push(CausalStep::DefinedHere {
        type_name,
        location: record.location.clone(),
    });

    if let Some(ctor) = throwing_user_move_constructor(types, oracle, record) {
        chain.steps.push(CausalStep::ThrowingMoveConstructor {
            location: ctor.location.clone(),
        });
        return;
    }

    let next = if let Some(field) = first_throwing_member(types, oracle, record) {
        chain.steps.push(CausalStep::MayThrow {
            origin: Origin::Member {
                name: field.name.clone(),
            },
            type_name: field.ty.unqualified().to_string(),
            location: field.location.clone(),
        });
        field.ty.ty
    } else if let Some(base) = first_throwing_base(types, oracle, record) {
        chain.steps.push(CausalStep::MayThrow {
            origin: Origin::Base,
            type_name: base.ty.written(),
            location: base.location.clone(),
        });
        base.ty.ty
    } else {
        return;
    };

    if depth >= max_depth {
        chain.truncated = types.definition(next).is_some();
        if chain.truncated {
            tracing::debug!("chain truncated at depth {}", depth);
        }
        return;
    }
    explain(types, oracle, next, depth + 1, max_depth, chain);
}
