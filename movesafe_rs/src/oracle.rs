//! Exception-specification oracle.
//!
//! The analyzer never reads exception specifications itself; it asks an
//! [`ExceptionOracle`] whether a constructor may throw. [`ExceptionSpecAnalyzer`]
//! is the built-in oracle: it reads the declared specification and, for
//! defaulted constructors, derives the answer from the subobjects.
//!
//! Results are memoized per [`CtorId`] for the analyzer's lifetime. The type
//! system is immutable during a run, so entries are never invalidated.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;

use crate::query::TypeQuery;
use crate::types::{CtorDecl, CtorId, CtorKind, ExceptionSpec, TypeId};

/// Tri-state answer of an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionState {
    NotThrowing,
    Throwing,
    /// Could not be decided. Never counts as proof of safety.
    Unknown,
}

impl ExceptionState {
    /// Worst of two states: Throwing beats Unknown beats NotThrowing.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Throwing, _) | (_, Self::Throwing) => Self::Throwing,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            _ => Self::NotThrowing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotThrowing => "not-throwing",
            Self::Throwing => "throwing",
            Self::Unknown => "unknown",
        }
    }
}

/// Classifies whether a constructor may throw.
///
/// Implementations may be shared across threads that analyze independent
/// translation units, hence the `Send + Sync` bound.
pub trait ExceptionOracle: Send + Sync {
    fn classify(&self, types: &dyn TypeQuery, ctor: &CtorDecl) -> ExceptionState;
}

/// Built-in oracle with a concurrent lookup-or-compute cache.
#[derive(Debug, Default)]
pub struct ExceptionSpecAnalyzer {
    cache: DashMap<CtorId, ExceptionState>,
}

impl ExceptionSpecAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized constructors.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn analyze(&self, types: &dyn TypeQuery, ctor: &CtorDecl) -> ExceptionState {
        if let Some(hit) = self.cache.get(&ctor.id) {
            tracing::trace!("exception spec cache hit for ctor {:?}", ctor.id);
            return *hit;
        }

        // Guard dropped above: the derived analysis re-enters the cache.
        let state = self.compute(types, ctor);
        tracing::trace!(
            "classified ctor {:?} of type {:?}: {}",
            ctor.id,
            ctor.owner,
            state.as_str()
        );
        self.cache.insert(ctor.id, state);
        state
    }

    fn compute(&self, types: &dyn TypeQuery, ctor: &CtorDecl) -> ExceptionState {
        match ctor.spec {
            ExceptionSpec::Noexcept | ExceptionSpec::ThrowNone => ExceptionState::NotThrowing,
            ExceptionSpec::NoexceptFalse | ExceptionSpec::Throw => ExceptionState::Throwing,
            ExceptionSpec::Unevaluated => ExceptionState::Unknown,
            ExceptionSpec::Unspecified if ctor.user_provided => ExceptionState::Throwing,
            ExceptionSpec::Unspecified => self.analyze_defaulted(types, ctor),
        }
    }

    /// A defaulted special member throws iff one of the subobject operations
    /// it invokes throws.
    fn analyze_defaulted(&self, types: &dyn TypeQuery, ctor: &CtorDecl) -> ExceptionState {
        if ctor.kind == CtorKind::Other {
            return ExceptionState::Unknown;
        }
        let Some(record) = types.definition(ctor.owner) else {
            return ExceptionState::Unknown;
        };

        let mut state = ExceptionState::NotThrowing;
        let bases = record.bases.iter().map(|b| (b.ty.ty, ctor.kind));
        let fields = record.fields.iter().map(|f| {
            // Moving from a const member selects its copy constructor.
            let kind = if ctor.kind == CtorKind::Move && f.ty.qualifiers.is_const {
                CtorKind::Copy
            } else {
                ctor.kind
            };
            (f.ty.ty, kind)
        });

        for (ty, kind) in bases.chain(fields) {
            state = state.combine(self.subobject(types, ty, kind));
            if state == ExceptionState::Throwing {
                break;
            }
        }
        state
    }

    fn subobject(&self, types: &dyn TypeQuery, ty: TypeId, kind: CtorKind) -> ExceptionState {
        if types.kind(ty).is_scalar() {
            return ExceptionState::NotThrowing;
        }
        let Some(record) = types.definition(ty) else {
            return ExceptionState::Unknown;
        };
        if record.trivially_copyable && kind != CtorKind::Default {
            return ExceptionState::NotThrowing;
        }

        let selected = match kind {
            CtorKind::Move => record
                .move_constructor()
                .or_else(|| record.copy_constructor()),
            CtorKind::Copy => record.copy_constructor(),
            CtorKind::Default => record.ctors.iter().find(|c| c.kind == CtorKind::Default),
            CtorKind::Other => None,
        };
        match selected {
            Some(ctor) => self.analyze(types, ctor),
            None => ExceptionState::Unknown,
        }
    }
}

impl ExceptionOracle for ExceptionSpecAnalyzer {
    fn classify(&self, types: &dyn TypeQuery, ctor: &CtorDecl) -> ExceptionState {
        self.analyze(types, ctor)
    }
}

/// Oracle backed by answers the host computed up front.
#[derive(Debug, Clone)]
pub struct StaticOracle {
    answers: HashMap<CtorId, ExceptionState>,
    fallback: ExceptionState,
}

impl StaticOracle {
    /// `fallback` answers every constructor without a recorded classification.
    pub fn new(fallback: ExceptionState) -> Self {
        Self {
            answers: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, ctor: CtorId, state: ExceptionState) -> Self {
        self.answers.insert(ctor, state);
        self
    }

    pub fn insert(&mut self, ctor: CtorId, state: ExceptionState) {
        self.answers.insert(ctor, state);
    }
}

impl Default for StaticOracle {
    fn default() -> Self {
        Self::new(ExceptionState::Unknown)
    }
}

impl ExceptionOracle for StaticOracle {
    fn classify(&self, _types: &dyn TypeQuery, ctor: &CtorDecl) -> ExceptionState {
        self.answers.get(&ctor.id).copied().unwrap_or(self.fallback)
    }
}
