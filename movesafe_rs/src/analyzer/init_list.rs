//! Containers constructed from an initializer list.
//!
//! The backing array of an initializer list is const, so every element is
//! copied into the container. For element types that are expensive to copy
//! the remedy is to `reserve` and `push_back` instead; where that code goes
//! depends on the construction context.

use serde::Serialize;

use super::predicate::is_trivially_copyable;
use crate::diagnostics::{Diagnostic, DiagnosticSink, VECTOR_INITIALIZER_LIST, templates};
use crate::query::TypeQuery;
use crate::types::{SourceLocation, TypeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitContext {
    /// `std::vector<T> v{...};`
    Variable { name: String },
    /// `return {...};`
    Return,
    /// Anywhere else, e.g. a conditional operand
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitListSite {
    /// Qualified template name, e.g. `::std::vector`
    pub container: String,
    /// Specialization as written, e.g. `vector<Test>`
    pub spelling: String,
    pub element: TypeId,
    /// Location of the initializer list
    pub location: SourceLocation,
    /// Number of initializers in the list
    pub elements: usize,
    pub context: InitContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitListFinding {
    pub warning: Diagnostic,
    pub remedy: Diagnostic,
}

impl InitListFinding {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        vec![self.warning.clone(), self.remedy.clone()]
    }

    pub fn emit(&self, sink: &mut dyn DiagnosticSink) {
        sink.emit(self.warning.clone());
        sink.emit(self.remedy.clone());
    }
}

/// `None` for empty lists, trivially copyable elements and incomplete
/// element types.
pub(crate) fn analyze_init_list(
    types: &dyn TypeQuery,
    site: &InitListSite,
) -> Option<InitListFinding> {
    if site.elements == 0 {
        return None;
    }
    if !types.kind(site.element).is_scalar() && types.definition(site.element).is_none() {
        return None;
    }
    if is_trivially_copyable(types, site.element) {
        return None;
    }

    let count = site.elements.to_string();
    let (template, args) = match &site.context {
        InitContext::Variable { name } => {
            (templates::INIT_LIST_INTO_VARIABLE, vec![count, name.clone()])
        }
        InitContext::Return => (templates::INIT_LIST_BEFORE_RETURN, vec![count]),
        InitContext::Expression => (templates::INIT_LIST_IN_LAMBDA, vec![count]),
    };

    Some(InitListFinding {
        warning: Diagnostic::warning(
            VECTOR_INITIALIZER_LIST,
            site.location.clone(),
            templates::INIT_LIST_COPIES,
            vec![site.spelling.clone()],
        ),
        remedy: Diagnostic::note(VECTOR_INITIALIZER_LIST, site.location.clone(), template, args),
    })
}
