//! Container instantiations whose elements copy on resize.

use serde::Serialize;

use super::chain::{self, CausalStep, Chain};
use super::predicate::will_degrade_to_copy;
use crate::diagnostics::{Diagnostic, DiagnosticSink, VECTOR_PESSIMIZATION, templates};
use crate::oracle::ExceptionOracle;
use crate::query::TypeQuery;
use crate::types::{SourceLocation, TypeId};

/// A use of a growable container specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instantiation {
    /// Qualified template name, e.g. `::std::vector`
    pub container: String,
    /// Specialization as written, e.g. `vector<MoveConstructorThrows>`
    pub spelling: String,
    pub element: TypeId,
    /// Start of the container type at the use site
    pub location: SourceLocation,
}

impl Instantiation {
    pub fn new(
        container: impl Into<String>,
        spelling: impl Into<String>,
        element: TypeId,
        location: SourceLocation,
    ) -> Self {
        Self {
            container: container.into(),
            spelling: spelling.into(),
            element,
            location,
        }
    }
}

/// One warning plus the causal chain explaining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PessimizationReport {
    /// Display name of the element type
    pub element: String,
    pub warning: Diagnostic,
    pub chain: Vec<CausalStep>,
    /// See [`Chain::truncated`]
    pub truncated: bool,
}

impl PessimizationReport {
    pub fn notes(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.chain.iter().map(CausalStep::to_note)
    }

    /// Warning followed by its notes.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        std::iter::once(self.warning.clone())
            .chain(self.notes())
            .collect()
    }

    pub fn emit(&self, sink: &mut dyn DiagnosticSink) {
        sink.emit(self.warning.clone());
        for note in self.notes() {
            sink.emit(note);
        }
    }
}

/// `None` unless the element type degrades to copying.
pub(crate) fn analyze_instantiation(
    types: &dyn TypeQuery,
    oracle: &dyn ExceptionOracle,
    max_depth: usize,
    site: &Instantiation,
) -> Option<PessimizationReport> {
    if !will_degrade_to_copy(types, oracle, site.element) {
        return None;
    }

    let element = types.display_name(site.element);
    tracing::debug!("{} at {} degrades to copying", site.spelling, site.location);

    let warning = Diagnostic::warning(
        VECTOR_PESSIMIZATION,
        site.location.clone(),
        templates::WILL_COPY_ON_RESIZE,
        vec![site.spelling.clone(), element.clone()],
    );

    let mut explanation = Chain::default();
    chain::explain(types, oracle, site.element, 1, max_depth, &mut explanation);

    Some(PessimizationReport {
        element,
        warning,
        chain: explanation.steps,
        truncated: explanation.truncated,
    })
}
