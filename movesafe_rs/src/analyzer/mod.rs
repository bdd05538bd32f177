//! Move-safety analysis.
//!
//! # Checks
//!
//! | Check | Reports | Severity |
//! |-------|---------|----------|
//! | `performance-vector-pessimization` | element type copies on resize, plus causal notes | warning |
//! | `performance-vector-initializer-list` | container built from an initializer list of non-trivial elements | warning |
//!
//! # Example
//!
//! ```rust
//! use movesafe::analyzer::{Instantiation, MoveSafety};
//! use movesafe::oracle::ExceptionSpecAnalyzer;
//! use movesafe::query::{RecordBuilder, TypeTable};
//! use movesafe::types::{CtorKind, ExceptionSpec, SourceLocation, TagKind};
//!
//! let mut table = TypeTable::new();
//! let ty = table.declare_record(TagKind::Struct, "Widget");
//! table.define(
//!     ty,
//!     RecordBuilder::new(SourceLocation::new("w.h", 1, 8)).user_constructor(
//!         CtorKind::Move,
//!         ExceptionSpec::NoexceptFalse,
//!         SourceLocation::new("w.h", 2, 5),
//!     ),
//! );
//!
//! let oracle = ExceptionSpecAnalyzer::new();
//! let analysis = MoveSafety::new(&table, &oracle);
//! let site = Instantiation::new(
//!     "::std::vector",
//!     "vector<Widget>",
//!     ty,
//!     SourceLocation::new("main.cpp", 4, 10),
//! );
//! let report = analysis.analyze_instantiation(&site).expect("Widget degrades");
//! assert_eq!(report.chain.len(), 2);
//! ```

pub mod chain;
pub mod init_list;
pub mod pessimization;
pub mod predicate;

pub use chain::{CausalStep, Chain, MAX_RECURSION_DEPTH, Origin};
pub use init_list::{InitContext, InitListFinding, InitListSite};
pub use pessimization::{Instantiation, PessimizationReport};

use crate::oracle::ExceptionOracle;
use crate::query::TypeQuery;
use crate::types::TypeId;

/// Borrowed view over a type system and an oracle for one analysis run.
///
/// Holds no mutable state of its own; independent queries may run
/// concurrently as long as the oracle allows it.
#[derive(Clone, Copy)]
pub struct MoveSafety<'a> {
    types: &'a dyn TypeQuery,
    oracle: &'a dyn ExceptionOracle,
    max_depth: usize,
}

impl<'a> MoveSafety<'a> {
    pub fn new(types: &'a dyn TypeQuery, oracle: &'a dyn ExceptionOracle) -> Self {
        Self {
            types,
            oracle,
            max_depth: MAX_RECURSION_DEPTH,
        }
    }

    /// Levels explained below (and including) the element type. Clamped to 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn display_name(&self, ty: TypeId) -> String {
        self.types.display_name(ty)
    }

    pub fn will_degrade_to_copy(&self, ty: TypeId) -> bool {
        predicate::will_degrade_to_copy(self.types, self.oracle, ty)
    }

    /// Causal chain for `ty`, starting at depth 1.
    pub fn explain(&self, ty: TypeId) -> Chain {
        let mut out = Chain::default();
        chain::explain(self.types, self.oracle, ty, 1, self.max_depth, &mut out);
        out
    }

    pub fn analyze_instantiation(&self, site: &Instantiation) -> Option<PessimizationReport> {
        pessimization::analyze_instantiation(self.types, self.oracle, self.max_depth, site)
    }

    pub fn analyze_init_list(&self, site: &InitListSite) -> Option<InitListFinding> {
        init_list::analyze_init_list(self.types, site)
    }
}

impl std::fmt::Debug for MoveSafety<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveSafety")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
