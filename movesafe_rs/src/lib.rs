//! # movesafe
//!
//! **Move-safety analyzer** - finds container element types whose relocation
//! silently degrades from move to copy, and explains why.
//!
//! A growable container only moves its elements on reallocation when their
//! move constructor is known not to throw. Otherwise it copies them, which is
//! usually far slower and easy to miss. movesafe reports every such element
//! type and walks its members and bases to point at the declaration that
//! causes the problem.
//!
//! ## Features
//!
//! - **Resize pessimization** - warn when `std::vector<T>` will copy on resize
//! - **Causal chains** - bounded, recursive notes down to the throwing constructor
//! - **Initializer lists** - warn when a container is built by copying a list
//! - **Config & suppressions** - `.movesafe/config.toml`, `.movesafe/suppressions.toml`
//!
//! ## Quick Start
//!
//! ```rust
//! use movesafe::{Checker, Diagnostic, ExceptionSpecAnalyzer, Instantiation, MovesafeConfig, Suppressions};
//! use movesafe::query::{RecordBuilder, TypeTable};
//! use movesafe::types::{CtorKind, ExceptionSpec, SourceLocation, TagKind};
//!
//! let mut table = TypeTable::new();
//! let legacy = table.declare_record(TagKind::Struct, "Legacy");
//! table.define(
//!     legacy,
//!     RecordBuilder::new(SourceLocation::new("legacy.h", 1, 8))
//!         .user_constructor(CtorKind::Copy, ExceptionSpec::Unspecified, SourceLocation::new("legacy.h", 2, 5))
//!         .user_constructor(CtorKind::Move, ExceptionSpec::NoexceptFalse, SourceLocation::new("legacy.h", 3, 5)),
//! );
//!
//! let oracle = ExceptionSpecAnalyzer::new();
//! let config = MovesafeConfig::default();
//! let suppressions = Suppressions::default();
//! let checker = Checker::new(&table, &oracle, &config, &suppressions);
//!
//! let site = Instantiation::new("::std::vector", "vector<Legacy>", legacy, SourceLocation::new("main.cpp", 7, 35));
//! let mut out: Vec<Diagnostic> = Vec::new();
//! let summary = checker.check_instantiations(&[site], &mut out);
//!
//! assert_eq!(summary.reported, 1);
//! assert_eq!(
//!     out[0].to_string(),
//!     "main.cpp:7:35: warning: 'vector<Legacy>' will copy elements on resize instead of moving \
//!      because the move constructor of 'struct Legacy' may throw [performance-vector-pessimization]"
//! );
//! ```

// ============================================================================
// Type model
// ============================================================================

/// Identifiers, locations and the declaration records analysis runs over.
pub mod types;

/// The [`TypeQuery`](query::TypeQuery) seam and the in-memory [`TypeTable`](query::TypeTable).
pub mod query;

/// Exception-specification classification of constructors.
///
/// - [`ExceptionSpecAnalyzer`](oracle::ExceptionSpecAnalyzer) - memoizing built-in oracle
/// - [`StaticOracle`](oracle::StaticOracle) - fixed answers, for hosts and tests
pub mod oracle;

// ============================================================================
// Analysis
// ============================================================================

/// Degradation predicate, causal chain builder and the two checks.
///
/// # Submodules
///
/// - [`analyzer::predicate`] - will a type copy instead of move
/// - [`analyzer::chain`] - recursive explanation, bounded by depth
/// - [`analyzer::pessimization`] - container instantiation check
/// - [`analyzer::init_list`] - initializer-list construction check
pub mod analyzer;

/// Diagnostic records, message templates and sinks.
pub mod diagnostics;

// ============================================================================
// Project integration
// ============================================================================

/// `.movesafe/config.toml` loading.
pub mod config;

/// `.movesafe/suppressions.toml` for reviewed findings.
pub mod suppressions;

/// Batch runner applying config and suppressions.
pub mod runner;

// ============================================================================
// Re-exports
// ============================================================================

/// Analysis façade over a type system and an oracle.
pub use analyzer::MoveSafety;

/// Container instantiation site and its report.
pub use analyzer::{Instantiation, PessimizationReport};

/// Initializer-list site and its finding.
pub use analyzer::{InitContext, InitListFinding, InitListSite};

/// Causal chain types.
pub use analyzer::{CausalStep, Chain, MAX_RECURSION_DEPTH};

pub use config::{ConfigError, MovesafeConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use oracle::{ExceptionOracle, ExceptionSpecAnalyzer, ExceptionState};
pub use query::{TypeQuery, TypeTable};
pub use runner::{CheckSummary, Checker};
pub use suppressions::{CheckKind, Suppressions};
