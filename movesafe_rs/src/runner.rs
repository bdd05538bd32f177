//! Batch checker.
//!
//! Applies configuration and suppressions to the sites a host collected for
//! one translation unit (or a whole project) and streams the resulting
//! diagnostics into a sink.

use serde::Serialize;
use std::collections::HashMap;

use crate::analyzer::{InitListSite, Instantiation, MoveSafety};
use crate::config::MovesafeConfig;
use crate::diagnostics::DiagnosticSink;
use crate::oracle::ExceptionOracle;
use crate::query::TypeQuery;
use crate::suppressions::{CheckKind, Suppressions};

/// Summary statistics for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    /// Warnings emitted
    pub reported: usize,
    /// Findings dropped by a suppression
    pub suppressed: usize,
    /// Sites ignored because the check is off or the container is not configured
    pub skipped: usize,
    /// Warnings per check name
    pub by_check: HashMap<String, usize>,
}

impl CheckSummary {
    fn record(&mut self, check: CheckKind) {
        self.reported += 1;
        *self
            .by_check
            .entry(check.check_name().to_string())
            .or_default() += 1;
    }

    pub fn merge(&mut self, other: CheckSummary) {
        self.reported += other.reported;
        self.suppressed += other.suppressed;
        self.skipped += other.skipped;
        for (check, count) in other.by_check {
            *self.by_check.entry(check).or_default() += count;
        }
    }
}

pub struct Checker<'a> {
    analysis: MoveSafety<'a>,
    config: &'a MovesafeConfig,
    suppressions: &'a Suppressions,
}

impl<'a> Checker<'a> {
    pub fn new(
        types: &'a dyn TypeQuery,
        oracle: &'a dyn ExceptionOracle,
        config: &'a MovesafeConfig,
        suppressions: &'a Suppressions,
    ) -> Self {
        let analysis = MoveSafety::new(types, oracle)
            .with_max_depth(config.vector_pessimization.max_depth);
        Self {
            analysis,
            config,
            suppressions,
        }
    }

    pub fn analysis(&self) -> &MoveSafety<'a> {
        &self.analysis
    }

    pub fn check_instantiations(
        &self,
        sites: &[Instantiation],
        sink: &mut dyn DiagnosticSink,
    ) -> CheckSummary {
        let mut summary = CheckSummary::default();
        let config = &self.config.vector_pessimization;

        for site in sites {
            if !config.enabled || !config.matches(&site.container) {
                summary.skipped += 1;
                continue;
            }
            let Some(report) = self.analysis.analyze_instantiation(site) else {
                continue;
            };
            if self.suppressions.is_suppressed(
                CheckKind::VectorPessimization,
                &report.element,
                Some(&site.location.file),
            ) {
                tracing::debug!("suppressed {} at {}", report.element, site.location);
                summary.suppressed += 1;
                continue;
            }
            report.emit(sink);
            summary.record(CheckKind::VectorPessimization);
        }

        tracing::info!(
            "vector pessimization: {} reported, {} suppressed, {} skipped",
            summary.reported,
            summary.suppressed,
            summary.skipped
        );
        summary
    }

    pub fn check_init_lists(
        &self,
        sites: &[InitListSite],
        sink: &mut dyn DiagnosticSink,
    ) -> CheckSummary {
        let mut summary = CheckSummary::default();
        let config = &self.config.vector_initializer_list;

        for site in sites {
            if !config.enabled || !config.matches(&site.container) {
                summary.skipped += 1;
                continue;
            }
            let Some(finding) = self.analysis.analyze_init_list(site) else {
                continue;
            };
            let element = self.analysis.display_name(site.element);
            if self.suppressions.is_suppressed(
                CheckKind::VectorInitializerList,
                &element,
                Some(&site.location.file),
            ) {
                summary.suppressed += 1;
                continue;
            }
            finding.emit(sink);
            summary.record(CheckKind::VectorInitializerList);
        }

        tracing::info!(
            "vector initializer lists: {} reported, {} suppressed, {} skipped",
            summary.reported,
            summary.suppressed,
            summary.skipped
        );
        summary
    }

    /// Both checks over one batch.
    pub fn check_all(
        &self,
        instantiations: &[Instantiation],
        init_lists: &[InitListSite],
        sink: &mut dyn DiagnosticSink,
    ) -> CheckSummary {
        let mut summary = self.check_instantiations(instantiations, sink);
        summary.merge(self.check_init_lists(init_lists, sink));
        summary
    }
}
