//! Diagnostics and the sink they are reported to.
//!
//! A [`Diagnostic`] keeps its message template and arguments apart so hosts
//! can localize or re-render them; [`Diagnostic::message`] produces the
//! canonical English text.

use serde::Serialize;
use std::fmt;

use crate::types::SourceLocation;

/// Check emitting the resize-degradation warning and its causal notes.
pub const VECTOR_PESSIMIZATION: &str = "performance-vector-pessimization";

/// Check emitting the initializer-list copy warning.
pub const VECTOR_INITIALIZER_LIST: &str = "performance-vector-initializer-list";

/// Message templates. `%N` is replaced by the N-th argument.
pub mod templates {
    pub const WILL_COPY_ON_RESIZE: &str = "'%0' will copy elements on resize instead of moving because the move constructor of '%1' may throw";
    pub const DEFINED_HERE: &str = "'%0' defined here";
    pub const THROWING_MOVE_CTOR: &str = "throwing move constructor declared here";
    pub const MAY_THROW: &str = "because the move constructor of '%0' may throw";

    pub const INIT_LIST_COPIES: &str =
        "constructing '%0' with an initializer list will cause elements to be copied";
    pub const INIT_LIST_INTO_VARIABLE: &str =
        "reserve %0 elements and push_back them into '%1' after its declaration instead";
    pub const INIT_LIST_BEFORE_RETURN: &str =
        "reserve %0 elements and push_back them into a local vector before returning it instead";
    pub const INIT_LIST_IN_LAMBDA: &str =
        "reserve %0 elements and push_back them inside an immediately invoked lambda instead";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Check that produced this diagnostic
    pub check: &'static str,
    pub severity: Severity,
    pub location: SourceLocation,
    pub template: &'static str,
    pub args: Vec<String>,
}

impl Diagnostic {
    pub fn new(
        check: &'static str,
        severity: Severity,
        location: SourceLocation,
        template: &'static str,
        args: Vec<String>,
    ) -> Self {
        Self {
            check,
            severity,
            location,
            template,
            args,
        }
    }

    pub fn warning(
        check: &'static str,
        location: SourceLocation,
        template: &'static str,
        args: Vec<String>,
    ) -> Self {
        Self::new(check, Severity::Warning, location, template, args)
    }

    pub fn note(
        check: &'static str,
        location: SourceLocation,
        template: &'static str,
        args: Vec<String>,
    ) -> Self {
        Self::new(check, Severity::Note, location, template, args)
    }

    /// Template with `%N` placeholders substituted.
    pub fn message(&self) -> String {
        render(self.template, &self.args)
    }
}

/// `file:line:column: severity: message [check]`, the suffix on warnings and
/// errors only.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message())?;
        if self.severity != Severity::Note {
            write!(f, " [{}]", self.check)?;
        }
        Ok(())
    }
}

/// Substitute `%0`..`%9` in `template`. Placeholders without a matching
/// argument are kept verbatim.
pub fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().and_then(|d| d.to_digit(10)) {
            Some(idx) => {
                chars.next();
                match args.get(idx as usize) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('%');
                        out.push_str(&idx.to_string());
                    }
                }
            }
            None => out.push('%'),
        }
    }
    out
}

/// Receives diagnostics in emission order: each warning is followed by its
/// notes.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("v.cpp", 14, 35)
    }

    #[test]
    fn renders_placeholders_in_order() {
        let msg = render(
            templates::WILL_COPY_ON_RESIZE,
            &["vector<A>".to_string(), "struct A".to_string()],
        );
        assert_eq!(
            msg,
            "'vector<A>' will copy elements on resize instead of moving because the move constructor of 'struct A' may throw"
        );
    }

    #[test]
    fn keeps_unmatched_placeholders_and_bare_percent() {
        assert_eq!(render("%0 and %1", &["x".to_string()]), "x and %1");
        assert_eq!(render("100% sure", &[]), "100% sure");
        assert_eq!(render("trailing %", &[]), "trailing %");
    }

    #[test]
    fn display_matches_compiler_style() {
        let warning = Diagnostic::warning(
            VECTOR_PESSIMIZATION,
            loc(),
            templates::DEFINED_HERE,
            vec!["struct A".into()],
        );
        assert_eq!(
            warning.to_string(),
            "v.cpp:14:35: warning: 'struct A' defined here [performance-vector-pessimization]"
        );

        let note = Diagnostic::note(
            VECTOR_PESSIMIZATION,
            loc(),
            templates::THROWING_MOVE_CTOR,
            vec![],
        );
        assert_eq!(
            note.to_string(),
            "v.cpp:14:35: note: throwing move constructor declared here"
        );
    }

    #[test]
    fn vec_sink_preserves_order() {
        let mut sink: Vec<Diagnostic> = Vec::new();
        sink.emit(Diagnostic::note(VECTOR_PESSIMIZATION, loc(), "first", vec![]));
        sink.emit(Diagnostic::note(VECTOR_PESSIMIZATION, loc(), "second", vec![]));
        let messages: Vec<String> = sink.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
