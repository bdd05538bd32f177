//! Diagnostic conversion
//!
//! Maps movesafe diagnostics to LSP diagnostics. A warning and the notes that
//! follow it become one LSP diagnostic; notes travel as related information
//! when the client supports it and are folded into the message otherwise.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, Location, NumberOrString,
    Position, Range, Url,
};
use movesafe::Severity;
use movesafe::types::SourceLocation;

/// Value of `Diagnostic.source` on everything movesafe publishes.
pub const SOURCE: &str = "movesafe";

/// Client features that change how diagnostics are shaped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientCapabilities {
    /// `textDocument.publishDiagnostics.relatedInformation`
    pub related_information: bool,
}

impl ClientCapabilities {
    pub fn from_lsp(caps: &lsp_types::ClientCapabilities) -> Self {
        let related_information = caps
            .text_document
            .as_ref()
            .and_then(|td| td.publish_diagnostics.as_ref())
            .and_then(|pd| pd.related_information)
            .unwrap_or(false);
        Self {
            related_information,
        }
    }
}

fn position(location: &SourceLocation) -> Position {
    Position {
        line: location.line.saturating_sub(1),
        character: location.column.saturating_sub(1),
    }
}

fn range(location: &SourceLocation) -> Range {
    let at = position(location);
    Range { start: at, end: at }
}

fn severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Note => DiagnosticSeverity::INFORMATION,
    }
}

/// Only absolute paths can be turned into `file://` URIs.
fn file_url(file: &str) -> Option<Url> {
    if !Path::new(file).is_absolute() {
        return None;
    }
    Url::from_file_path(file).ok()
}

/// Convert one primary diagnostic and its notes.
///
/// Notes whose file cannot be addressed by URI are folded into the message
/// even when the client supports related information.
pub fn to_lsp_diagnostic(
    primary: &movesafe::Diagnostic,
    notes: &[movesafe::Diagnostic],
    caps: ClientCapabilities,
) -> Diagnostic {
    let mut message = primary.message();
    let mut related = Vec::new();

    for note in notes {
        let uri = if caps.related_information {
            file_url(&note.location.file)
        } else {
            None
        };
        match uri {
            Some(uri) => related.push(DiagnosticRelatedInformation {
                location: Location {
                    uri,
                    range: range(&note.location),
                },
                message: note.message(),
            }),
            None => {
                message.push_str("\n\n");
                message.push_str(&note.to_string());
            }
        }
    }

    Diagnostic {
        range: range(&primary.location),
        severity: Some(severity(primary.severity)),
        code: Some(NumberOrString::String(primary.check.to_string())),
        code_description: None,
        source: Some(SOURCE.to_string()),
        message,
        related_information: if related.is_empty() {
            None
        } else {
            Some(related)
        },
        tags: None,
        data: None,
    }
}

/// Relative paths are taken against `root`; absolute ones pass through.
fn resolve(diagnostic: &movesafe::Diagnostic, root: Option<&Path>) -> movesafe::Diagnostic {
    let mut resolved = diagnostic.clone();
    if let Some(root) = root {
        let file = Path::new(&diagnostic.location.file);
        if !file.is_absolute() {
            let joined: PathBuf = root.join(file);
            resolved.location.file = joined.to_string_lossy().into_owned();
        }
    }
    resolved
}

/// Split a flat warning-then-notes stream into per-document diagnostics.
///
/// Each non-note diagnostic opens a group that collects the notes after it.
/// Relative paths are resolved against `root` (usually the workspace folder).
/// Leading notes without a primary, and primaries whose file still has no
/// absolute path, are dropped.
pub fn group_by_document(
    diagnostics: &[movesafe::Diagnostic],
    caps: ClientCapabilities,
    root: Option<&Path>,
) -> HashMap<Url, Vec<Diagnostic>> {
    let mut out: HashMap<Url, Vec<Diagnostic>> = HashMap::new();
    let mut rest = diagnostics;

    while let Some(start) = rest.iter().position(|d| d.severity != Severity::Note) {
        if start > 0 {
            tracing::debug!("dropping {} notes without a primary diagnostic", start);
        }
        let primary = &rest[start];
        let tail = &rest[start + 1..];
        let len = tail
            .iter()
            .position(|d| d.severity != Severity::Note)
            .unwrap_or(tail.len());
        let notes = &tail[..len];
        rest = &tail[len..];

        let primary = resolve(primary, root);
        let Some(uri) = file_url(&primary.location.file) else {
            tracing::warn!(
                "dropping diagnostic at {}: no document URI for a relative path",
                primary.location
            );
            continue;
        };
        let notes: Vec<movesafe::Diagnostic> = notes.iter().map(|n| resolve(n, root)).collect();
        out.entry(uri)
            .or_default()
            .push(to_lsp_diagnostic(&primary, &notes, caps));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use movesafe::diagnostics::{VECTOR_PESSIMIZATION, templates};
    use pretty_assertions::assert_eq;

    fn warning(file: &str) -> movesafe::Diagnostic {
        movesafe::Diagnostic::warning(
            VECTOR_PESSIMIZATION,
            SourceLocation::new(file, 14, 35),
            templates::WILL_COPY_ON_RESIZE,
            vec![
                "vector<MoveConstructorThrows>".into(),
                "struct MoveConstructorThrows".into(),
            ],
        )
    }

    fn notes(file: &str) -> Vec<movesafe::Diagnostic> {
        vec![
            movesafe::Diagnostic::note(
                VECTOR_PESSIMIZATION,
                SourceLocation::new(file, 9, 8),
                templates::DEFINED_HERE,
                vec!["struct MoveConstructorThrows".into()],
            ),
            movesafe::Diagnostic::note(
                VECTOR_PESSIMIZATION,
                SourceLocation::new(file, 11, 5),
                templates::THROWING_MOVE_CTOR,
                vec![],
            ),
        ]
    }

    #[test]
    fn positions_are_zero_based() {
        let diag = to_lsp_diagnostic(&warning("/src/a.cpp"), &[], ClientCapabilities::default());
        assert_eq!(diag.range.start, Position { line: 13, character: 34 });
        assert_eq!(diag.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(
            diag.code,
            Some(NumberOrString::String(
                "performance-vector-pessimization".to_string()
            ))
        );
        assert_eq!(diag.source.as_deref(), Some("movesafe"));
        assert!(diag.related_information.is_none());
    }

    #[test]
    fn notes_become_related_information() {
        let caps = ClientCapabilities {
            related_information: true,
        };
        let diag = to_lsp_diagnostic(&warning("/src/a.cpp"), &notes("/src/a.h"), caps);
        let related = diag.related_information.expect("related");
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].message, "'struct MoveConstructorThrows' defined here");
        assert_eq!(related[1].location.range.start, Position { line: 10, character: 4 });
        assert_eq!(related[1].location.uri.path(), "/src/a.h");
        assert!(!diag.message.contains("note:"));
    }

    #[test]
    fn notes_fold_into_message_without_support() {
        let diag = to_lsp_diagnostic(
            &warning("/src/a.cpp"),
            &notes("/src/a.h"),
            ClientCapabilities::default(),
        );
        assert!(diag.related_information.is_none());
        assert!(diag.message.ends_with(
            "\n\n/src/a.h:9:8: note: 'struct MoveConstructorThrows' defined here\
             \n\n/src/a.h:11:5: note: throwing move constructor declared here"
        ));
    }

    #[test]
    fn relative_note_paths_are_folded() {
        let caps = ClientCapabilities {
            related_information: true,
        };
        let diag = to_lsp_diagnostic(&warning("/src/a.cpp"), &notes("a.h"), caps);
        assert!(diag.related_information.is_none());
        assert!(diag.message.contains("a.h:11:5: note:"));
    }

    #[test]
    fn groups_warnings_with_their_notes() {
        let mut stream = vec![notes("/src/orphan.h")[0].clone()];
        stream.push(warning("/src/a.cpp"));
        stream.extend(notes("/src/a.h"));
        stream.push(warning("/src/b.cpp"));
        stream.push(warning("relative.cpp"));
        stream.extend(notes("/src/a.h"));

        let caps = ClientCapabilities {
            related_information: true,
        };
        let grouped = group_by_document(&stream, caps, None);
        assert_eq!(grouped.len(), 2);

        let a = &grouped[&Url::from_file_path("/src/a.cpp").unwrap()];
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].related_information.as_ref().map(Vec::len), Some(2));

        let b = &grouped[&Url::from_file_path("/src/b.cpp").unwrap()];
        assert_eq!(b.len(), 1);
        assert!(b[0].related_information.is_none());
    }

    #[test]
    fn relative_paths_resolve_against_the_root() {
        let mut stream = vec![warning("src/a.cpp")];
        stream.extend(notes("include/a.h"));
        let caps = ClientCapabilities {
            related_information: true,
        };

        assert!(group_by_document(&stream, caps, None).is_empty());

        let grouped = group_by_document(&stream, caps, Some(Path::new("/work")));
        let a = &grouped[&Url::from_file_path("/work/src/a.cpp").unwrap()];
        assert_eq!(a.len(), 1);
        let related = a[0].related_information.as_ref().expect("related");
        assert_eq!(related.len(), 2);
        assert_eq!(related[0].location.uri.path(), "/work/include/a.h");
    }

    #[test]
    fn capabilities_from_lsp() {
        let mut caps = lsp_types::ClientCapabilities::default();
        assert!(!ClientCapabilities::from_lsp(&caps).related_information);

        caps.text_document = Some(lsp_types::TextDocumentClientCapabilities {
            publish_diagnostics: Some(lsp_types::PublishDiagnosticsClientCapabilities {
                related_information: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(ClientCapabilities::from_lsp(&caps).related_information);
    }
}
