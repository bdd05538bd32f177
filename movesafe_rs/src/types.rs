//! Host type model.
//!
//! These are the declarations the analyzer walks. They are owned by the host
//! (usually lowered from a compiler's AST) and only borrowed for the duration
//! of one query.

use serde::Serialize;
use std::fmt;

/// Opaque identity of a nominal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

/// Opaque identity of a constructor declaration.
///
/// Oracle caches are keyed on this, so it must stay stable for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CtorId(pub u32);

/// Position in a source file (1-indexed line and column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Record keyword, as printed in front of a record's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Struct,
    Class,
    Union,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Union => "union",
        }
    }
}

/// Coarse classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// `int`, `double`, `bool`, ...
    Builtin,
    /// Scoped or unscoped enumeration
    Enum,
    /// Pointers, references and member pointers. Relocated bitwise.
    Pointer,
    /// struct / class / union, possibly without a visible definition
    Record(TagKind),
}

impl TypeKind {
    /// Builtins, enums and pointers never need a constructor to relocate.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Record(_))
    }
}

/// Local cv-qualifiers on a use of a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
}

impl Qualifiers {
    pub fn is_empty(&self) -> bool {
        !self.is_const && !self.is_volatile
    }
}

/// A type as spelled at a use site (data member, base specifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    pub ty: TypeId,
    /// Spelling without local qualifiers, e.g. `Inner` or `std::string`
    pub spelling: String,
    #[serde(skip_serializing_if = "Qualifiers::is_empty")]
    pub qualifiers: Qualifiers,
}

impl TypeRef {
    pub fn new(ty: TypeId, spelling: impl Into<String>) -> Self {
        Self {
            ty,
            spelling: spelling.into(),
            qualifiers: Qualifiers::default(),
        }
    }

    pub fn with_const(mut self) -> Self {
        self.qualifiers.is_const = true;
        self
    }

    pub fn with_volatile(mut self) -> Self {
        self.qualifiers.is_volatile = true;
        self
    }

    /// Spelling with local qualifiers stripped.
    pub fn unqualified(&self) -> &str {
        &self.spelling
    }

    /// Spelling as written, qualifiers included.
    pub fn written(&self) -> String {
        let mut out = String::new();
        if self.qualifiers.is_const {
            out.push_str("const ");
        }
        if self.qualifiers.is_volatile {
            out.push_str("volatile ");
        }
        out.push_str(&self.spelling);
        out
    }
}

/// Which special member a constructor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CtorKind {
    Default,
    Copy,
    Move,
    Other,
}

/// Declared exception specification of a constructor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionSpec {
    /// Nothing written
    #[default]
    Unspecified,
    /// `noexcept` / `noexcept(true)`
    Noexcept,
    /// `noexcept(false)`
    NoexceptFalse,
    /// `throw()`
    ThrowNone,
    /// `throw(T, ...)`
    Throw,
    /// Dependent or not yet instantiated
    Unevaluated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CtorDecl {
    pub id: CtorId,
    /// Record declaring this constructor
    pub owner: TypeId,
    pub kind: CtorKind,
    /// False for implicit and `= default` constructors
    pub user_provided: bool,
    pub spec: ExceptionSpec,
    pub location: SourceLocation,
}

impl CtorDecl {
    pub fn is_move(&self) -> bool {
        self.kind == CtorKind::Move
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseSpec {
    pub ty: TypeRef,
    pub is_virtual: bool,
    /// Start of the base specifier
    pub location: SourceLocation,
}

/// Definition of a struct, class or union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDecl {
    pub tag: TagKind,
    /// Fully qualified name without leading `::`, e.g. `Outer::Inner`
    pub name: String,
    pub location: SourceLocation,
    pub trivially_copyable: bool,
    /// Declaration order
    pub ctors: Vec<CtorDecl>,
    /// Declaration order
    pub fields: Vec<FieldDecl>,
    /// Declaration order
    pub bases: Vec<BaseSpec>,
}

impl RecordDecl {
    /// `struct Outer::Inner`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.tag.as_str(), self.name)
    }

    /// First declared move constructor, user-provided or not.
    pub fn move_constructor(&self) -> Option<&CtorDecl> {
        self.ctors.iter().find(|c| c.is_move())
    }

    /// First declared copy constructor.
    pub fn copy_constructor(&self) -> Option<&CtorDecl> {
        self.ctors.iter().find(|c| c.kind == CtorKind::Copy)
    }

    /// First move constructor the user wrote a body for.
    pub fn user_move_constructor(&self) -> Option<&CtorDecl> {
        self.ctors.iter().find(|c| c.is_move() && c.user_provided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, column: u32) -> SourceLocation {
        SourceLocation::new("t.cpp", line, column)
    }

    fn ctor(id: u32, kind: CtorKind, user_provided: bool) -> CtorDecl {
        CtorDecl {
            id: CtorId(id),
            owner: TypeId(0),
            kind,
            user_provided,
            spec: ExceptionSpec::Unspecified,
            location: loc(id, 5),
        }
    }

    #[test]
    fn type_ref_spellings() {
        let r = TypeRef::new(TypeId(3), "MoveConstructorThrows").with_const();
        assert_eq!(r.unqualified(), "MoveConstructorThrows");
        assert_eq!(r.written(), "const MoveConstructorThrows");

        let plain = TypeRef::new(TypeId(3), "Inner");
        assert_eq!(plain.written(), "Inner");
    }

    #[test]
    fn record_display_uses_tag_keyword() {
        let record = RecordDecl {
            tag: TagKind::Class,
            name: "Outer::Inner".into(),
            location: loc(1, 7),
            trivially_copyable: false,
            ctors: vec![],
            fields: vec![],
            bases: vec![],
        };
        assert_eq!(record.display_name(), "class Outer::Inner");
    }

    #[test]
    fn constructor_lookups_follow_declaration_order() {
        let record = RecordDecl {
            tag: TagKind::Struct,
            name: "S".into(),
            location: loc(1, 8),
            trivially_copyable: false,
            ctors: vec![
                ctor(1, CtorKind::Copy, true),
                ctor(2, CtorKind::Move, false),
                ctor(3, CtorKind::Move, true),
            ],
            fields: vec![],
            bases: vec![],
        };
        assert_eq!(record.move_constructor().map(|c| c.id), Some(CtorId(2)));
        assert_eq!(record.user_move_constructor().map(|c| c.id), Some(CtorId(3)));
        assert_eq!(record.copy_constructor().map(|c| c.id), Some(CtorId(1)));
    }

    #[test]
    fn location_display() {
        assert_eq!(loc(12, 35).to_string(), "t.cpp:12:35");
    }
}
