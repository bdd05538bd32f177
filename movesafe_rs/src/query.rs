//! Type/declaration query service.
//!
//! [`TypeQuery`] is the seam to the host: given a [`TypeId`] it answers what
//! kind of type it is, how to print it, and (for complete records) its
//! definition. [`TypeTable`] is an arena-backed implementation hosts can lower
//! their declarations into.

use crate::types::{
    BaseSpec, CtorDecl, CtorId, CtorKind, ExceptionSpec, FieldDecl, RecordDecl, SourceLocation,
    TagKind, TypeId, TypeKind, TypeRef,
};

/// Read-only view of the host's type system.
pub trait TypeQuery {
    fn kind(&self, ty: TypeId) -> TypeKind;

    /// Canonical display name (`int`, `enum E`, `struct Outer::Inner`).
    fn display_name(&self, ty: TypeId) -> String;

    /// Definition of a record type. `None` for non-records and for records
    /// without a visible definition.
    fn definition(&self, ty: TypeId) -> Option<&RecordDecl>;
}

#[derive(Debug, Clone)]
struct TypeEntry {
    kind: TypeKind,
    name: String,
    definition: Option<RecordDecl>,
}

/// In-memory type arena.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
    next_ctor: u32,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: TypeKind, name: impl Into<String>) -> TypeId {
        let id = TypeId(self.entries.len() as u32);
        self.entries.push(TypeEntry {
            kind,
            name: name.into(),
            definition: None,
        });
        id
    }

    pub fn builtin(&mut self, name: impl Into<String>) -> TypeId {
        self.push(TypeKind::Builtin, name)
    }

    pub fn enumeration(&mut self, name: impl Into<String>) -> TypeId {
        self.push(TypeKind::Enum, name)
    }

    /// `name` is the pointer's full spelling, e.g. `MoveConstructorThrows *`.
    pub fn pointer(&mut self, name: impl Into<String>) -> TypeId {
        self.push(TypeKind::Pointer, name)
    }

    /// Declare a record without a definition. Call [`TypeTable::define`] to
    /// complete it.
    pub fn declare_record(&mut self, tag: TagKind, name: impl Into<String>) -> TypeId {
        self.push(TypeKind::Record(tag), name)
    }

    /// Complete a declared record. Constructor identities are allocated here.
    ///
    /// Returns `false` (and leaves the table untouched) when `ty` is not a
    /// declared record.
    pub fn define(&mut self, ty: TypeId, builder: RecordBuilder) -> bool {
        let Some(entry) = self.entries.get(ty.0 as usize) else {
            return false;
        };
        let TypeKind::Record(tag) = entry.kind else {
            return false;
        };
        let name = entry.name.clone();

        let mut ctors = Vec::with_capacity(builder.ctors.len());
        for draft in builder.ctors {
            let id = CtorId(self.next_ctor);
            self.next_ctor += 1;
            ctors.push(CtorDecl {
                id,
                owner: ty,
                kind: draft.kind,
                user_provided: draft.user_provided,
                spec: draft.spec,
                location: draft.location,
            });
        }

        self.entries[ty.0 as usize].definition = Some(RecordDecl {
            tag,
            name,
            location: builder.location,
            trivially_copyable: builder.trivially_copyable,
            ctors,
            fields: builder.fields,
            bases: builder.bases,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeQuery for TypeTable {
    /// Ids this table never handed out answer `Builtin`, so they are never
    /// reported as degrading.
    fn kind(&self, ty: TypeId) -> TypeKind {
        self.entries
            .get(ty.0 as usize)
            .map(|e| e.kind)
            .unwrap_or(TypeKind::Builtin)
    }

    fn display_name(&self, ty: TypeId) -> String {
        match self.entries.get(ty.0 as usize) {
            Some(entry) => match entry.kind {
                TypeKind::Record(tag) => format!("{} {}", tag.as_str(), entry.name),
                TypeKind::Enum => format!("enum {}", entry.name),
                TypeKind::Builtin | TypeKind::Pointer => entry.name.clone(),
            },
            None => format!("<unknown type #{}>", ty.0),
        }
    }

    fn definition(&self, ty: TypeId) -> Option<&RecordDecl> {
        self.entries.get(ty.0 as usize)?.definition.as_ref()
    }
}

#[derive(Debug, Clone)]
struct CtorDraft {
    kind: CtorKind,
    user_provided: bool,
    spec: ExceptionSpec,
    location: SourceLocation,
}

/// Builder for a record definition, consumed by [`TypeTable::define`].
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    location: SourceLocation,
    trivially_copyable: bool,
    ctors: Vec<CtorDraft>,
    fields: Vec<FieldDecl>,
    bases: Vec<BaseSpec>,
}

impl RecordBuilder {
    /// `location` is where the record's name is declared.
    pub fn new(location: SourceLocation) -> Self {
        Self {
            location,
            trivially_copyable: false,
            ctors: Vec::new(),
            fields: Vec::new(),
            bases: Vec::new(),
        }
    }

    pub fn trivially_copyable(mut self, yes: bool) -> Self {
        self.trivially_copyable = yes;
        self
    }

    /// A constructor the user wrote a body for.
    pub fn user_constructor(
        mut self,
        kind: CtorKind,
        spec: ExceptionSpec,
        location: SourceLocation,
    ) -> Self {
        self.ctors.push(CtorDraft {
            kind,
            user_provided: true,
            spec,
            location,
        });
        self
    }

    /// An implicitly declared or `= default` constructor.
    pub fn defaulted_constructor(
        mut self,
        kind: CtorKind,
        spec: ExceptionSpec,
        location: SourceLocation,
    ) -> Self {
        self.ctors.push(CtorDraft {
            kind,
            user_provided: false,
            spec,
            location,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: TypeRef, location: SourceLocation) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
            location,
        });
        self
    }

    pub fn base(mut self, ty: TypeRef, location: SourceLocation) -> Self {
        self.bases.push(BaseSpec {
            ty,
            is_virtual: false,
            location,
        });
        self
    }

    pub fn virtual_base(mut self, ty: TypeRef, location: SourceLocation) -> Self {
        self.bases.push(BaseSpec {
            ty,
            is_virtual: true,
            location,
        });
        self
    }
}
