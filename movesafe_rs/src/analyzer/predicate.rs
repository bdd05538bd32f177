//! Degradation predicate and the lookups the causal chain is built from.
//!
//! [`will_degrade_to_copy`] is the single source of truth: a member or base is
//! only ever blamed when its own type satisfies it.

use crate::oracle::{ExceptionOracle, ExceptionState};
use crate::query::TypeQuery;
use crate::types::{BaseSpec, CtorDecl, FieldDecl, RecordDecl, TypeId};

/// Scalars always; records when the host says so. Incomplete records are not.
pub fn is_trivially_copyable(types: &dyn TypeQuery, ty: TypeId) -> bool {
    if types.kind(ty).is_scalar() {
        return true;
    }
    types
        .definition(ty)
        .is_some_and(|record| record.trivially_copyable)
}

/// The first declared move constructor exists and is proven not to throw.
pub fn has_nothrow_move_constructor(
    types: &dyn TypeQuery,
    oracle: &dyn ExceptionOracle,
    record: &RecordDecl,
) -> bool {
    record
        .move_constructor()
        .is_some_and(|ctor| oracle.classify(types, ctor) == ExceptionState::NotThrowing)
}

/// Whether relocating a `ty` falls back to copying.
///
/// False for scalars, for trivially copyable records and for records without
/// a visible definition.
pub fn will_degrade_to_copy(
    types: &dyn TypeQuery,
    oracle: &dyn ExceptionOracle,
    ty: TypeId,
) -> bool {
    !is_trivially_copyable(types, ty)
        && types
            .definition(ty)
            .is_some_and(|record| !has_nothrow_move_constructor(types, oracle, record))
}

/// The first user-provided move constructor, if it is classified as throwing.
pub fn throwing_user_move_constructor<'r>(
    types: &dyn TypeQuery,
    oracle: &dyn ExceptionOracle,
    record: &'r RecordDecl,
) -> Option<&'r CtorDecl> {
    record
        .user_move_constructor()
        .filter(|ctor| oracle.classify(types, ctor) == ExceptionState::Throwing)
}

pub fn first_throwing_member<'r>(
    types: &dyn TypeQuery,
    oracle: &dyn ExceptionOracle,
    record: &'r RecordDecl,
) -> Option<&'r FieldDecl> {
    record
        .fields
        .iter()
        .find(|field| will_degrade_to_copy(types, oracle, field.ty.ty))
}

/// Virtual bases are never considered.
pub fn first_throwing_base<'r>(
    types: &dyn TypeQuery,
    oracle: &dyn ExceptionOracle,
    record: &'r RecordDecl,
) -> Option<&'r BaseSpec> {
    record
        .bases
        .iter()
        .find(|base| !base.is_virtual && will_degrade_to_copy(types, oracle, base.ty.ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{ExceptionSpecAnalyzer, StaticOracle};
    use crate::query::{RecordBuilder, TypeTable};
    use crate::types::{CtorKind, ExceptionSpec, SourceLocation, TagKind, TypeRef};

    fn loc(line: u32, column: u32) -> SourceLocation {
        SourceLocation::new("p.cpp", line, column)
    }

    fn throwing(table: &mut TypeTable, name: &str) -> TypeId {
        let ty = table.declare_record(TagKind::Struct, name);
        table.define(
            ty,
            RecordBuilder::new(loc(1, 8))
                .user_constructor(CtorKind::Copy, ExceptionSpec::Unspecified, loc(2, 5))
                .user_constructor(CtorKind::Move, ExceptionSpec::NoexceptFalse, loc(3, 5)),
        );
        ty
    }

    #[test]
    fn scalars_never_degrade() {
        let mut table = TypeTable::new();
        let int = table.builtin("int");
        let e = table.enumeration("ExampleEnum");
        let p = table.pointer("int *");
        let oracle = StaticOracle::new(ExceptionState::Throwing);

        for ty in [int, e, p] {
            assert!(!will_degrade_to_copy(&table, &oracle, ty));
            assert!(is_trivially_copyable(&table, ty));
        }
    }

    #[test]
    fn trivially_copyable_record_never_degrades() {
        let mut table = TypeTable::new();
        let int = table.builtin("int");
        let pod = table.declare_record(TagKind::Struct, "TriviallyCopyableExample");
        table.define(
            pod,
            RecordBuilder::new(loc(1, 8))
                .trivially_copyable(true)
                .user_constructor(CtorKind::Move, ExceptionSpec::NoexceptFalse, loc(2, 5))
                .field("I", TypeRef::new(int, "int"), loc(2, 9)),
        );
        let oracle = StaticOracle::new(ExceptionState::Throwing);
        assert!(!will_degrade_to_copy(&table, &oracle, pod));
    }

    #[test]
    fn degrading_types_are_never_trivially_copyable() {
        let mut table = TypeTable::new();
        let int = table.builtin("int");
        let thrower = throwing(&mut table, "MoveConstructorThrows");
        let pod = table.declare_record(TagKind::Struct, "Pod");
        table.define(pod, RecordBuilder::new(loc(5, 8)).trivially_copyable(true));
        let opaque = table.declare_record(TagKind::Struct, "Opaque");
        let oracle = StaticOracle::new(ExceptionState::Throwing);

        let degrading: Vec<TypeId> = [int, thrower, pod, opaque]
            .into_iter()
            .filter(|&ty| will_degrade_to_copy(&table, &oracle, ty))
            .collect();
        assert_eq!(degrading, vec![thrower]);
        assert!(
            degrading
                .iter()
                .all(|&ty| !is_trivially_copyable(&table, ty))
        );
    }

    #[test]
    fn incomplete_record_is_conservatively_safe() {
        let mut table = TypeTable::new();
        let opaque = table.declare_record(TagKind::Class, "Opaque");
        let oracle = ExceptionSpecAnalyzer::new();
        assert!(!will_degrade_to_copy(&table, &oracle, opaque));
        assert!(!is_trivially_copyable(&table, opaque));
    }

    #[test]
    fn missing_move_constructor_degrades() {
        let mut table = TypeTable::new();
        let s = table.declare_record(TagKind::Struct, "CopyOnly");
        table.define(
            s,
            RecordBuilder::new(loc(1, 8)).user_constructor(
                CtorKind::Copy,
                ExceptionSpec::Noexcept,
                loc(2, 5),
            ),
        );
        let oracle = ExceptionSpecAnalyzer::new();
        assert!(will_degrade_to_copy(&table, &oracle, s));
    }

    #[test]
    fn unknown_classification_is_not_proof_of_safety() {
        let mut table = TypeTable::new();
        let s = table.declare_record(TagKind::Struct, "Dependent");
        table.define(
            s,
            RecordBuilder::new(loc(1, 8)).user_constructor(
                CtorKind::Move,
                ExceptionSpec::Unevaluated,
                loc(2, 5),
            ),
        );
        let oracle = ExceptionSpecAnalyzer::new();
        assert!(will_degrade_to_copy(&table, &oracle, s));
        // Not reported as the throwing constructor either
        let record = table.definition(s).unwrap();
        assert!(throwing_user_move_constructor(&table, &oracle, record).is_none());
    }

    #[test]
    fn only_first_move_constructor_counts() {
        let mut table = TypeTable::new();
        let s = table.declare_record(TagKind::Struct, "TwoMoves");
        table.define(
            s,
            RecordBuilder::new(loc(1, 8))
                .user_constructor(CtorKind::Move, ExceptionSpec::Noexcept, loc(2, 5))
                .user_constructor(CtorKind::Move, ExceptionSpec::NoexceptFalse, loc(3, 5)),
        );
        let oracle = ExceptionSpecAnalyzer::new();
        assert!(!will_degrade_to_copy(&table, &oracle, s));
        let record = table.definition(s).unwrap();
        assert!(throwing_user_move_constructor(&table, &oracle, record).is_none());
    }

    #[test]
    fn member_and_base_lookups_skip_safe_and_virtual_entries() {
        let mut table = TypeTable::new();
        let int = table.builtin("int");
        let bad = throwing(&mut table, "Bad");
        let worse = throwing(&mut table, "Worse");
        let s = table.declare_record(TagKind::Struct, "Holder");
        table.define(
            s,
            RecordBuilder::new(loc(10, 8))
                .virtual_base(TypeRef::new(bad, "Bad"), loc(10, 25))
                .base(TypeRef::new(worse, "Worse"), loc(10, 38))
                .field("n", TypeRef::new(int, "int"), loc(11, 9))
                .field("w", TypeRef::new(worse, "Worse"), loc(12, 11))
                .field("b", TypeRef::new(bad, "Bad"), loc(13, 9)),
        );
        let oracle = ExceptionSpecAnalyzer::new();
        let record = table.definition(s).unwrap();

        let member = first_throwing_member(&table, &oracle, record).unwrap();
        assert_eq!(member.name, "w");

        let base = first_throwing_base(&table, &oracle, record).unwrap();
        assert_eq!(base.ty.spelling, "Worse");
        assert!(!base.is_virtual);
    }
}
