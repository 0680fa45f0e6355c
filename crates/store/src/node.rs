use types::FacilityToken;

/// An index into one of the Store's typed arenas, tagged by label — the "edges as
/// `(src_arena_idx, relation_tag, dst_arena_idx)`" design from §9, rather than the
/// reference's untyped graph-node dict.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKey {
    Department(usize),
    Program(usize),
    YearTerm(usize),
    Section(usize),
    Course(usize),
    Faculty(usize),
    Room(usize),
    Cohort(usize),
    Policy(usize),
    /// ROOM `IS_TYPE` FACILITY_TYPE points at a facility token, not an arena entry.
    FacilityType(FacilityToken),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Out,
    In,
}
