use crate::node::NodeKey;
use types::RelationKind;

/// Extra attributes a relation can carry — currently only `CAN_TEACH`'s proficiency /
/// last_taught (§3).
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeAttrs {
    pub proficiency: Option<i32>,
    pub last_taught: Option<i32>,
}

#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub from: NodeKey,
    pub rel: RelationKind,
    pub to: NodeKey,
    pub attrs: EdgeAttrs,
}
