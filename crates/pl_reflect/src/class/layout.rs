use alloc::sync::Arc;
use alloc::vec::Vec;

use pl_utils::hash::HashMap;

use super::Class;
use crate::info::{AttributeInfo, EventInfo, MethodInfo, SlotInfo};

// -----------------------------------------------------------------------------
// LinkState

/// How a class resolved its base chain the last time it was linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// The class declares no base.
    Root,
    /// Every base in the chain is registered.
    Linked,
    /// The chain stops at `missing`, a base that is not registered or
    /// that closes a cycle.
    ///
    /// Members of the resolved part of the chain stay available.
    Orphaned { missing: &'static str },
}

impl LinkState {
    #[inline]
    pub const fn is_orphaned(&self) -> bool {
        matches!(self, Self::Orphaned { .. })
    }
}

// -----------------------------------------------------------------------------
// Member tables

/// A member of the flattened view, with the distance from the class to
/// the ancestor that declares it.
pub(crate) struct Member<T> {
    pub depth: usize,
    pub info: Arc<T>,
}

impl<T> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self {
            depth: self.depth,
            info: self.info.clone(),
        }
    }
}

/// Members ordered base-first. A redeclared name replaces the inherited
/// entry in place.
pub(crate) struct MemberTable<T> {
    members: Vec<Member<T>>,
    index: HashMap<&'static str, usize>,
}

impl<T> Default for MemberTable<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            index: HashMap::default(),
        }
    }
}

impl<T> MemberTable<T> {
    fn merge(&mut self, depth: usize, own: &[Arc<T>], name: impl Fn(&T) -> &'static str) {
        for info in own {
            let member = Member {
                depth,
                info: info.clone(),
            };
            match self.index.get(name(info)) {
                Some(&slot) => self.members[slot] = member,
                None => {
                    self.index.insert(name(info), self.members.len());
                    self.members.push(member);
                }
            }
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Member<T>> {
        self.index.get(name).map(|&slot| &self.members[slot])
    }

    #[inline]
    pub fn infos(&self) -> Vec<Arc<T>> {
        self.members.iter().map(|m| m.info.clone()).collect()
    }

    #[inline]
    pub fn members(&self) -> &[Member<T>] {
        &self.members
    }
}

// -----------------------------------------------------------------------------
// Layout

/// The resolved view of a class: its ancestors and the flattened member
/// tables. Rebuilt each time the class is linked.
pub(crate) struct Layout {
    pub state: LinkState,
    /// Nearest base first.
    pub ancestors: Vec<Arc<Class>>,
    pub attributes: MemberTable<AttributeInfo>,
    pub methods: MemberTable<MethodInfo>,
    pub events: MemberTable<EventInfo>,
    pub slots: MemberTable<SlotInfo>,
    pub properties: Vec<(&'static str, &'static str)>,
}

impl Layout {
    pub fn empty() -> Self {
        Self {
            state: LinkState::Root,
            ancestors: Vec::new(),
            attributes: MemberTable::default(),
            methods: MemberTable::default(),
            events: MemberTable::default(),
            slots: MemberTable::default(),
            properties: Vec::new(),
        }
    }

    /// Flattens `class` over a resolved chain of ancestors.
    pub fn build(class: &Class, ancestors: Vec<Arc<Class>>, state: LinkState) -> Self {
        let mut layout = Self {
            state,
            ..Self::empty()
        };

        let chain = ancestors
            .iter()
            .map(|c| &**c)
            .enumerate()
            .map(|(index, c)| (index + 1, c))
            .rev()
            .chain(core::iter::once((0, class)));

        for (depth, declaring) in chain {
            layout.attributes.merge(depth, &declaring.attributes, AttributeInfo::name);
            layout.methods.merge(depth, &declaring.methods, MethodInfo::name);
            layout.events.merge(depth, &declaring.events, EventInfo::name);
            layout.slots.merge(depth, &declaring.slots, SlotInfo::name);
            for &(key, value) in &declaring.properties {
                match layout.properties.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => layout.properties.push((key, value)),
                }
            }
        }

        layout.ancestors = ancestors;
        layout
    }
}
