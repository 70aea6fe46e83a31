// Per-block extension payloads.
//
// A captured block may carry extra tile-entity data that plain material +
// block data cannot express. The set of kinds is closed:
// - `StoredItems`: sparse slot-indexed container contents.
// - `SignText`: the lines written on a sign.
// - `SignColor`: the dye applied to the sign text.
//
// `PayloadSet` holds at most one payload per kind. Inserting a second payload
// of an existing kind replaces the first. Almost every block carries zero
// payloads and the largest realistic set is two (a sign), so storage is an
// inline `SmallVec`.

use crate::types::{DyeColor, ItemStack};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Container contents keyed by slot index. Empty slots are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerItems {
    slots: BTreeMap<usize, ItemStack>,
}

impl ContainerItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the occupied slots of a full storage array.
    pub fn from_slots(slots: &[Option<ItemStack>]) -> Self {
        let slots = slots
            .iter()
            .enumerate()
            .filter_map(|(index, stack)| stack.clone().map(|stack| (index, stack)))
            .collect();
        Self { slots }
    }

    pub fn set(&mut self, slot: usize, stack: ItemStack) {
        self.slots.insert(slot, stack);
    }

    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(&slot)
    }

    /// Occupied slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots.iter().map(|(index, stack)| (*index, stack))
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Text lines of a sign, top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignLines(pub Vec<String>);

/// Discriminant of `BlockPayload`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadKind {
    StoredItems,
    SignText,
    SignColor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BlockPayload {
    StoredItems(ContainerItems),
    SignText(SignLines),
    SignColor(DyeColor),
}

impl BlockPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            BlockPayload::StoredItems(_) => PayloadKind::StoredItems,
            BlockPayload::SignText(_) => PayloadKind::SignText,
            BlockPayload::SignColor(_) => PayloadKind::SignColor,
        }
    }
}

/// At most one payload per `PayloadKind`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadSet {
    entries: SmallVec<[BlockPayload; 2]>,
}

impl PayloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a payload, returning the one it replaced, if any.
    pub fn insert(&mut self, payload: BlockPayload) -> Option<BlockPayload> {
        let kind = payload.kind();
        match self.entries.iter_mut().find(|p| p.kind() == kind) {
            Some(slot) => Some(std::mem::replace(slot, payload)),
            None => {
                self.entries.push(payload);
                None
            }
        }
    }

    pub fn get(&self, kind: PayloadKind) -> Option<&BlockPayload> {
        self.entries.iter().find(|p| p.kind() == kind)
    }

    pub fn stored_items(&self) -> Option<&ContainerItems> {
        match self.get(PayloadKind::StoredItems) {
            Some(BlockPayload::StoredItems(items)) => Some(items),
            _ => None,
        }
    }

    pub fn sign_text(&self) -> Option<&SignLines> {
        match self.get(PayloadKind::SignText) {
            Some(BlockPayload::SignText(lines)) => Some(lines),
            _ => None,
        }
    }

    pub fn sign_color(&self) -> Option<DyeColor> {
        match self.get(PayloadKind::SignColor) {
            Some(BlockPayload::SignColor(color)) => Some(*color),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
