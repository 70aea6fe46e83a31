// One captured block, waiting to be put back.
//
// An `ExplodedBlock` is the pre-explosion state of a single cell: location,
// material, block data, and any payloads (container contents, sign text,
// sign color). It may own one companion block, the other half of a double
// chest. The link is an owned `Box` one level deep with no back-reference;
// a companion never has a companion of its own.
//
// `restore()` consumes the block, so restoring twice cannot be written. The
// write order matters for double chests: the world exposes a double chest's
// storage across both halves, so the companion is placed before the
// primary's container slots are refilled.
//
// See also: `explosion.rs` which builds these and owns them in restore order,
// `payload.rs` for `PayloadSet`.

use crate::cell::BlockSnapshot;
use crate::payload::{BlockPayload, PayloadSet};
use crate::types::{BlockData, Location, Material};
use crate::world::BlockWorld;
use log::trace;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplodedBlock {
    location: Location,
    material: Material,
    data: BlockData,
    payloads: PayloadSet,
    companion: Option<Box<ExplodedBlock>>,
}

impl ExplodedBlock {
    pub fn new(location: Location, material: Material, data: BlockData) -> Self {
        Self {
            location,
            material,
            data,
            payloads: PayloadSet::new(),
            companion: None,
        }
    }

    pub fn from_snapshot(snapshot: BlockSnapshot) -> Self {
        Self::new(snapshot.location, snapshot.material, snapshot.data)
    }

    /// Attach a payload, replacing any earlier payload of the same kind.
    pub fn add_payload(&mut self, payload: BlockPayload) {
        self.payloads.insert(payload);
    }

    /// Link the other half of a structural pair.
    ///
    /// Returns the companion back if a link already exists or if `companion`
    /// itself carries a link; the existing link is never replaced.
    pub fn connect(&mut self, companion: ExplodedBlock) -> Result<(), Box<ExplodedBlock>> {
        let companion = Box::new(companion);
        if self.companion.is_some() || companion.companion.is_some() {
            return Err(companion);
        }
        self.companion = Some(companion);
        Ok(())
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn data(&self) -> &BlockData {
        &self.data
    }

    pub fn payloads(&self) -> &PayloadSet {
        &self.payloads
    }

    pub fn companion(&self) -> Option<&ExplodedBlock> {
        self.companion.as_deref()
    }

    /// Write this block, its companion, and its payloads back into the world.
    pub fn restore<W: BlockWorld + ?Sized>(self, world: &mut W) {
        trace!("restoring {} at {}", self.material, self.location);
        world.place_block(&self.location, &self.material, &self.data);
        if let Some(companion) = self.companion {
            companion.restore(&mut *world);
        }
        if let Some(items) = self.payloads.stored_items() {
            world.fill_container(&self.location, items);
        }
        if let Some(lines) = self.payloads.sign_text() {
            world.write_sign_lines(&self.location, lines);
        }
        if let Some(color) = self.payloads.sign_color() {
            world.write_sign_color(&self.location, color);
        }
    }
}
