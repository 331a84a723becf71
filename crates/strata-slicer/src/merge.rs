//! Merging per-object layers into one aligned layer stack.

use crate::contour::build_contours;
use crate::object::{ObjectId, ObjectMode};
use crate::path::{Segment, ToolPath};
use crate::settings::SliceSettings;
use crate::slice::SlicedLayer;

/// Z bucketing tolerance as a fraction of layer height.
pub const Z_EPSILON_FACTOR: f64 = 0.1;

/// Absolute floor for the Z bucketing tolerance (mm).
pub const Z_EPSILON_FLOOR: f64 = 0.0005;

/// All layers of one sliced object, with its effective settings.
#[derive(Debug, Clone)]
pub struct ObjectLayers {
    /// Source object identity.
    pub id: ObjectId,
    /// Additive or subtractive intent.
    pub mode: ObjectMode,
    /// Effective settings for this object (global merged with overrides).
    pub settings: SliceSettings,
    /// Per-object layer skeletons from plane slicing.
    pub layers: Vec<SlicedLayer>,
}

/// One object's share of a merged layer.
#[derive(Debug, Clone)]
pub struct LayerEntry {
    /// Source object identity.
    pub object: ObjectId,
    /// Effective settings for this entry.
    pub settings: SliceSettings,
    /// Surviving intersection segments after boolean composition.
    pub segments: Vec<Segment>,
    /// Wall loops, outer before inner. Populated by perimeter generation.
    pub perimeters: Vec<ToolPath>,
    /// Infill paths. Populated by infill generation.
    pub infill: Vec<ToolPath>,
}

/// One merged layer spanning all objects at (approximately) one Z height.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Authoritative emission index, 0-based and gapless.
    pub index: usize,
    /// Z height (mm).
    pub z: f64,
    /// Surviving additive entries at this height.
    pub entries: Vec<LayerEntry>,
}

struct Slot {
    z: f64,
    additive: Vec<(ObjectId, SliceSettings, Vec<Segment>)>,
    subtractive: Vec<Segment>,
}

/// Merge all objects' layers into one Z-aligned stack.
///
/// Independently sliced objects compute layer Z from their own bounding
/// box, so heights rarely match exactly; layers land in the same slot when
/// their Z values agree within `max(Z_EPSILON_FACTOR × layer_height,
/// Z_EPSILON_FLOOR)`. In slots with both modes, an additive segment
/// survives only if its midpoint lies outside every subtractive contour.
/// Empty entries and empty slots are dropped; the rest sort by Z and
/// re-index 0..N−1, which is the order G-code emission follows.
pub fn merge_layers(objects: &[ObjectLayers], layer_height: f64) -> Vec<Layer> {
    let z_epsilon = (Z_EPSILON_FACTOR * layer_height).max(Z_EPSILON_FLOOR);
    let mut slots: Vec<Slot> = Vec::new();

    for object in objects {
        for layer in &object.layers {
            let index = match slots
                .iter()
                .position(|s| (s.z - layer.z).abs() < z_epsilon)
            {
                Some(index) => index,
                None => {
                    slots.push(Slot {
                        z: layer.z,
                        additive: Vec::new(),
                        subtractive: Vec::new(),
                    });
                    slots.len() - 1
                }
            };
            let slot = &mut slots[index];
            match object.mode {
                ObjectMode::Additive => slot.additive.push((
                    object.id,
                    object.settings.clone(),
                    layer.segments.clone(),
                )),
                ObjectMode::Subtractive => {
                    slot.subtractive.extend(layer.segments.iter().copied())
                }
            }
        }
    }

    let mut layers: Vec<Layer> = Vec::with_capacity(slots.len());
    for slot in &mut slots {
        if !slot.subtractive.is_empty() && !slot.additive.is_empty() {
            let cutters = build_contours(&slot.subtractive);
            for (_, _, segments) in &mut slot.additive {
                segments.retain(|seg| {
                    let mid = seg.midpoint();
                    !cutters.iter().any(|c| c.contains(&mid))
                });
            }
        }

        let entries: Vec<LayerEntry> = slot
            .additive
            .drain(..)
            .filter(|(_, _, segments)| !segments.is_empty())
            .map(|(object, settings, segments)| LayerEntry {
                object,
                settings,
                segments,
                perimeters: Vec::new(),
                infill: Vec::new(),
            })
            .collect();

        if !entries.is_empty() {
            layers.push(Layer {
                index: 0,
                z: slot.z,
                entries,
            });
        }
    }

    layers.sort_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(std::cmp::Ordering::Equal));
    for (index, layer) in layers.iter_mut().enumerate() {
        layer.index = index;
    }
    layers
}
