//! Core slicing engine: placed triangle meshes in, per-layer toolpaths out.
//!
//! The pipeline runs in fixed stages. Each object is sliced into planar
//! intersection segments, per-object layers are merged into one Z-aligned
//! stack (applying subtractive booleans), then every surviving layer gets
//! wall loops and infill. G-code emission lives in a separate crate and
//! consumes the [`SlicedModel`] produced here.

#![warn(missing_docs)]

pub mod contour;
pub mod error;
pub mod infill;
pub mod merge;
pub mod mesh;
pub mod object;
pub mod path;
pub mod perimeter;
pub mod progress;
pub mod settings;
pub mod slice;

pub use contour::build_contours;
pub use error::{Result, SliceWarning, SlicerError};
pub use infill::generate_infill;
pub use merge::{merge_layers, Layer, LayerEntry, ObjectLayers};
pub use mesh::Mesh;
pub use object::{ObjectEntry, ObjectId, ObjectMode, Placement};
pub use path::{Contour, PathKind, Segment, ToolPath};
pub use perimeter::generate_perimeters;
pub use progress::{CancelToken, ProgressEvent, ProgressFn};
pub use settings::{InfillPattern, SettingsOverride, SliceSettings};
pub use slice::{slice_object, SlicedLayer, SlicedObject};

/// A fully sliced build: layers with toolpaths, plus non-fatal warnings.
#[derive(Debug, Clone)]
pub struct SlicedModel {
    /// Merged layers, bottom to top, with perimeters and infill populated.
    pub layers: Vec<Layer>,
    /// Objects that were dropped and why.
    pub warnings: Vec<SliceWarning>,
}

/// Slice a set of objects with no cancellation or progress reporting.
pub fn slice_objects(
    objects: &[ObjectEntry],
    settings: &SliceSettings,
) -> Result<SlicedModel> {
    slice_objects_with(objects, settings, &CancelToken::new(), None)
}

/// Slice a set of objects, observing cancellation and reporting progress.
///
/// Fails fast on invalid settings (global, or effective per-object after
/// overrides are applied) or an object set without a single additive
/// member. Objects that contribute nothing (above the Z ceiling,
/// or no intersection segments at any height) are dropped with a warning;
/// the call only errors with [`SlicerError::EmptyModel`] when nothing at
/// all survives. Cancellation is checked before each object and before
/// each layer's path generation.
pub fn slice_objects_with(
    objects: &[ObjectEntry],
    settings: &SliceSettings,
    cancel: &CancelToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<SlicedModel> {
    settings.validate()?;
    if !objects.iter().any(|o| o.mode == ObjectMode::Additive) {
        return Err(SlicerError::InvalidInput(
            "at least one additive object is required".into(),
        ));
    }

    let mut warnings = Vec::new();
    let mut object_layers: Vec<ObjectLayers> = Vec::with_capacity(objects.len());

    for (index, object) in objects.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(SlicerError::Cancelled);
        }
        if let Some(report) = progress {
            report(ProgressEvent::SlicingObject {
                index,
                total: objects.len(),
            });
        }

        let effective = match &object.overrides {
            Some(overrides) => {
                let effective = overrides.apply(settings);
                // Overrides can reintroduce values validate() rejects
                effective.validate()?;
                effective
            }
            None => settings.clone(),
        };
        let sliced = slice_object(&object.mesh, &object.placement, &effective);

        if sliced.above_z_limit {
            warnings.push(SliceWarning::AboveZLimit { object: object.id });
            continue;
        }
        if sliced.layers.is_empty() {
            warnings.push(SliceWarning::NoLayers { object: object.id });
            continue;
        }
        object_layers.push(ObjectLayers {
            id: object.id,
            mode: object.mode,
            settings: effective,
            layers: sliced.layers,
        });
    }

    if let Some(report) = progress {
        report(ProgressEvent::MergingLayers);
    }
    let mut layers = merge_layers(&object_layers, settings.layer_height);
    if layers.is_empty() {
        return Err(SlicerError::EmptyModel);
    }

    let total = layers.len();
    for layer in &mut layers {
        if cancel.is_cancelled() {
            return Err(SlicerError::Cancelled);
        }
        if let Some(report) = progress {
            if layer.index % 5 == 0 || layer.index + 1 == total {
                report(ProgressEvent::GeneratingPaths {
                    layer: layer.index,
                    total,
                });
            }
        }
        let index = layer.index;
        for entry in &mut layer.entries {
            let contours = build_contours(&entry.segments);
            entry.perimeters = generate_perimeters(&contours, &entry.settings);
            entry.infill = generate_infill(&entry.perimeters, &entry.settings, index);
        }
    }

    Ok(SlicedModel { layers, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cube_mesh(size: f32) -> Mesh {
        let v = [
            [0.0, 0.0, 0.0],
            [size, 0.0, 0.0],
            [size, size, 0.0],
            [0.0, size, 0.0],
            [0.0, 0.0, size],
            [size, 0.0, size],
            [size, size, size],
            [0.0, size, size],
        ];
        let idx: [usize; 36] = [
            0, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7, 0, 1, 5, 0, 5, 4, 2, 3, 7, 2, 7,
            6, 0, 4, 7, 0, 7, 3, 1, 2, 6, 1, 6, 5,
        ];
        let mut positions = Vec::with_capacity(idx.len() * 3);
        for i in idx {
            positions.extend_from_slice(&v[i]);
        }
        Mesh::new(positions).unwrap()
    }

    #[test]
    fn test_full_pipeline_on_cube() {
        let objects = [ObjectEntry::additive(ObjectId(1), cube_mesh(10.0))];
        let model = slice_objects(&objects, &SliceSettings::default()).unwrap();
        assert_eq!(model.layers.len(), 50);
        assert!(model.warnings.is_empty());
        for layer in &model.layers {
            assert_eq!(layer.entries.len(), 1);
            assert!(!layer.entries[0].perimeters.is_empty());
        }
        // Interior layers of a 10mm cube at 20% density have infill
        assert!(!model.layers[25].entries[0].infill.is_empty());
    }

    #[test]
    fn test_no_additive_objects_rejected() {
        let objects = [ObjectEntry::subtractive(ObjectId(1), cube_mesh(10.0))];
        let err = slice_objects(&objects, &SliceSettings::default()).unwrap_err();
        assert!(matches!(err, SlicerError::InvalidInput(_)));
    }

    #[test]
    fn test_pre_cancelled_token() {
        let objects = [ObjectEntry::additive(ObjectId(1), cube_mesh(10.0))];
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = slice_objects_with(&objects, &SliceSettings::default(), &cancel, None)
            .unwrap_err();
        assert!(matches!(err, SlicerError::Cancelled));
    }

    #[test]
    fn test_object_above_ceiling_warned_and_dropped() {
        let mut floating = ObjectEntry::additive(ObjectId(2), cube_mesh(10.0));
        floating.placement = Placement::at(0.0, 0.0, 60.0);
        let objects = [
            ObjectEntry::additive(ObjectId(1), cube_mesh(10.0)),
            floating,
        ];
        let settings = SliceSettings {
            max_z_height: 50.0,
            ..Default::default()
        };
        let model = slice_objects(&objects, &settings).unwrap();
        assert_eq!(
            model.warnings,
            vec![SliceWarning::AboveZLimit {
                object: ObjectId(2)
            }]
        );
        assert_eq!(model.layers.len(), 50);
    }

    #[test]
    fn test_subtractive_object_carves_additive() {
        let mut cutter = ObjectEntry::subtractive(ObjectId(2), cube_mesh(4.0));
        cutter.placement = Placement::at(3.0, 3.0, 0.0);
        let objects = [ObjectEntry::additive(ObjectId(1), cube_mesh(10.0)), cutter];
        let carved = slice_objects(&objects, &SliceSettings::default()).unwrap();
        let solid = slice_objects(
            &[ObjectEntry::additive(ObjectId(1), cube_mesh(10.0))],
            &SliceSettings::default(),
        )
        .unwrap();
        // The cutter sits fully inside, so its own outline segments vanish
        // along with nothing of the cube's outer wall
        let carved_mid = &carved.layers[5].entries[0];
        let solid_mid = &solid.layers[5].entries[0];
        assert_eq!(carved_mid.segments.len(), solid_mid.segments.len());
    }

    #[test]
    fn test_per_object_override_changes_walls() {
        let mut object = ObjectEntry::additive(ObjectId(1), cube_mesh(10.0));
        object.overrides = Some(SettingsOverride {
            wall_count: Some(4),
            ..Default::default()
        });
        let model = slice_objects(&[object], &SliceSettings::default()).unwrap();
        let walls = model.layers[10].entries[0]
            .perimeters
            .iter()
            .filter(|p| p.is_wall())
            .count();
        assert_eq!(walls, 4);
    }

    #[test]
    fn test_progress_events_reported() {
        let objects = [ObjectEntry::additive(ObjectId(1), cube_mesh(10.0))];
        let events = AtomicUsize::new(0);
        let report = |_: ProgressEvent| {
            events.fetch_add(1, Ordering::Relaxed);
        };
        slice_objects_with(
            &objects,
            &SliceSettings::default(),
            &CancelToken::new(),
            Some(&report),
        )
        .unwrap();
        assert!(events.load(Ordering::Relaxed) >= 3);
    }

    #[test]
    fn test_zero_line_width_override_rejected() {
        let mut object = ObjectEntry::additive(ObjectId(1), cube_mesh(10.0));
        object.overrides = Some(SettingsOverride {
            line_width: Some(0.0),
            ..Default::default()
        });
        let err = slice_objects(&[object], &SliceSettings::default()).unwrap_err();
        assert!(matches!(err, SlicerError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_settings_rejected_before_slicing() {
        let objects = [ObjectEntry::additive(ObjectId(1), cube_mesh(10.0))];
        let settings = SliceSettings {
            layer_height: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            slice_objects(&objects, &settings),
            Err(SlicerError::InvalidInput(_))
        ));
    }
}
