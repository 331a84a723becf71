//! G-code text emission from a sliced model.

use std::fmt::Write;

use strata_math::Point2;
use strata_slicer::{
    CancelToken, Layer, ProgressEvent, ProgressFn, SliceSettings, SlicedModel, ToolPath,
};

use crate::error::{GcodeError, Result};

/// Travels shorter than this skip the retract/unretract pair (mm).
pub const RETRACTION_TRAVEL_THRESHOLD: f64 = 1.0;

/// Emit G-code for a sliced model, ignoring cancellation.
pub fn generate_gcode(model: &SlicedModel, settings: &SliceSettings) -> String {
    let mut w = Writer::new(settings);
    w.preamble(model.layers.len());
    for layer in &model.layers {
        w.emit_layer(layer);
    }
    w.shutdown();
    w.finish()
}

/// Emit G-code for a sliced model, observing cancellation per layer.
///
/// Output is deterministic: the same model and settings always produce
/// byte-identical text. Coordinates are millimeters with three decimals,
/// extrusion five, feed rates integral mm/min. Feed rates are only written
/// when they change. Walls are emitted before infill within each entry,
/// and wall loops get an explicit closing move back to their first point.
pub fn generate_gcode_with(
    model: &SlicedModel,
    settings: &SliceSettings,
    cancel: &CancelToken,
    progress: Option<ProgressFn<'_>>,
) -> Result<String> {
    let mut w = Writer::new(settings);
    w.preamble(model.layers.len());

    let total = model.layers.len();
    for layer in &model.layers {
        if cancel.is_cancelled() {
            return Err(GcodeError::Cancelled);
        }
        if let Some(report) = progress {
            if layer.index % 5 == 0 || layer.index + 1 == total {
                report(ProgressEvent::EmittingGcode {
                    layer: layer.index,
                    total,
                });
            }
        }

        w.emit_layer(layer);
    }

    w.shutdown();
    Ok(w.finish())
}

/// Extruder advance per millimeter of XY travel.
///
/// The deposited bead cross-section (line width × layer height) divided by
/// the filament cross-section.
fn extrusion_per_mm(settings: &SliceSettings, layer_height: f64) -> f64 {
    let bead = settings.line_width * layer_height;
    let radius = settings.filament_diameter / 2.0;
    bead / (std::f64::consts::PI * radius * radius)
}

struct Writer<'a> {
    out: String,
    settings: &'a SliceSettings,
    position: Option<Point2>,
    e: f64,
    feed: Option<f64>,
}

impl<'a> Writer<'a> {
    fn new(settings: &'a SliceSettings) -> Self {
        Self {
            out: String::new(),
            settings,
            position: None,
            e: 0.0,
            feed: None,
        }
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn preamble(&mut self, layer_count: usize) {
        self.line("; strata G-code");
        let _ = writeln!(self.out, "; layers: {layer_count}");
        let _ = writeln!(self.out, "M104 S{:.0}", self.settings.nozzle_temp);
        let _ = writeln!(self.out, "M140 S{:.0}", self.settings.bed_temp);
        let _ = writeln!(self.out, "M109 S{:.0}", self.settings.nozzle_temp);
        let _ = writeln!(self.out, "M190 S{:.0}", self.settings.bed_temp);
        self.line("G28");
        self.line("G92 E0");
    }

    fn layer_change(&mut self, index: usize, z: f64) {
        let _ = writeln!(self.out, "; LAYER:{index}");
        let feed = self.settings.travel_speed * 60.0;
        let _ = writeln!(self.out, "G0 Z{:.3} F{:.0}", z, feed);
        self.feed = Some(feed);
    }

    fn emit_layer(&mut self, layer: &Layer) {
        self.layer_change(layer.index, layer.z);
        for entry in &layer.entries {
            let e_per_mm = extrusion_per_mm(&entry.settings, self.settings.layer_height);
            for path in entry.perimeters.iter().chain(entry.infill.iter()) {
                self.emit_path(path, &entry.settings, e_per_mm);
            }
        }
    }

    fn emit_path(&mut self, path: &ToolPath, settings: &SliceSettings, e_per_mm: f64) {
        if path.points.len() < 2 {
            return;
        }
        self.travel_to(&path.points[0], settings);

        let feed = settings.feature_speed(path.kind) * 60.0;
        for i in 1..path.points.len() {
            self.extrude_to(&path.points[i], feed, e_per_mm);
        }
        // Close wall loops back onto their first point
        if path.is_wall() {
            let first = path.points[0];
            self.extrude_to(&first, feed, e_per_mm);
        }
    }

    fn travel_to(&mut self, target: &Point2, settings: &SliceSettings) {
        let distance = match self.position {
            Some(current) => (target - current).norm(),
            None => f64::MAX,
        };
        if distance == 0.0 {
            return;
        }

        let retract = settings.retraction > 0.0
            && self.e > 0.0
            && distance > RETRACTION_TRAVEL_THRESHOLD;
        let retract_feed = settings.retraction_speed * 60.0;
        if retract {
            let _ = writeln!(
                self.out,
                "G1 E{:.5} F{:.0}",
                self.e - settings.retraction,
                retract_feed
            );
            self.feed = Some(retract_feed);
        }

        let travel_feed = settings.travel_speed * 60.0;
        if self.feed == Some(travel_feed) {
            let _ = writeln!(self.out, "G0 X{:.3} Y{:.3}", target.x, target.y);
        } else {
            let _ = writeln!(
                self.out,
                "G0 X{:.3} Y{:.3} F{:.0}",
                target.x, target.y, travel_feed
            );
            self.feed = Some(travel_feed);
        }

        if retract {
            let _ = writeln!(self.out, "G1 E{:.5} F{:.0}", self.e, retract_feed);
            self.feed = Some(retract_feed);
        }
        self.position = Some(*target);
    }

    fn extrude_to(&mut self, target: &Point2, feed: f64, e_per_mm: f64) {
        let current = match self.position {
            Some(current) => current,
            None => return,
        };
        let distance = (target - current).norm();
        if distance == 0.0 {
            return;
        }
        self.e += distance * e_per_mm;
        if self.feed == Some(feed) {
            let _ = writeln!(
                self.out,
                "G1 X{:.3} Y{:.3} E{:.5}",
                target.x, target.y, self.e
            );
        } else {
            let _ = writeln!(
                self.out,
                "G1 X{:.3} Y{:.3} E{:.5} F{:.0}",
                target.x, target.y, self.e, feed
            );
            self.feed = Some(feed);
        }
        self.position = Some(*target);
    }

    fn shutdown(&mut self) {
        self.line("M104 S0");
        self.line("M140 S0");
        self.line("G28 X0");
        self.line("M84");
    }

    fn finish(self) -> String {
        self.out
    }
}
