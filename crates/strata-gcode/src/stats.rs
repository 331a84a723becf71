//! Print statistics derived from emitted G-code.

use serde::{Deserialize, Serialize};

/// Density of PLA filament (g/cm³), used for the weight estimate.
pub const FILAMENT_DENSITY_G_CM3: f64 = 1.24;

/// Extrusion moves completed per minute, a coarse time heuristic.
const EXTRUSION_LINES_PER_MINUTE: f64 = 20.0;

/// Summary numbers scanned back out of the emitted G-code text.
///
/// Working from the text rather than the model keeps the numbers honest:
/// they describe exactly what the printer will be told to do, after every
/// simplification and retraction decision has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintStats {
    /// Number of layers.
    pub layer_count: usize,
    /// Total G-code lines.
    pub line_count: usize,
    /// Extruder-driving moves (any G1 with an E word, retractions
    /// included).
    pub extrusion_moves: usize,
    /// Non-extruding moves (G0, or G1 without an E word).
    pub travel_moves: usize,
    /// Filament length consumed (mm), the final extruder position.
    pub filament_mm: f64,
    /// Filament volume (cm³).
    pub filament_cm3: f64,
    /// Filament weight for PLA (g).
    pub filament_g: f64,
    /// Rough print time estimate (s).
    pub estimated_seconds: f64,
}

impl PrintStats {
    /// Scan emitted G-code and compute the summary.
    pub fn from_gcode(gcode: &str, filament_diameter: f64) -> Self {
        let mut layer_count = 0usize;
        let mut line_count = 0usize;
        let mut extrusion_moves = 0usize;
        let mut travel_moves = 0usize;
        let mut filament_mm: f64 = 0.0;

        for line in gcode.lines() {
            line_count += 1;
            if line.starts_with("; LAYER:") {
                layer_count += 1;
            } else if line.starts_with("G0 ") {
                travel_moves += 1;
            } else if line.starts_with("G1 ") {
                match word_value(line, 'E') {
                    Some(e) => {
                        filament_mm = filament_mm.max(e);
                        extrusion_moves += 1;
                    }
                    None => travel_moves += 1,
                }
            }
        }

        let radius_cm = filament_diameter / 2.0 / 10.0;
        let filament_cm3 =
            std::f64::consts::PI * radius_cm * radius_cm * (filament_mm / 10.0);

        Self {
            layer_count,
            line_count,
            extrusion_moves,
            travel_moves,
            filament_mm,
            filament_cm3,
            filament_g: filament_cm3 * FILAMENT_DENSITY_G_CM3,
            estimated_seconds: extrusion_moves as f64 / EXTRUSION_LINES_PER_MINUTE * 60.0,
        }
    }
}

/// Value of a G-code word like `X12.3` on a line, if present.
fn word_value(line: &str, word: char) -> Option<f64> {
    for token in line.split_whitespace() {
        let mut chars = token.chars();
        if chars.next() == Some(word) {
            return chars.as_str().parse().ok();
        }
    }
    None
}
