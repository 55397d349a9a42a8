use serde::{Deserialize, Serialize};

use crate::{color::pastel_turns, peg_table::PegTable, Float};

/// One committed chord, colored from `phase` (in turns).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chord<S> {
    pub from: usize,
    pub to: usize,
    pub phase: S,
}

/// Chords in the order they were wound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Winding<S> {
    chords: Vec<Chord<S>>,
}

impl<S> Default for Winding<S> {
    fn default() -> Self {
        Self { chords: Vec::new() }
    }
}

impl<S> Winding<S> {
    pub fn push(&mut self, chord: Chord<S>) {
        self.chords.push(chord)
    }

    pub fn clear(&mut self) {
        self.chords.clear()
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn chords(&self) -> &[Chord<S>] {
        &self.chords
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chord<S>> {
        self.chords.iter()
    }
}

impl<S: Float> Winding<S> {
    /// Vector rendering on a `size` square canvas: black background, pegs as
    /// dots, chords in winding order so later ones lie on top.
    pub fn build_svg(&self, table: &PegTable<S>, size: usize, line_thickness: f32) -> svg::Document {
        let mut doc = svg::Document::new()
            .set("viewBox", (0, 0, size, size))
            .add(
                svg::node::element::Rectangle::new()
                    .set("width", size)
                    .set("height", size)
                    .set("fill", "black"),
            );
        for peg in table.pegs() {
            doc = doc.add(
                svg::node::element::Circle::new()
                    .set("cx", format!("{:.4}", peg.x))
                    .set("cy", format!("{:.4}", peg.y))
                    .set("r", format!("{:.4}", line_thickness * 2.0))
                    .set("fill", "gray"),
            );
        }

        for chord in self.chords.iter() {
            let (Some(start), Some(end)) = (table.get(chord.from), table.get(chord.to)) else {
                continue;
            };
            let color = pastel_turns(chord.phase).to_u8();
            doc = doc.add(
                svg::node::element::Line::new()
                    .set("x1", format!("{:.4}", start.x))
                    .set("y1", format!("{:.4}", start.y))
                    .set("x2", format!("{:.4}", end.x))
                    .set("y2", format!("{:.4}", end.y))
                    .set("stroke", color.to_string())
                    .set("stroke-width", format!("{:.4}", line_thickness))
                    .set("opacity", 1),
            );
        }
        doc
    }
}

impl<S> Winding<S> {
    /// Plain text winding instructions, one `from -> to` line per chord.
    pub fn build_instructions(&self) -> String {
        self.chords
            .iter()
            .map(|chord| format!("{} -> {}\n", chord.from, chord.to))
            .collect()
    }
}

impl<'a, S> IntoIterator for &'a Winding<S> {
    type Item = &'a Chord<S>;
    type IntoIter = std::slice::Iter<'a, Chord<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
