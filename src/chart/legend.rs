use super::palette::{DIM_ALPHA, Rgba};

/// Legend hover state for a categorical chart. The original assignment is
/// never mutated; hovering only changes the colors handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendHighlight {
    original: Vec<Rgba>,
    hovered: Option<usize>,
}

impl LegendHighlight {
    pub fn new(original: Vec<Rgba>) -> Self {
        Self {
            original,
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Dim every entry except `index`. Out-of-range indexes are ignored.
    pub fn hover(&mut self, index: usize) {
        if index < self.original.len() {
            self.hovered = Some(index);
        }
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    pub fn original(&self) -> &[Rgba] {
        &self.original
    }

    pub fn colors(&self) -> Vec<Rgba> {
        match self.hovered {
            Some(active) => self
                .original
                .iter()
                .enumerate()
                .map(|(index, color)| {
                    if index == active {
                        *color
                    } else {
                        color.with_alpha(DIM_ALPHA)
                    }
                })
                .collect(),
            None => self.original.clone(),
        }
    }
}
