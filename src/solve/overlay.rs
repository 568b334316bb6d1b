use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayEntry {
    pub markup: String,
    pub position: Position,
}

/// Inline-math markup shown for one solved expression.
pub fn result_markup(expression: &str, answer: &str) -> String {
    format!("\\(\\LARGE{{{expression} = {answer}}}\\)")
}

/// Rendered results in arrival order. Entries are only removed by [`ResultOverlay::reset`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultOverlay {
    entries: Vec<OverlayEntry>,
}

impl ResultOverlay {
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn add_entry(&mut self, markup: String, position: Position) -> usize {
        self.entries.push(OverlayEntry { markup, position });
        self.entries.len() - 1
    }

    /// Returns `false` when `index` does not name an entry.
    pub fn move_entry(&mut self, index: usize, position: Position) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.position = position;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[OverlayEntry] {
        &self.entries
    }

    pub fn markup_list(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.markup.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
