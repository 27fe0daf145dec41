use super::note::{Note, Step, StrumDirection};
use crate::error::{Boundary, StateError, ValidationError};

/// Ordered list of recorded steps with a cursor on the current one.
///
/// The cursor is `None` until the first step is recorded and always points
/// at an existing step afterwards. Navigation never wraps: trying to move
/// past either end returns a [`Boundary`] and leaves the cursor alone.
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    steps: Vec<Step>,
    cursor: Option<usize>,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step built from `notes` and make it current.
    ///
    /// Returns the new step's index.
    pub fn record_step(
        &mut self,
        notes: Vec<Note>,
        strum: StrumDirection,
    ) -> Result<usize, ValidationError> {
        let step = Step::new(notes, strum)?;
        self.steps.push(step);
        let index = self.steps.len() - 1;
        self.cursor = Some(index);
        Ok(index)
    }

    /// Replace the current step whole.
    pub fn update_current(
        &mut self,
        notes: Vec<Note>,
        strum: StrumDirection,
    ) -> crate::Result<usize> {
        let index = self.cursor.ok_or(StateError::NoCurrentStep)?;
        let step = Step::new(notes, strum)?;
        self.steps[index] = step;
        Ok(index)
    }

    /// Make step `index` current.
    pub fn move_to(&mut self, index: usize) -> Result<&Step, Boundary> {
        if index >= self.steps.len() {
            return Err(Boundary::OutOfRange {
                requested: index,
                len: self.steps.len(),
            });
        }
        self.cursor = Some(index);
        Ok(&self.steps[index])
    }

    /// Advance the cursor by one step.
    pub fn next(&mut self) -> Result<&Step, Boundary> {
        match self.cursor {
            Some(i) if i + 1 < self.steps.len() => {
                self.cursor = Some(i + 1);
                Ok(&self.steps[i + 1])
            }
            _ => Err(Boundary::NoNextStep),
        }
    }

    /// Move the cursor back by one step.
    pub fn previous(&mut self) -> Result<&Step, Boundary> {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                Ok(&self.steps[i - 1])
            }
            _ => Err(Boundary::NoPreviousStep),
        }
    }

    /// Remove step `index`. The cursor stays on the same position when it
    /// can, otherwise it moves to the new last step.
    pub fn remove(&mut self, index: usize) -> Result<Step, Boundary> {
        if index >= self.steps.len() {
            return Err(Boundary::OutOfRange {
                requested: index,
                len: self.steps.len(),
            });
        }
        let removed = self.steps.remove(index);
        self.cursor = match self.cursor {
            _ if self.steps.is_empty() => None,
            Some(c) if c > index => Some(c - 1),
            Some(c) => Some(c.min(self.steps.len() - 1)),
            None => None,
        };
        Ok(removed)
    }

    /// Drop every step.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.cursor = None;
    }

    /// Swap in a complete, already validated list of steps.
    ///
    /// The cursor lands on the first step, or `None` when `steps` is empty.
    pub fn replace_all(&mut self, steps: Vec<Step>) {
        self.cursor = if steps.is_empty() { None } else { Some(0) };
        self.steps = steps;
    }

    /// Index of the current step, `None` before anything is recorded.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor in the `-1`-for-none convention used by displays.
    pub fn cursor_position(&self) -> isize {
        self.cursor.map_or(-1, |c| c as isize)
    }

    pub fn current(&self) -> Option<&Step> {
        self.cursor.and_then(|c| self.steps.get(c))
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
