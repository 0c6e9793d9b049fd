//! Linear output ramp for click-free enable/disable.
//!
//! A ramp is a bounded sequence of DAC values; the engine writes each one
//! and waits between them. Cooperative context only.

/// Ramp direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    /// 0 → target
    Up,
    /// target → 0
    Down,
}

/// Iterator over the intermediate values of a ramp.
///
/// Yields `steps` values. The final value (`target` for up, 0 for down)
/// is not included; the caller writes it after the last delay.
#[derive(Debug, Clone)]
pub struct Ramp {
    target: u8,
    steps: u8,
    index: u8,
    direction: RampDirection,
}

impl Ramp {
    pub fn up(target: u8, steps: u8) -> Self {
        Self::new(target, steps, RampDirection::Up)
    }

    pub fn down(from: u8, steps: u8) -> Self {
        Self::new(from, steps, RampDirection::Down)
    }

    fn new(target: u8, steps: u8, direction: RampDirection) -> Self {
        Self {
            target,
            steps,
            index: 0,
            direction,
        }
    }

    /// Value the output settles at once the ramp is done.
    pub fn end_value(&self) -> u8 {
        match self.direction {
            RampDirection::Up => self.target,
            RampDirection::Down => 0,
        }
    }
}

impl Iterator for Ramp {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.index >= self.steps {
            return None;
        }

        let scaled = (self.target as u32 * self.index as u32 / self.steps as u32) as u8;
        self.index += 1;

        Some(match self.direction {
            RampDirection::Up => scaled,
            RampDirection::Down => self.target - scaled,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.steps.saturating_sub(self.index) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Ramp {}
