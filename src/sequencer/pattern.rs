//! Step pattern for one track

use std::fmt;
use std::str::FromStr;

use super::STEPS;
use crate::error::SequencerError;

/// Sixteen on/off gates. `Copy`, so every toggle produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pattern {
    gates: [bool; STEPS],
}

impl Pattern {
    /// All gates off
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_gates(gates: [bool; STEPS]) -> Self {
        Self { gates }
    }

    /// Gate at `step`, or an error if the step is off the grid
    pub fn gate(&self, step: usize) -> Result<bool, SequencerError> {
        self.gates
            .get(step)
            .copied()
            .ok_or(SequencerError::StepOutOfRange(step))
    }

    /// Return a copy with the gate at `step` flipped
    pub fn toggled(self, step: usize) -> Result<Self, SequencerError> {
        let mut gates = self.gates;
        let gate = gates
            .get_mut(step)
            .ok_or(SequencerError::StepOutOfRange(step))?;
        *gate = !*gate;
        Ok(Self { gates })
    }

    pub fn gates(&self) -> &[bool; STEPS] {
        &self.gates
    }

    /// Number of active gates
    pub fn active_count(&self) -> usize {
        self.gates.iter().filter(|g| **g).count()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gate in &self.gates {
            f.write_str(if *gate { "x" } else { "." })?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = SequencerError;

    /// Parse sixteen characters: `x`/`X` for on, `.`/`-` for off.
    /// Whitespace is ignored so patterns can be grouped by beat.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SequencerError::InvalidPattern(s.to_string());
        let mut gates = [false; STEPS];
        let mut count = 0;

        for c in s.chars().filter(|c| !c.is_whitespace()) {
            let gate = match c {
                'x' | 'X' => true,
                '.' | '-' => false,
                _ => return Err(invalid()),
            };
            *gates.get_mut(count).ok_or_else(invalid)? = gate;
            count += 1;
        }

        if count != STEPS {
            return Err(invalid());
        }
        Ok(Self { gates })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pattern_is_silent() {
        let pattern = Pattern::new();
        assert_eq!(pattern.active_count(), 0);
        assert_eq!(pattern.to_string(), "................");
    }

    #[test]
    fn test_toggle_flips_only_one_gate() {
        let original: Pattern = "x..x....x.......".parse().unwrap();
        for i in 0..STEPS {
            let toggled = original.toggled(i).unwrap();
            for j in 0..STEPS {
                if j == i {
                    assert_ne!(toggled.gate(j).unwrap(), original.gate(j).unwrap());
                } else {
                    assert_eq!(toggled.gate(j).unwrap(), original.gate(j).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_double_toggle_is_identity() {
        let original: Pattern = "x.x.x.x.xx..xx..".parse().unwrap();
        for i in 0..STEPS {
            assert_eq!(original.toggled(i).unwrap().toggled(i).unwrap(), original);
        }
    }

    #[test]
    fn test_toggle_leaves_source_untouched() {
        let original = Pattern::new();
        let toggled = original.toggled(3).unwrap();
        assert!(!original.gate(3).unwrap());
        assert!(toggled.gate(3).unwrap());
    }

    #[test]
    fn test_step_out_of_range() {
        let pattern = Pattern::new();
        assert_eq!(pattern.gate(16), Err(SequencerError::StepOutOfRange(16)));
        assert_eq!(pattern.toggled(99), Err(SequencerError::StepOutOfRange(99)));
    }

    #[test]
    fn test_parse() {
        let pattern: Pattern = "x--- X... x-x- ....".parse().unwrap();
        assert_eq!(pattern.to_string(), "x...x...x.x.....");
        assert_eq!(pattern.active_count(), 4);

        assert!("x...".parse::<Pattern>().is_err());
        assert!("x...x...x...x...x".parse::<Pattern>().is_err());
        assert!("o...x...x...x...".parse::<Pattern>().is_err());
    }
}
