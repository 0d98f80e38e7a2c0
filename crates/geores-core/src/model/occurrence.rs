// crates/geores-core/src/model/occurrence.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A location name found in a document, with the offset at which it starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationOccurrence {
    pub text: String,
    pub position: usize,
}

impl LocationOccurrence {
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    /// Builds occurrences for a list of names as if they appeared in that
    /// order separated by single spaces.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Vec<Self> {
        let mut position = 0;
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let occurrence = LocationOccurrence::new(name, position);
                position += name.chars().count() + 1;
                occurrence
            })
            .collect()
    }
}

impl fmt::Display for LocationOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\":{}", self.text, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_uses_text_and_position() {
        let a = LocationOccurrence::new("Boston", 0);
        assert_eq!(a, LocationOccurrence::new("Boston", 0));
        assert_ne!(a, LocationOccurrence::new("Boston", 7));
        assert_ne!(a, LocationOccurrence::new("boston", 0));
        assert_eq!(a.to_string(), "\"Boston\":0");
    }

    #[test]
    fn from_names_assigns_running_offsets() {
        let occurrences = LocationOccurrence::from_names(&["Boston", "Haverhill", "Zürich"]);
        let positions: Vec<usize> = occurrences.iter().map(|o| o.position).collect();
        assert_eq!(positions, vec![0, 7, 17]);
    }
}
