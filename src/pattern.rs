use serde::Serialize;

/// Active weeks of a course section, as 1-based week numbers in ascending
/// order.
///
/// Each character of the source pattern stands for one week of the term. Any
/// ASCII digit marks the week as active; the digit's value is ignored. Every
/// other character (usually `-` or a space) marks an inactive week.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeekPattern(Vec<u32>);

impl WeekPattern {
    pub fn decode(pattern: &str) -> Self {
        let weeks = pattern
            .chars()
            .zip(1..)
            .filter(|(c, _)| c.is_ascii_digit())
            .map(|(_, week)| week)
            .collect();
        Self(weeks)
    }

    pub fn weeks(&self) -> &[u32] {
        &self.0
    }

    pub fn first(&self) -> Option<u32> {
        self.0.first().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
