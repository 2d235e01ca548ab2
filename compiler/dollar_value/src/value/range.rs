use std::fmt;

/// Inclusive integer range; descending when `start > end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeValue {
    pub start: i64,
    pub end: i64,
}

impl RangeValue {
    pub fn new(start: i64, end: i64) -> Self {
        RangeValue { start, end }
    }

    pub fn len(self) -> u64 {
        self.start.abs_diff(self.end).saturating_add(1)
    }

    /// Ranges always hold at least one element.
    pub fn is_empty(self) -> bool {
        false
    }

    pub fn contains(self, n: i64) -> bool {
        let (lo, hi) = self.bounds();
        lo <= n && n <= hi
    }

    #[must_use]
    pub fn reversed(self) -> RangeValue {
        RangeValue::new(self.end, self.start)
    }

    pub fn bounds(self) -> (i64, i64) {
        (self.start.min(self.end), self.start.max(self.end))
    }

    /// Elements in iteration order.
    pub fn iter(self) -> Box<dyn Iterator<Item = i64>> {
        if self.start <= self.end {
            Box::new(self.start..=self.end)
        } else {
            Box::new((self.end..=self.start).rev())
        }
    }

    /// Element at `index`, in iteration order.
    pub fn get(self, index: u64) -> Option<i64> {
        if index >= self.len() {
            return None;
        }
        let offset = i64::try_from(index).ok()?;
        if self.start <= self.end {
            self.start.checked_add(offset)
        } else {
            self.start.checked_sub(offset)
        }
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
