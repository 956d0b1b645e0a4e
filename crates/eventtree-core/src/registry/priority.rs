use std::fmt;

/// Handler priority level
///
/// The rank is the delivery order: `Highest` handlers run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Delivered first
    Highest = 0,
    High = 1,
    /// Default priority
    Normal = 2,
    Low = 3,
    /// Delivered last
    Lowest = 4,
}

impl Priority {
    /// Every priority, in delivery order
    pub const ALL: [Priority; 5] = [
        Priority::Highest,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::Lowest,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Highest => "Highest",
            Priority::High => "High",
            Priority::Normal => "Normal",
            Priority::Low => "Low",
            Priority::Lowest => "Lowest",
        };
        f.write_str(label)
    }
}
