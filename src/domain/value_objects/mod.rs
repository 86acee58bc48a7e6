use serde::{Deserialize, Serialize};

/// Number of outstanding messages a device may pull in one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Take(u32);

impl Take {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 10;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Take {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingFilter {
    pub owner: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_is_clamped_into_range() {
        assert_eq!(Take::new(0).get(), 1);
        assert_eq!(Take::new(5).get(), 5);
        assert_eq!(Take::new(10).get(), 10);
        assert_eq!(Take::new(500).get(), 10);
        assert_eq!(Take::default().get(), 1);
    }
}
