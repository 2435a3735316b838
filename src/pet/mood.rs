//! Mood derivation.
//!
//! Exactly one mood holds at any instant.  Priority, highest first:
//!
//! | # | Condition            | Mood    |
//! |---|----------------------|---------|
//! | 1 | happy flag raised    | Happy   |
//! | 2 | angry flag raised    | Angry   |
//! | 3 | sleepiness < 20      | Sleepy  |
//! | 4 | hunger < 20          | Angry   |
//! | 5 | boredom < 20         | Sad     |
//! | 6 | otherwise            | Neutral |

use serde::Serialize;

/// Stat level under which the pet's face changes.
pub const MOOD_THRESHOLD: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mood {
    Neutral,
    Angry,
    Happy,
    Sleepy,
    Sad,
}

/// Everything the mood depends on, sampled at one instant.
#[derive(Debug, Clone, Copy)]
pub struct MoodInputs {
    pub happy: bool,
    pub angry: bool,
    pub hunger: u8,
    pub boredom: u8,
    pub sleepiness: u8,
}

pub fn derive_mood(m: &MoodInputs) -> Mood {
    if m.happy {
        return Mood::Happy;
    }
    if m.angry {
        return Mood::Angry;
    }
    if m.sleepiness < MOOD_THRESHOLD {
        return Mood::Sleepy;
    }
    if m.hunger < MOOD_THRESHOLD {
        return Mood::Angry;
    }
    if m.boredom < MOOD_THRESHOLD {
        return Mood::Sad;
    }
    Mood::Neutral
}
