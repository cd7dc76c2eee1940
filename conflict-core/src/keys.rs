use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keys a participant may answer a stimulus trial with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKey {
    #[serde(rename = ",")]
    Comma,
    #[serde(rename = ".")]
    Period,
    #[serde(rename = "/")]
    Slash,
}

impl ResponseKey {
    pub fn as_char(&self) -> char {
        match self {
            ResponseKey::Comma => ',',
            ResponseKey::Period => '.',
            ResponseKey::Slash => '/',
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ResponseKey::Comma => "comma key (,)",
            ResponseKey::Period => "period key (.)",
            ResponseKey::Slash => "forward slash key (/)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Index,
    Middle,
    Ring,
}

impl Finger {
    pub fn name(&self) -> &'static str {
        match self {
            Finger::Index => "index finger",
            Finger::Middle => "middle finger",
            Finger::Ring => "ring finger",
        }
    }

    /// Fingers rest on fixed keys regardless of counterbalancing group.
    pub fn key(&self) -> ResponseKey {
        match self {
            Finger::Index => ResponseKey::Comma,
            Finger::Middle => ResponseKey::Period,
            Finger::Ring => ResponseKey::Slash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAssignment {
    pub finger: Finger,
    pub key: ResponseKey,
}

impl From<Finger> for KeyAssignment {
    fn from(finger: Finger) -> Self {
        Self {
            finger,
            key: finger.key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyMappingError {
    #[error("group index {0} out of bounds (expected 0..=14)")]
    GroupIndexOutOfBounds(i32),
}

/// Response slots of a task, each bound to a finger/key for one
/// counterbalancing group. Slot meaning is task specific (flanker: H, F;
/// Stroop: red, blue, green).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMapping<const N: usize> {
    slots: [KeyAssignment; N],
}

impl KeyMapping<2> {
    pub fn flanker(group_index: i32) -> Result<Self, KeyMappingError> {
        use Finger::*;
        let fingers = match group_index {
            0..=4 => [Index, Middle],
            5..=14 => [Middle, Index],
            _ => return Err(KeyMappingError::GroupIndexOutOfBounds(group_index)),
        };
        Ok(Self::from_fingers(fingers))
    }
}

impl KeyMapping<3> {
    pub fn stroop(group_index: i32) -> Result<Self, KeyMappingError> {
        use Finger::*;
        let fingers = match group_index {
            0..=2 => [Index, Middle, Ring],
            3..=5 => [Index, Ring, Middle],
            6..=8 => [Ring, Index, Middle],
            9..=11 => [Ring, Middle, Index],
            12..=14 => [Middle, Ring, Index],
            _ => return Err(KeyMappingError::GroupIndexOutOfBounds(group_index)),
        };
        Ok(Self::from_fingers(fingers))
    }
}

impl<const N: usize> KeyMapping<N> {
    fn from_fingers(fingers: [Finger; N]) -> Self {
        Self {
            slots: fingers.map(KeyAssignment::from),
        }
    }

    pub fn slots(&self) -> &[KeyAssignment; N] {
        &self.slots
    }

    pub fn key(&self, slot: usize) -> Option<ResponseKey> {
        self.slots.get(slot).map(|a| a.key)
    }

    pub fn slot_of(&self, key: ResponseKey) -> Option<usize> {
        self.slots.iter().position(|a| a.key == key)
    }

    /// Keys accepted on a stimulus trial, in slot order.
    pub fn choices(&self) -> Vec<ResponseKey> {
        self.slots.iter().map(|a| a.key).collect()
    }
}
