// src/story/preferences.rs
// Story preferences collected from the form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Favourite story topic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[default]
    Dinosaurs,
    Space,
    Superheroes,
    MagicForest,
    OceanExploration,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Dinosaurs,
        Topic::Space,
        Topic::Superheroes,
        Topic::MagicForest,
        Topic::OceanExploration,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Dinosaurs => "Khủng long",
            Topic::Space => "Vũ trụ",
            Topic::Superheroes => "Siêu anh hùng",
            Topic::MagicForest => "Khu rừng Phép thuật",
            Topic::OceanExploration => "Thám hiểm Đại dương",
        }
    }
}

/// Reading level the story should be written at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingLevel {
    #[default]
    Simple,
    Medium,
    Advanced,
}

impl ReadingLevel {
    pub const ALL: [ReadingLevel; 3] = [
        ReadingLevel::Simple,
        ReadingLevel::Medium,
        ReadingLevel::Advanced,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReadingLevel::Simple => "Đơn giản",
            ReadingLevel::Medium => "Trung bình",
            ReadingLevel::Advanced => "Nâng cao",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a known {kind}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Match a trimmed label, or a 1-based menu index
fn parse_option<T: Copy>(
    options: &[T],
    label: impl Fn(&T) -> &'static str,
    kind: &'static str,
    input: &str,
) -> Result<T, UnknownOption> {
    let input = input.trim();
    if let Some(found) = options.iter().find(|&o| label(o) == input) {
        return Ok(*found);
    }
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i).copied())
        .ok_or_else(|| UnknownOption {
            kind,
            value: input.to_string(),
        })
}

impl FromStr for Topic {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option(&Topic::ALL, Topic::label, "topic", s)
    }
}

impl FromStr for ReadingLevel {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_option(&ReadingLevel::ALL, ReadingLevel::label, "reading level", s)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for ReadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything the reader chose before the story starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPreferences {
    pub character_name: String,
    pub friend_name: String,
    pub pet_name: String,
    pub pet_type: String,
    pub topic: Topic,
    pub lesson: String,
    pub reading_level: ReadingLevel,
}

/// One editable field of `StoryPreferences`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceField {
    CharacterName,
    FriendName,
    PetName,
    PetType,
    Topic,
    ReadingLevel,
    Lesson,
}

impl PreferenceField {
    /// Form order
    pub const ALL: [PreferenceField; 7] = [
        PreferenceField::CharacterName,
        PreferenceField::FriendName,
        PreferenceField::PetName,
        PreferenceField::PetType,
        PreferenceField::Topic,
        PreferenceField::ReadingLevel,
        PreferenceField::Lesson,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PreferenceField::CharacterName => "Tên nhân vật chính",
            PreferenceField::FriendName => "Tên người bạn",
            PreferenceField::PetName => "Tên thú cưng",
            PreferenceField::PetType => "Loài thú cưng",
            PreferenceField::Topic => "Chủ đề yêu thích",
            PreferenceField::ReadingLevel => "Trình độ đọc",
            PreferenceField::Lesson => "Bài học hoặc thông điệp",
        }
    }

    /// Example hint for free-text fields
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            PreferenceField::CharacterName => Some("Ví dụ: An"),
            PreferenceField::FriendName => Some("Ví dụ: Bình"),
            PreferenceField::PetName => Some("Ví dụ: Mực"),
            PreferenceField::PetType => Some("Ví dụ: chú chó"),
            PreferenceField::Lesson => Some("Ví dụ: Tầm quan trọng của sự chia sẻ"),
            PreferenceField::Topic | PreferenceField::ReadingLevel => None,
        }
    }

    /// Labels of the enumerated options, if this is a selector
    pub fn options(&self) -> Option<Vec<&'static str>> {
        match self {
            PreferenceField::Topic => Some(Topic::ALL.iter().map(Topic::label).collect()),
            PreferenceField::ReadingLevel => {
                Some(ReadingLevel::ALL.iter().map(ReadingLevel::label).collect())
            }
            _ => None,
        }
    }

    /// The form will not submit without a main character name
    pub fn is_required(&self) -> bool {
        matches!(self, PreferenceField::CharacterName)
    }
}

impl StoryPreferences {
    /// Current value of a field as displayed in the form
    pub fn value(&self, field: PreferenceField) -> &str {
        match field {
            PreferenceField::CharacterName => &self.character_name,
            PreferenceField::FriendName => &self.friend_name,
            PreferenceField::PetName => &self.pet_name,
            PreferenceField::PetType => &self.pet_type,
            PreferenceField::Topic => self.topic.label(),
            PreferenceField::ReadingLevel => self.reading_level.label(),
            PreferenceField::Lesson => &self.lesson,
        }
    }

    /// Copy of these preferences with one field replaced
    pub fn with_value(&self, field: PreferenceField, value: &str) -> Result<Self, UnknownOption> {
        let mut next = self.clone();
        match field {
            PreferenceField::CharacterName => next.character_name = value.to_string(),
            PreferenceField::FriendName => next.friend_name = value.to_string(),
            PreferenceField::PetName => next.pet_name = value.to_string(),
            PreferenceField::PetType => next.pet_type = value.to_string(),
            PreferenceField::Topic => next.topic = value.parse()?,
            PreferenceField::ReadingLevel => next.reading_level = value.parse()?,
            PreferenceField::Lesson => next.lesson = value.to_string(),
        }
        Ok(next)
    }
}
