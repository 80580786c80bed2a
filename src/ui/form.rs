// src/ui/form.rs
// Preference form: an immutable record plus field prompts

use thiserror::Error;

use crate::story::{PreferenceField, StoryPreferences, UnknownOption};

pub const FORM_HEADING: &str = "Tạo nên câu chuyện của bạn";
pub const FORM_INTRO: &str = "Hãy điền vào các chi tiết bên dưới để bắt đầu cuộc phiêu lưu!";
pub const SUBMIT_LABEL: &str = "Bắt đầu câu chuyện của tôi ✨";
pub const SUBMITTING_LABEL: &str = "Đang dệt nên giấc mơ...";

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error(transparent)]
    UnknownOption(#[from] UnknownOption),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryForm {
    prefs: StoryPreferences,
}

impl StoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferences(&self) -> &StoryPreferences {
        &self.prefs
    }

    pub fn into_preferences(self) -> StoryPreferences {
        self.prefs
    }

    /// New form with one field set from raw input
    ///
    /// Blank input leaves a selector on its current option and is refused
    /// for a required field.
    pub fn with_input(&self, field: PreferenceField, input: &str) -> Result<Self, FormError> {
        let input = input.trim();
        if input.is_empty() {
            if field.options().is_some() {
                return Ok(self.clone());
            }
            if field.is_required() {
                return Err(FormError::Required(field.label()));
            }
        }
        Ok(Self {
            prefs: self.prefs.with_value(field, input)?,
        })
    }

    pub fn submit_label(loading: bool) -> &'static str {
        if loading { SUBMITTING_LABEL } else { SUBMIT_LABEL }
    }

    /// Prompt line for one field, e.g. `Tên nhân vật chính (Ví dụ: An): `
    pub fn field_prompt(&self, field: PreferenceField) -> String {
        match field.options() {
            Some(options) => {
                let menu = options
                    .iter()
                    .enumerate()
                    .map(|(i, label)| format!("  {}. {}", i + 1, label))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "{}\n{}\n{} [{}]: ",
                    field.label(),
                    menu,
                    field.label(),
                    self.prefs.value(field)
                )
            }
            None => {
                let marker = if field.is_required() { " *" } else { "" };
                match field.placeholder() {
                    Some(hint) => format!("{}{} ({}): ", field.label(), marker, hint),
                    None => format!("{}{}: ", field.label(), marker),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{ReadingLevel, Topic};

    #[test]
    fn test_with_input_returns_new_record() {
        let empty = StoryForm::new();
        let filled = empty
            .with_input(PreferenceField::CharacterName, "  An ")
            .unwrap()
            .with_input(PreferenceField::ReadingLevel, "2")
            .unwrap();

        assert_eq!(empty, StoryForm::new());
        assert_eq!(filled.preferences().character_name, "An");
        assert_eq!(filled.preferences().reading_level, ReadingLevel::Medium);
    }

    #[test]
    fn test_blank_selector_keeps_current_option() {
        let form = StoryForm::new()
            .with_input(PreferenceField::Topic, "Vũ trụ")
            .unwrap()
            .with_input(PreferenceField::Topic, "")
            .unwrap();
        assert_eq!(form.preferences().topic, Topic::Space);
    }

    #[test]
    fn test_blank_text_clears_field() {
        let form = StoryForm::new()
            .with_input(PreferenceField::PetName, "Mực")
            .unwrap()
            .with_input(PreferenceField::PetName, " ")
            .unwrap();
        assert!(form.preferences().pet_name.is_empty());
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = StoryForm::new().with_input(PreferenceField::Topic, "9").unwrap_err();
        assert!(matches!(err, FormError::UnknownOption(_)));
    }

    #[test]
    fn test_blank_character_name_is_refused() {
        let form = StoryForm::new()
            .with_input(PreferenceField::CharacterName, "An")
            .unwrap();

        for blank in ["", "   "] {
            let err = form.with_input(PreferenceField::CharacterName, blank).unwrap_err();
            assert!(matches!(err, FormError::Required(_)));
            assert_eq!(err.to_string(), "Tên nhân vật chính is required");
        }
        assert_eq!(form.preferences().character_name, "An");
    }

    #[test]
    fn test_field_prompts() {
        let form = StoryForm::new();
        assert_eq!(
            form.field_prompt(PreferenceField::CharacterName),
            "Tên nhân vật chính * (Ví dụ: An): "
        );
        let topic = form.field_prompt(PreferenceField::Topic);
        assert!(topic.contains("  1. Khủng long"));
        assert!(topic.contains("  5. Thám hiểm Đại dương"));
        assert!(topic.ends_with("[Khủng long]: "));
    }

    #[test]
    fn test_submit_label_tracks_loading() {
        assert_eq!(StoryForm::submit_label(false), SUBMIT_LABEL);
        assert_eq!(StoryForm::submit_label(true), SUBMITTING_LABEL);
    }
}
