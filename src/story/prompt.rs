// src/story/prompt.rs
// Fixed storyteller instruction, reply schema and per-turn prompts

use serde_json::{json, Value};

use super::preferences::StoryPreferences;
use crate::llm::ChatConfig;

pub const SYSTEM_INSTRUCTION: &str = "Bạn là một người kể chuyện chuyên nghiệp cho trẻ em. \
Nhiệm vụ của bạn là tạo ra một câu chuyện tương tác \"chọn cuộc phiêu lưu của riêng bạn\".
Sau khi viết một đoạn của câu chuyện, bạn PHẢI cung cấp chính xác hai lựa chọn để người đọc quyết định điều gì sẽ xảy ra tiếp theo.
Định dạng phản hồi của bạn dưới dạng một đối tượng JSON có hai khóa: \"storyPart\" và \"choices\".
\"storyPart\" phải là một chuỗi chứa đoạn truyện.
\"choices\" phải là một mảng gồm hai chuỗi, mỗi chuỗi là một lựa chọn riêng biệt. Nếu câu chuyện nên kết thúc, hãy để mảng \"choices\" trống.";

// Stand-ins for empty free-text fields
pub const DEFAULT_CHARACTER: &str = "một người bạn dũng cảm";
pub const DEFAULT_FRIEND: &str = "một người bạn đồng hành trung thành";
pub const DEFAULT_PET_NAME: &str = "một con vật";
pub const DEFAULT_PET_TYPE: &str = "bí ẩn";
pub const DEFAULT_LESSON: &str = "khám phá những điều mới mẻ";

/// Returns the structured-output schema for story replies
/// Uses Gemini's OpenAPI subset (upper-case type names)
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "storyPart": {
                "type": "STRING",
                "description": "Một đoạn của câu chuyện."
            },
            "choices": {
                "type": "ARRAY",
                "description": "Một mảng gồm 2 chuỗi cho lựa chọn tiếp theo của người dùng. Mảng này sẽ trống nếu câu chuyện kết thúc.",
                "items": { "type": "STRING" }
            }
        },
        "required": ["storyPart", "choices"]
    })
}

/// Conversation settings for a new story
pub fn chat_config(model: &str) -> ChatConfig {
    ChatConfig {
        model: model.to_string(),
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        response_schema: response_schema(),
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

/// First turn: every preference, with placeholders for blanks
pub fn initial_prompt(prefs: &StoryPreferences) -> String {
    format!(
        "Bắt đầu một câu chuyện dựa trên các chi tiết sau:\n\
         - Nhân vật chính: {}\n\
         - Bạn bè: {}\n\
         - Thú cưng: {} là {}\n\
         - Chủ đề: {}\n\
         - Bài học/Thông điệp: {}\n\
         - Trình độ đọc: {}",
        or_default(&prefs.character_name, DEFAULT_CHARACTER),
        or_default(&prefs.friend_name, DEFAULT_FRIEND),
        or_default(&prefs.pet_name, DEFAULT_PET_NAME),
        or_default(&prefs.pet_type, DEFAULT_PET_TYPE),
        prefs.topic.label(),
        or_default(&prefs.lesson, DEFAULT_LESSON),
        prefs.reading_level.label(),
    )
}

pub fn continuation_prompt(choice: &str) -> String {
    format!("Người dùng đã chọn: \"{}\". Hãy tiếp tục câu chuyện.", choice)
}
