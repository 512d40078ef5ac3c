use crate::llm::capability::{ChatMessage, ChatRequest, TextRequest};
use crate::portrait::types::{AiLength, AiTone, OptionItem, ToneSettings};

pub const ANALYSIS_PROMPT: &str = r#"Analyze facial aesthetics. Provide professional assessment.
Return strict JSON:
{
  "scores": {
    "eyes": 0-100, "cheeks": 0-100, "lips": 0-100, "brows": 0-100, "jawline": 0-100, "symmetry": 0-100, "total": 0-100
  },
  "summary": string (2-sentence summary in Simplified Chinese. Use "照片中人物" instead of "您"),
  "keywords": string[] (8-10 aesthetic keywords in Chinese)
}"#;

const SCENARIO_SUGGESTION_PROMPT: &str = r#"You are a creative aesthetic director.
Generate 6 UNIQUE, CREATIVE, and STYLISH aesthetic personas/scenarios for a photo transformation app.
Examples: "Cyberpunk Rebel", "Forest Fairy", "Vintage 90s HK Star", "Clean Fit CEO".

Return strict JSON:
[
  { "id": "unique_id", "name": "Name (Chinese)", "description": "3 keywords description (Chinese)", "icon": "emoji" }
]"#;

const CHAT_FORMAT_INSTRUCTION: &str = " Keep the response concise and friendly. Return the response in JSON format with fields: 'response' (the answer string) and 'suggested_questions' (array of 3 follow-up questions).";

pub const OPTION_SUGGESTION_COUNT: usize = 4;

pub fn system_instruction(settings: &ToneSettings) -> String {
    let tone = match settings.tone {
        AiTone::Humorous => "Relaxed, witty, slightly humorous but respectful.",
        AiTone::Standard => "Professional, objective, and empathetic.",
        AiTone::Scientific => "Strictly scientific, data-driven, academic tone.",
    };
    let length = match settings.length {
        AiLength::Detailed => "Detailed, comprehensive explanations.",
        AiLength::Standard => "Concise and to the point.",
        AiLength::Concise => "Short, bullet-point style, minimal fluff.",
    };
    format!("You are Aesthetica AI, a professional medical aesthetic consultant. {tone} {length}")
}

pub fn analysis_request(settings: &ToneSettings) -> TextRequest {
    TextRequest {
        system_instruction: Some(system_instruction(settings)),
        prompt: ANALYSIS_PROMPT.to_string(),
    }
}

pub fn explain_request(selection: &str, settings: &ToneSettings) -> TextRequest {
    TextRequest {
        system_instruction: Some(system_instruction(settings)),
        prompt: format!(
            "Explain this medical/aesthetic term briefly: \"{}\".",
            selection.trim()
        ),
    }
}

pub fn chat_request(history: &[ChatMessage], message: &str, settings: &ToneSettings) -> ChatRequest {
    ChatRequest {
        system_instruction: format!("{}{}", system_instruction(settings), CHAT_FORMAT_INSTRUCTION),
        history: history.to_vec(),
        message: message.trim().to_string(),
    }
}

pub fn option_suggestion_request(category: &str, existing: &[OptionItem]) -> TextRequest {
    let labels = existing
        .iter()
        .map(|item| item.label.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    TextRequest {
        system_instruction: None,
        prompt: format!(
            "You are an expert aesthetic consultant.\nThe user is browsing the category \"{category}\".\nExisting options: {labels}.\nGenerate {OPTION_SUGGESTION_COUNT} NEW, CREATIVE, and DISTINCT options.\nReturn strict JSON: [{{\"id\": \"...\", \"label\": \"...\", \"tip\": \"...\", \"prompt\": \"...\"}}]"
        ),
    }
}

pub fn scenario_suggestion_request() -> TextRequest {
    TextRequest {
        system_instruction: None,
        prompt: SCENARIO_SUGGESTION_PROMPT.to_string(),
    }
}

pub fn scenario_config_request(scenario_name: &str) -> TextRequest {
    TextRequest {
        system_instruction: None,
        prompt: format!(
            r#"You are an expert aesthetic consultant.
Generate a complete aesthetic configuration for the persona/scenario: "{}".

Return strict JSON with the following structure:
{{
  "beauty": {{ "smooth": 0-100, "whiten": 0-100, "highClass": 0-100, "rich": 0-100, "pure": 0-100, "darkCircles": 0-100, "nasolabial": 0-100, "jawline": 0-100 }},
  "style": {{ "category": "one of [clinical, classical, mood, status, tweak]", "subOption": "string_id", "intensity": 0-100 }},
  "fashion": {{ "hairstyle": "string_id", "headwear": "string_id", "earrings": "string_id", "necklace": "string_id", "clothing": "string_id", "outerwear": "string_id", "footwear": "string_id", "accessories": "string_id" }},
  "background": {{ "lighting": "string_id", "environment": "string_id" }}
}}

For "fashion" and "style.subOption", try to use IDs that match common keys if possible (e.g. h_straight, xionghun), otherwise use descriptive keys.
For "background.lighting", use one of: studio, natural, cinematic, warm.
For "background.environment", use one of: solid, indoor, outdoor, artistic."#,
            scenario_name.trim()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_reflects_tone_and_length() {
        let text = system_instruction(&ToneSettings {
            tone: AiTone::Scientific,
            length: AiLength::Concise,
        });
        assert!(text.starts_with("You are Aesthetica AI"));
        assert!(text.contains("data-driven"));
        assert!(text.contains("bullet-point"));
    }

    #[test]
    fn option_suggestions_list_existing_labels() {
        let existing = vec![
            OptionItem::new("h_bob", "一刀切", ""),
            OptionItem::new("h_wool", "羊毛卷", ""),
        ];
        let request = option_suggestion_request("hairstyle", &existing);
        assert!(request.prompt.contains("\"hairstyle\""));
        assert!(request.prompt.contains("一刀切, 羊毛卷"));
        assert!(request.prompt.contains("Generate 4 NEW"));
    }

    #[test]
    fn scenario_request_names_the_persona() {
        let request = scenario_config_request("  森系精灵 ");
        assert!(request.prompt.contains("persona/scenario: \"森系精灵\""));
        assert!(request.prompt.contains("\"beauty\": {"));
    }

    #[test]
    fn chat_request_appends_format_instruction() {
        let request = chat_request(&[], " 下颌线是什么？ ", &ToneSettings::default());
        assert!(request.system_instruction.ends_with("(array of 3 follow-up questions)."));
        assert_eq!(request.message, "下颌线是什么？");
    }
}
