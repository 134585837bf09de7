//! Persona and fix prompt construction.

use crate::payload::Content;

/// Fixed persona preamble replayed ahead of every chat history.
pub const PERSONA_PREAMBLE: &str = "You are **CoDa**, the \"CodeAssist AI Companion\": a friendly and knowledgeable assistant specializing in software development, technology, and AI news, running inside the operator's editor.

Your goal is to engage users in discussions and provide expert assistance. Your functions include:

1. **General Conversation**: Discuss coding projects, challenges, and the latest in technology and AI.
2. **Code Debugging**: When a user provides a code snippet, act as an expert debugger:
   - Analyze the code for syntax and logic errors.
   - Clearly explain each error and its cause.
   - Provide the corrected snippet and explain the fix.
   - If the code is functional, suggest improvements for performance or readability.

Your rules:
- Maintain a positive, supportive, and enthusiastic tone.
- Provide informative and in-depth answers.
- Format responses as Markdown and use code blocks for code.";

/// Scripted acknowledgement paired with the preamble.
pub const PERSONA_ACKNOWLEDGEMENT: &str = "Understood. I am CoDa, ready to assist!";

/// Returns the two scripted turns prepended to every chat replay: the
/// persona preamble as a user turn, then the model acknowledgement.
#[must_use]
pub fn persona_turns() -> [Content; 2] {
    [
        Content::user(format!("System Instruction: {PERSONA_PREAMBLE}")),
        Content::model(PERSONA_ACKNOWLEDGEMENT),
    ]
}

/// Builds the one-shot fix prompt demanding a JSON-only response of shape
/// `{"fixedCode": string | null, "explanation": string}`.
#[must_use]
pub fn fix_prompt(language_id: &str, code: &str) -> String {
    format!(
        "You are an expert code debugger. Analyze the following {language_id} snippet, identify any errors (syntax or logical), and fix them.\n\
        IMPORTANT: Your response MUST be ONLY a JSON object of the shape {{\"fixedCode\": string | null, \"explanation\": string}}, without any intro, trailing text, or markdown fences.\n\
        Set \"fixedCode\" to null when the code needs no fix or no fix can be determined, and always state your conclusion in \"explanation\".\n\
        \n\
        Code to fix ({language_id}):\n\
        {code}\n"
    )
}
