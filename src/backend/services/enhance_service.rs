// src/backend/services/enhance_service.rs
use crate::error::VaultError;
use crate::metrics;
use crate::services::ports::TextEnhancer;

/// Instruction sent ahead of the user's message.
pub fn build_enhance_prompt(content: &str) -> String {
    format!(
        "You are a professional message writer for a digital time capsule app called TimeVault. \n\
    Enhance and polish the following message to make it sound more emotional, thoughtful, and meaningful, while keeping the core message and intent exactly the same. \n\
    If it's a short note, make it poetic. If it's a letter, make it formal yet warm.\n\
    \n\
    Return ONLY the enhanced message text. No conversational filler, no quotes around the response, no explanations.\n\
\n\
    Message to enhance:\n\
    \"{}\"",
        content
    )
}

/// Trims and drops one leading and one trailing quote mark, if present.
pub fn clean_enhanced_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_lead = trimmed
        .strip_prefix('"')
        .or_else(|| trimmed.strip_prefix('\''))
        .unwrap_or(trimmed);
    without_lead
        .strip_suffix('"')
        .or_else(|| without_lead.strip_suffix('\''))
        .unwrap_or(without_lead)
        .to_string()
}

/// Rewrites `content` through the configured model.
pub async fn enhance<E: TextEnhancer>(enhancer: &E, content: &str) -> Result<String, VaultError> {
    if content.trim().is_empty() {
        return Err(VaultError::InvalidInput("Content is required".to_string()));
    }
    match enhancer.generate(&build_enhance_prompt(content)).await {
        Ok(raw) => {
            metrics::record_enhancement();
            Ok(clean_enhanced_text(&raw))
        }
        Err(e) => {
            metrics::record_upstream_failure();
            log_error!("AI Enhancement Error: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    struct Echo(&'static str);

    impl TextEnhancer for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, VaultError> {
            assert!(prompt.contains("Message to enhance:"));
            Ok(self.0.to_string())
        }
    }

    struct Down;

    impl TextEnhancer for Down {
        async fn generate(&self, _prompt: &str) -> Result<String, VaultError> {
            Err(VaultError::HttpError("timeout".into()))
        }
    }

    #[test]
    fn strips_wrapping_quotes_once() {
        assert_eq!(clean_enhanced_text("  \"Dear you\"\n"), "Dear you");
        assert_eq!(clean_enhanced_text("'single'"), "single");
        assert_eq!(clean_enhanced_text("\"\"double\"\""), "\"double\"");
        assert_eq!(clean_enhanced_text("it's fine"), "it's fine");
    }

    #[test]
    fn prompt_quotes_the_message() {
        let prompt = build_enhance_prompt("see you in 2030");
        assert!(prompt.starts_with("You are a professional message writer"));
        assert!(prompt.ends_with("\"see you in 2030\""));
    }

    #[test]
    fn enhance_cleans_model_output() {
        assert_eq!(block_on(enhance(&Echo("\"Polished.\""), "hi")).unwrap(), "Polished.");
    }

    #[test]
    fn enhance_rejects_empty_and_surfaces_failures() {
        assert!(matches!(block_on(enhance(&Echo("x"), " ")), Err(VaultError::InvalidInput(_))));
        assert!(matches!(block_on(enhance(&Down, "hi")), Err(VaultError::HttpError(_))));
    }
}
