//! Prompt templates for Paddock.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub chat: ChatPrompts,
}

/// Prompts for grounded chat responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    /// System prompt template. `{{context}}` is replaced with the
    /// JSON-stringified retrieved chunks (an empty string when retrieval
    /// was skipped or failed).
    pub system: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            system: r#"Você é um assistente de IA que sabe tudo sobre Fórmula 1.
Use o contexto abaixo para complementar o que você já sabe sobre corridas de Fórmula 1.
O contexto fornecerá os dados mais recentes de páginas da Wikipédia,
do site oficial da F1 e de outras fontes.
Se o contexto não incluir as informações necessárias, responda com base no seu
conhecimento existente e não mencione a fonte da informação nem
o que o contexto inclui ou não inclui.
Formate as respostas usando markdown quando aplicável e não retorne
imagens.

----------
STARTER CONTEXT:
{{context}}
END CONTEXT
------------"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the defaults, with an optional custom directory.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let chat_path = custom_path.join("chat.toml");
            if chat_path.exists() {
                let content = std::fs::read_to_string(&chat_path)?;
                prompts.chat = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_has_a_context_slot() {
        let prompts = Prompts::default();
        assert!(prompts.chat.system.contains("{{context}}"));
        assert!(prompts.chat.system.contains("Fórmula 1"));
    }

    #[test]
    fn render_substitutes_variables() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "[\"chunk um\"]".to_string());

        let rendered = Prompts::render("CONTEXT: {{context}}", &vars);
        assert_eq!(rendered, "CONTEXT: [\"chunk um\"]");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let rendered = Prompts::render("{{missing}}", &HashMap::new());
        assert_eq!(rendered, "{{missing}}");
    }
}
