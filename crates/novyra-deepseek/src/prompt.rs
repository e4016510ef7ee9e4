// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt construction.

use std::fmt::Write as _;

use novyra_core::types::SessionContext;
use novyra_router::catalog::{packages, HOURS_CONTENT, SERVICES};
use tracing::{info, warn};

/// Loads the base system prompt following priority: file > inline > default.
pub async fn load_system_prompt(
    assistant_name: &str,
    business_name: &str,
    inline_prompt: &Option<String>,
    prompt_file: &Option<String>,
) -> String {
    if let Some(file_path) = prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim().to_string();
                if !trimmed.is_empty() {
                    info!(path = file_path, "loaded system prompt from file");
                    return trimmed;
                }
            }
            Err(e) => {
                warn!(
                    path = file_path,
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = inline_prompt
        && !prompt.trim().is_empty()
    {
        return prompt.clone();
    }

    default_prompt(assistant_name, business_name)
}

/// Persona, business facts and the escalation policy.
pub fn default_prompt(assistant_name: &str, business_name: &str) -> String {
    let mut prompt = format!(
        "You are {assistant_name}, the friendly AI customer support assistant for {business_name}. \
         You are warm, conversational and professional. Answer questions directly, including \
         casual questions about yourself or general topics.\n\n**Our Services:**\n"
    );
    for service in SERVICES {
        let _ = writeln!(prompt, "- {}", service.title());
    }

    prompt.push_str("\n**Pricing Packages:**\n");
    for package in packages() {
        let _ = writeln!(prompt, "\n{} PACKAGE - {}", package.name.to_uppercase(), package.price);
        for feature in &package.features {
            let _ = writeln!(prompt, "• {feature}");
        }
    }

    prompt.push('\n');
    prompt.push_str(HOURS_CONTENT);
    prompt.push_str(ESCALATION_POLICY);
    prompt
}

const ESCALATION_POLICY: &str = "

**When to connect the customer to a human agent:**
ONLY when the customer explicitly asks for a human or agent, is ready to buy or start a project right now, has a serious complaint, or asks about account-specific details you cannot see.

Do NOT escalate for general questions about services, pricing or packages, for casual conversation, or when you are merely unsure. Try to help first.

When you do escalate, say so clearly, for example: \"I'd be happy to connect you with one of our team members who can help you with that!\" or \"Let me connect you with an agent who can assist you further.\"

Never reply with \"I can't answer that\". Be honest about what you don't know and help with what you do.";

/// Appends the per-session context block to `base`.
///
/// Nothing is appended when the session has no topic, no package interest,
/// and business hours are open.
pub fn with_context(base: &str, context: &SessionContext, business_hours: bool) -> String {
    let mut lines = Vec::new();
    if let Some(intent) = context.last_intent.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Previous conversation topic: {intent}"));
    }
    if let Some(package) = context.package_selected.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("Customer showed interest in: {package}"));
    }
    if !business_hours {
        lines.push(
            "It is currently outside business hours; agents will follow up by email.".to_string(),
        );
    }

    if lines.is_empty() {
        base.to_string()
    } else {
        format!("{base}\n\n**Conversation Context:**\n{}", lines.join("\n"))
    }
}
