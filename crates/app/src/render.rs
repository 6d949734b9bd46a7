//! Turns conversation events into terminal output.

use shared::category::Category;
use shared::events::{ClearReason, ConversationEvent, TurnOutcome};
use shared::message::{MessageId, Role};
use std::fmt::Write;

/// Welcome text shown for an empty conversation
pub fn welcome(category: Category) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", category.icon(), category.welcome());
    let _ = writeln!(out, "{}", category.description());
    let _ = writeln!(out, "\n快捷模块 (/module n):");
    for (i, module) in category.modules().iter().enumerate() {
        let _ = writeln!(out, "  {}. {} {} - {}", i + 1, module.icon, module.name, module.desc);
    }
    let _ = writeln!(out, "\n推荐问题 (/suggest n):");
    for (i, text) in category.suggestions().iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, text);
    }
    out
}

/// Prints only what each event adds to the screen.
#[derive(Debug)]
pub struct Renderer {
    category: Category,
    /// Reply being streamed and how many bytes of it are on screen
    streaming: Option<(MessageId, usize)>,
    new_chat: bool,
}

impl Renderer {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            streaming: None,
            new_chat: true,
        }
    }

    pub fn render(&mut self, event: &ConversationEvent) -> String {
        match event {
            ConversationEvent::MessageAppended(message) => match message.role {
                Role::User if self.new_chat => {
                    self.new_chat = false;
                    format!("── 正在与 {} 对话 ──\n", self.category.display_name())
                }
                Role::User => String::new(),
                Role::Model => {
                    self.streaming = Some((message.id, 0));
                    format!("[{}] 助手: ", message.formatted_time())
                }
            },
            ConversationEvent::ContentUpdated { id, content } => self.advance(*id, content),
            ConversationEvent::TurnFinished {
                id,
                outcome,
                content,
            } => {
                let mut out = match outcome {
                    TurnOutcome::Completed => self.advance(*id, content),
                    TurnOutcome::Failed => {
                        let partial = matches!(self.streaming, Some((sid, n)) if sid == *id && n > 0);
                        let prefix = if partial { "\n" } else { "" };
                        format!("{}{}", prefix, content)
                    }
                };
                self.streaming = None;
                out.push('\n');
                out
            }
            ConversationEvent::Cleared { category, reason } => {
                let mut out = String::new();
                if self.streaming.take().is_some() {
                    out.push('\n');
                }
                self.category = *category;
                self.new_chat = true;
                let notice = match reason {
                    ClearReason::CategorySwitch => format!("已切换到 {}", category.display_name()),
                    ClearReason::UserRequest => "对话已清空".to_string(),
                };
                let _ = writeln!(out, "── {} ──", notice);
                out.push_str(&welcome(*category));
                out
            }
            ConversationEvent::LoadingChanged(_) => String::new(),
        }
    }

    /// Emit the part of `content` not yet on screen.
    fn advance(&mut self, id: MessageId, content: &str) -> String {
        match &mut self.streaming {
            Some((sid, shown)) if *sid == id => {
                let fresh = content.get(*shown..).unwrap_or_default().to_string();
                *shown = content.len();
                fresh
            }
            _ => String::new(),
        }
    }
}
