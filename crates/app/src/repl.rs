//! Terminal command parsing.

use assistant::compose_outgoing;
use shared::category::Category;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send
    Send(String),
    Category(Category),
    Clear,
    /// Reference a file by name in the next message
    Attach(String),
    Detach,
    /// List suggestions, or send the n-th (1-based)
    Suggest(Option<usize>),
    /// List quick modules, or send the n-th (1-based)
    Module(Option<usize>),
    Help,
    Quit,
    /// Malformed or unknown slash command, with a hint for the user
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "category" | "c" => match arg.parse::<Category>() {
                Ok(category) => Command::Category(category),
                Err(e) => Command::Invalid(e.to_string()),
            },
            "clear" | "new" => Command::Clear,
            "attach" if arg.is_empty() => Command::Invalid("Usage: /attach <path>".into()),
            "attach" => match Path::new(arg).file_name() {
                Some(name) => Command::Attach(name.to_string_lossy().to_string()),
                None => Command::Invalid(format!("Not a file: {}", arg)),
            },
            "detach" => Command::Detach,
            "suggest" | "s" => parse_index(arg).map_or_else(Command::Invalid, Command::Suggest),
            "module" | "m" => parse_index(arg).map_or_else(Command::Invalid, Command::Module),
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => Command::Invalid(format!("Unknown command: /{}", other)),
        }
    }
}

fn parse_index(arg: &str) -> Result<Option<usize>, String> {
    if arg.is_empty() {
        return Ok(None);
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(format!("Expected a positive number, got: {}", arg)),
    }
}

/// Attachment waiting to go out with the next message.
#[derive(Debug, Default)]
pub struct Draft {
    attachment: Option<String>,
}

impl Draft {
    pub fn attach(&mut self, name: String) {
        self.attachment = Some(name);
    }

    /// Returns whether there was an attachment to remove.
    pub fn detach(&mut self) -> bool {
        self.attachment.take().is_some()
    }

    /// Text to send for `text`; the attachment stays until [`Draft::sent`].
    pub fn outgoing(&self, text: &str) -> Option<String> {
        compose_outgoing(text, self.attachment.as_deref())
    }

    /// The message went out, so its attachment is used up.
    pub fn sent(&mut self) {
        self.attachment = None;
    }
}

/// Accepts the usual affirmative answers to a y/N prompt.
pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "是" | "确认"
    )
}

pub const HELP: &str = "\
命令:
  /category <data|process|office>  切换助手 (会清空当前对话)
  /clear                           清空当前对话
  /attach <path>                   为下一条消息添加附件 (仅发送文件名)
  /detach                          移除附件
  /suggest [n]                     查看或发送推荐问题
  /module [n]                      查看或发送快捷模块
  /help                            显示帮助
  /quit                            退出";
