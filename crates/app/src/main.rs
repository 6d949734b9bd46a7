mod render;
mod repl;
mod settings;

use anyhow::{Context, Result};
use assistant::{ConversationController, RejectReason, SubmitOutcome};
use providers::GeminiClient;
use repl::{Command, Draft};
use shared::events::ConversationEvent;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with a streamed reply
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let path = settings::config_path();
    let (settings, _) = settings::load_or_default(path.as_deref());

    let client = GeminiClient::from_settings(&settings.model)
        .context("Set GEMINI_API_KEY or add model.gemini_auth.api_key to settings.json")?;
    tracing::info!(model = client.model(), "gemini provider ready");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let controller = Arc::new(
        ConversationController::new(Arc::new(client), settings.default_category)
            .with_events(events_tx)
            .with_base_instruction(settings.system_instruction.clone()),
    );
    tokio::spawn(print_events(events_rx, settings.default_category));

    print!("{}", render::welcome(controller.category()));
    println!("输入 /help 查看命令。");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut draft = Draft::default();
    let mut confirming_clear = false;

    while let Some(line) = lines.next_line().await? {
        if confirming_clear {
            confirming_clear = false;
            if repl::is_yes(&line) {
                controller.clear_conversation();
            } else {
                println!("已取消。");
            }
            continue;
        }

        match Command::parse(&line) {
            Command::Send(text) => {
                if let Some(outgoing) = draft.outgoing(&text) {
                    if start_turn(&controller, outgoing) {
                        draft.sent();
                    }
                }
            }
            Command::Category(category) => {
                if !controller.select_category(category) {
                    println!("当前已是 {}。", category.display_name());
                }
            }
            Command::Clear if settings.confirm_clear => {
                println!("确认清空当前对话记录吗？(y/N)");
                confirming_clear = true;
            }
            Command::Clear => controller.clear_conversation(),
            Command::Attach(name) => {
                println!("已添加附件: {}", name);
                draft.attach(name);
            }
            Command::Detach => {
                if draft.detach() {
                    println!("已移除附件。");
                }
            }
            Command::Suggest(index) => {
                let category = controller.category();
                pick(category.suggestions(), index, |text| {
                    start_turn(&controller, text.to_string());
                });
            }
            Command::Module(index) => {
                let category = controller.category();
                let prompts: Vec<String> = category
                    .modules()
                    .iter()
                    .map(|m| category.module_prompt(m))
                    .collect();
                pick(&prompts, index, |text| {
                    start_turn(&controller, text.to_string());
                });
            }
            Command::Help => println!("{}", repl::HELP),
            Command::Quit => break,
            Command::Invalid(hint) => println!("{}", hint),
        }
    }

    Ok(())
}

/// List `items`, or act on the 1-based `index`.
fn pick<T: AsRef<str>>(items: &[T], index: Option<usize>, send: impl FnOnce(&str)) {
    match index {
        None => {
            for (i, item) in items.iter().enumerate() {
                println!("  {}. {}", i + 1, item.as_ref());
            }
        }
        Some(n) => match items.get(n - 1) {
            Some(item) => {
                println!("你: {}", item.as_ref());
                send(item.as_ref());
            }
            None => println!("没有第 {} 项。", n),
        },
    }
}

/// Run one turn in the background so commands stay responsive while it streams.
/// Returns `false` when a reply is still generating and nothing was started.
fn start_turn(controller: &Arc<ConversationController>, text: String) -> bool {
    if controller.is_loading() {
        println!("正在生成回复，请稍候…");
        return false;
    }
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        match controller.submit(&text).await {
            SubmitOutcome::Rejected(RejectReason::TurnInFlight) => {
                println!("正在生成回复，请稍候…");
            }
            outcome => tracing::debug!(?outcome, "turn ended"),
        }
    });
    true
}

async fn print_events(
    mut rx: mpsc::UnboundedReceiver<ConversationEvent>,
    category: shared::category::Category,
) {
    let mut renderer = render::Renderer::new(category);
    while let Some(event) = rx.recv().await {
        let out = renderer.render(&event);
        if !out.is_empty() {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(out.as_bytes());
            let _ = stdout.flush();
        }
    }
}
