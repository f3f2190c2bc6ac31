//! A terminal front end for the chat widget.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use chat_widget::SessionBuilder;
use chat_widget::core::controller::ControllerState;
use chat_widget::core::message::{Message, PENDING_TEXT, Sender};
use chat_widget::core::shell::{EMPTY_PLACEHOLDER, HEADER_TITLE};
use chat_widget::core::{ChatView, Widget, WidgetView};
use chat_widget::speech::{DictationRequest, LineDictation};
use chat_widget_gemini_model::{GeminiConfigBuilder, GeminiProvider};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum SessionEvent {
    Changed(WidgetView),
    Dictation(DictationRequest),
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Open,
    Menu,
    Dismiss,
    New,
    History,
    Clear,
    Mic,
    Help,
    Quit,
    Message(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line {
            "/open" => Command::Open,
            "/menu" => Command::Menu,
            "/dismiss" => Command::Dismiss,
            "/new" => Command::New,
            "/history" => Command::History,
            "/clear" => Command::Clear,
            "/mic" => Command::Mic,
            "/help" => Command::Help,
            "/quit" => Command::Quit,
            _ => Command::Message(line),
        }
    }
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = env::var("GEMINI_API_KEY") else {
        eprintln!("GEMINI_API_KEY environment variable is not set");
        return;
    };
    let mut config = GeminiConfigBuilder::with_api_key(api_key);
    if let Ok(model) = env::var("GEMINI_MODEL") {
        config = config.with_model(model);
    }
    if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    let model_provider = GeminiProvider::new(config.build());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let dictation = LineDictation::new({
        let event_tx = event_tx.clone();
        move |request| {
            event_tx.send(SessionEvent::Dictation(request)).ok();
        }
    });
    let mut session_builder =
        SessionBuilder::with_model_provider(model_provider, dictation)
            .on_change({
                let event_tx = event_tx.clone();
                move |view| {
                    event_tx.send(SessionEvent::Changed(view.clone())).ok();
                }
            });
    if let Ok(dir) = env::var("CHAT_WIDGET_HISTORY_DIR") {
        session_builder = session_builder.with_history_dir(dir);
    }
    let session = session_builder.build();
    let widget = session.widget();

    if widget.toggle_open().is_err() {
        return;
    }
    let Some(mut shown) = current_view(widget).await else {
        return;
    };
    print_header(&shown);

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        let result = match Command::parse(line) {
            Command::Quit => break,
            Command::Help => {
                print_help();
                continue;
            }
            Command::Open => widget.toggle_open(),
            Command::Menu => widget.toggle_menu(),
            Command::Dismiss => widget.dismiss(),
            Command::New => widget.new_conversation(),
            Command::History => widget.view_history(),
            Command::Clear => widget.clear_history(),
            Command::Mic => widget.start_listening(),
            Command::Message(text) => session.send_message(text),
        };
        if result.is_err() {
            break;
        }

        // Wait for the command to be handled, then see what it asked for.
        let Some(mut view) = current_view(widget).await else {
            break;
        };
        let mut dictation = None;
        while let Ok(event) = event_rx.try_recv() {
            if let SessionEvent::Dictation(DictationRequest::Start {
                continuous,
            }) = event
            {
                dictation = Some(continuous);
            }
        }
        if let Some(continuous) = dictation {
            if dictate(widget, continuous).await.is_none() {
                break;
            }
            let Some(next) = current_view(widget).await else {
                break;
            };
            view = next;
        }

        render(&shown, &view);
        shown = view;

        if shown.state == ControllerState::AwaitingReply {
            let progress_bar = ProgressBar::new_spinner();
            progress_bar.set_style(progress_style.clone());
            progress_bar.set_message(PENDING_TEXT);
            let view =
                wait_for_reply(&mut event_rx, &progress_bar, &shown).await;
            // Finish the progress bar before printing anything else.
            progress_bar.finish_and_clear();

            let Some(view) = view else {
                break;
            };
            render(&shown, &view);
            shown = view;
        }
    }
}

async fn current_view(widget: &Widget) -> Option<ChatView> {
    match widget.view().await {
        Ok(WidgetView::Ready(view)) => Some(view),
        Ok(WidgetView::Unsupported { notice }) => {
            eprintln!("{}", notice.bright_red());
            None
        }
        Err(err) => {
            error!("{err}");
            None
        }
    }
}

/// Waits until the reply to the last message in `shown` is displayed.
///
/// Views queued before `shown` was taken may still be in `event_rx`, so an
/// idle view only counts once it has more settled messages than `shown`.
async fn wait_for_reply(
    event_rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    progress_bar: &ProgressBar,
    shown: &ChatView,
) -> Option<ChatView> {
    let shown_len = settled(&shown.messages).len();
    loop {
        progress_bar.inc(1);

        let sleep = sleep(Duration::from_millis(100));
        let event = select! {
            event = event_rx.recv() => event?,
            _ = sleep => {
                continue;
            }
        };

        if let SessionEvent::Changed(WidgetView::Ready(view)) = event {
            if view.state == ControllerState::Idle
                && settled(&view.messages).len() > shown_len
            {
                return Some(view);
            }
        }
    }
}

/// Reads dictated lines and reports them the way a recognizer would.
async fn dictate(widget: &Widget, continuous: bool) -> Option<()> {
    if continuous {
        println!("🎙️  Listening, an empty line stops.");
    } else {
        println!("🎙️  Listening...");
    }
    widget.speech_listening(true).ok()?;

    let mut transcript = String::new();
    loop {
        print!("{} ", "🎙️".bright_magenta());
        std::io::stdout().flush().ok();

        let line = read_line().await?;
        let line = line.trim();
        if !line.is_empty() {
            if !transcript.is_empty() {
                transcript.push(' ');
            }
            transcript.push_str(line);
            widget.speech_transcript(transcript.as_str()).ok()?;
        }
        if !continuous || line.is_empty() {
            break;
        }
    }

    widget.speech_listening(false).ok()
}

fn render(shown: &ChatView, view: &ChatView) {
    if shown.open != view.open {
        if view.open {
            print_header(view);
        } else {
            println!("{}", "(chat closed, /open to show it)".dimmed());
        }
        return;
    }
    if !view.open {
        return;
    }

    if !shown.menu_open && view.menu_open {
        println!("{}", "/new      New conversation".bright_white());
        println!("{}", "/history  View history".bright_white());
        println!("{}", "/clear    Clear history".bright_white());
    }
    if view.draft != shown.draft && !view.draft.is_empty() {
        println!("{} {}", "Input:".dimmed(), view.draft);
    }

    let before = settled(&shown.messages);
    let after = settled(&view.messages);
    if after.starts_with(before) {
        after[before.len()..].iter().for_each(print_message);
    } else {
        println!("{}", "─".repeat(24).dimmed());
        print_transcript(after);
    }
}

fn print_header(view: &ChatView) {
    println!("{}", HEADER_TITLE.bold());
    print_transcript(settled(&view.messages));
}

fn print_transcript(messages: &[Message]) {
    if messages.is_empty() {
        println!("{}", EMPTY_PLACEHOLDER.dimmed());
    }
    messages.iter().for_each(print_message);
}

fn print_message(message: &Message) {
    match message.sender() {
        Sender::User => {
            println!("{}🙂 {}", BAR_CHAR.bright_green(), message.text());
        }
        Sender::Bot => {
            println!(
                "{}🤖 {}",
                BAR_CHAR.bright_cyan(),
                message.text().bright_white()
            );
        }
    }
}

fn print_help() {
    println!("/open     Open or close the chat");
    println!("/menu     Open or close the history menu");
    println!("/dismiss  Close the menu");
    println!("/new      Start a new conversation");
    println!("/history  Show the whole history");
    println!("/clear    Clear the history");
    println!("/mic      Dictate a message");
    println!("/help     Show this help");
    println!("/quit     Quit");
}

/// The messages without the reply placeholder, which the spinner stands in
/// for.
fn settled(messages: &[Message]) -> &[Message] {
    match messages.split_last() {
        Some((last, rest)) if last.is_pending() => rest,
        _ => messages,
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
