use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_widget_test_model::{PresetReply, TestModelProvider};
use tokio::time::{sleep, timeout};

use super::{ChatView, Widget, WidgetBuilder, WidgetView};
use crate::controller::ControllerState;
use crate::message::{FALLBACK_REPLY, Message};
use crate::storage::{HistoryStorage, MemoryStorage};
use crate::voice::{NoSpeechEngine, SpeechEngine, UNSUPPORTED_NOTICE};

#[derive(Clone, Default)]
struct FakeMicrophone {
    starts: Arc<Mutex<Vec<bool>>>,
    stops: Arc<AtomicUsize>,
}

impl SpeechEngine for FakeMicrophone {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self, continuous: bool) {
        self.starts.lock().unwrap().push(continuous);
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
    }
}

fn ready(view: WidgetView) -> ChatView {
    match view {
        WidgetView::Ready(view) => view,
        other => panic!("unexpected view: {other:?}"),
    }
}

async fn wait_for(
    widget: &Widget,
    mut f: impl FnMut(&ChatView) -> bool,
) -> ChatView {
    let mut view_rx = widget.subscribe();
    let view = timeout(
        Duration::from_millis(500),
        view_rx.wait_for(|v| matches!(v, WidgetView::Ready(c) if f(c))),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    ready(view)
}

async fn wait_idle(widget: &Widget, len: usize) -> ChatView {
    wait_for(widget, |v| {
        v.state == ControllerState::Idle && v.messages.len() == len
    })
    .await
}

#[tokio::test]
async fn test_simple_exchange() {
    let model_provider =
        TestModelProvider::with_replies([PresetReply::text(
            "Hello! How can I help?",
        )]);
    let storage = MemoryStorage::default();

    let widget =
        WidgetBuilder::new(model_provider.clone(), FakeMicrophone::default())
            .with_storage(storage.clone())
            .build();
    widget.toggle_open().unwrap();
    widget.submit("Hi").unwrap();

    let view = wait_idle(&widget, 2).await;
    let expected =
        [Message::user("Hi"), Message::bot("Hello! How can I help?")];
    assert!(view.open);
    assert_eq!(view.messages, expected);
    assert_eq!(storage.load().unwrap(), expected);
    assert_eq!(model_provider.prompts(), ["Hi"]);
}

#[tokio::test]
async fn test_failed_exchange() {
    let model_provider =
        TestModelProvider::with_replies([PresetReply::Failure]);
    let widget =
        WidgetBuilder::new(model_provider, FakeMicrophone::default()).build();
    widget.submit("Hi").unwrap();

    let view = wait_idle(&widget, 2).await;
    assert_eq!(
        view.messages,
        [Message::user("Hi"), Message::bot(FALLBACK_REPLY)]
    );
}

#[tokio::test]
async fn test_empty_submission() {
    let model_provider = TestModelProvider::default();
    let widget =
        WidgetBuilder::new(model_provider.clone(), FakeMicrophone::default())
            .build();
    widget.submit("   ").unwrap();
    widget.submit_draft().unwrap();

    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.state, ControllerState::Idle);
    assert!(view.messages.is_empty());
    assert!(model_provider.prompts().is_empty());
}

#[tokio::test]
async fn test_single_request_in_flight() {
    let model_provider = TestModelProvider::with_replies([
        PresetReply::Hang,
        PresetReply::text("never used"),
    ]);
    let widget =
        WidgetBuilder::new(model_provider.clone(), FakeMicrophone::default())
            .build();
    widget.submit("first").unwrap();
    widget.submit("second").unwrap();
    widget.new_conversation().unwrap();
    widget.toggle_open().unwrap();

    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.state, ControllerState::AwaitingReply);
    assert_eq!(view.messages, [Message::user("first"), Message::pending()]);
    // The shell still reacts while waiting.
    assert!(view.open);

    sleep(Duration::from_millis(50)).await;
    assert_eq!(model_provider.prompts(), ["first"]);
    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.state, ControllerState::AwaitingReply);
}

#[tokio::test]
async fn test_draft() {
    let model_provider =
        TestModelProvider::with_replies([PresetReply::text("Sure.")]);
    let widget =
        WidgetBuilder::new(model_provider.clone(), FakeMicrophone::default())
            .build();
    widget.set_draft("Can you help?").unwrap();
    assert_eq!(ready(widget.view().await.unwrap()).draft, "Can you help?");

    widget.submit_draft().unwrap();
    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.draft, "");

    wait_idle(&widget, 2).await;
    assert_eq!(model_provider.prompts(), ["Can you help?"]);
}

#[tokio::test]
async fn test_voice_submission() {
    let model_provider =
        TestModelProvider::with_replies([PresetReply::text("Hi there!")]);
    let microphone = FakeMicrophone::default();
    let widget = WidgetBuilder::new(model_provider.clone(), microphone.clone())
        .continuous_listening(true)
        .build();

    widget.start_listening().unwrap();
    widget.speech_listening(true).unwrap();
    widget.start_listening().unwrap();
    widget.speech_transcript("hel").unwrap();
    widget.speech_transcript("hello").unwrap();
    let view = ready(widget.view().await.unwrap());
    assert!(view.listening);
    assert!(view.messages.is_empty());

    widget.speech_listening(false).unwrap();
    // A second session without new speech submits nothing.
    widget.speech_listening(true).unwrap();
    widget.speech_listening(false).unwrap();

    let view = wait_idle(&widget, 2).await;
    assert_eq!(
        view.messages,
        [Message::user("hello"), Message::bot("Hi there!")]
    );
    assert_eq!(model_provider.prompts(), ["hello"]);
    assert_eq!(*microphone.starts.lock().unwrap(), [true]);
}

#[tokio::test]
async fn test_voice_into_draft() {
    let model_provider = TestModelProvider::default();
    let widget =
        WidgetBuilder::new(model_provider.clone(), FakeMicrophone::default())
            .voice_auto_send(false)
            .build();

    widget.speech_listening(true).unwrap();
    widget.speech_transcript("hello").unwrap();
    widget.speech_listening(false).unwrap();

    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.draft, "hello");
    assert!(view.messages.is_empty());
    assert!(model_provider.prompts().is_empty());
}

#[tokio::test]
async fn test_voice_dropped_while_awaiting() {
    let model_provider = TestModelProvider::with_replies([PresetReply::Hang]);
    let widget =
        WidgetBuilder::new(model_provider.clone(), FakeMicrophone::default())
            .build();
    widget.submit("typed").unwrap();
    widget.speech_listening(true).unwrap();
    widget.speech_transcript("spoken").unwrap();
    widget.speech_listening(false).unwrap();

    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.messages, [Message::user("typed"), Message::pending()]);
    sleep(Duration::from_millis(20)).await;
    assert_eq!(model_provider.prompts(), ["typed"]);
}

#[tokio::test]
async fn test_history_survives_restart() {
    let storage = MemoryStorage::default();
    {
        let model_provider =
            TestModelProvider::with_replies([PresetReply::text("Hello")]);
        let widget =
            WidgetBuilder::new(model_provider, FakeMicrophone::default())
                .with_storage(storage.clone())
                .build();
        widget.submit("Hi").unwrap();
        wait_idle(&widget, 2).await;
    }

    let widget = WidgetBuilder::new(
        TestModelProvider::default(),
        FakeMicrophone::default(),
    )
    .with_storage(storage.clone())
    .build();
    assert!(ready(widget.view().await.unwrap()).messages.is_empty());

    widget.view_history().unwrap();
    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.messages, [Message::user("Hi"), Message::bot("Hello")]);

    widget.clear_history().unwrap();
    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.messages.len(), 2);
    assert!(!storage.is_present());

    widget.new_conversation().unwrap();
    widget.view_history().unwrap();
    assert!(ready(widget.view().await.unwrap()).messages.is_empty());
}

#[tokio::test]
async fn test_menu() {
    let widget = WidgetBuilder::new(
        TestModelProvider::default(),
        FakeMicrophone::default(),
    )
    .build();
    widget.toggle_open().unwrap();
    widget.toggle_menu().unwrap();
    let view = ready(widget.view().await.unwrap());
    assert!(view.open && view.menu_open);

    widget.dismiss().unwrap();
    let view = ready(widget.view().await.unwrap());
    assert!(view.open && !view.menu_open);
}

#[tokio::test]
async fn test_on_change() {
    let changes = Arc::new(AtomicUsize::new(0));
    let widget = WidgetBuilder::new(
        TestModelProvider::default(),
        FakeMicrophone::default(),
    )
    .on_change({
        let changes = Arc::clone(&changes);
        move |_| {
            changes.fetch_add(1, Ordering::Relaxed);
        }
    })
    .build();

    widget.toggle_open().unwrap();
    // Not a change, the menu is already closed.
    widget.dismiss().unwrap();
    widget.toggle_open().unwrap();
    widget.view().await.unwrap();
    assert_eq!(changes.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn test_unsupported_speech() {
    let model_provider = TestModelProvider::default();
    let widget =
        WidgetBuilder::new(model_provider.clone(), NoSpeechEngine).build();
    assert_eq!(
        *widget.subscribe().borrow(),
        WidgetView::Unsupported {
            notice: UNSUPPORTED_NOTICE
        }
    );

    widget.toggle_open().unwrap();
    widget.submit("Hi").unwrap();
    let view = widget.view().await.unwrap();
    assert!(matches!(view, WidgetView::Unsupported { .. }));

    sleep(Duration::from_millis(20)).await;
    assert!(model_provider.prompts().is_empty());
}

#[tokio::test]
async fn test_stop_listening() {
    let microphone = FakeMicrophone::default();
    let widget =
        WidgetBuilder::new(TestModelProvider::default(), microphone.clone())
            .build();

    // Not listening yet, nothing to stop.
    widget.stop_listening().unwrap();
    widget.start_listening().unwrap();
    widget.speech_listening(true).unwrap();
    widget.stop_listening().unwrap();
    widget.view().await.unwrap();
    assert_eq!(microphone.stops.load(Ordering::Relaxed), 1);

    widget.speech_listening(false).unwrap();
    widget.stop_listening().unwrap();
    let view = ready(widget.view().await.unwrap());
    assert!(!view.listening);
    assert_eq!(microphone.stops.load(Ordering::Relaxed), 1);
    assert_eq!(*microphone.starts.lock().unwrap(), [false]);
}

#[tokio::test]
async fn test_placeholder_while_reply_is_slow() {
    let mut model_provider =
        TestModelProvider::with_replies([PresetReply::text("Done.")]);
    model_provider.set_delay(Duration::from_millis(200));
    let widget =
        WidgetBuilder::new(model_provider, FakeMicrophone::default()).build();
    widget.submit("Hi").unwrap();

    let view = ready(widget.view().await.unwrap());
    assert_eq!(view.state, ControllerState::AwaitingReply);
    assert_eq!(view.messages, [Message::user("Hi"), Message::pending()]);

    let view = wait_idle(&widget, 2).await;
    assert_eq!(view.messages, [Message::user("Hi"), Message::bot("Done.")]);
}
