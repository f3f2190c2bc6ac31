use std::time::Duration;

use chat_widget::SessionBuilder;
use chat_widget::core::controller::ControllerState;
use chat_widget::core::message::Message;
use chat_widget::core::storage::{FileStorage, HistoryStorage};
use chat_widget::core::{ChatView, WidgetView};
use chat_widget::speech::LineDictation;
use chat_widget_test_model::{PresetReply, TestModelProvider};
use tokio::sync::mpsc;
use tokio::time::timeout;

async fn wait_idle(
    view_rx: &mut mpsc::UnboundedReceiver<WidgetView>,
    len: usize,
) -> ChatView {
    loop {
        let view = timeout(Duration::from_secs(1), view_rx.recv())
            .await
            .unwrap()
            .unwrap();
        let WidgetView::Ready(view) = view else {
            panic!("unexpected view: {view:?}");
        };
        if view.state == ControllerState::Idle && view.messages.len() == len {
            return view;
        }
    }
}

#[tokio::test]
async fn test_history_is_kept_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let expected = [Message::user("Hi"), Message::bot("Hello!")];

    {
        let model_provider =
            TestModelProvider::with_replies([PresetReply::text("Hello!")]);
        let (view_tx, mut view_rx) = mpsc::unbounded_channel();
        let session = SessionBuilder::with_model_provider(
            model_provider,
            LineDictation::new(|_| {}),
        )
        .with_history_dir(dir.path())
        .on_change(move |view| {
            view_tx.send(view.clone()).ok();
        })
        .build();

        session.send_message("Hi").unwrap();
        let view = wait_idle(&mut view_rx, 2).await;
        assert_eq!(view.messages, expected);
    }

    let storage = FileStorage::in_dir(dir.path());
    assert_eq!(storage.load().unwrap(), expected);

    let session = SessionBuilder::with_model_provider(
        TestModelProvider::default(),
        LineDictation::new(|_| {}),
    )
    .with_history_dir(dir.path())
    .build();
    session.widget().view_history().unwrap();
    let Ok(WidgetView::Ready(view)) = session.widget().view().await else {
        panic!("widget should be ready");
    };
    assert_eq!(view.messages, expected);
}
