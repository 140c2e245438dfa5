mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use autotask::logger::LogLevel;
use autotask::nodes::{ImageClickNode, TypeTextNode};
use autotask::{
    Node, NodeContext, NodeInputs, NodeRegistry, Point, RecordingLogger, SKIP_MESSAGE,
};
use common::{FakeBackend, RecordingClipboard};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

fn inputs(value: Value) -> NodeInputs {
    NodeInputs::from_value(value).unwrap()
}

fn png() -> tempfile::NamedTempFile {
    tempfile::Builder::new().suffix(".png").tempfile().unwrap()
}

#[tokio::test]
async fn test_failed_previous_step_skips_every_rpa_node() {
    let backend = Arc::new(FakeBackend::new());
    let clipboard = Arc::new(RecordingClipboard::with_text("OLD"));
    let registry = NodeRegistry::builtin(backend.clone(), clipboard.clone());
    let image = png();
    let app = tempfile::NamedTempFile::new().unwrap();

    let cases = [
        ("mouse_click", json!({ "x": 1, "y": 2 }), "click_position"),
        (
            "image_click",
            json!({ "target_img": image.path().to_str().unwrap() }),
            "click_position",
        ),
        (
            "open_application",
            json!({ "app_file": app.path().to_str().unwrap() }),
            "process_info",
        ),
        ("type_text", json!({ "text": "hello" }), "text_info"),
        ("key_press", json!({ "key": "enter" }), "key_info"),
    ];

    for (kind, mut raw, payload_key) in cases {
        raw["previous_result"] = json!({ "success": false, "error_message": "upstream" });
        let node = registry.get(kind).unwrap();

        let output = node.execute(&inputs(raw), &NodeContext::new(kind)).await;

        assert_eq!(output["success"], false, "{kind}");
        assert_eq!(output["error_message"], SKIP_MESSAGE, "{kind}");
        assert_eq!(output["execution_time"], 0.0, "{kind}");
        assert_eq!(output[payload_key], Value::Null, "{kind}");
    }

    assert_eq!(backend.total_calls(), 0);
    assert!(clipboard.writes().is_empty());
}

#[tokio::test]
async fn test_previous_result_without_success_runs() {
    let backend = Arc::new(FakeBackend::new());
    let registry = NodeRegistry::builtin(backend.clone(), Arc::new(RecordingClipboard::default()));
    let node = registry.get("mouse_click").unwrap();

    let output = node
        .execute(
            &inputs(json!({ "x": 3, "y": 4, "previous_result": { "data": 1 } })),
            &NodeContext::new("click"),
        )
        .await;

    assert_eq!(output["success"], true);
    assert_eq!(backend.clicks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_image_is_reported_without_lookup() {
    let backend = Arc::new(FakeBackend::new());
    let node = ImageClickNode::new(backend.clone());

    let output = node
        .execute(
            &inputs(json!({ "target_img": "/nonexistent/button.png" })),
            &NodeContext::new("img"),
        )
        .await;

    assert_eq!(output["success"], false);
    assert_eq!(output["image_found"], false);
    assert_eq!(output["click_position"], Value::Null);
    let message = output["error_message"].as_str().unwrap();
    assert!(message.starts_with("image click failed:"));
    assert!(message.contains("/nonexistent/button.png"));
    assert_eq!(backend.locates.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_image_found_on_third_attempt_is_clicked_once() {
    let backend = Arc::new(FakeBackend::matching_on(3, Point::new(40, 60)));
    let node = ImageClickNode::new(backend.clone()).with_attempt_gap(Duration::from_millis(100));
    let image = png();

    let output = node
        .execute(
            &inputs(json!({ "target_img": image.path().to_str().unwrap(), "wait_time": 5 })),
            &NodeContext::new("img"),
        )
        .await;

    assert_eq!(output["success"], true);
    assert_eq!(output["image_found"], true);
    assert_eq!(output["click_position"], json!({ "x": 40, "y": 60 }));
    assert_eq!(backend.locates.load(Ordering::SeqCst), 3);
    assert_eq!(backend.clicks.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_errors_are_retried_until_deadline() {
    let backend = Arc::new(FakeBackend {
        locate_errors: true,
        ..FakeBackend::default()
    });
    let node = ImageClickNode::new(backend.clone()).with_attempt_gap(Duration::from_millis(500));
    let logger = Arc::new(RecordingLogger::new());
    let image = png();

    let output = node
        .execute(
            &inputs(json!({ "target_img": image.path().to_str().unwrap(), "wait_time": 2.0 })),
            &NodeContext::new("img").with_logger(logger.clone()),
        )
        .await;

    assert_eq!(output["success"], false);
    assert_eq!(
        output["error_message"],
        "image click failed: target image not found (attempts: 4)"
    );
    assert_eq!(backend.locates.load(Ordering::SeqCst), 4);
    assert_eq!(backend.clicks.load(Ordering::SeqCst), 0);
    assert!(logger.contains(LogLevel::Debug, "screen capture failed"));
    assert!(logger.contains(LogLevel::Warning, "4 attempts"));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_image_click_stops_polling() {
    let backend = Arc::new(FakeBackend::new());
    let node = ImageClickNode::new(backend.clone());
    let image = png();
    let cancel = CancellationToken::new();
    let ctx = NodeContext::new("img").with_cancel(cancel.clone());
    let raw = inputs(json!({ "target_img": image.path().to_str().unwrap(), "wait_time": 60 }));

    let canceller = async {
        tokio::time::sleep(Duration::from_millis(1200)).await;
        cancel.cancel();
    };
    let (output, ()) = tokio::join!(node.execute(&raw, &ctx), canceller);

    assert_eq!(output["success"], false);
    assert_eq!(
        output["error_message"],
        "image click failed: cancelled after 3 attempts"
    );
    assert!(output["execution_time"].as_f64().unwrap() < 2.0);
}

#[tokio::test]
async fn test_clipboard_restored_after_paste() {
    let backend = Arc::new(FakeBackend::new());
    let clipboard = Arc::new(RecordingClipboard::with_text("OLD"));
    let node = TypeTextNode::new(backend.clone(), clipboard.clone());

    let output = node
        .execute(&inputs(json!({ "text": "NEW" })), &NodeContext::new("type"))
        .await;

    assert_eq!(output["success"], true);
    assert_eq!(output["text_info"], json!({ "content": "NEW", "length": 3 }));
    assert_eq!(clipboard.writes(), vec!["NEW", "OLD"]);
    assert_eq!(clipboard.text(), "OLD");
    let keys = backend.last_hotkey.lock().unwrap().clone();
    assert_eq!(keys.last().map(String::as_str), Some("v"));
}

#[tokio::test]
async fn test_clipboard_restored_when_paste_fails() {
    let backend = Arc::new(FakeBackend {
        fail_hotkey: true,
        ..FakeBackend::default()
    });
    let clipboard = Arc::new(RecordingClipboard::with_text("OLD"));
    let node = TypeTextNode::new(backend, clipboard.clone());

    let output = node
        .execute(&inputs(json!({ "text": "NEW" })), &NodeContext::new("type"))
        .await;

    assert_eq!(output["success"], false);
    assert_eq!(
        output["error_message"],
        "text input failed: Platform-specific error: keyboard unavailable"
    );
    assert_eq!(output["text_info"], Value::Null);
    assert_eq!(clipboard.text(), "OLD");
}

#[tokio::test(start_paused = true)]
async fn test_execution_time_covers_the_effect() {
    let backend = Arc::new(FakeBackend {
        delay: Duration::from_millis(750),
        ..FakeBackend::default()
    });
    let registry = NodeRegistry::builtin(backend, Arc::new(RecordingClipboard::default()));
    let node = registry.get("key_press").unwrap();

    let output = node
        .execute(&inputs(json!({ "key": "tab" })), &NodeContext::new("keys"))
        .await;

    assert_eq!(output["success"], true);
    let elapsed = output["execution_time"].as_f64().unwrap();
    assert!(elapsed >= 0.75, "elapsed {elapsed}");
}

#[test]
fn test_contract_defaults() {
    let registry = NodeRegistry::builtin(
        Arc::new(FakeBackend::new()),
        Arc::new(RecordingClipboard::default()),
    );
    let image = registry.get("image_click").unwrap();
    let contract = image.contract();

    assert_eq!(contract.default_of("confidence"), Some(&json!(0.8)));
    assert_eq!(contract.default_of("wait_time"), Some(&json!(1.0)));
    assert_eq!(contract.inputs["confidence"].step, Some(0.03));
    assert!(contract.inputs["target_img"].required);
    assert!(!contract.inputs["previous_result"].required);

    let launch = registry.get("open_application").unwrap();
    assert_eq!(launch.contract().default_of("wait_time"), Some(&json!(2.0)));
}
