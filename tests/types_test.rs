use email_normalize::*;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FakeSession {
    calls: Mutex<Vec<String>>,
}

impl FakeSession {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl MailSession for FakeSession {
    fn mark(&self, flags: &[String], uid: u32) -> Result<()> {
        self.record(format!("mark {uid} {}", flags.join(",")))
    }

    fn delete_message(&self, uid: u32, folder: &str) -> Result<()> {
        self.record(format!("delete {uid} {folder}"))
    }

    fn copy_message(
        &self,
        uid: u32,
        target_folder: &str,
        message: &NormalizedMessage,
    ) -> Result<()> {
        self.record(format!("copy {uid} {target_folder} {}", message.subject))
    }

    fn move_message(
        &self,
        uid: u32,
        target_folder: &str,
        message: &NormalizedMessage,
    ) -> Result<()> {
        self.record(format!("move {uid} {target_folder} {}", message.subject))
    }
}

#[derive(Debug)]
struct RejectingSession;

impl MailSession for RejectingSession {
    fn mark(&self, _flags: &[String], _uid: u32) -> Result<()> {
        Err(NormalizeError::Session("STORE failed".into()))
    }

    fn delete_message(&self, _uid: u32, _folder: &str) -> Result<()> {
        Err(NormalizeError::Session("STORE failed".into()))
    }

    fn copy_message(&self, _uid: u32, _target: &str, _message: &NormalizedMessage) -> Result<()> {
        Err(NormalizeError::Session("COPY failed".into()))
    }

    fn move_message(&self, _uid: u32, _target: &str, _message: &NormalizedMessage) -> Result<()> {
        Err(NormalizeError::Session("MOVE failed".into()))
    }
}

fn message_with_flags(flags: &[&str]) -> NormalizedMessage {
    let identity = MessageIdentity::new(7, "INBOX").with_flags(flags);
    parse_message(identity, b"From: a@x.com\r\nSubject: Hi\r\n\r\nBody").unwrap()
}

// --- HeaderMap ---

#[test]
fn test_header_map_case_insensitive() {
    let mut headers = HeaderMap::new();
    headers.append("Content-Type", "text/plain");

    assert_eq!(headers.get("content-type"), headers.get("Content-Type"));
    assert_eq!(headers.get_first("CONTENT-TYPE"), Some("text/plain"));
    assert!(headers.contains("content-TYPE"));
}

#[test]
fn test_header_map_appends_duplicates() {
    let mut headers = HeaderMap::new();
    headers.append("Received", "one");
    headers.append("received", "two");
    headers.append("Subject", "s");

    assert_eq!(headers.len(), 2);
    assert_eq!(headers.get("RECEIVED").unwrap(), ["one", "two"]);
}

#[test]
fn test_header_map_keeps_first_seen_order() {
    let headers: HeaderMap = [("B", "1"), ("A", "2"), ("b", "3")].into_iter().collect();
    let names: Vec<&str> = headers.iter().map(|e| e.name.as_str()).collect();

    assert_eq!(names, ["B", "A"]);
    assert_eq!(headers.get("b").unwrap(), ["1", "3"]);
}

#[test]
fn test_header_map_missing() {
    let headers = HeaderMap::new();

    assert!(headers.is_empty());
    assert!(headers.get("x-missing").is_none());
    assert!(headers.get_first("x-missing").is_none());
}

// --- Flags and session delegation ---

#[test]
fn test_new_dedupes_identity_flags() {
    let identity = MessageIdentity::new(3, "Archive").with_flags(&["seen", "seen", "draft"]);
    let msg = NormalizedMessage::new(identity);

    assert_eq!(msg.uid, 3);
    assert_eq!(msg.folder, "Archive");
    assert_eq!(msg.flags, vec!["seen".to_string(), "draft".to_string()]);
    assert!(msg.text.is_empty());
    assert!(!msg.is_attached());
}

#[test]
fn test_mark_existing_flag_is_noop() {
    let session = Arc::new(FakeSession::default());
    let mut msg = message_with_flags(&["seen"]).with_session(session.clone());

    msg.mark(&["seen"]).unwrap();

    assert_eq!(msg.flags, vec!["seen".to_string()]);
    assert_eq!(session.calls(), ["mark 7 seen"]);
}

#[test]
fn test_mark_un_prefix_removes_flag() {
    let session = Arc::new(FakeSession::default());
    let mut msg = message_with_flags(&["seen"]).with_session(session.clone());

    msg.mark(&["unseen"]).unwrap();

    assert!(msg.flags.is_empty());
    assert_eq!(session.calls(), ["mark 7 unseen"]);
}

#[test]
fn test_mark_un_prefix_absent_flag_is_noop() {
    let session = Arc::new(FakeSession::default());
    let mut msg = message_with_flags(&["flagged"]).with_session(session);

    msg.mark(&["unseen"]).unwrap();

    assert_eq!(msg.flags, vec!["flagged".to_string()]);
}

#[test]
fn test_mark_adds_new_flags() {
    let session = Arc::new(FakeSession::default());
    let mut msg = message_with_flags(&[]).with_session(session.clone());

    msg.mark(&["seen", "flagged"]).unwrap();

    assert_eq!(msg.flags, vec!["seen".to_string(), "flagged".to_string()]);
    assert!(msg.has_flag("flagged"));
    assert_eq!(session.calls(), ["mark 7 seen,flagged"]);
}

#[test]
fn test_detached_mark_updates_flags_but_errors() {
    let mut msg = message_with_flags(&[]);

    assert!(!msg.is_attached());
    assert!(matches!(msg.mark(&["seen"]), Err(NormalizeError::Detached)));
    assert!(msg.has_flag("seen"));
}

#[test]
fn test_delete_copy_move_forwarded() {
    let session = Arc::new(FakeSession::default());
    let mut msg = message_with_flags(&[]);
    msg.attach(session.clone());

    msg.copy_to("Archive").unwrap();
    msg.move_to("Trash").unwrap();
    msg.delete().unwrap();

    assert_eq!(
        session.calls(),
        ["copy 7 Archive Hi", "move 7 Trash Hi", "delete 7 INBOX"]
    );
}

#[test]
fn test_detached_operations_error() {
    let msg = message_with_flags(&[]);

    assert!(matches!(msg.delete(), Err(NormalizeError::Detached)));
    assert!(matches!(msg.copy_to("Archive"), Err(NormalizeError::Detached)));
    assert!(matches!(msg.move_to("Trash"), Err(NormalizeError::Detached)));
}

#[test]
fn test_session_errors_returned_verbatim() {
    let mut msg = message_with_flags(&[]).with_session(Arc::new(RejectingSession));

    let err = msg.mark(&["seen"]).unwrap_err();
    assert_eq!(err.to_string(), "Mail session error: STORE failed");
    assert!(msg.has_flag("seen"));
    assert!(matches!(msg.copy_to("X"), Err(NormalizeError::Session(_))));
}

// --- Serialization ---

#[test]
fn test_message_serializes_without_session() {
    let session = Arc::new(FakeSession::default());
    let msg = message_with_flags(&["seen"]).with_session(session);

    let json = serde_json::to_value(&msg).unwrap();

    assert_eq!(json["from_email"], "a@x.com");
    assert_eq!(json["subject"], "Hi");
    assert_eq!(json["flags"][0], "seen");
    assert_eq!(json["headers"][0]["name"], "From");
    assert!(json.get("session").is_none());

    let restored: NormalizedMessage = serde_json::from_value(json).unwrap();
    assert!(!restored.is_attached());
    assert_eq!(restored.subject, "Hi");
}

#[test]
fn test_options_deserialize_with_defaults() {
    let options: NormalizerOptions =
        serde_json::from_str(r#"{"fallback_charset": "windows-1252"}"#).unwrap();

    assert_eq!(options.fallback_charset, "windows-1252");
    assert!(options.detect_html_charset);
    assert_eq!(NormalizerOptions::default().fallback_charset, DEFAULT_FALLBACK);
}
