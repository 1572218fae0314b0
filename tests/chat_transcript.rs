use sensei_terminal::chat::{
    CHAT_FAILED_NOTICE, ChatRole, ChatTranscript, MISSING_PLAYER_NOTICE, is_tactics_trigger,
};

#[test]
fn submit_appends_user_entry_before_the_call_settles() {
    let mut chat = ChatTranscript::new(Some("p1".to_string()), false);
    chat.input = "How is her shooting form?".to_string();

    let submission = chat.submit().expect("submit should produce a request");

    assert_eq!(submission.message, "How is her shooting form?");
    assert_eq!(submission.player_id.as_deref(), Some("p1"));
    assert_eq!(chat.messages.len(), 1);
    assert_eq!(chat.messages[0].role, ChatRole::User);
    assert!(chat.pending);
    assert!(chat.input.is_empty());
}

#[test]
fn pending_request_blocks_a_second_submit() {
    let mut chat = ChatTranscript::new(Some("p1".to_string()), false);
    chat.input = "first".to_string();
    chat.submit().expect("first submit should go out");

    chat.input = "second".to_string();
    assert!(chat.submit().is_none());
    assert_eq!(chat.messages.len(), 1);
}

#[test]
fn blank_input_is_ignored() {
    let mut chat = ChatTranscript::new(Some("p1".to_string()), false);
    chat.input = "   ".to_string();
    assert!(chat.submit().is_none());
    assert!(chat.messages.is_empty());
    assert!(!chat.pending);
}

#[test]
fn missing_player_context_short_circuits_with_a_warning() {
    let mut chat = ChatTranscript::new(None, false);
    chat.input = "who should start tonight?".to_string();

    assert!(chat.submit().is_none());
    assert_eq!(chat.messages.len(), 1);
    assert_eq!(chat.messages[0].role, ChatRole::Assistant);
    assert_eq!(chat.messages[0].content, MISSING_PLAYER_NOTICE);
    assert!(!chat.pending);
}

#[test]
fn tactics_trigger_is_a_case_insensitive_substring_match() {
    assert!(is_tactics_trigger("Please CHANGE TACTICS to zone defense"));
    assert!(is_tactics_trigger("change tactics"));
    assert!(!is_tactics_trigger("changetactics"));
    assert!(!is_tactics_trigger("new training plan please"));
}

#[test]
fn tactics_flag_requires_the_transcript_to_opt_in() {
    let mut chat = ChatTranscript::new(Some("p1".to_string()), false);
    chat.input = "change tactics to zone defense".to_string();
    let submission = chat.submit().expect("submit should produce a request");
    assert!(!submission.tactics);

    let mut chat = ChatTranscript::new(Some("p1".to_string()), true);
    chat.input = "change tactics to zone defense".to_string();
    let submission = chat.submit().expect("submit should produce a request");
    assert!(submission.tactics);
}

#[test]
fn settled_transcript_alternates_strictly() {
    let mut chat = ChatTranscript::new(Some("p1".to_string()), false);

    chat.input = "how did he train today?".to_string();
    chat.submit().expect("submit should produce a request");
    chat.settle_reply("Two full-court sessions.".to_string());

    chat.input = "and yesterday?".to_string();
    chat.submit().expect("submit should produce a request");
    chat.settle_failure();

    assert_eq!(chat.messages.len(), 4);
    for (i, msg) in chat.messages.iter().enumerate() {
        let expected = if i % 2 == 0 {
            ChatRole::User
        } else {
            ChatRole::Assistant
        };
        assert_eq!(msg.role, expected);
    }
    assert_eq!(chat.messages[3].content, CHAT_FAILED_NOTICE);
    assert!(!chat.pending);
}

#[test]
fn accepts_matches_context_only_while_pending() {
    let mut chat = ChatTranscript::new(Some("p1".to_string()), false);
    assert!(!chat.accepts(Some("p1")));

    chat.input = "hello".to_string();
    chat.submit().expect("submit should produce a request");
    assert!(chat.accepts(Some("p1")));
    assert!(!chat.accepts(Some("p2")));
    assert!(!chat.accepts(None));

    chat.settle_reply("hi".to_string());
    assert!(!chat.accepts(Some("p1")));
}
