//! End-to-end journeys: keystrokes in, buffer edits and parsed mentions out.

use crossterm::event::KeyCode;
use katana_integrations::Integration;
use katana_integrations::Registry;
use katana_mentions::ConnectionDirectory;
use katana_mentions::EntityRef;
use katana_mentions::MentionComposer;
use katana_mentions::MentionOutcome;
use katana_mentions::MentionSession;
use mentions_test_support::active_account;
use mentions_test_support::connection_sources;
use mentions_test_support::failing_entities;
use mentions_test_support::fixed_entities;
use mentions_test_support::key;
use mentions_test_support::revoked_account;
use pretty_assertions::assert_eq;

fn composer(connected: impl IntoIterator<Item = Integration>) -> MentionComposer {
    MentionComposer::new(
        ConnectionDirectory::from_integrations(connected),
        Registry::builtin(),
    )
}

fn composer_ids(composer: &MentionComposer) -> Vec<&str> {
    composer
        .candidates()
        .iter()
        .map(|item| item.id.as_str())
        .collect()
}

fn session_ids(session: &MentionSession) -> Vec<&str> {
    composer_ids(session.composer())
}

fn sync_at_end(composer: &mut MentionComposer, text: &str) {
    composer.sync_input(text, text.len());
}

#[tokio::test]
async fn connected_set_comes_from_accounts_and_provider_connections() {
    let (sources, _) = connection_sources(
        vec![active_account("jira_oauth"), revoked_account("linear_oauth")],
        true,
        false,
    );
    let mut session = MentionSession::connect(sources, fixed_entities(vec![], vec![])).await;

    session.sync_input("@", 1);
    // The revoked Linear account and the inactive Vercel connection
    // contribute nothing; one active Google connection unlocks the suite.
    assert_eq!(
        session_ids(&session),
        vec!["jira", "google", "drive", "sheets", "docs"]
    );
}

#[test]
fn bare_at_lists_connected_integrations_in_popup_order() {
    let mut composer = composer([
        Integration::Slack,
        Integration::Jira,
        Integration::Github,
    ]);
    sync_at_end(&mut composer, "@");
    assert_eq!(composer_ids(&composer), vec!["jira", "github", "slack"]);
    assert_eq!(composer.selected_index(), Some(0));
}

#[test]
fn prefix_narrowing_follows_each_keystroke() {
    let mut composer = composer([Integration::Jira, Integration::Linear]);
    for (text, expected) in [
        ("@", vec!["jira", "linear"]),
        ("@j", vec!["jira"]),
        ("@ji", vec!["jira"]),
        ("@jira", vec!["jira"]),
    ] {
        sync_at_end(&mut composer, text);
        assert_eq!(composer_ids(&composer), expected, "after typing {text:?}");
    }

    // Not a prefix of anything connected: empty list, popup still open.
    sync_at_end(&mut composer, "@jirax");
    assert!(composer.popup_open());
    assert_eq!(composer.candidates().len(), 0);
}

#[test]
fn colon_shows_the_full_command_catalog_in_order() {
    let mut composer = composer([Integration::Jira, Integration::Linear]);
    sync_at_end(&mut composer, "@jira:");
    assert_eq!(
        composer_ids(&composer),
        vec![
            "create-issue",
            "list-issues",
            "get-issue",
            "update-issue",
            "add-comment",
        ]
    );
}

#[test]
fn complete_command_plus_whitespace_is_a_closed_mention() {
    let mut composer = composer([Integration::Jira]);
    sync_at_end(&mut composer, "@jira:create-issue ");
    assert!(!composer.popup_open());
}

#[test]
fn command_commit_round_trips_to_no_active_mention() {
    let mut composer = composer([Integration::Jira]);
    sync_at_end(&mut composer, "@jira:cre");

    let (outcome, _) = composer.handle_key_event(key(KeyCode::Enter));
    let MentionOutcome::Committed { edit, mention } = outcome else {
        panic!("command selection commits");
    };
    assert_eq!(edit.text, "@jira:create-issue ");
    assert_eq!(edit.cursor, 19);
    assert_eq!(mention, None);

    // The host echoes the edit back; nothing reopens.
    composer.sync_input(&edit.text, edit.cursor);
    assert!(!composer.popup_open());
}

#[test]
fn resolution_is_deterministic_for_the_same_input() {
    let buffer = "check @li";
    let mut first = composer([Integration::Jira, Integration::Linear]);
    let mut second = composer([Integration::Jira, Integration::Linear]);
    sync_at_end(&mut first, buffer);
    sync_at_end(&mut second, buffer);

    assert_eq!(composer_ids(&first), composer_ids(&second));
    assert_eq!(first.selected_index(), Some(0));
    assert_eq!(second.selected_index(), Some(0));
}

#[tokio::test]
async fn entity_journey_commits_a_parsed_mention() {
    let (sources, _) = connection_sources(vec![active_account("jira_oauth")], false, false);
    let entities = fixed_entities(
        vec![
            EntityRef::new("WEB", "Website"),
            EntityRef::new("OPS", "Ops tooling"),
        ],
        vec![],
    );
    let mut session = MentionSession::connect(sources, entities).await;

    session.sync_input("@jira:project:", 14);
    assert!(session.composer().is_loading());
    session.settle().await;
    assert_eq!(session_ids(&session), vec!["WEB", "OPS"]);

    session.handle_key_event(key(KeyCode::Down));
    let (outcome, _) = session.handle_key_event(key(KeyCode::Enter));
    let MentionOutcome::Committed { edit, mention } = outcome else {
        panic!("entity selection commits");
    };
    assert_eq!(edit.text, "@jira:project:OPS ");
    assert_eq!(edit.cursor, 18);

    let mention = mention.expect("entity commits carry the mention");
    assert_eq!(mention.integration, "jira");
    assert_eq!(mention.entity_type.as_deref(), Some("project"));
    assert_eq!(mention.entity_id.as_deref(), Some("OPS"));
    assert_eq!(mention.sub_entity_type, None);
    assert_eq!(mention.full_text, "@jira:project:OPS");
    assert_eq!(mention.start_index, 0);
    assert_eq!(mention.end_index, 17);

    session.sync_input(&edit.text, edit.cursor);
    assert!(!session.composer().popup_open());
}

#[tokio::test]
async fn sub_entity_journey_walks_menu_then_leaf() {
    let (sources, _) = connection_sources(vec![active_account("jira_oauth")], false, false);
    let entities = fixed_entities(
        vec![],
        vec![
            EntityRef::new("101", "Login broken"),
            EntityRef::new("102", "Dashboard slow"),
        ],
    );
    let mut session = MentionSession::connect(sources, entities).await;

    // The sub-entity menu for jira projects is static, no fetch needed.
    session.sync_input("@jira:project:WEB:", 18);
    assert!(!session.composer().is_loading());
    assert_eq!(session_ids(&session), vec!["issues", "create-issue"]);

    let (outcome, _) = session.handle_key_event(key(KeyCode::Enter));
    let MentionOutcome::Committed { edit, mention } = outcome else {
        panic!("menu selection commits");
    };
    assert_eq!(edit.text, "@jira:project:WEB:issues ");
    let mention = mention.expect("menu commits carry the mention");
    assert_eq!(mention.sub_entity_type.as_deref(), Some("issues"));
    assert_eq!(mention.sub_entity_id, None);

    // Typing the path onward drills into the async sub-entity list.
    session.sync_input("@jira:project:WEB:issues:", 25);
    session.settle().await;
    assert_eq!(session_ids(&session), vec!["101", "102"]);

    let (outcome, _) = session.handle_key_event(key(KeyCode::Enter));
    let MentionOutcome::Committed { edit, mention } = outcome else {
        panic!("leaf selection commits");
    };
    assert_eq!(edit.text, "@jira:project:WEB:issues:101 ");
    assert_eq!(edit.cursor, 29);
    let mention = mention.expect("leaf commits carry the mention");
    assert_eq!(mention.sub_entity_id.as_deref(), Some("101"));
    assert_eq!(mention.full_text, "@jira:project:WEB:issues:101");
}

#[tokio::test]
async fn backend_failures_never_escape_the_popup() {
    let (sources, _) = connection_sources(vec![active_account("jira_oauth")], false, false);
    let mut session = MentionSession::connect(sources, failing_entities()).await;

    session.sync_input("@jira:project:", 14);
    session.settle().await;

    assert!(session.composer().popup_open());
    assert!(!session.composer().is_loading());
    assert_eq!(session.composer().candidates().len(), 0);
}

#[tokio::test]
async fn connecting_an_account_mid_session_takes_an_explicit_refresh() {
    let (sources, accounts) = connection_sources(vec![active_account("jira_oauth")], false, false);
    let mut session = MentionSession::connect(sources, fixed_entities(vec![], vec![])).await;

    session.sync_input("@", 1);
    assert_eq!(session_ids(&session), vec!["jira"]);

    accounts.push(active_account("github_oauth"));
    // The snapshot is immutable until the host asks for a refresh.
    session.sync_input("@", 1);
    assert_eq!(session_ids(&session), vec!["jira"]);

    session.refresh_connections().await;
    assert_eq!(session_ids(&session), vec!["jira", "github"]);
}
