//! Wire shapes of the payloads exchanged with the dashboard.

use anyhow::Result;
use katana_integrations::Integration;
use katana_integrations::Registry;
use katana_mentions::ConnectionDirectory;
use katana_mentions::MentionComposer;
use katana_mentions::MentionSpan;
use katana_mentions::ParsedMention;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn parsed_mentions_serialize_camel_case_and_omit_untyped_levels() -> Result<()> {
    let mention = ParsedMention::from_span("@jira:project:WEB", MentionSpan { start: 0, end: 17 });
    let value = serde_json::to_value(&mention)?;
    assert_eq!(
        value,
        json!({
            "integration": "jira",
            "entityType": "project",
            "entityId": "WEB",
            "fullText": "@jira:project:WEB",
            "startIndex": 0,
            "endIndex": 17,
        })
    );
    Ok(())
}

#[test]
fn parsed_mentions_accept_payloads_without_optional_segments() -> Result<()> {
    let mention: ParsedMention = serde_json::from_value(json!({
        "integration": "slack",
        "fullText": "@slack",
        "startIndex": 4,
        "endIndex": 10,
    }))?;
    assert_eq!(mention.integration, "slack");
    assert_eq!(mention.entity_type, None);
    assert_eq!(mention.sub_entity_id, None);
    Ok(())
}

#[test]
fn candidate_rows_use_the_dashboard_field_names() -> Result<()> {
    let mut composer = MentionComposer::new(
        ConnectionDirectory::from_integrations([Integration::Github]),
        Registry::builtin(),
    );
    composer.sync_input("@github:", 8);
    let first = composer.candidates().first().expect("github has commands");

    let value = serde_json::to_value(first)?;
    assert_eq!(value["type"], "command");
    assert_eq!(value["integration"], "github");
    assert_eq!(value["command"], value["id"]);
    // Unset path segments stay off the wire entirely.
    assert!(value.get("entityType").is_none());
    assert!(value.get("data").is_none());
    Ok(())
}
