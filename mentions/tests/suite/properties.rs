//! Generative checks over the parser and resolver invariants.

use crossterm::event::KeyCode;
use katana_integrations::Integration;
use katana_integrations::Registry;
use katana_mentions::ConnectionDirectory;
use katana_mentions::MentionComposer;
use katana_mentions::MentionOutcome;
use katana_mentions::active_mention;
use katana_mentions::parse_mentions;
use mentions_test_support::key;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use strum::IntoEnumIterator;

fn composer(connected: impl IntoIterator<Item = Integration>) -> MentionComposer {
    MentionComposer::new(
        ConnectionDirectory::from_integrations(connected),
        Registry::builtin(),
    )
}

fn all_connected() -> MentionComposer {
    composer(Integration::iter())
}

fn candidate_ids(composer: &MentionComposer) -> Vec<String> {
    composer
        .candidates()
        .iter()
        .map(|item| item.id.clone())
        .collect()
}

proptest! {
    #[test]
    fn whitespace_between_at_and_cursor_never_opens_a_mention(
        prefix in "[a-z ]{0,12}",
        word in "[a-z]{0,6}",
        tail in "[a-z]{0,6}",
    ) {
        let buffer = format!("{prefix}@{word} {tail}");
        let connections = ConnectionDirectory::from_integrations(Integration::iter());
        let active = active_mention(&buffer, buffer.len(), &connections, Registry::builtin());
        prop_assert!(active.is_none(), "whitespace closed mention reopened in {buffer:?}");
    }

    #[test]
    fn every_prefix_of_a_connected_name_surfaces_it(
        index in 0usize..10,
        cut in 1usize..=10,
    ) {
        let integration = Integration::iter().nth(index).expect("index in range");
        let name = integration.name();
        let prefix = &name[..cut.min(name.len())];

        let mut composer = all_connected();
        let buffer = format!("@{prefix}");
        composer.sync_input(&buffer, buffer.len());

        let ids = candidate_ids(&composer);
        prop_assert!(
            ids.iter().any(|id| id.as_str() == name),
            "typing @{prefix} lost {name}; got {ids:?}"
        );
    }

    #[test]
    fn non_prefixes_always_yield_an_empty_list(junk in "[x-z]{1,6}") {
        // No canonical integration name starts with x, y, or z.
        let mut composer = composer([Integration::Jira, Integration::Linear]);
        let buffer = format!("@{junk}");
        composer.sync_input(&buffer, buffer.len());

        prop_assert!(composer.popup_open());
        prop_assert_eq!(composer.candidates().len(), 0);
    }

    #[test]
    fn resolving_the_same_input_twice_matches(
        buffer in "[a-z@: ]{0,24}",
        cursor in 0usize..=24,
    ) {
        let mut first = composer([Integration::Jira, Integration::Linear]);
        let mut second = composer([Integration::Jira, Integration::Linear]);
        first.sync_input(&buffer, cursor);
        second.sync_input(&buffer, cursor);

        prop_assert_eq!(first.popup_open(), second.popup_open());
        prop_assert_eq!(candidate_ids(&first), candidate_ids(&second));
        prop_assert_eq!(first.selected_index(), second.selected_index());
        if first.popup_open() {
            prop_assert_eq!(first.selected_index(), Some(0));
        }
    }

    #[test]
    fn command_commits_always_close_the_mention(
        index in 0usize..10,
        downs in 0usize..8,
    ) {
        let integration = Integration::iter().nth(index).expect("index in range");
        let mut composer = all_connected();
        let buffer = format!("@{}:", integration.name());
        composer.sync_input(&buffer, buffer.len());

        // Integrations without a command catalog show an empty popup, and
        // there is nothing to commit.
        if composer.candidates().is_empty() {
            let (_, consumed) = composer.handle_key_event(key(KeyCode::Enter));
            prop_assert!(!consumed);
            return Ok(());
        }

        for _ in 0..downs {
            composer.handle_key_event(key(KeyCode::Down));
        }
        let (outcome, consumed) = composer.handle_key_event(key(KeyCode::Enter));
        prop_assert!(consumed);
        let MentionOutcome::Committed { edit, mention } = outcome else {
            return Err(TestCaseError::fail("command selection must commit"));
        };
        prop_assert_eq!(mention, None);
        prop_assert!(edit.text.ends_with(' '), "commit adds a trailing space");

        composer.sync_input(&edit.text, edit.cursor);
        prop_assert!(!composer.popup_open(), "committed command reopened: {:?}", edit.text);
    }

    #[test]
    fn entity_commits_keep_surrounding_text_and_span_invariants(
        prefix in "[a-z ]{0,8}",
        suffix in "[a-z]{0,8}",
        id in "[A-Z]{1,3}",
    ) {
        let buffer = format!("{prefix}@jira:project: {suffix}");
        let cursor = prefix.len() + 14;
        let mut composer = composer([Integration::Jira]);
        let fetch = composer
            .sync_input(&buffer, cursor)
            .expect("entity level issues a fetch");
        composer.apply_fetch(
            fetch.generation,
            Ok(vec![katana_mentions::EntityRef::new(id.clone(), "row")]),
        );

        let (outcome, _) = composer.handle_key_event(key(KeyCode::Enter));
        let MentionOutcome::Committed { edit, mention } = outcome else {
            return Err(TestCaseError::fail("entity selection must commit"));
        };
        let mention = mention.expect("entity commits carry the mention");

        prop_assert!(edit.text.starts_with(&prefix));
        prop_assert!(edit.text.ends_with(&suffix));
        prop_assert_eq!(
            &edit.text[mention.start_index..mention.end_index],
            mention.full_text.as_str()
        );
        prop_assert_eq!(mention.entity_id.as_deref(), Some(id.as_str()));
        prop_assert_eq!(edit.cursor, mention.end_index + 1);
    }

    #[test]
    fn extracted_mentions_always_satisfy_the_span_invariant(
        text in "[a-z@: ]{0,30}",
    ) {
        for mention in parse_mentions(&text) {
            prop_assert_eq!(
                &text[mention.start_index..mention.end_index],
                mention.full_text.as_str()
            );
            prop_assert!(mention.full_text.starts_with('@'));
            prop_assert!(!mention.integration.is_empty());
            prop_assert!(!mention.full_text.contains(char::is_whitespace));
        }
    }
}
