//! Mention parsing and autocomplete for the Cost Katana chat input.
//!
//! The chat box lets users reference connected integrations and their
//! entities inline: `@jira:project:WEB:issues:WEB-17` or
//! `@slack:send-message`. This crate finds the mention token around the
//! cursor, decides which candidate list the popup should show, fetches
//! async candidates without letting slow responses clobber newer
//! keystrokes, and splices a selected candidate back into the buffer.
//!
//! Hosts embed either [`MentionComposer`] (synchronous, bring your own
//! fetch plumbing) or [`MentionSession`] (tokio tasks included).

// Library code never writes to stdout/stderr directly; diagnostics go
// through tracing.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod apply;
mod composer;
mod connections;
mod item;
mod parse;
mod resolver;
mod session;
mod sources;

pub use apply::BufferEdit;
pub use composer::MentionComposer;
pub use composer::MentionOutcome;
pub use connections::ConnectionDirectory;
pub use connections::ConnectionSources;
pub use item::AutocompleteItem;
pub use item::ItemKind;
pub use parse::ActiveMention;
pub use parse::MentionLevel;
pub use parse::MentionSpan;
pub use parse::ParsedMention;
pub use parse::active_mention;
pub use parse::parse_mentions;
pub use resolver::CandidateFetch;
pub use resolver::FetchCall;
pub use session::MentionSession;
pub use sources::EntityRef;
pub use sources::EntitySource;
pub use sources::IntegrationSource;
pub use sources::ProviderConnectionSource;
pub use sources::SourceError;
pub use sources::SourceResult;
