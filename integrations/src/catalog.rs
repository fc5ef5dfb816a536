//! Static command catalogs and entity taxonomies, validated once at startup.

use crate::Integration;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use thiserror::Error;

/// One chat command an integration exposes, e.g. `create-issue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Hyphenated token typed after `@integration:`. The parser recognizes a
    /// fully typed command by its hyphen, so every name must carry one.
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

/// A mentionable top-level entity type plus its static sub-entity menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTypeSpec {
    /// Token typed after the integration name. Must stay hyphen-free, since a
    /// hyphen in that position reads as a fully typed command instead.
    pub name: &'static str,
    pub label: &'static str,
    /// Menu offered once an entity id has been typed: drill-down sub-entity
    /// types and entity-scoped commands, e.g. jira `project` offers `issues`
    /// and `create-issue`.
    pub sub_entries: &'static [SubEntrySpec],
}

/// One row of a sub-entity menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubEntrySpec {
    pub name: &'static str,
    pub label: &'static str,
}

/// Everything the mention engine knows statically about one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrationProfile {
    pub integration: Integration,
    /// Catalog order is popup display order.
    pub commands: &'static [CommandSpec],
    pub entity_types: &'static [EntityTypeSpec],
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate profile for `{integration}`")]
    DuplicateProfile { integration: Integration },
    #[error("invalid command `{command}` for `{integration}`: {reason}")]
    InvalidCommand {
        integration: Integration,
        command: String,
        reason: &'static str,
    },
    #[error("invalid entity type `{entity_type}` for `{integration}`: {reason}")]
    InvalidEntityType {
        integration: Integration,
        entity_type: String,
        reason: &'static str,
    },
    #[error("invalid sub-entry `{entry}` under `{integration}:{entity_type}`: {reason}")]
    InvalidSubEntry {
        integration: Integration,
        entity_type: String,
        entry: String,
        reason: &'static str,
    },
}

/// Validated lookup table from [`Integration`] to its profile.
///
/// Unknown integrations simply resolve to empty command lists and menus; an
/// integration can be connected without having a profile (the umbrella
/// `google` connection is the builtin example).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    profiles: BTreeMap<Integration, &'static IntegrationProfile>,
}

impl Registry {
    /// Builds a registry, rejecting malformed tables up front instead of
    /// leaving bad names to fall through lookups at resolve time.
    pub fn from_profiles(profiles: &'static [IntegrationProfile]) -> Result<Self, RegistryError> {
        let mut map: BTreeMap<Integration, &'static IntegrationProfile> = BTreeMap::new();
        for profile in profiles {
            validate_profile(profile)?;
            if map.insert(profile.integration, profile).is_some() {
                return Err(RegistryError::DuplicateProfile {
                    integration: profile.integration,
                });
            }
        }
        Ok(Self { profiles: map })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The product registry shipped with the dashboard.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(|| match Registry::from_profiles(BUILTIN_PROFILES) {
            Ok(registry) => registry,
            Err(err) => {
                // The builtin tables are compile-time constants; a rejection
                // here is a programming error caught by the tests below.
                tracing::error!("builtin integration registry rejected: {err}");
                Registry::empty()
            }
        })
    }

    pub fn profile(&self, integration: Integration) -> Option<&'static IntegrationProfile> {
        self.profiles.get(&integration).copied()
    }

    /// Command catalog in display order; empty for unknown integrations.
    pub fn commands(&self, integration: Integration) -> &'static [CommandSpec] {
        self.profile(integration).map_or(&[], |profile| profile.commands)
    }

    pub fn entity_type(
        &self,
        integration: Integration,
        name: &str,
    ) -> Option<&'static EntityTypeSpec> {
        self.profile(integration)?
            .entity_types
            .iter()
            .find(|spec| spec.name == name)
    }

    /// Sub-entity menu for an `(integration, entity type)` pair; empty when
    /// the pair is not registered.
    pub fn sub_menu(&self, integration: Integration, entity_type: &str) -> &'static [SubEntrySpec] {
        self.entity_type(integration, entity_type)
            .map_or(&[], |spec| spec.sub_entries)
    }

    pub fn sub_entry(
        &self,
        integration: Integration,
        entity_type: &str,
        name: &str,
    ) -> Option<&'static SubEntrySpec> {
        self.sub_menu(integration, entity_type)
            .iter()
            .find(|entry| entry.name == name)
    }

    pub fn integrations(&self) -> impl Iterator<Item = Integration> + '_ {
        self.profiles.keys().copied()
    }
}

fn validate_profile(profile: &IntegrationProfile) -> Result<(), RegistryError> {
    let integration = profile.integration;

    let mut seen_commands: BTreeSet<&str> = BTreeSet::new();
    for command in profile.commands {
        let reason = if command.name.is_empty() {
            Some("name is empty")
        } else if !command.name.contains('-') {
            Some("command names must be hyphenated")
        } else if !is_kebab(command.name) {
            Some("name must be lowercase ascii, digits and hyphens")
        } else if !seen_commands.insert(command.name) {
            Some("duplicate command name")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(RegistryError::InvalidCommand {
                integration,
                command: command.name.to_string(),
                reason,
            });
        }
    }

    let mut seen_types: BTreeSet<&str> = BTreeSet::new();
    for entity_type in profile.entity_types {
        let reason = if entity_type.name.is_empty() {
            Some("name is empty")
        } else if entity_type.name.contains('-') {
            Some("entity type names must not contain hyphens")
        } else if !entity_type.name.chars().all(is_word_char) {
            Some("name must be lowercase ascii or digits")
        } else if !seen_types.insert(entity_type.name) {
            Some("duplicate entity type")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(RegistryError::InvalidEntityType {
                integration,
                entity_type: entity_type.name.to_string(),
                reason,
            });
        }

        let mut seen_entries: BTreeSet<&str> = BTreeSet::new();
        for entry in entity_type.sub_entries {
            let reason = if entry.name.is_empty() {
                Some("name is empty")
            } else if !is_kebab(entry.name) {
                Some("name must be lowercase ascii, digits and hyphens")
            } else if !seen_entries.insert(entry.name) {
                Some("duplicate sub-entry")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(RegistryError::InvalidSubEntry {
                    integration,
                    entity_type: entity_type.name.to_string(),
                    entry: entry.name.to_string(),
                    reason,
                });
            }
        }
    }

    Ok(())
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

fn is_kebab(name: &str) -> bool {
    name.chars().all(|c| is_word_char(c) || c == '-')
}

const JIRA_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "create-issue",
        label: "Create issue",
        description: "Create a new issue in a project",
    },
    CommandSpec {
        name: "list-issues",
        label: "List issues",
        description: "List recent issues",
    },
    CommandSpec {
        name: "get-issue",
        label: "Get issue",
        description: "Fetch one issue by key",
    },
    CommandSpec {
        name: "update-issue",
        label: "Update issue",
        description: "Update fields on an existing issue",
    },
    CommandSpec {
        name: "add-comment",
        label: "Add comment",
        description: "Comment on an issue",
    },
];

const LINEAR_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "create-issue",
        label: "Create issue",
        description: "Create a new issue",
    },
    CommandSpec {
        name: "list-issues",
        label: "List issues",
        description: "List recent issues",
    },
    CommandSpec {
        name: "get-issue",
        label: "Get issue",
        description: "Fetch one issue",
    },
    CommandSpec {
        name: "update-issue",
        label: "Update issue",
        description: "Update an existing issue",
    },
];

const GITHUB_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "create-issue",
        label: "Create issue",
        description: "Open a new issue in a repository",
    },
    CommandSpec {
        name: "list-issues",
        label: "List issues",
        description: "List open issues",
    },
    CommandSpec {
        name: "list-pull-requests",
        label: "List pull requests",
        description: "List open pull requests",
    },
];

const SLACK_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "send-message",
        label: "Send message",
        description: "Post a message to a channel",
    },
    CommandSpec {
        name: "list-channels",
        label: "List channels",
        description: "List channels in the workspace",
    },
];

const DISCORD_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "send-message",
        label: "Send message",
        description: "Post a message to a channel",
    },
    CommandSpec {
        name: "list-channels",
        label: "List channels",
        description: "List channels in a server",
    },
];

const VERCEL_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "list-projects",
        label: "List projects",
        description: "List projects in the team",
    },
    CommandSpec {
        name: "list-deployments",
        label: "List deployments",
        description: "List recent deployments",
    },
    CommandSpec {
        name: "get-deployment",
        label: "Get deployment",
        description: "Fetch one deployment",
    },
];

const DRIVE_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "search-files",
        label: "Search files",
        description: "Search files in Drive",
    },
    CommandSpec {
        name: "list-files",
        label: "List files",
        description: "List files in a folder",
    },
];

const SHEETS_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "read-sheet",
        label: "Read sheet",
        description: "Read a range from a spreadsheet",
    },
    CommandSpec {
        name: "append-row",
        label: "Append row",
        description: "Append a row to a spreadsheet",
    },
];

const DOCS_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "read-doc",
        label: "Read document",
        description: "Read a document body",
    },
    CommandSpec {
        name: "create-doc",
        label: "Create document",
        description: "Create a new document",
    },
];

const JIRA_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "project",
    label: "Project",
    sub_entries: &[
        SubEntrySpec {
            name: "issues",
            label: "Issues",
        },
        SubEntrySpec {
            name: "create-issue",
            label: "Create issue",
        },
    ],
}];

const LINEAR_ENTITIES: &[EntityTypeSpec] = &[
    EntityTypeSpec {
        name: "team",
        label: "Team",
        sub_entries: &[
            SubEntrySpec {
                name: "issues",
                label: "Issues",
            },
            SubEntrySpec {
                name: "create-issue",
                label: "Create issue",
            },
        ],
    },
    EntityTypeSpec {
        name: "project",
        label: "Project",
        sub_entries: &[SubEntrySpec {
            name: "issues",
            label: "Issues",
        }],
    },
];

const GITHUB_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "repository",
    label: "Repository",
    sub_entries: &[
        SubEntrySpec {
            name: "issues",
            label: "Issues",
        },
        SubEntrySpec {
            name: "pulls",
            label: "Pull requests",
        },
        SubEntrySpec {
            name: "create-issue",
            label: "Create issue",
        },
    ],
}];

const SLACK_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "channel",
    label: "Channel",
    sub_entries: &[
        SubEntrySpec {
            name: "messages",
            label: "Messages",
        },
        SubEntrySpec {
            name: "send-message",
            label: "Send message",
        },
    ],
}];

const DISCORD_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "server",
    label: "Server",
    sub_entries: &[SubEntrySpec {
        name: "channels",
        label: "Channels",
    }],
}];

const VERCEL_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "project",
    label: "Project",
    sub_entries: &[SubEntrySpec {
        name: "deployments",
        label: "Deployments",
    }],
}];

const DRIVE_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "folder",
    label: "Folder",
    sub_entries: &[SubEntrySpec {
        name: "files",
        label: "Files",
    }],
}];

const SHEETS_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "spreadsheet",
    label: "Spreadsheet",
    sub_entries: &[
        SubEntrySpec {
            name: "tabs",
            label: "Tabs",
        },
        SubEntrySpec {
            name: "append-row",
            label: "Append row",
        },
    ],
}];

const DOCS_ENTITIES: &[EntityTypeSpec] = &[EntityTypeSpec {
    name: "document",
    label: "Document",
    sub_entries: &[SubEntrySpec {
        name: "comments",
        label: "Comments",
    }],
}];

// The umbrella `google` connection carries no catalog of its own; mentioning
// it only makes sense through the suite integrations (drive, sheets, docs).
static BUILTIN_PROFILES: &[IntegrationProfile] = &[
    IntegrationProfile {
        integration: Integration::Jira,
        commands: JIRA_COMMANDS,
        entity_types: JIRA_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Linear,
        commands: LINEAR_COMMANDS,
        entity_types: LINEAR_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Github,
        commands: GITHUB_COMMANDS,
        entity_types: GITHUB_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Slack,
        commands: SLACK_COMMANDS,
        entity_types: SLACK_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Discord,
        commands: DISCORD_COMMANDS,
        entity_types: DISCORD_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Vercel,
        commands: VERCEL_COMMANDS,
        entity_types: VERCEL_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Drive,
        commands: DRIVE_COMMANDS,
        entity_types: DRIVE_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Sheets,
        commands: SHEETS_COMMANDS,
        entity_types: SHEETS_ENTITIES,
    },
    IntegrationProfile {
        integration: Integration::Docs,
        commands: DOCS_COMMANDS,
        entity_types: DOCS_ENTITIES,
    },
];
