//! Signal versus noise classification of changelog items.

use regex::RegexSet;

use crate::model::User;

/// Fields whose human edits indicate real progress.
pub const MEANINGFUL_FIELDS: &[&str] = &[
    "status",
    "assignee",
    "priority",
    "resolution",
    "summary",
    "description",
    "fix version",
    "fixversions",
    "sprint",
    "story points",
    "duedate",
    "issuetype",
    "labels",
    "component",
    "link",
];

/// Fields that churn without saying anything about progress.
pub const NOISE_FIELDS: &[&str] = &[
    "rank",
    "worklog",
    "worklogid",
    "timespent",
    "timeestimate",
    "timeoriginalestimate",
    "remainingestimate",
    "remoteissuelink",
    "flagged",
    "watchers",
];

/// Display-name fragments that identify automation accounts.
pub const BOT_NAME_PATTERNS: &[&str] = &[
    r"\bbot\b",
    r"\[bot\]",
    "automation",
    "automate",
    r"\bjira\b",
    r"\bsystem\b",
    "integration",
    "webhook",
    "scriptrunner",
    "service account",
];

/// Account types the tracker uses for non-human actors.
const BOT_ACCOUNT_TYPES: &[&str] = &["app", "system"];

/// Decides whether authors are bots and whether fields carry signal.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    bot_names: RegexSet,
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalClassifier {
    #[must_use]
    pub fn new() -> Self {
        let patterns: Vec<String> = BOT_NAME_PATTERNS
            .iter()
            .map(|p| format!("(?i){}", p))
            .collect();
        // The pattern table is static; an empty set only matches nothing.
        let bot_names = RegexSet::new(&patterns).unwrap_or_else(|_| RegexSet::empty());
        Self { bot_names }
    }

    /// A missing author, an app/system account, or a bot-like name.
    #[must_use]
    pub fn is_bot(&self, author: Option<&User>) -> bool {
        let Some(user) = author else {
            return true;
        };
        if let Some(account_type) = user.account_type.as_deref() {
            if BOT_ACCOUNT_TYPES
                .iter()
                .any(|t| t.eq_ignore_ascii_case(account_type))
            {
                return true;
            }
        }
        self.bot_names.is_match(&user.display_name)
    }

    #[must_use]
    pub fn is_meaningful_field(&self, field: &str) -> bool {
        contains_field(MEANINGFUL_FIELDS, field)
    }

    #[must_use]
    pub fn is_noise_field(&self, field: &str) -> bool {
        contains_field(NOISE_FIELDS, field)
    }

    /// Human edit to a meaningful field.
    #[must_use]
    pub fn is_meaningful(&self, field: &str, author_is_bot: bool) -> bool {
        !author_is_bot && self.is_meaningful_field(field)
    }

    /// Bot edit, or an edit to a noise field.
    #[must_use]
    pub fn is_noise(&self, field: &str, author_is_bot: bool) -> bool {
        author_is_bot || self.is_noise_field(field)
    }
}

fn contains_field(set: &[&str], field: &str) -> bool {
    let field = field.trim();
    set.iter().any(|f| f.eq_ignore_ascii_case(field))
}
