//! Per-status action dispatch table.
//!
//! Given a record's mount status, derives the ordered list of permitted
//! actions for a front end to offer, plus a failure notice for states where
//! nothing can be done.

use serde::Serialize;

use crate::status::MountStatus;

/// What an action does when triggered. The mount/unmount kinds pick their
/// whole-disk verb variant from the record at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Mount,
    Unmount,
    /// Open the record's mount point in the file browser.
    Reveal,
    /// Re-run the detail fetch interactively in a terminal window.
    RetryInTerminal,
}

/// Keyboard shortcut hint for a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub modifiers: &'static [&'static str],
    pub key: &'static str,
}

/// One action offered for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionSpec {
    pub title: &'static str,
    pub shortcut: Option<Shortcut>,
    pub kind: ActionKind,
}

/// The actions permitted for one mount status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSet {
    /// Explanation shown when the state permits no (or only fallback)
    /// actions.
    pub notice: Option<&'static str>,
    pub actions: Vec<ActionSpec>,
}

const CMD: &[&str] = &["cmd"];

const MOUNT: ActionSpec = ActionSpec {
    title: "Mount",
    shortcut: Some(Shortcut {
        modifiers: CMD,
        key: "m",
    }),
    kind: ActionKind::Mount,
};

const UNMOUNT: ActionSpec = ActionSpec {
    title: "Unmount",
    shortcut: Some(Shortcut {
        modifiers: CMD,
        key: "u",
    }),
    kind: ActionKind::Unmount,
};

const REVEAL: ActionSpec = ActionSpec {
    title: "Reveal in Finder",
    shortcut: Some(Shortcut {
        modifiers: CMD,
        key: "o",
    }),
    kind: ActionKind::Reveal,
};

const MOUNT_ALL: ActionSpec = ActionSpec {
    title: "Mount All",
    shortcut: None,
    kind: ActionKind::Mount,
};

const EJECT_ALL: ActionSpec = ActionSpec {
    title: "Eject All",
    shortcut: None,
    kind: ActionKind::Unmount,
};

const EJECT: ActionSpec = ActionSpec {
    title: "Eject",
    shortcut: None,
    kind: ActionKind::Unmount,
};

const RETRY_IN_TERMINAL: ActionSpec = ActionSpec {
    title: "Retry in Terminal",
    shortcut: Some(Shortcut {
        modifiers: CMD,
        key: "r",
    }),
    kind: ActionKind::RetryInTerminal,
};

/// Returns the permitted actions for a mount status.
pub fn available_actions(status: MountStatus) -> ActionSet {
    match status {
        MountStatus::Mounted => ActionSet {
            notice: None,
            actions: vec![UNMOUNT, REVEAL],
        },
        MountStatus::Unmounted => ActionSet {
            notice: None,
            actions: vec![MOUNT],
        },
        MountStatus::Whole => ActionSet {
            notice: None,
            actions: vec![EJECT_ALL, MOUNT_ALL],
        },
        MountStatus::Unmountable => ActionSet {
            notice: Some("This volume cannot be unmounted"),
            actions: vec![],
        },
        MountStatus::Container => ActionSet {
            notice: Some("Containers cannot be mounted"),
            actions: vec![],
        },
        MountStatus::TimedOut => ActionSet {
            notice: None,
            actions: vec![RETRY_IN_TERMINAL, EJECT, MOUNT],
        },
        MountStatus::Initializing
        | MountStatus::Inaccessible
        | MountStatus::ClassificationFailed => ActionSet {
            notice: Some("Mountability Unknown"),
            actions: vec![EJECT, MOUNT],
        },
    }
}
