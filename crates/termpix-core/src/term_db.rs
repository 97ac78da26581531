#![forbid(unsafe_code)]

//! Built-in terminal database.
//!
//! Entries are composed from sequence groups (basic cursor control, 16/256/
//! direct color, sixel, kitty, iTerm2, tmux passthrough). [`TermDb::detect`]
//! chooses an entry from the environment the same way the probe-free
//! heuristics of most terminal libraries do: program-specific variables first,
//! then `TERM`, then adjustments for `COLORTERM`, `NO_COLOR` and multiplexers.

use std::env;

use crate::sequences::{TermInfo, TermSeq};

/// Environment snapshot used by [`TermDb::detect`].
///
/// Tests construct this directly instead of mutating the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectInputs {
    pub term: String,
    pub term_program: String,
    pub colorterm: String,
    pub no_color: bool,
    pub in_tmux: bool,
    pub in_screen: bool,
    pub kitty_window_id: bool,
    pub vte_version: String,
}

impl DetectInputs {
    /// Read the relevant variables from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            term: env::var("TERM").unwrap_or_default(),
            term_program: env::var("TERM_PROGRAM").unwrap_or_default(),
            colorterm: env::var("COLORTERM").unwrap_or_default(),
            no_color: env::var("NO_COLOR").is_ok(),
            in_tmux: env::var("TMUX").is_ok(),
            in_screen: env::var("STY").is_ok(),
            kitty_window_id: env::var("KITTY_WINDOW_ID").is_ok(),
            vte_version: env::var("VTE_VERSION").unwrap_or_default(),
        }
    }

    /// Inputs carrying only a `TERM` value.
    #[must_use]
    pub fn with_term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    fn advertises_direct_color(&self) -> bool {
        self.colorterm.contains("truecolor") || self.colorterm.contains("24bit")
    }
}

const BASIC: &[TermSeq] = &[
    TermSeq::ResetTerminalSoft,
    TermSeq::ResetTerminalHard,
    TermSeq::ResetAttributes,
    TermSeq::Clear,
    TermSeq::InvertColors,
    TermSeq::EnableBold,
    TermSeq::CursorToTopLeft,
    TermSeq::CursorToBottomLeft,
    TermSeq::CursorToPos,
    TermSeq::CursorUp1,
    TermSeq::CursorUp,
    TermSeq::CursorDown1,
    TermSeq::CursorDown,
    TermSeq::CursorLeft1,
    TermSeq::CursorLeft,
    TermSeq::CursorRight1,
    TermSeq::CursorRight,
    TermSeq::EnableCursor,
    TermSeq::DisableCursor,
    TermSeq::EnableEcho,
    TermSeq::DisableEcho,
    TermSeq::EnableInsert,
    TermSeq::DisableInsert,
    TermSeq::EnableWrap,
    TermSeq::DisableWrap,
];

const COLOR_16: &[TermSeq] = &[
    TermSeq::SetColorFg16,
    TermSeq::SetColorBg16,
    TermSeq::SetColorFgbg16,
    TermSeq::ResetColorFg,
    TermSeq::ResetColorBg,
];

const COLOR_256: &[TermSeq] = &[
    TermSeq::SetColorFg256,
    TermSeq::SetColorBg256,
    TermSeq::SetColorFgbg256,
];

const DIRECT: &[TermSeq] = &[
    TermSeq::SetColorFgDirect,
    TermSeq::SetColorBgDirect,
    TermSeq::SetColorFgbgDirect,
];

const SIXEL: &[TermSeq] = &[
    TermSeq::BeginSixels,
    TermSeq::EndSixels,
    TermSeq::EnableSixelScrolling,
    TermSeq::DisableSixelScrolling,
];

const KITTY: &[TermSeq] = &[
    TermSeq::BeginKittyImmediateImageV1,
    TermSeq::EndKittyImage,
    TermSeq::BeginKittyImageChunk,
    TermSeq::EndKittyImageChunk,
];

const ITERM2: &[TermSeq] = &[TermSeq::BeginIterm2Image, TermSeq::EndIterm2Image];

const REPEAT: &[TermSeq] = &[TermSeq::RepeatChar];

const TMUX: &[TermSeq] = &[TermSeq::BeginTmuxPassthrough, TermSeq::EndTmuxPassthrough];

/// Groups removed when `NO_COLOR` is set.
const COLOR_GROUPS: &[&[TermSeq]] = &[COLOR_16, COLOR_256, DIRECT];

struct DbEntry {
    name: &'static str,
    aliases: &'static [&'static str],
    groups: &'static [&'static [TermSeq]],
}

impl DbEntry {
    fn matches(&self, term: &str) -> bool {
        self.name == term || self.aliases.contains(&term)
    }

    fn info(&self) -> TermInfo {
        let mut builder = TermInfo::builder(self.name);
        for group in self.groups {
            builder = builder.seqs(group);
        }
        builder.build()
    }

    fn has_group(&self, group: &[TermSeq]) -> bool {
        self.groups.iter().any(|g| *g == group)
    }
}

const XTERM_GROUPS: &[&[TermSeq]] = &[BASIC, COLOR_16, COLOR_256, REPEAT];
const KITTY_GROUPS: &[&[TermSeq]] = &[BASIC, COLOR_16, COLOR_256, DIRECT, KITTY, REPEAT];
const SIXEL_DIRECT_GROUPS: &[&[TermSeq]] = &[BASIC, COLOR_16, COLOR_256, DIRECT, SIXEL];
const DIRECT_GROUPS: &[&[TermSeq]] = &[BASIC, COLOR_16, COLOR_256, DIRECT, REPEAT];
const INDEXED_GROUPS: &[&[TermSeq]] = &[BASIC, COLOR_16, COLOR_256];
const FALLBACK_GROUPS: &[&[TermSeq]] = &[BASIC, COLOR_16, COLOR_256, DIRECT, REPEAT];

const ENTRIES: &[DbEntry] = &[
    DbEntry {
        name: "xterm",
        aliases: &["xterm-256color", "xterm-color", "xterm-16color"],
        groups: XTERM_GROUPS,
    },
    DbEntry {
        name: "xterm-direct",
        aliases: &["xterm-truecolor"],
        groups: &[BASIC, COLOR_16, COLOR_256, DIRECT, REPEAT],
    },
    DbEntry {
        name: "kitty",
        aliases: &["xterm-kitty"],
        groups: KITTY_GROUPS,
    },
    DbEntry {
        name: "ghostty",
        aliases: &["xterm-ghostty"],
        groups: KITTY_GROUPS,
    },
    DbEntry {
        name: "foot",
        aliases: &["foot-extra", "foot-direct"],
        groups: &[BASIC, COLOR_16, COLOR_256, DIRECT, SIXEL, REPEAT],
    },
    DbEntry {
        name: "mlterm",
        aliases: &["mlterm-256color"],
        groups: SIXEL_DIRECT_GROUPS,
    },
    DbEntry {
        name: "konsole",
        aliases: &["konsole-256color", "konsole-direct"],
        groups: SIXEL_DIRECT_GROUPS,
    },
    DbEntry {
        name: "vte",
        aliases: &["vte-256color", "vte-direct", "gnome", "gnome-256color"],
        groups: DIRECT_GROUPS,
    },
    DbEntry {
        name: "alacritty",
        aliases: &["alacritty-direct"],
        groups: &[BASIC, COLOR_16, COLOR_256, DIRECT],
    },
    DbEntry {
        name: "st",
        aliases: &["st-256color", "st-direct"],
        groups: DIRECT_GROUPS,
    },
    DbEntry {
        name: "wezterm",
        aliases: &[],
        groups: &[
            BASIC, COLOR_16, COLOR_256, DIRECT, SIXEL, KITTY, ITERM2, REPEAT,
        ],
    },
    DbEntry {
        name: "iterm",
        aliases: &["iterm2", "iTerm.app"],
        groups: &[BASIC, COLOR_16, COLOR_256, DIRECT, ITERM2, SIXEL],
    },
    DbEntry {
        name: "mintty",
        aliases: &["mintty-direct"],
        groups: &[BASIC, COLOR_16, COLOR_256, DIRECT, SIXEL, ITERM2],
    },
    DbEntry {
        name: "rxvt",
        aliases: &["rxvt-unicode", "rxvt-unicode-256color", "rxvt-256color"],
        groups: INDEXED_GROUPS,
    },
    DbEntry {
        name: "screen",
        aliases: &["screen-256color"],
        groups: INDEXED_GROUPS,
    },
    DbEntry {
        name: "tmux",
        aliases: &["tmux-256color", "tmux-direct"],
        groups: &[BASIC, COLOR_16, COLOR_256, DIRECT, TMUX],
    },
    DbEntry {
        name: "linux",
        aliases: &["linux-16color"],
        groups: &[BASIC, COLOR_16],
    },
    DbEntry {
        name: "vt100",
        aliases: &["vt102", "vt220"],
        groups: &[BASIC],
    },
    DbEntry {
        name: "dumb",
        aliases: &[],
        groups: &[],
    },
];

static DUMB: DbEntry = DbEntry {
    name: "dumb",
    aliases: &[],
    groups: &[],
};

/// `TERM_PROGRAM` values that identify an entry more precisely than `TERM`.
const TERM_PROGRAMS: &[(&str, &str)] = &[
    ("iterm.app", "iterm"),
    ("wezterm", "wezterm"),
    ("ghostty", "ghostty"),
    ("mintty", "mintty"),
    ("kitty", "kitty"),
];

/// Read-only database of built-in terminal entries.
#[derive(Debug, Clone, Copy)]
pub struct TermDb {
    entries: &'static [DbEntry],
}

impl std::fmt::Debug for DbEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbEntry")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl Default for TermDb {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TermDb {
    /// The built-in database.
    #[must_use]
    pub const fn builtin() -> Self {
        Self { entries: ENTRIES }
    }

    /// Canonical entry names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Entry for an exact name or alias.
    #[must_use]
    pub fn lookup(&self, term: &str) -> Option<TermInfo> {
        self.find(term).map(DbEntry::info)
    }

    /// A broadly compatible modern table, used to fill gaps in a detected one.
    #[must_use]
    pub fn fallback_info(&self) -> TermInfo {
        DbEntry {
            name: "fallback",
            aliases: &[],
            groups: FALLBACK_GROUPS,
        }
        .info()
    }

    /// Table for the terminal described by `inputs`.
    ///
    /// Unknown non-empty `TERM` values are treated as xterm; an empty `TERM`
    /// is treated as `dumb`.
    #[must_use]
    pub fn detect(&self, inputs: &DetectInputs) -> TermInfo {
        let entry = self.select(inputs);
        let mut builder = TermInfo::builder(entry.name);
        for group in entry.groups {
            builder = builder.seqs(group);
        }

        if inputs.advertises_direct_color()
            && !inputs.in_screen
            && entry.has_group(COLOR_256)
            && !entry.has_group(DIRECT)
        {
            builder = builder.seqs(DIRECT);
        }
        if inputs.in_tmux && !entry.groups.is_empty() {
            builder = builder.seqs(TMUX);
        }
        if inputs.no_color {
            for group in COLOR_GROUPS {
                for &seq in *group {
                    builder = builder.without(seq);
                }
            }
        }

        let info = builder.build();
        crate::debug!(
            entry = entry.name,
            term = %inputs.term,
            sequences = info.len(),
            "selected terminal database entry"
        );
        info
    }

    fn find(&self, term: &str) -> Option<&'static DbEntry> {
        self.entries.iter().find(|entry| entry.matches(term))
    }

    fn find_by_prefix(&self, term: &str) -> Option<&'static DbEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                term.strip_prefix(entry.name)
                    .is_some_and(|rest| rest.starts_with('-'))
            })
            .max_by_key(|entry| entry.name.len())
    }

    fn named(&self, name: &str) -> &'static DbEntry {
        self.find(name).unwrap_or(&DUMB)
    }

    fn select(&self, inputs: &DetectInputs) -> &'static DbEntry {
        if inputs.kitty_window_id {
            return self.named("kitty");
        }

        let program = inputs.term_program.to_ascii_lowercase();
        if let Some(&(_, name)) = TERM_PROGRAMS.iter().find(|(p, _)| *p == program) {
            return self.named(name);
        }

        let term = inputs.term.as_str();
        if term.is_empty() {
            return self.named("dumb");
        }

        let entry = self
            .find(term)
            .or_else(|| self.find_by_prefix(term))
            .unwrap_or_else(|| self.named("xterm"));

        if entry.name == "xterm" && !inputs.vte_version.is_empty() {
            return self.named("vte");
        }
        entry
    }
}
