//! Accelerator map and its rc-file format.
//!
//! The file uses the same line shape GTK writes:
//!
//! ```text
//! ; horizon-gtk GtkAccelMap rc-file         -*- scheme -*-
//! (gtk_accel_path "<MainWindow>/File/Save" "<Primary>s")
//! ```
//!
//! Lines starting with `;` are comments. Key names cover printable ASCII,
//! function keys and a few editing keys; anything else is written as a hex
//! keyval.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::types::{
    GDK_CONTROL_MASK, GDK_MOD1_MASK, GDK_SHIFT_MASK, GDK_SUPER_MASK, GdkModifierType, guint,
};

const MODIFIER_NAMES: &[(&str, GdkModifierType)] = &[
    ("<Shift>", GDK_SHIFT_MASK),
    ("<Primary>", GDK_CONTROL_MASK),
    ("<Alt>", GDK_MOD1_MASK),
    ("<Super>", GDK_SUPER_MASK),
];

const MODIFIER_ALIASES: &[(&str, GdkModifierType)] = &[
    ("<control>", GDK_CONTROL_MASK),
    ("<ctrl>", GDK_CONTROL_MASK),
    ("<ctl>", GDK_CONTROL_MASK),
    ("<primary>", GDK_CONTROL_MASK),
    ("<shift>", GDK_SHIFT_MASK),
    ("<shft>", GDK_SHIFT_MASK),
    ("<alt>", GDK_MOD1_MASK),
    ("<mod1>", GDK_MOD1_MASK),
    ("<super>", GDK_SUPER_MASK),
];

const NAMED_KEYS: &[(&str, guint)] = &[
    ("space", 0x020),
    ("BackSpace", 0xff08),
    ("Tab", 0xff09),
    ("Return", 0xff0d),
    ("Escape", 0xff1b),
    ("Home", 0xff50),
    ("Left", 0xff51),
    ("Up", 0xff52),
    ("Right", 0xff53),
    ("Down", 0xff54),
    ("Page_Up", 0xff55),
    ("Page_Down", 0xff56),
    ("End", 0xff57),
    ("Insert", 0xff63),
    ("Delete", 0xffff),
];

const KEY_F1: guint = 0xffbe;

#[derive(Debug, Default)]
pub(crate) struct AccelMap {
    entries: BTreeMap<String, (guint, GdkModifierType)>,
}

impl AccelMap {
    /// Register `path` unless it is already known.
    pub fn add_entry(&mut self, path: &str, key: guint, mods: GdkModifierType) {
        self.entries.entry(path.to_string()).or_insert((key, mods));
    }

    pub fn change_entry(&mut self, path: &str, key: guint, mods: GdkModifierType) {
        self.entries.insert(path.to_string(), (key, mods));
    }

    pub fn lookup(&self, path: &str) -> Option<(guint, GdkModifierType)> {
        self.entries.get(path).copied()
    }

    /// Apply every well-formed entry in `text`. Returns how many were applied.
    pub fn load_str(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let Some((path, accel)) = parse_line(line) else {
                continue;
            };
            if !is_valid_accel_path(path) {
                continue;
            }
            if let Some((key, mods)) = parse_accelerator(accel) {
                self.change_entry(path, key, mods);
                applied += 1;
            }
        }
        applied
    }

    pub fn to_rc_string(&self) -> String {
        let mut out = String::from("; horizon-gtk GtkAccelMap rc-file         -*- scheme -*-\n");
        for (path, &(key, mods)) in &self.entries {
            let _ = writeln!(
                out,
                "(gtk_accel_path \"{}\" \"{}\")",
                escape(path),
                accelerator_name(key, mods)
            );
        }
        out
    }
}

/// Accelerator paths look like `<WindowType>/Category/Action`.
pub(crate) fn is_valid_accel_path(path: &str) -> bool {
    path.starts_with('<')
        && path
            .find(">/")
            .is_some_and(|end| end > 1 && end + 2 < path.len())
}

pub(crate) fn accelerator_name(key: guint, mods: GdkModifierType) -> String {
    let mut name = String::new();
    for &(prefix, mask) in MODIFIER_NAMES {
        if mods & mask != 0 {
            name.push_str(prefix);
        }
    }
    name.push_str(&key_name(key));
    name
}

fn key_name(key: guint) -> String {
    if let Some(&(name, _)) = NAMED_KEYS.iter().find(|&&(_, v)| v == key) {
        return name.to_string();
    }
    if (KEY_F1..KEY_F1 + 12).contains(&key) {
        return format!("F{}", key - KEY_F1 + 1);
    }
    match char::from_u32(key) {
        Some(c) if c.is_ascii_graphic() => c.to_ascii_lowercase().to_string(),
        _ => format!("{key:#06x}"),
    }
}

pub(crate) fn parse_accelerator(accel: &str) -> Option<(guint, GdkModifierType)> {
    let mut rest = accel.trim();
    let mut mods = 0;
    while rest.starts_with('<') {
        let end = rest.find('>')?;
        let token = rest[..=end].to_ascii_lowercase();
        let &(_, mask) = MODIFIER_ALIASES.iter().find(|&&(name, _)| name == token)?;
        mods |= mask;
        rest = &rest[end + 1..];
    }
    parse_key(rest).map(|key| (key, mods))
}

fn parse_key(name: &str) -> Option<guint> {
    if name.is_empty() {
        return None;
    }
    if let Some(&(_, value)) = NAMED_KEYS.iter().find(|&&(n, _)| n.eq_ignore_ascii_case(name)) {
        return Some(value);
    }
    if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<guint>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KEY_F1 + n - 1);
        }
    }
    if let Some(hex) = name.strip_prefix("0x") {
        return guint::from_str_radix(hex, 16).ok();
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_graphic() => Some(c.to_ascii_lowercase() as guint),
        _ => None,
    }
}

/// Parse `(gtk_accel_path "PATH" "ACCEL")`.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_prefix("(gtk_accel_path")?.strip_suffix(')')?.trim();
    let (path, rest) = quoted(body)?;
    let (accel, rest) = quoted(rest.trim_start())?;
    rest.trim().is_empty().then_some((path, accel))
}

fn quoted(s: &str) -> Option<(&str, &str)> {
    let s = s.strip_prefix('"')?;
    let end = s.find('"')?;
    Some((&s[..end], &s[end + 1..]))
}

fn escape(path: &str) -> String {
    path.replace('"', "")
}
