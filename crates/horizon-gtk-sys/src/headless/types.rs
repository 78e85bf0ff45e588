//! Static type hierarchy and signal declarations.

use std::ffi::CStr;

pub use crate::types::G_TYPE_OBJECT;
use crate::types::GType;

pub const G_TYPE_INITIALLY_UNOWNED: GType = 0x1000;
pub const G_TYPE_APPLICATION: GType = 0x1001;
pub const GTK_TYPE_WIDGET: GType = 0x2000;
pub const GTK_TYPE_CONTAINER: GType = 0x2001;
pub const GTK_TYPE_BIN: GType = 0x2002;
pub const GTK_TYPE_WINDOW: GType = 0x2003;
pub const GTK_TYPE_BUTTON: GType = 0x2004;
pub const GTK_TYPE_MENU_ITEM: GType = 0x2005;
pub const GTK_TYPE_BOX: GType = 0x2006;
pub const GTK_TYPE_LABEL: GType = 0x2007;
pub const GTK_TYPE_IMAGE: GType = 0x2008;
pub const GTK_TYPE_SIZE_GROUP: GType = 0x2009;
pub const GTK_TYPE_APPLICATION: GType = 0x200a;

/// How a signal's handlers are called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Marshal {
    /// `void (*)(gpointer instance, gpointer data)`
    Void,
    /// `void (*)(gpointer instance, gpointer arg, gpointer data)`
    Pointer,
    /// `gboolean (*)(gpointer instance, gpointer arg, gpointer data)`,
    /// emission stops at the first handler returning `TRUE`.
    BoolPointer,
}

#[derive(Debug)]
pub(crate) struct SignalDecl {
    pub name: &'static str,
    pub marshal: Marshal,
    pub detailed: bool,
}

#[derive(Debug)]
pub(crate) struct TypeInfo {
    pub ty: GType,
    pub name: &'static CStr,
    pub parent: Option<GType>,
    pub signals: &'static [SignalDecl],
}

const fn signal(name: &'static str, marshal: Marshal) -> SignalDecl {
    SignalDecl {
        name,
        marshal,
        detailed: false,
    }
}

static TYPES: &[TypeInfo] = &[
    TypeInfo {
        ty: G_TYPE_OBJECT,
        name: c"GObject",
        parent: None,
        signals: &[SignalDecl {
            name: "notify",
            marshal: Marshal::Pointer,
            detailed: true,
        }],
    },
    TypeInfo {
        ty: G_TYPE_INITIALLY_UNOWNED,
        name: c"GInitiallyUnowned",
        parent: Some(G_TYPE_OBJECT),
        signals: &[],
    },
    TypeInfo {
        ty: G_TYPE_APPLICATION,
        name: c"GApplication",
        parent: Some(G_TYPE_OBJECT),
        signals: &[
            signal("startup", Marshal::Void),
            signal("activate", Marshal::Void),
            signal("shutdown", Marshal::Void),
        ],
    },
    TypeInfo {
        ty: GTK_TYPE_APPLICATION,
        name: c"GtkApplication",
        parent: Some(G_TYPE_APPLICATION),
        signals: &[],
    },
    TypeInfo {
        ty: GTK_TYPE_WIDGET,
        name: c"GtkWidget",
        parent: Some(G_TYPE_INITIALLY_UNOWNED),
        signals: &[
            signal("destroy", Marshal::Void),
            signal("show", Marshal::Void),
            signal("hide", Marshal::Void),
        ],
    },
    TypeInfo {
        ty: GTK_TYPE_CONTAINER,
        name: c"GtkContainer",
        parent: Some(GTK_TYPE_WIDGET),
        signals: &[signal("add", Marshal::Pointer), signal("remove", Marshal::Pointer)],
    },
    TypeInfo {
        ty: GTK_TYPE_BIN,
        name: c"GtkBin",
        parent: Some(GTK_TYPE_CONTAINER),
        signals: &[],
    },
    TypeInfo {
        ty: GTK_TYPE_WINDOW,
        name: c"GtkWindow",
        parent: Some(GTK_TYPE_BIN),
        signals: &[signal("delete-event", Marshal::BoolPointer)],
    },
    TypeInfo {
        ty: GTK_TYPE_BUTTON,
        name: c"GtkButton",
        parent: Some(GTK_TYPE_BIN),
        signals: &[signal("clicked", Marshal::Void)],
    },
    TypeInfo {
        ty: GTK_TYPE_MENU_ITEM,
        name: c"GtkMenuItem",
        parent: Some(GTK_TYPE_BIN),
        signals: &[signal("activate", Marshal::Void)],
    },
    TypeInfo {
        ty: GTK_TYPE_BOX,
        name: c"GtkBox",
        parent: Some(GTK_TYPE_CONTAINER),
        signals: &[],
    },
    TypeInfo {
        ty: GTK_TYPE_LABEL,
        name: c"GtkLabel",
        parent: Some(GTK_TYPE_WIDGET),
        signals: &[],
    },
    TypeInfo {
        ty: GTK_TYPE_IMAGE,
        name: c"GtkImage",
        parent: Some(GTK_TYPE_WIDGET),
        signals: &[],
    },
    TypeInfo {
        ty: GTK_TYPE_SIZE_GROUP,
        name: c"GtkSizeGroup",
        parent: Some(G_TYPE_OBJECT),
        signals: &[],
    },
];

pub(crate) fn info(ty: GType) -> Option<&'static TypeInfo> {
    TYPES.iter().find(|t| t.ty == ty)
}

/// Whether `ty` is `ancestor` or derives from it.
pub(crate) fn is_a(ty: GType, ancestor: GType) -> bool {
    let mut current = Some(ty);
    while let Some(t) = current {
        if t == ancestor {
            return true;
        }
        current = info(t).and_then(|i| i.parent);
    }
    false
}

/// Look a signal up on `ty` and its ancestors. `name` must be canonical.
pub(crate) fn find_signal(ty: GType, name: &str) -> Option<&'static SignalDecl> {
    let mut current = info(ty);
    while let Some(t) = current {
        if let Some(decl) = t.signals.iter().find(|s| s.name == name) {
            return Some(decl);
        }
        current = t.parent.and_then(info);
    }
    None
}

/// Split `"notify::label"` into `("notify", Some("label"))` and canonicalise
/// underscores to dashes in the signal name.
pub(crate) fn parse_detailed_signal(detailed: &str) -> Option<(String, Option<&str>)> {
    let (name, detail) = match detailed.split_once("::") {
        Some((name, detail)) => (name, Some(detail)),
        None => (detailed, None),
    };
    if name.is_empty() || detail.is_some_and(str::is_empty) {
        return None;
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }
    Some((name.replace('_', "-"), detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy() {
        assert!(is_a(GTK_TYPE_WINDOW, GTK_TYPE_BIN));
        assert!(is_a(GTK_TYPE_WINDOW, G_TYPE_INITIALLY_UNOWNED));
        assert!(is_a(GTK_TYPE_BUTTON, G_TYPE_OBJECT));
        assert!(!is_a(GTK_TYPE_LABEL, GTK_TYPE_CONTAINER));
        assert!(!is_a(GTK_TYPE_SIZE_GROUP, G_TYPE_INITIALLY_UNOWNED));
    }

    #[test]
    fn test_signal_lookup_walks_parents() {
        assert_eq!(find_signal(GTK_TYPE_BUTTON, "destroy").unwrap().marshal, Marshal::Void);
        assert_eq!(find_signal(GTK_TYPE_WINDOW, "add").unwrap().marshal, Marshal::Pointer);
        assert!(find_signal(GTK_TYPE_LABEL, "clicked").is_none());
        assert!(find_signal(GTK_TYPE_APPLICATION, "notify").unwrap().detailed);
    }

    #[test]
    fn test_parse_detailed_signal() {
        assert_eq!(
            parse_detailed_signal("notify::label"),
            Some(("notify".to_string(), Some("label")))
        );
        assert_eq!(
            parse_detailed_signal("delete_event"),
            Some(("delete-event".to_string(), None))
        );
        assert_eq!(parse_detailed_signal("notify::"), None);
        assert_eq!(parse_detailed_signal(""), None);
        assert_eq!(parse_detailed_signal("bad name"), None);
    }
}
