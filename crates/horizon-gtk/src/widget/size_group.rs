use horizon_gtk_sys as ffi;

use crate::enums::SizeGroupMode;
use crate::handle::{self, IsA, Owned, WidgetSList, facade};
use crate::toolkit::api;
use crate::widget::base::raw;
use crate::{Object, Widget};

facade! {
    /// Makes its member widgets request the same size (`GtkSizeGroup`).
    ///
    /// A size group is not a widget and does not keep its members alive.
    pub struct SizeGroup(ffi::GtkSizeGroup);
    type_name = "GtkSizeGroup";
    static_type = (api().gtk_size_group_get_type)();
    is_a = [Object];
}

impl SizeGroup {
    pub fn new(mode: SizeGroupMode) -> Owned<Self> {
        // SAFETY: the new group's reference is ours.
        unsafe { handle::construct::<Self>((api().gtk_size_group_new)(mode.into_glib()), "gtk_size_group_new") }
    }

    pub fn set_mode(&self, mode: SizeGroupMode) {
        // SAFETY: the group is live for the call.
        unsafe { (api().gtk_size_group_set_mode)(self.ptr.as_ptr(), mode.into_glib()) }
    }

    pub fn mode(&self) -> SizeGroupMode {
        // SAFETY: the group is live for the call.
        SizeGroupMode::from_glib(unsafe { (api().gtk_size_group_get_mode)(self.ptr.as_ptr()) })
    }

    /// Add a member. Adding a member twice has no effect.
    pub fn add_widget(&self, widget: &impl IsA<Widget>) {
        // SAFETY: both instances are live for the call.
        unsafe { (api().gtk_size_group_add_widget)(self.ptr.as_ptr(), raw(widget)) }
    }

    /// Remove a member. Removing a non-member logs a toolkit warning.
    pub fn remove_widget(&self, widget: &impl IsA<Widget>) {
        // SAFETY: both instances are live for the call.
        unsafe { (api().gtk_size_group_remove_widget)(self.ptr.as_ptr(), raw(widget)) }
    }

    /// The current members.
    ///
    /// The view holds a reference on each member until it is dropped.
    pub fn widgets(&self) -> WidgetSList<'_> {
        // SAFETY: the list is owned by the group, which outlives the view.
        unsafe { WidgetSList::from_raw((api().gtk_size_group_get_widgets)(self.ptr.as_ptr())) }
    }
}

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::{Button, Label, Toolkit, ToolkitConfig};
    use horizon_gtk_sys::headless;

    #[test]
    fn test_membership() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let group = SizeGroup::new(SizeGroupMode::Horizontal);
        assert_eq!(group.mode(), SizeGroupMode::Horizontal);
        group.set_mode(SizeGroupMode::Both);
        assert_eq!(group.mode(), SizeGroupMode::Both);

        let button = Button::new();
        let label = Label::new("l").unwrap();
        group.add_widget(&*button);
        group.add_widget(&*label);
        group.add_widget(&*button);

        let members = group.widgets();
        assert_eq!(members.len(), 2);
        let names: Vec<_> = members.iter().map(|w| w.type_name()).collect();
        assert_eq!(names, ["GtkButton", "GtkLabel"]);
        assert_eq!(headless::ref_count(button.as_ptr().cast()), Some(2));
        drop(members);
        assert_eq!(headless::ref_count(button.as_ptr().cast()), Some(1));

        group.remove_widget(&*button);
        assert_eq!(group.widgets().len(), 1);
        let warnings = headless::warning_count();
        group.remove_widget(&*button);
        assert_eq!(headless::warning_count(), warnings + 1);
    }

    #[test]
    fn test_destroyed_member_leaves_group() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let group = SizeGroup::new(SizeGroupMode::Vertical);
        let button = Button::new();
        group.add_widget(&*button);
        button.destroy();
        assert!(group.widgets().is_empty());
    }

    #[test]
    fn test_member_view_outlives_dropped_member() {
        let _tk = Toolkit::init(&ToolkitConfig::headless()).unwrap();
        let group = SizeGroup::new(SizeGroupMode::Both);
        let label = Label::new("kept by view").unwrap();
        let ptr = label.as_ptr();
        group.add_widget(&*label);

        let members = group.widgets();
        drop(label);
        assert_eq!(headless::ref_count(ptr.cast()), Some(1));

        let warnings = headless::warning_count();
        let member = members.iter().next().unwrap();
        member.show();
        assert!(member.is_visible());
        assert_eq!(member.downcast_ref::<Label>().unwrap().text(), "kept by view");
        assert_eq!(headless::warning_count(), warnings);

        drop(members);
        assert_eq!(headless::ref_count(ptr.cast()), None);
        assert!(group.widgets().is_empty());
    }
}
