//! Handle ownership and the static type hierarchy.
//!
//! A facade (such as [`Button`](crate::Button)) is a view of one native
//! object and never counts references. Ownership lives in two wrappers:
//!
//! - [`Owned<T>`] holds one strong reference. [`Owned::release`] consumes the
//!   handle, so releasing twice does not compile; dropping an unreleased
//!   handle releases it.
//! - [`Borrowed<'a, T>`] wraps a pointer someone else keeps alive. It is
//!   `Copy`, has no `release`, and cannot outlive `'a`.
//!
//! Both dereference to the facade, so `Owned<Button>` and
//! `Borrowed<'_, Button>` expose the same methods.
//!
//! ```compile_fail
//! use horizon_gtk::{Borrowed, Button};
//!
//! fn drop_it(button: Borrowed<'_, Button>) {
//!     // A borrowed view has no release.
//!     button.release();
//! }
//! ```
//!
//! ```compile_fail
//! use horizon_gtk::{Button, Owned};
//!
//! fn twice(button: Owned<Button>) {
//!     button.release();
//!     button.release();
//! }
//! ```
//!
//! The hierarchy is declared with [`IsA`]: `Button: IsA<Widget>` lets any
//! `&Button` be used where a widget is expected. [`Cast::upcast_ref`] is
//! checked at compile time, [`Cast::downcast_ref`] at run time against the
//! toolkit's type system.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::ptr::NonNull;

use horizon_gtk_sys as ffi;
use horizon_gtk_sys::{GFALSE, GType};

use crate::logging::targets;
use crate::thread_check::ThreadAffinity;
use crate::toolkit::api;

/// A facade over a native object type.
///
/// # Safety
///
/// Implementors must be `#[repr(transparent)]` over a `NonNull<Self::Native>`
/// (plus zero-sized markers), and `Self::Native` must be the C instance
/// struct of the type `static_type` returns.
pub unsafe trait ObjectType: Sized + 'static {
    /// The C instance struct.
    type Native;

    /// The toolkit's name for the type.
    const NAME: &'static str;

    /// The toolkit type id.
    fn static_type() -> GType;

    fn as_ptr(&self) -> *mut Self::Native;

    /// The instance as a `GObject` pointer.
    fn as_object_ptr(&self) -> NonNull<ffi::GObject> {
        // SAFETY: facades always wrap a non-null pointer.
        unsafe { NonNull::new_unchecked(self.as_ptr().cast()) }
    }
}

/// `Self` is a `T`, statically.
///
/// # Safety
///
/// Every instance of `Self` must be an instance of `T` in the toolkit's type
/// system.
pub unsafe trait IsA<T: ObjectType>: ObjectType {}

/// Conversions along the hierarchy.
pub trait Cast: ObjectType {
    /// View `self` as an ancestor type.
    fn upcast_ref<U: ObjectType>(&self) -> &U
    where
        Self: IsA<U>,
    {
        // SAFETY: both facades are a single non-null pointer and the
        // instance is a `U` by `IsA`.
        unsafe { &*(self as *const Self as *const U) }
    }

    /// Whether the instance is a `U` (or derives from it).
    fn is<U: ObjectType>(&self) -> bool {
        // SAFETY: the pointer is a live instance.
        unsafe {
            (api().g_type_check_instance_is_a)(self.as_ptr().cast(), U::static_type()) != GFALSE
        }
    }

    /// View `self` as `U` if the instance is one.
    fn downcast_ref<U: ObjectType>(&self) -> Option<&U> {
        if self.is::<U>() {
            // SAFETY: checked above; same layout as in `upcast_ref`.
            Some(unsafe { &*(self as *const Self as *const U) })
        } else {
            None
        }
    }
}

impl<T: ObjectType> Cast for T {}

/// Declare a facade type, its toolkit type and its ancestors.
macro_rules! facade {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($native:ty);
        type_name = $type_name:literal;
        static_type = $static_type:expr;
        is_a = [$($parent:ident),* $(,)?];
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        pub struct $name {
            ptr: ::std::ptr::NonNull<$native>,
            _not_send: ::std::marker::PhantomData<*mut ()>,
        }

        unsafe impl $crate::handle::ObjectType for $name {
            type Native = $native;
            const NAME: &'static str = $type_name;

            fn static_type() -> ::horizon_gtk_sys::GType {
                #[allow(unused_unsafe)]
                // SAFETY: type getters have no preconditions.
                unsafe {
                    $static_type
                }
            }

            #[inline]
            fn as_ptr(&self) -> *mut $native {
                self.ptr.as_ptr()
            }
        }

        unsafe impl $crate::handle::IsA<$name> for $name {}
        $(unsafe impl $crate::handle::IsA<$parent> for $name {})*

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({:p})", $type_name, self.ptr)
            }
        }
    };
}
pub(crate) use facade;

/// View a pointer slot as the facade stored in it.
///
/// # Safety
///
/// `ptr` must point at a live instance of `T`.
#[inline]
unsafe fn facade_ref<T: ObjectType>(ptr: &NonNull<T::Native>) -> &T {
    // SAFETY: `T` is `repr(transparent)` over `NonNull<T::Native>`.
    unsafe { &*(ptr as *const NonNull<T::Native> as *const T) }
}

/// One strong reference to a native object.
pub struct Owned<T: ObjectType> {
    ptr: NonNull<T::Native>,
    affinity: ThreadAffinity,
    _marker: PhantomData<T>,
}

impl<T: ObjectType> Owned<T> {
    /// Adopt a reference transferred to the caller.
    ///
    /// A floating reference (what widget constructors return) is sunk and
    /// becomes the adopted reference.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live instance of `T` carrying a reference the
    /// caller owns.
    pub unsafe fn from_raw_full(ptr: *mut T::Native) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        let api = api();
        // SAFETY: `ptr` is live by the caller's contract.
        unsafe {
            if (api.g_object_is_floating)(ptr.as_ptr().cast()) != GFALSE {
                (api.g_object_ref_sink)(ptr.as_ptr().cast());
            }
        }
        tracing::trace!(target: targets::HANDLE, ty = T::NAME, ptr = ?ptr, "adopted reference");
        Some(Self::wrap(ptr))
    }

    /// Take a new reference on an object someone else owns.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live instance of `T`.
    pub unsafe fn from_raw_none(ptr: *mut T::Native) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        // SAFETY: `ptr` is live by the caller's contract.
        unsafe { (api().g_object_ref_sink)(ptr.as_ptr().cast()) };
        tracing::trace!(target: targets::HANDLE, ty = T::NAME, ptr = ?ptr, "took reference");
        Some(Self::wrap(ptr))
    }

    /// Take a new reference on a live instance.
    pub(crate) fn from_instance(this: &T) -> Self {
        // SAFETY: `this` is a live instance for the call.
        unsafe { (api().g_object_ref_sink)(this.as_ptr().cast()) };
        // SAFETY: facades wrap non-null pointers.
        Self::wrap(unsafe { NonNull::new_unchecked(this.as_ptr()) })
    }

    fn wrap(ptr: NonNull<T::Native>) -> Self {
        Self {
            ptr,
            affinity: ThreadAffinity::current(),
            _marker: PhantomData,
        }
    }

    /// Drop this reference now.
    ///
    /// Consumes the handle: a released handle cannot be used or released
    /// again. Equivalent to dropping it.
    pub fn release(self) {
        drop(self);
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut T::Native {
        self.ptr.as_ptr()
    }

    /// Give up the reference without releasing it.
    pub fn into_raw(self) -> *mut T::Native {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }

    /// A `Copy` view that borrows this handle.
    pub fn borrow(&self) -> Borrowed<'_, T> {
        Borrowed {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Convert into an owned handle of an ancestor type.
    pub fn upcast<U: ObjectType>(self) -> Owned<U>
    where
        T: IsA<U>,
    {
        let affinity = self.affinity;
        let ptr = self.into_raw();
        Owned {
            // SAFETY: `into_raw` of a non-null handle.
            ptr: unsafe { NonNull::new_unchecked(ptr.cast()) },
            affinity,
            _marker: PhantomData,
        }
    }

    /// Convert into an owned handle of `U` if the instance is one.
    pub fn downcast<U: ObjectType>(self) -> Result<Owned<U>, Self> {
        if !(*self).is::<U>() {
            return Err(self);
        }
        let affinity = self.affinity;
        let ptr = self.into_raw();
        Ok(Owned {
            // SAFETY: `into_raw` of a non-null handle.
            ptr: unsafe { NonNull::new_unchecked(ptr.cast()) },
            affinity,
            _marker: PhantomData,
        })
    }

    /// Whether both handles refer to the same instance.
    pub fn ptr_eq<U: ObjectType>(&self, other: &U) -> bool {
        self.as_object_ptr() == other.as_object_ptr()
    }
}

impl<T: ObjectType> Deref for Owned<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the handle keeps the instance alive.
        unsafe { facade_ref(&self.ptr) }
    }
}

impl<T: ObjectType> Clone for Owned<T> {
    /// Take another strong reference.
    fn clone(&self) -> Self {
        // SAFETY: the instance is alive while `self` is.
        unsafe { (api().g_object_ref)(self.ptr.as_ptr().cast()) };
        Self::wrap(self.ptr)
    }
}

impl<T: ObjectType> Drop for Owned<T> {
    fn drop(&mut self) {
        self.affinity.check();
        tracing::trace!(target: targets::HANDLE, ty = T::NAME, ptr = ?self.ptr, "released reference");
        // SAFETY: releases the reference this handle owns.
        unsafe { (api().g_object_unref)(self.ptr.as_ptr().cast()) };
    }
}

impl<T: ObjectType> PartialEq for Owned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T: ObjectType> Eq for Owned<T> {}

impl<T: ObjectType + fmt::Debug> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&**self).finish()
    }
}

/// A view of an object kept alive by someone else.
pub struct Borrowed<'a, T: ObjectType> {
    ptr: NonNull<T::Native>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: ObjectType> Borrowed<'a, T> {
    /// Wrap a pointer without taking a reference.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a live instance of `T` that stays alive for
    /// `'a`.
    pub unsafe fn from_raw(ptr: *mut T::Native) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self {
            ptr,
            _marker: PhantomData,
        })
    }

    /// Take a strong reference to the viewed object.
    pub fn to_owned_handle(&self) -> Owned<T> {
        // SAFETY: the instance is alive for `'a`.
        unsafe { (api().g_object_ref_sink)(self.ptr.as_ptr().cast()) };
        Owned::wrap(self.ptr)
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut T::Native {
        self.ptr.as_ptr()
    }
}

impl<T: ObjectType> Clone for Borrowed<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ObjectType> Copy for Borrowed<'_, T> {}

impl<T: ObjectType> Deref for Borrowed<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: alive for `'a` by construction.
        unsafe { facade_ref(&self.ptr) }
    }
}

impl<T: ObjectType + fmt::Debug> fmt::Debug for Borrowed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Borrowed").field(&**self).finish()
    }
}

/// Panic for a constructor that returned null.
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn null_constructor(constructor: &'static str) -> ! {
    tracing::error!(target: targets::HANDLE, constructor, "native constructor returned null");
    panic!("{constructor} returned null")
}

/// Wrap the result of a constructor that transfers its reference.
///
/// # Safety
///
/// `ptr` must be null or a new instance of `T` whose reference the caller
/// owns.
#[track_caller]
pub(crate) unsafe fn construct<T: ObjectType>(ptr: *mut T::Native, constructor: &'static str) -> Owned<T> {
    // SAFETY: forwarded to the caller.
    match unsafe { Owned::from_raw_full(ptr) } {
        Some(owned) => owned,
        None => null_constructor(constructor),
    }
}

/// Walk a `GList` or `GSList` and take a reference on every widget in it.
///
/// # Safety
///
/// `head` must be null or a valid list whose `data` fields are null or live
/// widgets. `next` reads the successor of a node.
unsafe fn reference_nodes<N>(
    mut node: *mut N,
    next: impl Fn(&N) -> (*mut N, ffi::gpointer),
) -> Vec<Owned<crate::Widget>> {
    let mut widgets = Vec::new();
    while !node.is_null() {
        // SAFETY: `node` is a valid list node by the caller's contract.
        let (following, data) = next(unsafe { &*node });
        // SAFETY: `data` is null or a live widget.
        widgets.extend(unsafe { Owned::from_raw_none(data.cast()) });
        node = following;
    }
    widgets
}

/// Children of a container, as taken by [`ContainerExt::children`].
///
/// Holds a strong reference on every child, so entries stay alive after the
/// container drops or removes them. The list nodes the toolkit hands over
/// are freed as soon as the references are taken.
///
/// [`ContainerExt::children`]: crate::prelude::ContainerExt::children
pub struct WidgetList {
    widgets: Vec<Owned<crate::Widget>>,
}

impl WidgetList {
    /// # Safety
    ///
    /// `head` must be null or a list of live widgets whose nodes (not
    /// entries) are owned by the caller.
    pub(crate) unsafe fn from_raw(head: *mut ffi::GList) -> Self {
        // SAFETY: forwarded to the caller.
        let widgets = unsafe { reference_nodes(head, |node| (node.next, node.data)) };
        if !head.is_null() {
            // SAFETY: the nodes were transferred to us; the entries are
            // referenced above.
            unsafe { (api().g_list_free)(head) };
        }
        Self { widgets }
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> WidgetListIter<'_> {
        WidgetListIter {
            inner: self.widgets.iter(),
        }
    }

    /// New strong references to every child.
    pub fn to_owned_vec(&self) -> Vec<Owned<crate::Widget>> {
        self.widgets.clone()
    }

    /// Take the list's references.
    pub fn into_vec(self) -> Vec<Owned<crate::Widget>> {
        self.widgets
    }

    /// Drop every reference now.
    pub fn release(self) {
        drop(self);
    }
}

impl fmt::Debug for WidgetList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a WidgetList {
    type Item = Borrowed<'a, crate::Widget>;
    type IntoIter = WidgetListIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`WidgetList`].
pub struct WidgetListIter<'a> {
    inner: std::slice::Iter<'a, Owned<crate::Widget>>,
}

impl<'a> Iterator for WidgetListIter<'a> {
    type Item = Borrowed<'a, crate::Widget>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Owned::borrow)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for WidgetListIter<'_> {}

/// Members of a size group, read from the list the group owns.
///
/// The group's list is never freed here, and the group does not keep its
/// members alive: the view takes its own reference on each member when it
/// is created and drops them with the view. Later membership changes are
/// not reflected.
pub struct WidgetSList<'a> {
    widgets: Vec<Owned<crate::Widget>>,
    _marker: PhantomData<&'a crate::SizeGroup>,
}

impl<'a> WidgetSList<'a> {
    /// # Safety
    ///
    /// `head` must be null or a list of live widgets owned by an object
    /// alive for `'a`.
    pub(crate) unsafe fn from_raw(head: *mut ffi::GSList) -> Self {
        Self {
            // SAFETY: forwarded to the caller.
            widgets: unsafe { reference_nodes(head, |node| (node.next, node.data)) },
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Borrowed<'_, crate::Widget>> + '_ {
        self.widgets.iter().map(Owned::borrow)
    }
}

impl fmt::Debug for WidgetSList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

static_assertions::assert_eq_size!(Borrowed<'static, crate::Widget>, *mut ());
static_assertions::assert_not_impl_any!(Owned<crate::Widget>: Send, Sync);
static_assertions::assert_not_impl_any!(Borrowed<'static, crate::Widget>: Send, Sync);
static_assertions::assert_not_impl_any!(crate::Widget: Send, Sync, Clone, Copy);
static_assertions::assert_impl_all!(Borrowed<'static, crate::Widget>: Copy);
static_assertions::assert_not_impl_any!(WidgetList: Send, Sync, Clone);
static_assertions::assert_not_impl_any!(WidgetSList<'static>: Send, Sync, Clone);

#[cfg(all(test, feature = "headless"))]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::{Button, Label, Object, Toolkit, ToolkitConfig, Widget};
    use horizon_gtk_sys::headless;

    fn init() -> Toolkit {
        Toolkit::init(&ToolkitConfig::headless()).unwrap()
    }

    #[test]
    fn test_new_widget_sinks_floating_reference() {
        let _tk = init();
        let button = Button::new();
        assert_eq!(headless::is_floating(button.as_ptr().cast()), Some(false));
        assert_eq!(headless::ref_count(button.as_ptr().cast()), Some(1));
    }

    #[test]
    fn test_release_and_drop_both_finish_cleanly() {
        let _tk = init();
        let before = headless::live_object_count();
        let released = Button::new();
        released.release();
        {
            let _dropped = Label::new("text").unwrap();
        }
        assert_eq!(headless::live_object_count(), before);
    }

    #[test]
    fn test_clone_and_borrow_counts() {
        let _tk = init();
        let button = Button::new();
        let ptr = button.as_ptr().cast();
        let second = button.clone();
        assert_eq!(headless::ref_count(ptr), Some(2));
        let view = button.borrow();
        let copy = view;
        assert_eq!(headless::ref_count(ptr), Some(2));
        let third = copy.to_owned_handle();
        assert_eq!(headless::ref_count(ptr), Some(3));
        drop(third);
        drop(second);
        assert_eq!(headless::ref_count(ptr), Some(1));
        assert_eq!(button, button.clone());
    }

    #[test]
    fn test_upcast_and_downcast() {
        let _tk = init();
        let button = Button::new();
        let widget: &Widget = button.upcast_ref();
        assert!(widget.is::<Button>());
        assert!(widget.downcast_ref::<Label>().is_none());
        assert!(widget.downcast_ref::<Button>().is_some());

        let owned: Owned<Object> = button.upcast();
        let label = owned.downcast::<Label>().unwrap_err();
        let back = label.downcast::<Button>().unwrap();
        assert_eq!(back.type_name(), "GtkButton");
    }

    #[test]
    fn test_two_views_observe_same_state() {
        let _tk = init();
        let label = Label::new("one").unwrap();
        // SAFETY: `label` keeps the instance alive for the view's scope.
        let view = unsafe { Borrowed::<Label>::from_raw(label.as_ptr()) }.unwrap();
        label.set_text("two").unwrap();
        assert_eq!(view.text(), "two");
        view.set_text("three").unwrap();
        assert_eq!(label.text(), "three");
    }

    #[test]
    fn test_null_pointers_are_rejected() {
        let _tk = init();
        assert!(unsafe { Owned::<Button>::from_raw_full(std::ptr::null_mut()) }.is_none());
        assert!(unsafe { Borrowed::<Button>::from_raw(std::ptr::null_mut()) }.is_none());
    }
}
