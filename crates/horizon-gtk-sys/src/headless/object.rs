//! Instances, reference counts and the widget tree.

use std::collections::HashMap;
use std::ffi::CString;

use super::World;
use super::signal::PendingNotify;
use super::types::{self, G_TYPE_INITIALLY_UNOWNED};
use crate::types::{GSList, GType, GTypeInstance, gpointer};

/// The memory an instance pointer refers to.
///
/// Only its address is used as the instance's identity; the toolkit state
/// lives in [`Instance`].
#[repr(C)]
pub(crate) struct InstanceHeader {
    pub g_type_instance: GTypeInstance,
    pub g_type: GType,
}

/// A property value.
///
/// `Object` values hold a strong reference to the target instance, released
/// when the value is replaced or the owner is finalised.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Str(Option<CString>),
    Object(Option<usize>),
}

/// Nodes of a `GSList` owned by an instance and handed out by pointer.
#[derive(Default)]
pub(crate) struct OwnedSList {
    nodes: Vec<Box<GSList>>,
}

impl OwnedSList {
    pub fn rebuild(&mut self, items: &[usize]) {
        self.nodes = items
            .iter()
            .map(|&addr| {
                Box::new(GSList {
                    data: addr as gpointer,
                    next: std::ptr::null_mut(),
                })
            })
            .collect();
        for i in (1..self.nodes.len()).rev() {
            let next: *mut GSList = &mut *self.nodes[i];
            self.nodes[i - 1].next = next;
        }
    }

    pub fn head(&mut self) -> *mut GSList {
        self.nodes
            .first_mut()
            .map_or(std::ptr::null_mut(), |node| &mut **node as *mut GSList)
    }
}

pub(crate) struct Instance {
    pub ty: GType,
    pub ref_count: u32,
    pub floating: bool,
    pub props: HashMap<&'static str, Value>,
    pub handlers: Vec<super::signal::HandlerKey>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Size groups a widget belongs to.
    pub size_groups: Vec<usize>,
    /// Widgets in a size group, in insertion order.
    pub members: Vec<usize>,
    pub member_list: OwnedSList,
    pub in_destruction: bool,
    pub destroyed: bool,
    header: *mut InstanceHeader,
}

impl Instance {
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    pub fn bool_prop(&self, name: &str) -> bool {
        matches!(self.props.get(name), Some(Value::Bool(true)))
    }

    pub fn int_prop(&self, name: &str) -> i32 {
        match self.props.get(name) {
            Some(Value::Int(v)) => *v,
            _ => 0,
        }
    }

    pub fn uint_prop(&self, name: &str) -> u32 {
        match self.props.get(name) {
            Some(Value::UInt(v)) => *v,
            _ => 0,
        }
    }

    /// Pointer to a string property, valid until the property changes.
    pub fn str_prop(&self, name: &str) -> *const std::ffi::c_char {
        match self.props.get(name) {
            Some(Value::Str(Some(s))) => s.as_ptr(),
            _ => std::ptr::null(),
        }
    }

    pub fn object_prop(&self, name: &str) -> Option<usize> {
        match self.props.get(name) {
            Some(Value::Object(target)) => *target,
            _ => None,
        }
    }
}

/// Work left over after an instance's last reference is dropped.
///
/// Runs outside the world borrow because destroy notifies re-enter the ABI.
pub(crate) struct Finalized {
    pub notifies: Vec<PendingNotify>,
    pub release: Vec<usize>,
    header: *mut InstanceHeader,
}

impl Finalized {
    /// Free the instance memory. The address may be reused afterwards.
    pub fn free_header(&mut self) {
        if !self.header.is_null() {
            // SAFETY: allocated by `World::create` and freed only here.
            drop(unsafe { Box::from_raw(self.header) });
            self.header = std::ptr::null_mut();
        }
    }
}

impl World {
    /// Allocate an instance with one reference (floating for initially
    /// unowned types) and default properties.
    pub fn create(&mut self, ty: GType, props: &[(&'static str, Value)]) -> usize {
        let header = Box::into_raw(Box::new(InstanceHeader {
            g_type_instance: GTypeInstance {
                g_class: std::ptr::null_mut(),
            },
            g_type: ty,
        }));
        let addr = header as usize;
        let instance = Instance {
            ty,
            ref_count: 1,
            floating: types::is_a(ty, G_TYPE_INITIALLY_UNOWNED),
            props: props.iter().cloned().collect(),
            handlers: Vec::new(),
            parent: None,
            children: Vec::new(),
            size_groups: Vec::new(),
            members: Vec::new(),
            member_list: OwnedSList::default(),
            in_destruction: false,
            destroyed: false,
            header,
        };
        self.objects.insert(addr, instance);
        tracing::trace!(
            target: super::TARGET,
            addr = ?(addr as *const u8),
            type_name = ?types::info(ty).map(|i| i.name),
            "created instance"
        );
        addr
    }

    pub fn instance(&self, addr: usize) -> Option<&Instance> {
        self.objects.get(&addr)
    }

    pub fn instance_mut(&mut self, addr: usize) -> Option<&mut Instance> {
        self.objects.get_mut(&addr)
    }

    pub fn type_of(&self, addr: usize) -> Option<GType> {
        self.objects.get(&addr).map(|i| i.ty)
    }

    pub fn is_instance_of(&self, addr: usize, ancestor: GType) -> bool {
        self.type_of(addr).is_some_and(|ty| types::is_a(ty, ancestor))
    }

    /// Replace a property. Returns whether the stored value changed and, for
    /// object values, the reference the old value held.
    pub fn set_prop(&mut self, addr: usize, name: &'static str, value: Value) -> (bool, Option<usize>) {
        let Some(instance) = self.objects.get_mut(&addr) else {
            return (false, None);
        };
        if instance.props.get(name) == Some(&value) {
            return (false, None);
        }
        let old = instance.props.insert(name, value);
        let released = match old {
            Some(Value::Object(target)) => target,
            _ => None,
        };
        (true, released)
    }

    pub fn add_ref(&mut self, addr: usize) -> bool {
        match self.objects.get_mut(&addr) {
            Some(instance) => {
                instance.ref_count += 1;
                true
            }
            None => false,
        }
    }

    /// Sink a floating reference, or add a reference if not floating.
    pub fn ref_sink(&mut self, addr: usize) -> bool {
        match self.objects.get_mut(&addr) {
            Some(instance) if instance.floating => {
                instance.floating = false;
                true
            }
            Some(instance) => {
                instance.ref_count += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one reference. Returns `Some` when it was the last one.
    pub fn drop_ref(&mut self, addr: usize) -> Option<Finalized> {
        let instance = self.objects.get_mut(&addr)?;
        instance.ref_count = instance.ref_count.saturating_sub(1);
        if instance.ref_count > 0 {
            return None;
        }
        Some(self.finalize(addr))
    }

    fn finalize(&mut self, addr: usize) -> Finalized {
        let Some(instance) = self.objects.remove(&addr) else {
            return Finalized {
                notifies: Vec::new(),
                release: Vec::new(),
                header: std::ptr::null_mut(),
            };
        };
        tracing::trace!(target: super::TARGET, addr = ?(addr as *const u8), "finalizing instance");

        let mut notifies = Vec::new();
        for &key in &instance.handlers {
            if let Some(handler) = self.handlers.remove(key) {
                notifies.extend(self.release_handler(key, handler));
            }
        }

        let mut release = Vec::new();
        for &child in &instance.children {
            if let Some(c) = self.objects.get_mut(&child) {
                c.parent = None;
            }
            release.push(child);
        }
        for value in instance.props.values() {
            if let Value::Object(Some(target)) = value {
                release.push(*target);
            }
        }
        if let Some(parent) = instance.parent {
            if let Some(p) = self.objects.get_mut(&parent) {
                p.children.retain(|&c| c != addr);
            }
        }
        for &group in &instance.size_groups {
            self.remove_member(group, addr);
        }
        for &member in &instance.members {
            if let Some(m) = self.objects.get_mut(&member) {
                m.size_groups.retain(|&g| g != addr);
            }
        }
        self.toplevels.retain(|&t| t != addr);

        Finalized {
            notifies,
            release,
            header: instance.header,
        }
    }

    /// Attach `child` under `parent`. The caller has already taken the
    /// parent's reference on the child.
    pub fn attach(&mut self, parent: usize, child: usize) {
        if let Some(c) = self.objects.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children.push(child);
        }
    }

    /// Detach `child` from `parent`. Returns whether it was attached; the
    /// caller then owes one unref on the child.
    pub fn detach(&mut self, parent: usize, child: usize) -> bool {
        let attached = self
            .objects
            .get(&child)
            .is_some_and(|c| c.parent == Some(parent));
        if !attached {
            return false;
        }
        if let Some(c) = self.objects.get_mut(&child) {
            c.parent = None;
        }
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children.retain(|&c| c != child);
        }
        true
    }

    pub fn parent_of(&self, addr: usize) -> Option<usize> {
        self.objects.get(&addr).and_then(|i| i.parent)
    }

    pub fn children_of(&self, addr: usize) -> Vec<usize> {
        self.objects
            .get(&addr)
            .map(|i| i.children.clone())
            .unwrap_or_default()
    }

    pub fn add_member(&mut self, group: usize, widget: usize) -> bool {
        let Some(g) = self.objects.get_mut(&group) else {
            return false;
        };
        if g.members.contains(&widget) {
            return false;
        }
        g.members.push(widget);
        let members = g.members.clone();
        g.member_list.rebuild(&members);
        if let Some(w) = self.objects.get_mut(&widget) {
            w.size_groups.push(group);
        }
        true
    }

    pub fn remove_member(&mut self, group: usize, widget: usize) -> bool {
        let Some(g) = self.objects.get_mut(&group) else {
            return false;
        };
        let before = g.members.len();
        g.members.retain(|&m| m != widget);
        if g.members.len() == before {
            return false;
        }
        let members = g.members.clone();
        g.member_list.rebuild(&members);
        if let Some(w) = self.objects.get_mut(&widget) {
            w.size_groups.retain(|&s| s != group);
        }
        true
    }

    /// Drop `addr` from every size group it belongs to.
    pub fn leave_size_groups(&mut self, addr: usize) {
        let groups = self
            .objects
            .get(&addr)
            .map(|i| i.size_groups.clone())
            .unwrap_or_default();
        for group in groups {
            self.remove_member(group, addr);
        }
    }
}
