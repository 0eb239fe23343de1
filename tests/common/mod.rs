//! In-memory `RawStore` used by the integration tests.
//!
//! Models what the facade cares about: handle allocation and reuse, closed
//! handles, per-path permissions, and the native status codes for missing
//! keys, missing values and exhausted enumerations.

#![allow(dead_code)]

use native_reg::{
    Access, CreateKeyOptions, GetValueFlags, Hkey, KeyInfo, OpenKeyOptions, PredefinedKey,
    RawStore, RawValue, Registry, RegistryConfig, Status, StoreResult, ValueType,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// `ERROR_UNSUPPORTED_TYPE`, returned when a path read's type filter rejects a value.
pub const UNSUPPORTED_TYPE: Status = Status(1630);

const FIRST_HANDLE: u32 = 0x100;

#[derive(Debug, Default, Clone)]
struct Node {
    name: String,
    values: Vec<(String, RawValue)>,
}

#[derive(Debug, Clone, Copy)]
struct OpenHandle {
    access: Access,
}

#[derive(Default)]
struct State {
    /// Lowercased full path -> node.
    nodes: BTreeMap<String, Node>,
    /// Open handle -> lowercased path and granted access.
    handles: HashMap<Hkey, (String, OpenHandle)>,
    free: Vec<Hkey>,
    next: u32,
    read_only: Vec<String>,
    hives: HashMap<PathBuf, String>,
    env: HashMap<String, String>,
    calls: usize,
    inflated_counts: bool,
}

pub struct FakeStore {
    state: RefCell<State>,
}

impl FakeStore {
    pub fn new() -> Self {
        let mut state = State {
            next: FIRST_HANDLE,
            ..State::default()
        };
        for root in PredefinedKey::ALL {
            state.nodes.insert(
                root.name().to_lowercase(),
                Node {
                    name: root.name().to_string(),
                    values: Vec::new(),
                },
            );
        }
        Self {
            state: RefCell::new(state),
        }
    }

    /// Makes `path` (and everything below it) readable but not writable.
    pub fn protect(&self, path: &str) {
        self.state.borrow_mut().read_only.push(path.to_lowercase());
    }

    /// Registers a hive file that `load_app_key` can open.
    pub fn add_hive(&self, file: &str) {
        let mut state = self.state.borrow_mut();
        let root = format!("apphive\\{}", state.hives.len());
        state.nodes.insert(
            root.clone(),
            Node {
                name: file.to_string(),
                values: Vec::new(),
            },
        );
        state.hives.insert(PathBuf::from(file), root);
    }

    pub fn set_env(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .env
            .insert(name.to_lowercase(), value.to_string());
    }

    /// Creates a key with its ancestors, bypassing handles.
    pub fn seed_key(&self, path: &str) {
        self.state.borrow_mut().ensure_path(path);
    }

    /// Stores a value directly, bypassing handles.
    pub fn seed_value(&self, path: &str, name: &str, value: RawValue) {
        let mut state = self.state.borrow_mut();
        let key = state.ensure_path(path);
        put_value(state.nodes.get_mut(&key).expect("seeded key"), name, value);
    }

    /// Makes `query_info_key` report `u32::MAX` subkeys and values while
    /// enumeration still returns only the real entries.
    pub fn inflate_counts(&self) {
        self.state.borrow_mut().inflated_counts = true;
    }

    pub fn key_exists(&self, path: &str) -> bool {
        self.state.borrow().nodes.contains_key(&path.to_lowercase())
    }

    pub fn open_handles(&self) -> usize {
        self.state.borrow().handles.len()
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.state.borrow().calls
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.state.borrow_mut();
        state.calls += 1;
        f(&mut state)
    }
}

impl State {
    fn resolve(&self, hkey: Hkey) -> StoreResult<(String, Access)> {
        if let Some(root) = hkey.predefined() {
            return Ok((root.name().to_lowercase(), Access::ALL_ACCESS));
        }
        self.handles
            .get(&hkey)
            .map(|(path, open)| (path.clone(), open.access))
            .ok_or(Status::INVALID_HANDLE)
    }

    fn allocate(&mut self, path: String, access: Access) -> Hkey {
        let hkey = match self.free.pop() {
            Some(hkey) => hkey,
            None => {
                let hkey = Hkey::from_raw(self.next).expect("handle space");
                self.next += 4;
                hkey
            }
        };
        self.handles.insert(hkey, (path, OpenHandle { access }));
        hkey
    }

    fn check_access(&self, path: &str, access: Access) -> StoreResult<()> {
        let protected = self
            .read_only
            .iter()
            .any(|p| path == p || path.starts_with(&format!("{}\\", p)));
        if protected && !Access::READ.contains(access) {
            return Err(Status::ACCESS_DENIED);
        }
        Ok(())
    }

    fn ensure_path(&mut self, path: &str) -> String {
        let mut current = String::new();
        for part in path.split('\\').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('\\');
            }
            current.push_str(&part.to_lowercase());
            self.nodes.entry(current.clone()).or_insert_with(|| Node {
                name: part.to_string(),
                values: Vec::new(),
            });
        }
        current
    }

    fn children(&self, path: &str) -> Vec<String> {
        let prefix = format!("{}\\", path);
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(key, _)| !key[prefix.len()..].contains('\\'))
            .map(|(_, node)| node.name.clone())
            .collect()
    }

    fn subtree(&self, path: &str) -> Vec<String> {
        let prefix = format!("{}\\", path);
        self.nodes
            .keys()
            .filter(|key| *key == path || key.starts_with(&prefix))
            .cloned()
            .collect()
    }

    fn node(&self, path: &str) -> StoreResult<&Node> {
        self.nodes.get(path).ok_or(Status::FILE_NOT_FOUND)
    }

    fn node_mut(&mut self, path: &str) -> StoreResult<&mut Node> {
        self.nodes.get_mut(path).ok_or(Status::FILE_NOT_FOUND)
    }

    fn expand(&self, text: &str) -> String {
        let mut out = String::new();
        let mut parts = text.split('%');
        if let Some(first) = parts.next() {
            out.push_str(first);
        }
        let rest: Vec<&str> = parts.collect();
        let mut i = 0;
        while i < rest.len() {
            if i + 1 < rest.len() {
                match self.env.get(&rest[i].to_lowercase()) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('%');
                        out.push_str(rest[i]);
                        out.push('%');
                    }
                }
                out.push_str(rest[i + 1]);
                i += 2;
            } else {
                out.push('%');
                out.push_str(rest[i]);
                i += 1;
            }
        }
        out
    }
}

fn join(path: &str, sub_key: &str) -> String {
    let sub_key = sub_key.trim_matches('\\').to_lowercase();
    if sub_key.is_empty() {
        path.to_string()
    } else {
        format!("{}\\{}", path, sub_key)
    }
}

fn put_value(node: &mut Node, name: &str, value: RawValue) {
    match node
        .values
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some(slot) => slot.1 = value,
        None => node.values.push((name.to_string(), value)),
    }
}

fn type_bit(value_type: ValueType) -> u32 {
    match value_type {
        ValueType::None => 0x01,
        ValueType::String => 0x02,
        ValueType::ExpandString => 0x04,
        ValueType::Binary => 0x08,
        ValueType::Dword => 0x10,
        ValueType::MultiString => 0x20,
        ValueType::Qword => 0x40,
        _ => 0,
    }
}

fn utf16_units(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

impl RawStore for FakeStore {
    fn create_key(
        &self,
        parent: Hkey,
        sub_key: &str,
        _options: CreateKeyOptions,
        access: Access,
    ) -> StoreResult<Hkey> {
        self.with(|state| {
            let (base, _) = state.resolve(parent)?;
            let path = join(&base, sub_key);
            state.check_access(&path, access)?;
            let mut current = base;
            for part in sub_key.split('\\').filter(|p| !p.is_empty()) {
                current = format!("{}\\{}", current, part.to_lowercase());
                state.nodes.entry(current.clone()).or_insert_with(|| Node {
                    name: part.to_string(),
                    values: Vec::new(),
                });
            }
            Ok(state.allocate(path, access))
        })
    }

    fn open_key(
        &self,
        parent: Hkey,
        sub_key: &str,
        _options: OpenKeyOptions,
        access: Access,
    ) -> StoreResult<Hkey> {
        self.with(|state| {
            let (base, _) = state.resolve(parent)?;
            let path = join(&base, sub_key);
            state.node(&path)?;
            state.check_access(&path, access)?;
            Ok(state.allocate(path, access))
        })
    }

    fn open_current_user(&self, access: Access) -> StoreResult<Hkey> {
        self.with(|state| {
            Ok(state.allocate(PredefinedKey::CurrentUser.name().to_lowercase(), access))
        })
    }

    fn load_app_key(&self, file: &Path, access: Access) -> StoreResult<Hkey> {
        self.with(|state| {
            let root = state.hives.get(file).cloned().ok_or(Status::FILE_NOT_FOUND)?;
            Ok(state.allocate(root, access))
        })
    }

    fn query_info_key(&self, hkey: Hkey) -> StoreResult<KeyInfo> {
        self.with(|state| {
            let (path, _) = state.resolve(hkey)?;
            let children = state.children(&path);
            let node = state.node(&path)?;
            if state.inflated_counts {
                return Ok(KeyInfo {
                    subkey_count: u32::MAX,
                    max_subkey_name_len: u32::MAX,
                    value_count: u32::MAX,
                    max_value_name_len: u32::MAX,
                });
            }
            Ok(KeyInfo {
                subkey_count: children.len() as u32,
                max_subkey_name_len: children
                    .iter()
                    .map(|c| c.encode_utf16().count() as u32)
                    .max()
                    .unwrap_or(0),
                value_count: node.values.len() as u32,
                max_value_name_len: node
                    .values
                    .iter()
                    .map(|(n, _)| n.encode_utf16().count() as u32)
                    .max()
                    .unwrap_or(0),
            })
        })
    }

    fn enum_key(&self, hkey: Hkey, index: u32) -> StoreResult<String> {
        self.with(|state| {
            let (path, _) = state.resolve(hkey)?;
            state
                .children(&path)
                .into_iter()
                .nth(index as usize)
                .ok_or(Status::NO_MORE_ITEMS)
        })
    }

    fn enum_value(&self, hkey: Hkey, index: u32) -> StoreResult<String> {
        self.with(|state| {
            let (path, _) = state.resolve(hkey)?;
            state
                .node(&path)?
                .values
                .get(index as usize)
                .map(|(name, _)| name.clone())
                .ok_or(Status::NO_MORE_ITEMS)
        })
    }

    fn query_value(&self, hkey: Hkey, value_name: &str) -> StoreResult<RawValue> {
        self.with(|state| {
            let (path, _) = state.resolve(hkey)?;
            state
                .node(&path)?
                .values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(value_name))
                .map(|(_, value)| value.clone())
                .ok_or(Status::FILE_NOT_FOUND)
        })
    }

    fn get_value(
        &self,
        hkey: Hkey,
        sub_key: &str,
        value_name: &str,
        flags: GetValueFlags,
    ) -> StoreResult<RawValue> {
        self.with(|state| {
            if !flags.intersects(GetValueFlags::RT_ANY) {
                return Err(Status::INVALID_PARAMETER);
            }
            let (base, _) = state.resolve(hkey)?;
            let path = join(&base, sub_key);
            let value = state
                .node(&path)?
                .values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(value_name))
                .map(|(_, value)| value.clone())
                .ok_or(Status::FILE_NOT_FOUND)?;
            if value.value_type() == ValueType::ExpandString
                && !flags.contains(GetValueFlags::NO_EXPAND)
            {
                let expanded = state.expand(&utf16_units(value.data()));
                let mut data: Vec<u8> = expanded
                    .encode_utf16()
                    .flat_map(|u| u.to_le_bytes())
                    .collect();
                data.extend([0, 0]);
                if flags.bits() & type_bit(ValueType::String) == 0 {
                    return Err(UNSUPPORTED_TYPE);
                }
                return Ok(RawValue::new(ValueType::String, data));
            }
            if flags.bits() & type_bit(value.value_type()) == 0 {
                return Err(UNSUPPORTED_TYPE);
            }
            Ok(value)
        })
    }

    fn set_value(
        &self,
        hkey: Hkey,
        value_name: &str,
        value_type: ValueType,
        data: &[u8],
    ) -> StoreResult<()> {
        self.with(|state| {
            let (path, access) = state.resolve(hkey)?;
            if !access.contains(Access::SET_VALUE) {
                return Err(Status::ACCESS_DENIED);
            }
            let node = state.node_mut(&path)?;
            put_value(node, value_name, RawValue::new(value_type, data.to_vec()));
            Ok(())
        })
    }

    fn rename_key(&self, hkey: Hkey, sub_key: &str, new_name: &str) -> StoreResult<()> {
        self.with(|state| {
            let (base, _) = state.resolve(hkey)?;
            let path = join(&base, sub_key);
            state.node(&path)?;
            let parent = path.rsplit_once('\\').map(|(p, _)| p.to_string()).unwrap_or_default();
            let target = join(&parent, new_name);
            if state.nodes.contains_key(&target) {
                return Err(Status::ACCESS_DENIED);
            }
            for old in state.subtree(&path) {
                let mut node = state.nodes.remove(&old).expect("subtree node");
                let moved = format!("{}{}", target, &old[path.len()..]);
                if old == path {
                    node.name = new_name.to_string();
                }
                state.nodes.insert(moved, node);
            }
            Ok(())
        })
    }

    fn copy_tree(&self, src: Hkey, sub_key: &str, dest: Hkey) -> StoreResult<()> {
        self.with(|state| {
            let (base, _) = state.resolve(src)?;
            let (dest_path, _) = state.resolve(dest)?;
            let path = join(&base, sub_key);
            state.node(&path)?;
            for old in state.subtree(&path) {
                let node = state.nodes[&old].clone();
                if old == path {
                    let target = state.node_mut(&dest_path)?;
                    for (name, value) in node.values {
                        put_value(target, &name, value);
                    }
                } else {
                    let copied = format!("{}{}", dest_path, &old[path.len()..]);
                    state.nodes.insert(copied, node);
                }
            }
            Ok(())
        })
    }

    fn delete_key(&self, hkey: Hkey, sub_key: &str) -> StoreResult<()> {
        self.with(|state| {
            let (base, access) = state.resolve(hkey)?;
            let path = join(&base, sub_key);
            state.node(&path)?;
            state.check_access(&path, access | Access::DELETE)?;
            if !state.children(&path).is_empty() {
                return Err(Status::ACCESS_DENIED);
            }
            state.nodes.remove(&path);
            Ok(())
        })
    }

    fn delete_tree(&self, hkey: Hkey, sub_key: &str) -> StoreResult<()> {
        self.with(|state| {
            let (base, access) = state.resolve(hkey)?;
            let path = join(&base, sub_key);
            state.node(&path)?;
            state.check_access(&path, access | Access::DELETE)?;
            for key in state.subtree(&path) {
                if key == path {
                    if sub_key.is_empty() {
                        state.node_mut(&path)?.values.clear();
                    } else {
                        state.nodes.remove(&key);
                    }
                } else {
                    state.nodes.remove(&key);
                }
            }
            Ok(())
        })
    }

    fn delete_value(&self, hkey: Hkey, value_name: &str) -> StoreResult<()> {
        self.with(|state| {
            let (path, access) = state.resolve(hkey)?;
            if !access.contains(Access::SET_VALUE) {
                return Err(Status::ACCESS_DENIED);
            }
            let node = state.node_mut(&path)?;
            let before = node.values.len();
            node.values
                .retain(|(name, _)| !name.eq_ignore_ascii_case(value_name));
            if node.values.len() == before {
                return Err(Status::FILE_NOT_FOUND);
            }
            Ok(())
        })
    }

    fn delete_key_value(&self, hkey: Hkey, sub_key: &str, value_name: &str) -> StoreResult<()> {
        self.with(|state| {
            let (base, _) = state.resolve(hkey)?;
            let path = join(&base, sub_key);
            let node = state.node_mut(&path)?;
            let before = node.values.len();
            node.values
                .retain(|(name, _)| !name.eq_ignore_ascii_case(value_name));
            if node.values.len() == before {
                return Err(Status::FILE_NOT_FOUND);
            }
            Ok(())
        })
    }

    fn close_key(&self, hkey: Hkey) -> StoreResult<()> {
        self.with(|state| {
            if hkey.is_predefined() {
                return Ok(());
            }
            state.handles.remove(&hkey).ok_or(Status::INVALID_HANDLE)?;
            state.free.push(hkey);
            Ok(())
        })
    }
}

/// A facade over a fresh fake store, with platform detection overridden.
pub fn registry() -> Registry<FakeStore> {
    registry_over(FakeStore::new())
}

pub fn registry_over(store: FakeStore) -> Registry<FakeStore> {
    Registry::with_config(
        store,
        RegistryConfig::default().with_platform_supported(true),
    )
    .expect("fake store is always supported")
}

/// Encodes text the way the native API stores it, for seeding values.
pub fn sz(text: &str) -> RawValue {
    RawValue::new(ValueType::String, native_reg::codec::encode_string(text))
}
