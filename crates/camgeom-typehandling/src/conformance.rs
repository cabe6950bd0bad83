//! Reusable conformance checks for heterogeneous map implementations.
//!
//! Every check panics with a descriptive message on the first violation, so
//! an implementation's test suite calls them from ordinary `#[test]`
//! functions:
//!
//! ```
//! use camgeom_typehandling::conformance::{self, test_data};
//! use camgeom_typehandling::SimpleHeteroMap;
//!
//! conformance::check_insert_item(SimpleHeteroMap::<i64>::new, &test_data(), "i64 keys");
//! ```
//!
//! Dynamic checks take the contents as `(index, value)` pairs; each index is
//! turned into a key of the map's own key type with [`MapKey::from_index`].
//! Typed checks are driven by a [`HeteroFactory`].

use crate::{
    make_key, AnyKey, DynValue, DynamicMap, HeteroMap, HeteroMapError, Key, KeyKind, MapKey,
    MutableHeteroMap, SimpleHeteroMap, Storable, Value,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const SHUFFLE_SEED: u64 = 0x5eed_cafe;

/// Indices probed for absence are drawn from `0..PROBE_RANGE`.
const PROBE_RANGE: i64 = 30;

/// The simplest storable: every instance equals every other.
#[derive(Clone, Debug, Default)]
pub struct SimpleStorable;

impl Storable for SimpleStorable {
    fn describe(&self) -> Option<String> {
        Some("Simplest possible representation".to_string())
    }

    fn equals(&self, other: &dyn Storable) -> bool {
        other.is::<SimpleStorable>()
    }
}

/// A storable with state, equality and a hash.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexStorable(pub f64);

impl Storable for ComplexStorable {
    fn describe(&self) -> Option<String> {
        Some(format!("ComplexStorable({:?})", self.0))
    }

    fn hash_value(&self) -> Option<u64> {
        let mut hasher = DefaultHasher::new();
        self.0.to_bits().hash(&mut hasher);
        Some(hasher.finish())
    }

    fn equals(&self, other: &dyn Storable) -> bool {
        other.downcast_ref::<ComplexStorable>() == Some(self)
    }
}

/// A type that no map accepts.
#[derive(Clone, Debug)]
pub struct NotAStorable;

/// The standard contents: one value of each supported kind.
pub fn test_data() -> Vec<(i64, Value)> {
    vec![
        (0, Value::Bool(true)),
        (1, Value::Int(42)),
        (2, Value::Double(42.0)),
        (3, Value::String("How many roads must a man walk down?".to_string())),
        (4, Value::storable(SimpleStorable)),
        (5, Value::storable(ComplexStorable(-100.0))),
    ]
}

/// A key no map accepts: floats are never map keys.
fn wrong_key() -> AnyKey {
    AnyKey::Float(0.0)
}

fn key_of<M: HeteroMap>(index: i64) -> AnyKey {
    M::Key::from_index(index).to_any_key()
}

fn absent_indices(contents: &[(i64, Value)]) -> Vec<i64> {
    (0..PROBE_RANGE)
        .filter(|i| contents.iter().all(|(k, _)| k != i))
        .collect()
}

fn assert_key_type<T: std::fmt::Debug>(result: Result<T, HeteroMapError>, what: &str, msg: &str) {
    assert!(
        matches!(result, Err(HeteroMapError::KeyType { .. })),
        "{msg}: {what} with a wrong-typed key gave {result:?}, expected a key type error"
    );
}

/// Build a map from `factory` holding exactly `contents`.
pub fn filled<M, F>(factory: F, contents: &[(i64, Value)]) -> M
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = factory();
    for (index, value) in contents {
        map.set_value(M::Key::from_index(*index), value.clone());
    }
    map
}

/// Overwrite the first half of the content keys with `Int(0)`, so a later
/// update both replaces and adds.
fn partially_fill<M: DynamicMap>(map: &mut M, contents: &[(i64, Value)]) {
    for (index, _) in &contents[..contents.len() / 2] {
        map.set_value(M::Key::from_index(*index), Value::Int(0));
    }
}

fn snapshot<M: DynamicMap>(map: &M) -> Vec<(AnyKey, Value)> {
    map.items()
        .into_iter()
        .map(|(k, v)| (k, v.clone()))
        .collect()
}

/// Assert that `map` holds exactly `expected`, compared entry by entry.
fn assert_holds<M: DynamicMap>(map: &M, expected: &[(AnyKey, Value)], msg: &str) {
    assert_eq!(
        map.len(),
        expected.len(),
        "{msg}: map has {} entries, expected {}",
        map.len(),
        expected.len()
    );
    for (key, value) in expected {
        match map.get_item(key) {
            Ok(found) => assert!(
                found == value,
                "{msg}: map[{key}] is {found}, expected {value}"
            ),
            Err(err) => panic!("{msg}: map[{key}] failed: {err}"),
        }
    }
}

fn expected_items<M: HeteroMap>(contents: &[(i64, Value)]) -> Vec<(AnyKey, Value)> {
    contents
        .iter()
        .map(|(k, v)| (key_of::<M>(*k), v.clone()))
        .collect()
}

/// Remove from `pool` one value equal to `value`, if present.
fn take_equal(pool: &mut Vec<Value>, value: &Value) -> bool {
    match pool.iter().position(|v| v == value) {
        Some(pos) => {
            pool.swap_remove(pos);
            true
        }
        None => false,
    }
}

/// Membership through the dynamic interface.
pub fn check_contains<M: DynamicMap>(map: &M, contents: &[(i64, Value)], msg: &str) {
    for (index, _) in contents {
        let key = key_of::<M>(*index);
        assert_eq!(
            map.contains_any(&key),
            Ok(true),
            "{msg}: map does not contain {key}"
        );
    }
    for index in absent_indices(contents) {
        let key = key_of::<M>(index);
        assert_eq!(
            map.contains_any(&key),
            Ok(false),
            "{msg}: map unexpectedly contains {key}"
        );
    }
    assert_key_type(map.contains_any(&wrong_key()), "contains", msg);
}

/// Indexed lookup.
pub fn check_contents<M: DynamicMap>(map: &M, contents: &[(i64, Value)], msg: &str) {
    assert_holds(map, &expected_items::<M>(contents), msg);
    for index in absent_indices(contents) {
        let key = key_of::<M>(index);
        assert!(
            matches!(map.get_item(&key), Err(HeteroMapError::KeyNotFound(_))),
            "{msg}: map[{key}] should be missing"
        );
    }
    assert_key_type(map.get_item(&wrong_key()), "lookup", msg);
}

/// `get` with and without a default.
pub fn check_get<M: DynamicMap>(map: &M, contents: &[(i64, Value)], msg: &str) {
    let default = Value::String("default".to_string());
    for (index, value) in contents {
        let key = key_of::<M>(*index);
        assert_eq!(map.get(&key), Ok(Some(value)), "{msg}: get({key})");
        assert_eq!(
            map.get_or(&key, default.clone()).as_ref(),
            Ok(value),
            "{msg}: get({key}, default) ignored the stored value"
        );
    }
    for index in absent_indices(contents) {
        let key = key_of::<M>(index);
        assert_eq!(map.get(&key), Ok(None), "{msg}: get({key}) on a missing key");
        assert_eq!(
            map.get_or(&key, default.clone()),
            Ok(default.clone()),
            "{msg}: get({key}, default) on a missing key"
        );
    }
    assert_key_type(map.get(&wrong_key()), "get", msg);
    assert_key_type(map.get_or(&wrong_key(), default), "get with default", msg);
}

/// Iterating the keys and indexing reproduces the contents.
pub fn check_iteration<M: DynamicMap>(map: &M, contents: &[(i64, Value)], msg: &str) {
    let mut seen = Vec::new();
    for key in map.any_keys() {
        let value = map
            .get_item(&key)
            .unwrap_or_else(|err| panic!("{msg}: iterated key {key} cannot be read: {err}"));
        seen.push((key, value.clone()));
    }
    assert_eq!(
        seen.len(),
        contents.len(),
        "{msg}: iteration yielded {} keys",
        seen.len()
    );
    for (key, value) in expected_items::<M>(contents) {
        assert!(
            seen.iter().any(|(k, v)| *k == key && *v == value),
            "{msg}: iteration never produced {key}: {value}"
        );
    }
}

/// Keys, values and items match the contents as multisets.
pub fn check_views<M: DynamicMap>(map: &M, contents: &[(i64, Value)], msg: &str) {
    let expected = expected_items::<M>(contents);

    let mut keys = map.any_keys();
    assert_eq!(keys.len(), expected.len(), "{msg}: keys() has the wrong length");
    for (key, _) in &expected {
        let pos = keys
            .iter()
            .position(|k| k == key)
            .unwrap_or_else(|| panic!("{msg}: keys() is missing {key}"));
        keys.swap_remove(pos);
    }

    let mut values: Vec<Value> = map.values().into_iter().cloned().collect();
    assert_eq!(values.len(), expected.len(), "{msg}: values() has the wrong length");
    for (_, value) in &expected {
        assert!(
            take_equal(&mut values, value),
            "{msg}: values() is missing {value}"
        );
    }

    let items = map.items();
    assert_eq!(items.len(), expected.len(), "{msg}: items() has the wrong length");
    for (key, value) in &expected {
        assert!(
            items.iter().any(|(k, v)| k == key && *v == value),
            "{msg}: items() is missing ({key}, {value})"
        );
    }
}

/// Single assignments grow the map only for new keys.
pub fn check_insert_item<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = factory();
    partially_fill(&mut map, contents);
    for (index, value) in contents {
        let key = key_of::<M>(*index);
        let existed = map.contains_any(&key) == Ok(true);
        let before = map.len();
        map.set_item(key.clone(), Box::new(value.clone()))
            .unwrap_or_else(|err| panic!("{msg}: map[{key}] = {value} failed: {err}"));
        let grown = if existed { 0 } else { 1 };
        assert_eq!(
            map.len(),
            before + grown,
            "{msg}: assigning {key} changed the length from {before} to {}",
            map.len()
        );
        assert_eq!(map.get_item(&key), Ok(value), "{msg}: map[{key}] after assignment");
    }

    let before = snapshot(&map);
    let fresh = key_of::<M>(PROBE_RANGE + 1);
    let result = map.set_item(fresh.clone(), Box::new(NotAStorable));
    assert!(
        matches!(result, Err(HeteroMapError::ValueType { .. })),
        "{msg}: storing a non-storable gave {result:?}"
    );
    assert_eq!(
        map.contains_any(&fresh),
        Ok(false),
        "{msg}: a rejected value left an entry behind"
    );
    assert_key_type(map.set_item(wrong_key(), Box::new(true)), "assignment", msg);
    assert_holds(&map, &before, msg);
}

/// Update from another map.
pub fn check_update_mapping<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = factory();
    partially_fill(&mut map, contents);
    let source: SimpleHeteroMap<M::Key> = contents
        .iter()
        .map(|(k, v)| (M::Key::from_index(*k), v.clone()))
        .collect();
    map.update_mapping(&source)
        .unwrap_or_else(|err| panic!("{msg}: update from a mapping failed: {err}"));
    assert_holds(&map, &expected_items::<M>(contents), msg);

    let before = snapshot(&map);
    let result = if map.key_kind() == KeyKind::Str {
        let wrong: SimpleHeteroMap<i64> = [(PROBE_RANGE + 1, Value::Bool(false))]
            .into_iter()
            .collect();
        map.update_mapping(&wrong)
    } else {
        let wrong: SimpleHeteroMap<String> = [
            ((PROBE_RANGE + 1).to_string(), Value::Bool(false)),
            ("text".to_string(), Value::Bool(false)),
        ]
        .into_iter()
        .collect();
        map.update_mapping(&wrong)
    };
    assert_key_type(result, "update from a mapping", msg);
    assert_holds(&map, &before, msg);
}

/// Update from `(key, value)` pairs.
pub fn check_update_pairs<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = factory();
    partially_fill(&mut map, contents);
    let pairs = contents
        .iter()
        .map(|(k, v)| (key_of::<M>(*k), Box::new(v.clone()) as DynValue));
    map.update_pairs(pairs)
        .unwrap_or_else(|err| panic!("{msg}: update from pairs failed: {err}"));
    assert_holds(&map, &expected_items::<M>(contents), msg);

    let before = snapshot(&map);
    let bad_value: Vec<(AnyKey, DynValue)> = vec![
        (key_of::<M>(PROBE_RANGE + 1), Box::new(Value::Int(1)) as DynValue),
        (key_of::<M>(PROBE_RANGE + 2), Box::new(NotAStorable) as DynValue),
    ];
    let result = map.update_pairs(bad_value);
    assert!(
        matches!(result, Err(HeteroMapError::ValueType { .. })),
        "{msg}: update with a non-storable gave {result:?}"
    );
    assert_holds(&map, &before, msg);

    let bad_key: Vec<(AnyKey, DynValue)> = vec![
        (key_of::<M>(PROBE_RANGE + 1), Box::new(Value::Int(1)) as DynValue),
        (wrong_key(), Box::new(Value::Int(2)) as DynValue),
    ];
    assert_key_type(map.update_pairs(bad_key), "update from pairs", msg);
    assert_holds(&map, &before, msg);
}

/// Keyword-style update. Only string-keyed maps accept it.
pub fn check_update_kwargs<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = factory();
    partially_fill(&mut map, contents);
    let names: Vec<String> = contents.iter().map(|(k, _)| k.to_string()).collect();
    let kwargs = names
        .iter()
        .zip(contents)
        .map(|(name, (_, v))| (name.as_str(), Box::new(v.clone()) as DynValue));

    if map.key_kind() != KeyKind::Str {
        let before = snapshot(&map);
        assert_key_type(map.update_kwargs(kwargs), "keyword update", msg);
        assert_holds(&map, &before, msg);
        return;
    }

    map.update_kwargs(kwargs)
        .unwrap_or_else(|err| panic!("{msg}: keyword update failed: {err}"));
    let expected: Vec<(AnyKey, Value)> = names
        .iter()
        .zip(contents)
        .map(|(name, (_, v))| (AnyKey::from(name.as_str()), v.clone()))
        .collect();
    assert_holds(&map, &expected, msg);

    let before = snapshot(&map);
    let result = map.update_kwargs([
        ("extra", Box::new(true) as DynValue),
        ("broken", Box::new(NotAStorable) as DynValue),
    ]);
    assert!(
        matches!(result, Err(HeteroMapError::ValueType { .. })),
        "{msg}: keyword update with a non-storable gave {result:?}"
    );
    assert_holds(&map, &before, msg);
}

/// Assigning every content value in turn to one key.
pub fn check_replace_item<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = factory();
    let key = key_of::<M>(42);
    for (_, value) in contents {
        map.set_item(key.clone(), Box::new(value.clone()))
            .unwrap_or_else(|err| panic!("{msg}: map[{key}] = {value} failed: {err}"));
        assert_eq!(map.len(), 1, "{msg}: replacing {key} changed the length");
    }
    if let Some((_, last)) = contents.last() {
        assert_holds(&map, &[(key, last.clone())], msg);
    }
}

/// Deletion in shuffled order.
pub fn check_remove_item<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = filled(factory, contents);
    let missing = key_of::<M>(2019);
    assert!(
        matches!(map.del_item(&missing), Err(HeteroMapError::KeyNotFound(_))),
        "{msg}: deleting missing key {missing} did not fail"
    );
    assert_eq!(map.len(), contents.len(), "{msg}: failed delete changed the map");

    let mut order: Vec<i64> = contents.iter().map(|(k, _)| *k).collect();
    order.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
    for index in order {
        let key = key_of::<M>(index);
        let before = map.len();
        map.del_item(&key)
            .unwrap_or_else(|err| panic!("{msg}: del map[{key}] failed: {err}"));
        assert_eq!(map.len(), before - 1, "{msg}: deleting {key} did not shrink the map");
        assert_eq!(map.contains_any(&key), Ok(false), "{msg}: {key} survived deletion");
        assert!(
            matches!(map.del_item(&key), Err(HeteroMapError::KeyNotFound(_))),
            "{msg}: deleting {key} twice did not fail"
        );
    }
    assert_key_type(map.del_item(&wrong_key()), "delete", msg);
}

/// `pop` with and without a default.
pub fn check_pop<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = filled(factory, contents);
    let missing = key_of::<M>(2019);
    let default = Value::Long(-1);
    assert!(
        matches!(map.pop(&missing), Err(HeteroMapError::KeyNotFound(_))),
        "{msg}: pop of missing key {missing} did not fail"
    );
    assert_eq!(map.pop_or(&missing, default.clone()), Ok(default.clone()));
    assert_eq!(map.len(), contents.len(), "{msg}: failed pop changed the map");

    let mut order: Vec<&(i64, Value)> = contents.iter().collect();
    order.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
    for (i, (index, value)) in order.into_iter().enumerate() {
        let key = key_of::<M>(*index);
        let popped = if i % 2 == 0 {
            map.pop(&key)
        } else {
            map.pop_or(&key, default.clone())
        };
        assert_eq!(popped.as_ref(), Ok(value), "{msg}: pop({key})");
        assert_eq!(map.contains_any(&key), Ok(false), "{msg}: {key} survived pop");
        assert_eq!(
            map.pop_or(&key, default.clone()),
            Ok(default.clone()),
            "{msg}: second pop({key}, default)"
        );
    }
    assert!(map.is_empty(), "{msg}: map not empty after popping everything");
    assert_key_type(map.pop(&wrong_key()), "pop", msg);
    assert_key_type(map.pop_or(&wrong_key(), default), "pop with default", msg);
}

/// `popitem` drains the map in `len` calls; the next one fails.
pub fn check_popitem<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = filled(factory, contents);
    let mut expected = expected_items::<M>(contents);
    let mut seen = HashSet::new();
    for remaining in (0..contents.len()).rev() {
        let (key, value) = map
            .popitem()
            .unwrap_or_else(|err| panic!("{msg}: popitem with {} left failed: {err}", remaining + 1));
        assert!(seen.insert(key.to_string()), "{msg}: popitem returned {key} twice");
        let pos = expected
            .iter()
            .position(|(k, v)| *k == key && *v == value)
            .unwrap_or_else(|| panic!("{msg}: popitem returned unexpected ({key}, {value})"));
        expected.swap_remove(pos);
        assert_eq!(map.len(), remaining, "{msg}: popitem did not shrink the map");
    }
    assert_eq!(map.popitem(), Err(HeteroMapError::Empty), "{msg}: popitem on an empty map");
}

/// `clear` empties the map.
pub fn check_clear<M, F>(factory: F, contents: &[(i64, Value)], msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let mut map = filled(factory, contents);
    assert!(!map.is_empty(), "{msg}: filled map reports empty");
    map.clear();
    assert!(map.is_empty(), "{msg}: map not empty after clear");
    assert!(map.any_keys().is_empty(), "{msg}: cleared map still iterates keys");
    for (index, _) in contents {
        assert_eq!(map.contains_any(&key_of::<M>(*index)), Ok(false));
    }
}

/// Run every dynamic check against maps made by `factory`.
pub fn check_dynamic_map<M, F>(factory: F, msg: &str)
where
    M: DynamicMap,
    F: Fn() -> M,
{
    let contents = test_data();
    let map = filled(&factory, &contents);
    check_contains(&map, &contents, msg);
    check_contents(&map, &contents, msg);
    check_get(&map, &contents, msg);
    check_iteration(&map, &contents, msg);
    check_views(&map, &contents, msg);
    check_insert_item(&factory, &contents, msg);
    check_update_mapping(&factory, &contents, msg);
    check_update_pairs(&factory, &contents, msg);
    check_update_kwargs(&factory, &contents, msg);
    check_replace_item(&factory, &contents, msg);
    check_remove_item(&factory, &contents, msg);
    check_pop(&factory, &contents, msg);
    check_popitem(&factory, &contents, msg);
    check_clear(&factory, &contents, msg);
}

pub const KEY0: Key<i32, bool> = Key::new(0);
pub const KEY1: Key<i32, i32> = Key::new(1);
pub const KEY2: Key<i32, f64> = Key::new(2);
pub const KEY3: Key<i32, String> = Key::new(3);
pub const KEY4: Key<i32, Arc<SimpleStorable>> = Key::new(4);
pub const KEY5: Key<i32, ComplexStorable> = Key::new(5);

const ANSWER: &str = "How many roads must a man walk down?";

/// Produces the maps the typed checks run against.
pub trait HeteroFactory {
    type Filled: HeteroMap<Key = i32>;
    type Empty: MutableHeteroMap<Key = String>;

    /// A map holding the values of `KEY0` through `KEY5`; see [`fill_typed`].
    fn make_hetero_map(&self) -> Self::Filled;

    fn make_mutable_hetero_map(&self) -> Self::Empty;
}

/// Insert the standard typed contents.
pub fn fill_typed<M: MutableHeteroMap<Key = i32>>(map: &mut M) {
    map.insert(&KEY0, true);
    map.insert(&KEY1, 42);
    map.insert(&KEY2, 42.0);
    map.insert(&KEY3, ANSWER.to_string());
    map.insert_shared(&KEY4, Arc::new(SimpleStorable));
    map.insert_storable(&KEY5, ComplexStorable(-100.0));
}

fn factory_name<F>() -> &'static str {
    std::any::type_name::<F>()
}

fn skey<T: ?Sized>(name: &str) -> Key<String, T> {
    make_key(name.to_string())
}

pub fn check_at<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let map = factory.make_hetero_map();
    assert_eq!(map.at(&KEY0), Ok(&true), "{name}: at(KEY0)");
    assert_eq!(map.at(&KEY1), Ok(&42), "{name}: at(KEY1)");
    assert_eq!(map.at(&KEY2), Ok(&42.0), "{name}: at(KEY2)");
    assert_eq!(map.at(&KEY3).map(String::as_str), Ok(ANSWER), "{name}: at(KEY3)");
    let shared = map.at_shared(&KEY4);
    assert!(shared.is_ok(), "{name}: at_shared(KEY4) gave {shared:?}");
    assert_eq!(
        map.at_storable(&KEY5),
        Ok(&ComplexStorable(-100.0)),
        "{name}: at_storable(KEY5)"
    );
    let any = map
        .at_dyn(&make_key::<dyn Storable, _>(5))
        .unwrap_or_else(|err| panic!("{name}: at_dyn(5) failed: {err}"));
    assert_eq!(any.to_string(), "ComplexStorable(-100.0)");

    assert!(
        matches!(map.at(&make_key::<i32, _>(0)), Err(HeteroMapError::KeyNotFound(_))),
        "{name}: a bool read back as i32"
    );
    assert!(
        map.at(&make_key::<f32, _>(2)).is_err(),
        "{name}: an f64 read back as f32"
    );
    assert!(
        map.at_storable(&make_key::<SimpleStorable, _>(4)).is_err(),
        "{name}: a shared storable read back as owned"
    );
    assert!(
        map.at_shared(&make_key::<Arc<ComplexStorable>, _>(4)).is_err(),
        "{name}: a shared storable read back as the wrong type"
    );
    assert!(map.at(&make_key::<bool, _>(42)).is_err(), "{name}: missing key found");
}

pub fn check_at_mut<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_hetero_map();
    *map.at_mut(&KEY1)
        .unwrap_or_else(|err| panic!("{name}: at_mut(KEY1) failed: {err}")) += 1;
    assert_eq!(map.at(&KEY1), Ok(&43), "{name}: write through at_mut lost");
    map.at_mut(&KEY3)
        .unwrap_or_else(|err| panic!("{name}: at_mut(KEY3) failed: {err}"))
        .push_str(" Forty-two.");
    assert!(map.at(&KEY3).is_ok_and(|s| s.ends_with("Forty-two.")));
    map.at_storable_mut(&KEY5)
        .unwrap_or_else(|err| panic!("{name}: at_storable_mut(KEY5) failed: {err}"))
        .0 = 1.5;
    assert_eq!(map.at_storable(&KEY5), Ok(&ComplexStorable(1.5)));
    assert!(map.at_mut(&make_key::<i64, _>(1)).is_err(), "{name}: i32 written as i64");
    assert_eq!(map.len(), 6, "{name}: at_mut changed the size");
}

pub fn check_size<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let map = factory.make_hetero_map();
    assert_eq!(map.len(), 6, "{name}: filled map size");
    assert!(!map.is_empty(), "{name}: filled map reports empty");
}

pub fn check_mutable_size<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    assert_eq!(map.len(), 0, "{name}: new map size");
    assert!(map.is_empty(), "{name}: new map not empty");
    assert!(map.insert(&skey::<i32>("one"), 1));
    assert_eq!(map.len(), 1, "{name}: size after insert");
    assert!(!map.is_empty());
}

/// `contains_key` ignores the value type.
pub fn check_weak_contains<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let map = factory.make_hetero_map();
    for id in 0..6 {
        assert!(map.contains_key(&id), "{name}: missing key {id}");
    }
    assert!(!map.contains_key(&6), "{name}: unexpected key 6");
    assert!(!map.contains_key(&-1), "{name}: unexpected key -1");
}

/// Typed membership requires the exact value type.
pub fn check_typed_contains<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let map = factory.make_hetero_map();
    assert!(map.contains(&KEY0) && map.contains(&KEY1) && map.contains(&KEY2));
    assert!(map.contains(&KEY3), "{name}: KEY3");
    assert!(map.contains_shared(&KEY4), "{name}: KEY4");
    assert!(map.contains_storable(&KEY5), "{name}: KEY5");
    assert!(map.contains_dyn(&make_key::<dyn Storable, _>(5)), "{name}: KEY5 as dyn");

    assert!(!map.contains(&make_key::<i32, _>(0)), "{name}: bool as i32");
    assert!(!map.contains(&make_key::<i64, _>(1)), "{name}: i32 as i64");
    assert!(!map.contains(&make_key::<f32, _>(2)), "{name}: f64 as f32");
    assert!(!map.contains_storable(&make_key::<SimpleStorable, _>(4)));
    assert!(!map.contains_dyn(&make_key::<dyn Storable, _>(4)), "{name}: shared as owned");
    assert!(!map.contains_storable(&make_key::<SimpleStorable, _>(5)));
    assert!(!map.contains(&make_key::<bool, _>(6)), "{name}: missing key 6");
}

pub fn check_keys<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut keys = factory.make_hetero_map().keys();
    keys.sort_unstable();
    assert_eq!(keys, [0, 1, 2, 3, 4, 5], "{name}: keys");
    assert!(factory.make_mutable_hetero_map().keys().is_empty());
}

pub fn check_clear_idempotent<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    map.clear();
    assert!(map.is_empty(), "{name}: clear on an empty map");
    map.clear();
    assert!(map.is_empty(), "{name}: second clear");
}

pub fn check_typed_clear<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    let int_key = skey::<i32>("int");
    let text_key = skey::<String>("text");
    map.insert(&int_key, 1);
    map.insert(&text_key, "x".to_string());
    map.clear();
    assert!(map.is_empty(), "{name}: not empty after clear");
    assert!(!map.contains(&int_key) && !map.contains(&text_key));
}

pub fn check_insert_int<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    let key = skey::<i32>("answer");
    assert!(map.insert(&key, 42), "{name}: first insert refused");
    assert_eq!(map.at(&key), Ok(&42));
    assert!(!map.insert(&key, 43), "{name}: insert overwrote a value");
    assert_eq!(map.at(&key), Ok(&42), "{name}: refused insert changed the value");
    assert_eq!(map.len(), 1);
}

pub fn check_insert_string<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    let key = skey::<String>("question");
    assert!(map.insert(&key, ANSWER.to_string()), "{name}: first insert refused");
    assert_eq!(map.at(&key).map(String::as_str), Ok(ANSWER));
    assert!(!map.insert(&key, String::new()), "{name}: insert overwrote a value");
    assert!(!map.insert(&skey::<i32>("question"), 0), "{name}: key reused for i32");
    assert_eq!(map.len(), 1);
}

pub fn check_insert_storable<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    let owned = skey::<ComplexStorable>("owned");
    let shared = skey::<Arc<SimpleStorable>>("shared");
    let boxed = skey::<dyn Storable>("boxed");

    assert!(map.insert_storable(&owned, ComplexStorable(2.5)), "{name}: owned insert");
    let original = Arc::new(SimpleStorable);
    assert!(map.insert_shared(&shared, original.clone()), "{name}: shared insert");
    assert!(map.insert_dyn(&boxed, Box::new(ComplexStorable(7.0))), "{name}: boxed insert");
    assert_eq!(map.len(), 3);

    assert_eq!(map.at_storable(&owned), Ok(&ComplexStorable(2.5)));
    let back = map
        .at_shared(&shared)
        .unwrap_or_else(|err| panic!("{name}: at_shared failed: {err}"));
    assert!(Arc::ptr_eq(&back, &original), "{name}: shared value was copied");
    assert_eq!(
        map.at_storable(&skey::<ComplexStorable>("boxed")),
        Ok(&ComplexStorable(7.0)),
        "{name}: boxed value lost its concrete type"
    );
    assert!(!map.insert_storable(&owned, ComplexStorable(0.0)), "{name}: overwrite");
}

pub fn check_interleaved_inserts<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    let a = skey::<i32>("a");
    let b = skey::<String>("b");
    let c = skey::<ComplexStorable>("c");
    let d = skey::<f64>("d");
    assert!(map.insert(&a, 1));
    assert!(map.insert(&b, "b".to_string()));
    assert!(map.insert_storable(&c, ComplexStorable(3.0)));
    assert!(!map.insert(&skey::<f64>("a"), 1.0), "{name}: key a reused");
    assert!(map.insert(&d, 4.0));
    assert_eq!(map.len(), 4, "{name}: size after interleaved inserts");
    assert_eq!(map.at(&a), Ok(&1));
    assert_eq!(map.at(&b).map(String::as_str), Ok("b"));
    assert_eq!(map.at_storable(&c), Ok(&ComplexStorable(3.0)));
    assert_eq!(map.at(&d), Ok(&4.0));
}

pub fn check_erase<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    let int_key = skey::<i32>("int");
    let owned = skey::<ComplexStorable>("owned");
    let shared = skey::<Arc<SimpleStorable>>("shared");
    map.insert(&int_key, 5);
    map.insert_storable(&owned, ComplexStorable(1.0));
    map.insert_shared(&shared, Arc::new(SimpleStorable));

    assert!(!map.erase(&skey::<i64>("int")), "{name}: erase with the wrong type");
    assert!(map.contains(&int_key), "{name}: wrong-typed erase removed the value");
    assert!(map.erase(&int_key), "{name}: erase refused");
    assert!(!map.erase(&int_key), "{name}: second erase succeeded");
    assert!(!map.erase_storable(&skey::<SimpleStorable>("owned")));
    assert!(map.erase_storable(&owned), "{name}: erase_storable refused");
    assert!(!map.erase_storable(&skey::<SimpleStorable>("shared")));
    assert!(map.erase_shared(&shared), "{name}: erase_shared refused");
    assert!(map.is_empty(), "{name}: map not empty after erasing everything");
    assert!(!map.erase(&skey::<bool>("never")), "{name}: erased a missing key");
}

pub fn check_insert_erase_insert<F: HeteroFactory>(factory: &F) {
    let name = factory_name::<F>();
    let mut map = factory.make_mutable_hetero_map();
    assert!(map.insert(&skey::<i32>("slot"), 1));
    assert!(map.erase(&skey::<i32>("slot")));
    assert!(
        map.insert(&skey::<String>("slot"), "reused".to_string()),
        "{name}: erased key could not be reused"
    );
    assert_eq!(map.at(&skey::<String>("slot")).map(String::as_str), Ok("reused"));
    assert!(map.at(&skey::<i32>("slot")).is_err());
    assert_eq!(map.len(), 1);
}

/// Run every typed check.
pub fn check_hetero_factory<F: HeteroFactory>(factory: &F) {
    check_at(factory);
    check_at_mut(factory);
    check_size(factory);
    check_mutable_size(factory);
    check_weak_contains(factory);
    check_typed_contains(factory);
    check_keys(factory);
    check_clear_idempotent(factory);
    check_typed_clear(factory);
    check_insert_int(factory);
    check_insert_string(factory);
    check_insert_storable(factory);
    check_interleaved_inserts(factory);
    check_erase(factory);
    check_insert_erase_insert(factory);
}
