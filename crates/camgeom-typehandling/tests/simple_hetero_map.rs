use camgeom_typehandling::conformance::{self, test_data, HeteroFactory};
use camgeom_typehandling::{
    AnyKey, DynamicMap, HeteroMap, HeteroMapError, MutableHeteroMap, SimpleHeteroMap, Value,
};
use proptest::prelude::*;

struct SimpleFactory;

impl HeteroFactory for SimpleFactory {
    type Filled = SimpleHeteroMap<i32>;
    type Empty = SimpleHeteroMap<String>;

    fn make_hetero_map(&self) -> Self::Filled {
        let mut map = SimpleHeteroMap::new();
        conformance::fill_typed(&mut map);
        map
    }

    fn make_mutable_hetero_map(&self) -> Self::Empty {
        SimpleHeteroMap::new()
    }
}

#[test]
fn int_keys_pass_dynamic_checks() {
    conformance::check_dynamic_map(SimpleHeteroMap::<i32>::new, "SimpleHeteroMap<i32>");
}

#[test]
fn long_keys_pass_dynamic_checks() {
    conformance::check_dynamic_map(SimpleHeteroMap::<i64>::new, "SimpleHeteroMap<i64>");
}

#[test]
fn string_keys_pass_dynamic_checks() {
    conformance::check_dynamic_map(SimpleHeteroMap::<String>::new, "SimpleHeteroMap<String>");
}

#[test]
fn typed_api_passes_checks() {
    conformance::check_hetero_factory(&SimpleFactory);
}

#[test]
fn checks_accept_partial_contents() {
    let contents: Vec<_> = test_data().into_iter().skip(3).collect();
    let map = conformance::filled(SimpleHeteroMap::<i64>::new, &contents);
    conformance::check_contains(&map, &contents, "tail only");
    conformance::check_views(&map, &contents, "tail only");
    conformance::check_popitem(SimpleHeteroMap::<i64>::new, &contents, "tail only");
}

#[test]
#[should_panic(expected = "broken")]
fn checks_report_violations() {
    let mut contents = test_data();
    let map = conformance::filled(SimpleHeteroMap::<i32>::new, &contents);
    contents[1].1 = Value::Int(7);
    conformance::check_contents(&map, &contents, "broken");
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

proptest! {
    #[test]
    fn assignment_grows_only_for_new_keys(
        entries in prop::collection::vec((0i64..16, value_strategy()), 1..40)
    ) {
        let mut map = SimpleHeteroMap::<i64>::new();
        for (key, value) in entries {
            let key = AnyKey::Int(key);
            let existed = map.contains_any(&key).expect("int key");
            let before = map.len();
            map.set_item(key.clone(), Box::new(value.clone())).expect("set");
            prop_assert_eq!(map.len(), before + usize::from(!existed));
            prop_assert_eq!(map.get_item(&key).expect("get"), &value);
        }
    }

    #[test]
    fn deleted_keys_stay_deleted(keys in prop::collection::hash_set("[a-z]{1,6}", 1..20)) {
        let mut map = SimpleHeteroMap::<String>::new();
        for name in &keys {
            map.set_item(AnyKey::from(name.as_str()), Box::new(name.len() as i64)).expect("set");
        }
        for name in &keys {
            let key = AnyKey::from(name.as_str());
            map.del_item(&key).expect("delete");
            prop_assert_eq!(map.contains_any(&key), Ok(false));
            prop_assert_eq!(map.del_item(&key), Err(HeteroMapError::KeyNotFound(format!("{key}"))));
        }
        prop_assert!(map.is_empty());
    }

    #[test]
    fn popitem_drains_in_len_calls(n in 0usize..25) {
        let mut map = SimpleHeteroMap::<i32>::new();
        for i in 0..n {
            map.set_value(i as i32, Value::Long(i as i64));
        }
        for _ in 0..n {
            prop_assert!(map.popitem().is_ok());
        }
        prop_assert_eq!(map.popitem(), Err(HeteroMapError::Empty));
    }
}
