//! Property-based tests for schema construction and coercion.

use ogma_schema::{FieldSpec, FieldStructure, Schema, ScalarType};
use proptest::prelude::*;
use serde_json::{json, Value};

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[$A-Za-z_][0-9A-Za-z_$]{0,12}"
}

fn scalar_strategy() -> impl Strategy<Value = ScalarType> {
    prop_oneof![
        Just(ScalarType::Decimal),
        Just(ScalarType::Float),
        Just(ScalarType::Integer),
        Just(ScalarType::Double),
        Just(ScalarType::Short),
        Just(ScalarType::Date),
        Just(ScalarType::Datetime),
        Just(ScalarType::String),
        Just(ScalarType::Boolean),
    ]
}

proptest! {
    #[test]
    fn identifier_fields_always_construct(
        fields in proptest::collection::btree_map(identifier_strategy(), scalar_strategy(), 1..8)
    ) {
        let structure: FieldStructure = fields
            .into_iter()
            .map(|(name, ty)| (name, FieldSpec::new(ty)))
            .collect();
        prop_assert!(Schema::new(structure).is_ok());
    }

    #[test]
    fn unsupported_tags_never_construct(tag in "[a-z]{3,12}") {
        prop_assume!(ScalarType::from_tag(&tag).is_none());
        let declaration = json!({"field": {"type": tag}});
        prop_assert!(Schema::from_json(&declaration).is_err());
    }

    #[test]
    fn integer_literals_coerce_to_numbers(n in any::<i64>()) {
        let structure = FieldStructure::from([
            ("count".to_string(), FieldSpec::new(ScalarType::Integer)),
        ]);
        let schema = Schema::new(structure).unwrap();

        let mut record = json!({"count": n.to_string()}).as_object().unwrap().clone();
        prop_assert!(schema.check(&mut record).is_ok());
        prop_assert_eq!(&record["count"], &Value::from(n));
    }

    #[test]
    fn validation_agrees_across_duplicate_schemas(
        name in "[A-Za-z]{1,10}",
        age in prop_oneof![
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{1,6}".prop_map(|s| json!(s)),
        ],
    ) {
        let structure = FieldStructure::from([
            ("name".to_string(), FieldSpec::new(ScalarType::String)),
            ("age".to_string(), FieldSpec::new(ScalarType::Integer)),
        ]);
        let a = Schema::new(structure.clone()).unwrap();
        let b = Schema::new(structure).unwrap();

        let input = json!({"name": name, "age": age});
        let mut left = input.as_object().unwrap().clone();
        let mut right = input.as_object().unwrap().clone();
        prop_assert_eq!(a.check(&mut left).is_ok(), b.check(&mut right).is_ok());
        prop_assert_eq!(left, right);
    }
}
