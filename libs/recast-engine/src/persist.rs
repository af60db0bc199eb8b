use std::sync::Arc;

use recast_api::mapping::{FieldMap, RenameTable};
use recast_api::record::Record;
use recast_api::schema::Shape;
use recast_api::store::{PersistedRecord, RecordStore, Stored};
use recast_api::validate::ShapeValidator;
use recast_api::value::{Value, ValueBag};

use crate::builder;
use crate::error::ConvertError;
use crate::matcher;
use crate::transform::{FieldTransform, TransformTable};
use crate::validate::SchemaValidator;

/// Allow-list for predicate lookups. Caller-built configuration; the
/// default carries the reference trio.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct FetchPolicy {
    #[serde(default = "default_allow")]
    pub allow: Vec<String>,
}

fn default_allow() -> Vec<String> {
    vec!["username".into(), "id".into(), "email".into()]
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            allow: default_allow(),
        }
    }
}

impl FetchPolicy {
    pub fn permits(&self, field: &str) -> bool {
        self.allow.iter().any(|f| f == field)
    }
}

/// Converts fetched persistence records into domain records.
///
/// Wraps the store collaborator the way the engine sees it: lookup a record
/// by one allow-listed field, read its attributes under renamed names, run
/// per-field transforms, and hand the resulting bag to the record builder.
pub struct StoreAdapter {
    store: Arc<dyn RecordStore>,
    policy: FetchPolicy,
    validator: Arc<dyn ShapeValidator>,
}

impl StoreAdapter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            policy: FetchPolicy::default(),
            validator: Arc::new(SchemaValidator),
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ShapeValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Persistence record → domain record.
    ///
    /// For each field declared on `shape`, reads the attribute named by the
    /// rename table (identity by default). A field listed in `transforms` —
    /// keyed by the storage-side name — has its raw attribute passed through
    /// the transform before the bag write; that is also the only way a
    /// relationship handle gets converted.
    pub fn from_persisted(
        &self,
        record: &dyn PersistedRecord,
        shape: &Arc<Shape>,
        renames: &RenameTable,
        transforms: &TransformTable,
    ) -> Result<Record, ConvertError> {
        convert_one(record, shape, renames, transforms, self.validator.as_ref())
    }

    /// Lookup by one allow-listed field, then convert. A miss is `Ok(None)`,
    /// never an error.
    pub fn fetch(
        &self,
        field: &str,
        value: &Value,
        shape: &Arc<Shape>,
        renames: &RenameTable,
        transforms: &TransformTable,
    ) -> Result<Option<Record>, ConvertError> {
        self.check_filter(field)?;

        match self.store.find_one(field, value).map_err(ConvertError::Store)? {
            Some(record) => Ok(Some(self.from_persisted(
                record.as_ref(),
                shape,
                renames,
                transforms,
            )?)),
            None => {
                tracing::debug!(field, "no record matched lookup");
                Ok(None)
            }
        }
    }

    /// Lookup without conversion — the raw store record, allow-list still
    /// enforced.
    pub fn fetch_raw(
        &self,
        field: &str,
        value: &Value,
    ) -> Result<Option<Box<dyn PersistedRecord>>, ConvertError> {
        self.check_filter(field)?;
        self.store.find_one(field, value).map_err(ConvertError::Store)
    }

    fn check_filter(&self, field: &str) -> Result<(), ConvertError> {
        if !self.policy.permits(field) {
            return Err(ConvertError::UnsupportedFilterField {
                field: field.to_string(),
            });
        }
        Ok(())
    }
}

/// Transform that converts a multi-valued relationship handle element-wise
/// into domain records, carrying the contained shape's own renames and
/// transforms. Usage:
///
/// ```ignore
/// let transforms = TransformTable::new()
///     .with("categories", many_to_domain(category_shape, RenameTable::new(), TransformTable::new()));
/// adapter.from_persisted(&professional, &professional_shape,
///     &RenameTable::new().rename("service_categories", "categories"), &transforms)?;
/// ```
pub fn many_to_domain(
    shape: Arc<Shape>,
    remap: RenameTable,
    transforms: TransformTable,
) -> Arc<dyn FieldTransform> {
    Arc::new(ManyToDomain {
        shape,
        remap,
        transforms,
        validator: Arc::new(SchemaValidator),
    })
}

struct ManyToDomain {
    shape: Arc<Shape>,
    remap: RenameTable,
    transforms: TransformTable,
    validator: Arc<dyn ShapeValidator>,
}

impl FieldTransform for ManyToDomain {
    fn apply(&self, raw: Stored) -> Result<Value, ConvertError> {
        let related = match raw {
            Stored::Related(records) => records,
            Stored::Value(v) => {
                return Err(ConvertError::ShapeMismatch {
                    expected: "a relationship handle".to_string(),
                    found: v.type_name().to_string(),
                });
            }
        };

        let mut items = Vec::with_capacity(related.len());
        for record in &related {
            let converted = convert_one(
                record.as_ref(),
                &self.shape,
                &self.remap,
                &self.transforms,
                self.validator.as_ref(),
            )?;
            items.push(Value::Map(converted.into_bag()));
        }
        Ok(Value::Array(items))
    }
}

fn convert_one(
    record: &dyn PersistedRecord,
    shape: &Arc<Shape>,
    renames: &RenameTable,
    transforms: &TransformTable,
    validator: &dyn ShapeValidator,
) -> Result<Record, ConvertError> {
    let mut bag = ValueBag::new();

    for field in &shape.fields {
        let source = matcher::resolve(&field.name, renames);
        let Some(raw) = record.read(source) else {
            // absent attribute stays absent; the builder raises if required
            continue;
        };

        let value = match transforms.get(source) {
            Some(transform) => transform.apply(raw)?,
            None => match raw {
                Stored::Value(v) => v,
                Stored::Related(_) => {
                    return Err(ConvertError::ShapeMismatch {
                        expected: format!("a plain value for attribute '{source}'"),
                        found: "a relationship handle (claim it with many_to_domain)".to_string(),
                    });
                }
            },
        };
        bag.set(field.name.clone(), value);
    }

    builder::build(&bag, shape, &FieldMap::new(), validator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_api::error::DelegateError;
    use recast_api::schema::{Field, ShapeKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Attribute-bag record stub, optionally with one relationship.
    #[derive(Debug)]
    struct StubRecord {
        attrs: ValueBag,
        related: Option<(String, Vec<ValueBag>)>,
    }

    impl StubRecord {
        fn new(attrs: ValueBag) -> Self {
            Self {
                attrs,
                related: None,
            }
        }
    }

    impl PersistedRecord for StubRecord {
        fn read(&self, name: &str) -> Option<Stored> {
            if let Some((rel_name, bags)) = &self.related {
                if rel_name == name {
                    let records: Vec<Box<dyn PersistedRecord>> = bags
                        .iter()
                        .map(|b| Box::new(StubRecord::new(b.clone())) as Box<dyn PersistedRecord>)
                        .collect();
                    return Some(Stored::Related(records));
                }
            }
            self.attrs.get(name).map(|v| Stored::Value(v.clone()))
        }
    }

    /// Single-record store counting its lookups.
    struct StubStore {
        record: ValueBag,
        calls: AtomicUsize,
    }

    impl RecordStore for StubStore {
        fn find_one(
            &self,
            field: &str,
            value: &Value,
        ) -> Result<Option<Box<dyn PersistedRecord>>, DelegateError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.record.get(field) == Some(value) {
                Ok(Some(Box::new(StubRecord::new(self.record.clone()))))
            } else {
                Ok(None)
            }
        }
    }

    fn user_shape() -> Arc<Shape> {
        Arc::new(Shape::new(
            "User",
            ShapeKind::Domain,
            vec![
                Field::required("username", "string"),
                Field::optional("email", "string"),
            ],
        ))
    }

    fn stored_user() -> ValueBag {
        let mut bag = ValueBag::new();
        bag.set("username", "johndoe");
        bag.set("email_address", "x@y.com");
        bag
    }

    #[test]
    fn rename_reads_the_storage_side_name() {
        let record = StubRecord::new(stored_user());
        let adapter = StoreAdapter::new(Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        }));

        let renames = RenameTable::new().rename("email", "email_address");
        let user = adapter
            .from_persisted(&record, &user_shape(), &renames, &TransformTable::new())
            .unwrap();

        assert_eq!(user.get("email"), Some(&Value::String("x@y.com".into())));
        // no attribute named plain "email" on the record
        assert_eq!(record.read("email").map(|_| ()), None);
    }

    #[test]
    fn transforms_are_keyed_by_storage_side_name() {
        let mut attrs = stored_user();
        attrs.set("email_address", "  X@Y.COM  ");
        let record = StubRecord::new(attrs);
        let adapter = StoreAdapter::new(Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        }));

        let renames = RenameTable::new().rename("email", "email_address");
        let transforms = TransformTable::new().map_value("email_address", |v| match v {
            Value::String(s) => Value::String(s.trim().to_lowercase()),
            other => other,
        });

        let user = adapter
            .from_persisted(&record, &user_shape(), &renames, &transforms)
            .unwrap();
        assert_eq!(user.get("email"), Some(&Value::String("x@y.com".into())));
    }

    #[test]
    fn relationship_without_transform_is_rejected() {
        let shape = Arc::new(Shape::new(
            "User",
            ShapeKind::Domain,
            vec![
                Field::required("username", "string"),
                Field::optional("roles", "array"),
            ],
        ));
        let mut record = StubRecord::new(stored_user());
        record.related = Some(("roles".into(), vec![ValueBag::new()]));

        let adapter = StoreAdapter::new(Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        }));
        let err = adapter
            .from_persisted(&record, &shape, &RenameTable::new(), &TransformTable::new())
            .unwrap_err();
        assert!(matches!(err, ConvertError::ShapeMismatch { .. }));
    }

    #[test]
    fn many_to_domain_converts_element_wise() {
        let role_shape = Arc::new(Shape::new(
            "Role",
            ShapeKind::Domain,
            vec![Field::required("name", "string")],
        ));
        let shape = Arc::new(Shape::new(
            "User",
            ShapeKind::Domain,
            vec![
                Field::required("username", "string"),
                Field::optional("roles", "array"),
            ],
        ));

        let mut admin = ValueBag::new();
        admin.set("name", "admin");
        admin.set("internal_id", 7i64); // undeclared on Role, dropped
        let mut audit = ValueBag::new();
        audit.set("name", "audit");

        let mut record = StubRecord::new(stored_user());
        record.related = Some(("roles".into(), vec![admin, audit]));

        let transforms = TransformTable::new().with(
            "roles",
            many_to_domain(role_shape, RenameTable::new(), TransformTable::new()),
        );

        let adapter = StoreAdapter::new(Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        }));
        let user = adapter
            .from_persisted(&record, &shape, &RenameTable::new(), &transforms)
            .unwrap();

        let Some(Value::Array(roles)) = user.get("roles") else {
            panic!("roles should be an array");
        };
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].as_map().unwrap().get_str("name"), Some("admin"));
        assert!(!roles[0].as_map().unwrap().contains("internal_id"));
        assert_eq!(roles[1].as_map().unwrap().get_str("name"), Some("audit"));
    }

    #[test]
    fn disallowed_filter_field_never_touches_the_store() {
        let store = Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        });
        let adapter = StoreAdapter::new(store.clone());

        let err = adapter
            .fetch(
                "password",
                &Value::String("hunter2".into()),
                &user_shape(),
                &RenameTable::new(),
                &TransformTable::new(),
            )
            .unwrap_err();

        match err {
            ConvertError::UnsupportedFilterField { field } => assert_eq!(field, "password"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn fetch_miss_is_none_not_an_error() {
        let adapter = StoreAdapter::new(Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        }));

        let found = adapter
            .fetch(
                "username",
                &Value::String("nobody".into()),
                &user_shape(),
                &RenameTable::new(),
                &TransformTable::new(),
            )
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn fetch_raw_skips_conversion() {
        let adapter = StoreAdapter::new(Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        }));

        let raw = adapter
            .fetch_raw("username", &Value::String("johndoe".into()))
            .unwrap()
            .expect("record should match");

        // raw record still exposes storage-side names
        let Some(Stored::Value(v)) = raw.read("email_address") else {
            panic!("raw record should expose email_address");
        };
        assert_eq!(v, Value::String("x@y.com".into()));
    }

    #[test]
    fn custom_policy_extends_the_allow_list() {
        let adapter = StoreAdapter::new(Arc::new(StubStore {
            record: stored_user(),
            calls: AtomicUsize::new(0),
        }))
        .with_policy(FetchPolicy {
            allow: vec!["phone".into()],
        });

        assert!(adapter.fetch_raw("phone", &Value::Null).unwrap().is_none());
        assert!(matches!(
            adapter.fetch_raw("username", &Value::Null).unwrap_err(),
            ConvertError::UnsupportedFilterField { .. }
        ));
    }
}
