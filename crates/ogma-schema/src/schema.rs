//! Schema construction and the validation/coercion pipeline.

use crate::error::SchemaError;
use crate::types::{Coercion, IndexType, ScalarType, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A field-value map, as stored by and returned from the remote store.
pub type Record = serde_json::Map<String, Value>;

/// A declared field structure: field name → descriptor.
pub type FieldStructure = BTreeMap<String, FieldSpec>;

/// Field names must be identifiers.
const IDENTIFIER_PATTERN: &str = r"^[$A-Za-z_][0-9A-Za-z_$]*$";

/// Diagnostic attached to pattern violations when the field declares none.
const DEFAULT_MESSAGE: &str = "There is an error";

// ============================================================================
// Field Descriptors
// ============================================================================

/// Declared descriptor for a single vertex field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Scalar type the remote property is created with.
    #[serde(rename = "type")]
    pub field_type: ScalarType,
    /// Optional index created when the property is first reconciled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexType>,
    /// Optional pattern string values must match.
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Diagnostic message for pattern violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldSpec {
    pub fn new(field_type: ScalarType) -> Self {
        Self {
            field_type,
            index: None,
            pattern: None,
            message: None,
        }
    }

    pub fn indexed(field_type: ScalarType, index: IndexType) -> Self {
        Self {
            index: Some(index),
            ..Self::new(field_type)
        }
    }

    pub fn with_pattern(mut self, pattern: &str, message: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self.message = Some(message.to_string());
        self
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

/// A single field-level validation violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Value does not fit the field's type bucket (after coercion).
    Type,
    /// Value fits the type but fails the declared `match` pattern.
    Pattern,
}

// ============================================================================
// Schema
// ============================================================================

/// Derived per-field view the validator runs against. `index` is stripped:
/// it concerns reconciliation, not record shape.
#[derive(Debug, Clone)]
struct FieldValidator {
    kind: ValueKind,
    coercion: Option<Coercion>,
    pattern: Option<Regex>,
    message: String,
}

/// A validated, immutable vertex class declaration.
///
/// Constructed once per declared model. [`Schema::validate`] keeps the
/// last-call-wins `errors` scratch slot; concurrent callers use the pure
/// [`Schema::check`] instead of sharing one instance's scratch state.
#[derive(Debug, Clone)]
pub struct Schema {
    structure: FieldStructure,
    validators: BTreeMap<String, FieldValidator>,
    errors: Vec<FieldError>,
}

impl Schema {
    /// Build a schema from a typed field structure.
    ///
    /// Fails with [`SchemaError::VertexSchema`] listing every field whose
    /// name is not an identifier or whose `match` pattern does not compile.
    pub fn new(structure: FieldStructure) -> Result<Self, SchemaError> {
        let identifier = Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid");

        let mut errors = Vec::new();
        let mut validators = BTreeMap::new();

        for (name, spec) in &structure {
            if !identifier.is_match(name) {
                errors.push(format!("field `{name}`: name is not a valid identifier"));
                continue;
            }

            let pattern = match &spec.pattern {
                Some(raw) => match Regex::new(raw) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        errors.push(format!("field `{name}`: invalid match pattern: {err}"));
                        continue;
                    }
                },
                None => None,
            };

            validators.insert(
                name.clone(),
                FieldValidator {
                    kind: spec.field_type.value_kind(),
                    coercion: spec.field_type.coercion(),
                    pattern,
                    message: spec
                        .message
                        .clone()
                        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
                },
            );
        }

        if !errors.is_empty() {
            return Err(SchemaError::VertexSchema { errors });
        }

        Ok(Self {
            structure,
            validators,
            errors: Vec::new(),
        })
    }

    /// Build a schema from an untyped JSON declaration.
    ///
    /// This is the ingestion path for declarations that arrive as data
    /// rather than code. Unlike [`Schema::new`], the type tags are free
    /// text here, so unsupported scalar types are caught and reported —
    /// accumulated across every field before failing.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        let Some(fields) = value.as_object() else {
            return Err(SchemaError::VertexSchema {
                errors: vec!["vertex schema must be an object".to_string()],
            });
        };

        let mut errors = Vec::new();
        let mut structure = FieldStructure::new();

        for (name, descriptor) in fields {
            let Some(descriptor) = descriptor.as_object() else {
                errors.push(format!("field `{name}`: descriptor must be an object"));
                continue;
            };

            let field_type = match descriptor.get("type").and_then(Value::as_str) {
                Some(tag) => match ScalarType::from_tag(tag) {
                    Some(ty) => ty,
                    None => {
                        errors.push(format!(
                            "field `{name}`: type `{tag}` is not supported by ogma"
                        ));
                        continue;
                    }
                },
                None => {
                    errors.push(format!("field `{name}`: missing required key `type`"));
                    continue;
                }
            };

            let index = match descriptor.get("index").and_then(Value::as_str) {
                Some(tag) => match IndexType::from_tag(tag) {
                    Some(index) => Some(index),
                    None => {
                        errors.push(format!("field `{name}`: unknown index type `{tag}`"));
                        continue;
                    }
                },
                None => None,
            };

            structure.insert(
                name.clone(),
                FieldSpec {
                    field_type,
                    index,
                    pattern: descriptor
                        .get("match")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    message: descriptor
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                },
            );
        }

        match Self::new(structure) {
            Ok(schema) if errors.is_empty() => Ok(schema),
            Ok(_) => Err(SchemaError::VertexSchema { errors }),
            Err(SchemaError::VertexSchema { errors: more }) => {
                errors.extend(more);
                Err(SchemaError::VertexSchema { errors })
            }
        }
    }

    /// The declared structure, exactly as constructed.
    pub fn structure(&self) -> &FieldStructure {
        &self.structure
    }

    /// The declared field names, in deterministic order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.structure.keys().map(String::as_str)
    }

    /// Validate a record, coercing matching fields in place.
    ///
    /// Violations are stored in the `errors` scratch slot (last call wins);
    /// returns true iff the record is valid.
    pub fn validate(&mut self, record: &mut Record) -> bool {
        self.errors = match self.check(record) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };
        self.errors.is_empty()
    }

    /// Violations collected by the last [`Schema::validate`] call.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Pure validation: coerces the record in place and returns the full
    /// violation list instead of touching the scratch slot.
    pub fn check(&self, record: &mut Record) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        for (field, validator) in &self.validators {
            let Some(value) = record.get_mut(field) else {
                continue;
            };

            // Coerce first; a literal the parser rejects is left untouched
            // so the kind check below reports it.
            if let Some(coercion) = validator.coercion {
                coerce_in_place(value, coercion);
            }

            let fits = match validator.kind {
                ValueKind::Number => value.is_number(),
                ValueKind::Boolean => value.is_boolean(),
                ValueKind::String => value.is_string(),
                ValueKind::Date => value.as_str().is_some_and(|s| parse_date(s).is_some()),
            };

            if !fits {
                errors.push(FieldError {
                    field: field.clone(),
                    kind: ViolationKind::Type,
                    message: format!("expected a {} value", validator.kind),
                });
                continue;
            }

            if let (Some(pattern), Some(s)) = (&validator.pattern, value.as_str()) {
                if !pattern.is_match(s) {
                    errors.push(FieldError {
                        field: field.clone(),
                        kind: ViolationKind::Pattern,
                        message: validator.message.clone(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// Coercion Primitives
// ============================================================================

fn coerce_in_place(value: &mut Value, coercion: Coercion) {
    let Some(raw) = value.as_str() else {
        return;
    };

    match coercion {
        Coercion::ToInteger => {
            if let Ok(n) = raw.trim().parse::<i64>() {
                *value = Value::from(n);
            }
        }
        Coercion::ToFloat => {
            if let Ok(n) = raw.trim().parse::<f64>() {
                if let Some(n) = serde_json::Number::from_f64(n) {
                    *value = Value::Number(n);
                }
            }
        }
        Coercion::ToDate => {
            if let Some(dt) = parse_date(raw) {
                *value = Value::String(dt.to_rfc3339());
            }
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD`.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}
