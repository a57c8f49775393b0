//! Generic closed-object validation for untrusted request payloads
//!
//! Request shapes are declared once as static [`Schema`] descriptors and
//! walked generically over parsed JSON. A payload is accepted only if every
//! declared field is present with the declared shape and no undeclared field
//! appears. Validation is purely structural; it consults neither the fact
//! store nor the key registry.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Shape a declared field must have
#[derive(Debug)]
pub enum FieldKind {
    /// A JSON string
    Str,
    /// A nested object validated against the given schema
    Nested(&'static Schema),
    /// A sequence of nested objects, with a minimum length
    Many {
        schema: &'static Schema,
        at_least: usize,
    },
}

/// One declared field of a schema
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// A named, closed object shape: the declared fields and nothing else
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Structural validation failure.
///
/// The variant messages name the offending field and its containing schema;
/// they are logged server-side and never reach the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{schema}: expected a JSON object")]
    NotAnObject { schema: &'static str },

    #[error("{schema}: missing required field `{field}`")]
    RequiredField {
        schema: &'static str,
        field: &'static str,
    },

    #[error("{schema}: field `{field}` {reason}")]
    InvalidField {
        schema: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("{schema}: unrecognized field `{field}`")]
    UnrecognizedField { schema: &'static str, field: String },

    #[error("{schema}: malformed payload: {detail}")]
    Decode {
        schema: &'static str,
        detail: String,
    },
}

impl Schema {
    /// Validate a parsed JSON value against this schema
    pub fn validate(&'static self, value: &Value) -> Result<(), SchemaError> {
        let Some(object) = value.as_object() else {
            return Err(SchemaError::NotAnObject { schema: self.name });
        };

        for field in self.fields {
            let Some(field_value) = object.get(field.name) else {
                return Err(SchemaError::RequiredField {
                    schema: self.name,
                    field: field.name,
                });
            };
            self.validate_field(field, field_value)?;
        }

        for key in object.keys() {
            if !self.fields.iter().any(|field| field.name == key) {
                return Err(SchemaError::UnrecognizedField {
                    schema: self.name,
                    field: key.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_field(&'static self, field: &FieldSpec, value: &Value) -> Result<(), SchemaError> {
        match &field.kind {
            FieldKind::Str => {
                if !value.is_string() {
                    return Err(SchemaError::InvalidField {
                        schema: self.name,
                        field: field.name,
                        reason: format!("expected a string, got `{value}`"),
                    });
                }
                Ok(())
            }
            FieldKind::Nested(schema) => schema.validate(value),
            FieldKind::Many { schema, at_least } => {
                let Some(entries) = value.as_array() else {
                    return Err(SchemaError::InvalidField {
                        schema: self.name,
                        field: field.name,
                        reason: format!("expected a sequence, got `{value}`"),
                    });
                };
                if entries.len() < *at_least {
                    return Err(SchemaError::InvalidField {
                        schema: self.name,
                        field: field.name,
                        reason: format!(
                            "expects at least {at_least} entries, got {}",
                            entries.len()
                        ),
                    });
                }
                for entry in entries {
                    schema.validate(entry)?;
                }
                Ok(())
            }
        }
    }
}

/// Validate a value against a schema, then decode it into the typed request.
///
/// Sequences keep their input order through decoding.
pub fn decode<T: DeserializeOwned>(schema: &'static Schema, value: Value) -> Result<T, SchemaError> {
    schema.validate(&value)?;
    serde_json::from_value(value).map_err(|err| SchemaError::Decode {
        schema: schema.name,
        detail: err.to_string(),
    })
}

/// A single discriminating field: `{type, value}`
pub static DIF: Schema = Schema {
    name: "Dif",
    fields: &[
        FieldSpec {
            name: "type",
            kind: FieldKind::Str,
        },
        FieldSpec {
            name: "value",
            kind: FieldKind::Str,
        },
    ],
};

/// A named collection of at least one dif
pub static DIF_COLLECTION: Schema = Schema {
    name: "DifCollection",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::Str,
        },
        FieldSpec {
            name: "difs",
            kind: FieldKind::Many {
                schema: &DIF,
                at_least: 1,
            },
        },
    ],
};

/// A content item with at least one collection
pub static CONTENT_ITEM: Schema = Schema {
    name: "ContentItem",
    fields: &[
        FieldSpec {
            name: "id",
            kind: FieldKind::Str,
        },
        FieldSpec {
            name: "difcollections",
            kind: FieldKind::Many {
                schema: &DIF_COLLECTION,
                at_least: 1,
            },
        },
    ],
};

/// Identify request: key plus at least one content item
pub static IDENTIFY_REQUEST: Schema = Schema {
    name: "IdentifyRequest",
    fields: &[
        FieldSpec {
            name: "key",
            kind: FieldKind::Str,
        },
        FieldSpec {
            name: "contentItems",
            kind: FieldKind::Many {
                schema: &CONTENT_ITEM,
                at_least: 1,
            },
        },
    ],
};

/// Key registration request: super-key plus the key to mint
pub static KEY_REGISTRATION_REQUEST: Schema = Schema {
    name: "KeyRegistrationRequest",
    fields: &[
        FieldSpec {
            name: "superkey",
            kind: FieldKind::Str,
        },
        FieldSpec {
            name: "newkey",
            kind: FieldKind::Str,
        },
    ],
};
