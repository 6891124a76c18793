//! Type-keyed model cache.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{Entity, Field, Model};
use crate::error::{OrmError, Result};

const TAG_COLUMN: &str = "column";

/// Override applied to a model after parsing and before it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOption {
    /// Use this table name instead of the derived one.
    TableName(String),
    /// Map the given Rust field to this column name.
    ColumnName {
        /// Rust field name.
        field: String,
        /// Column name to use.
        column: String,
    },
}

/// Cache of parsed models, keyed by type identity.
///
/// A registry is usually created once per database handle and shared by
/// every session derived from it. Parsing is deterministic, so two callers
/// racing on the first lookup of a type observe the same metadata.
#[derive(Debug, Default)]
pub struct Registry {
    models: RwLock<HashMap<TypeId, Arc<Model>>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the model for `T`, parsing and caching it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::InvalidTag`] if a field tag is malformed.
    pub fn get<T: Entity>(&self) -> Result<Arc<Model>> {
        let type_id = TypeId::of::<T>();
        {
            let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(model) = models.get(&type_id) {
                return Ok(Arc::clone(model));
            }
        }

        let model = Arc::new(parse::<T>()?);
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        let entry = models.entry(type_id).or_insert_with(|| {
            debug!(table = %model.table_name(), entity = model.type_name(), "registered model");
            Arc::clone(&model)
        });
        Ok(Arc::clone(entry))
    }

    /// Parses `T`, applies `options` and stores the result, replacing any
    /// model cached for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::InvalidTag`] for a malformed tag and
    /// [`OrmError::UnknownField`] if an option names a missing field.
    /// Mapping a field to a column another field uses fails with
    /// [`OrmError::DuplicateColumn`].
    pub fn register<T: Entity>(&self, options: &[ModelOption]) -> Result<Arc<Model>> {
        let mut model = parse::<T>()?;
        for option in options {
            match option {
                ModelOption::TableName(name) => model.set_table_name(name.clone()),
                ModelOption::ColumnName { field, column } => {
                    model.rename_column(field, column.clone())?;
                }
            }
        }

        let model = Arc::new(model);
        debug!(table = %model.table_name(), entity = model.type_name(), "registered model");
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Arc::clone(&model));
        Ok(model)
    }

    /// Returns the number of cached models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no model has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse<T: Entity>() -> Result<Model> {
    let mut fields = Vec::with_capacity(T::FIELDS.len());
    for desc in T::FIELDS {
        let tags = parse_tag(desc.tag)?;
        let column = tags
            .get(TAG_COLUMN)
            .filter(|column| !column.is_empty())
            .map_or_else(|| underscore_name(desc.name), |column| (*column).to_string());
        fields.push(Field {
            name: desc.name,
            column,
            offset: desc.offset,
            kind: desc.kind,
            nullable: desc.nullable,
            read: desc.read,
            write: desc.write,
        });
    }

    let table_name = T::TABLE_NAME
        .filter(|name| !name.is_empty())
        .map_or_else(|| underscore_name(short_type_name::<T>()), ToString::to_string);

    Model::new(TypeId::of::<T>(), type_name::<T>(), table_name, fields)
}

fn parse_tag(tag: &str) -> Result<HashMap<&str, &str>> {
    let mut pairs = HashMap::new();
    if tag.trim().is_empty() {
        return Ok(pairs);
    }
    for pair in tag.split(',') {
        let parts: Vec<&str> = pair.split('=').collect();
        if parts.len() != 2 {
            return Err(OrmError::InvalidTag(pair.to_string()));
        }
        pairs.insert(parts[0].trim(), parts[1].trim());
    }
    Ok(pairs)
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Converts a `CamelCase` identifier to `snake_case`.
///
/// Already snake_case input is returned unchanged.
#[must_use]
pub fn underscore_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
