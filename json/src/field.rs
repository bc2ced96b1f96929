use jzon::JsonValue;

use crate::ImportError;

/// A value of the document together with its path, used to name the field in errors.
#[derive(Clone)]
pub(crate) struct Field<'a> {
    value: &'a JsonValue,
    path: String,
}

impl<'a> Field<'a> {
    pub fn root(value: &'a JsonValue) -> Self {
        Field { value, path: "$".to_owned() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn invalid(&self, reason: impl Into<String>) -> ImportError {
        ImportError::Invalid { path: self.path.clone(), reason: reason.into() }
    }

    fn mismatch(&self, expected: &'static str) -> ImportError {
        ImportError::Type { path: self.path.clone(), expected }
    }

    pub fn optional(&self, key: &str) -> Result<Option<Field<'a>>, ImportError> {
        if !self.value.is_object() {
            return Err(self.mismatch("object"));
        }
        let value = &self.value[key];
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(Field { value, path: format!("{}.{key}", self.path) }))
    }

    pub fn get(&self, key: &str) -> Result<Field<'a>, ImportError> {
        self.optional(key)?.ok_or_else(|| ImportError::Missing(format!("{}.{key}", self.path)))
    }

    pub fn items(&self) -> Result<Vec<Field<'a>>, ImportError> {
        if !self.value.is_array() {
            return Err(self.mismatch("array"));
        }
        let items = self.value.members().enumerate();
        Ok(items.map(|(index, value)| Field { value, path: format!("{}[{index}]", self.path) }).collect())
    }

    /// Items of the array under `key`; an absent array is empty.
    pub fn items_of(&self, key: &str) -> Result<Vec<Field<'a>>, ImportError> {
        match self.optional(key)? {
            Some(field) => field.items(),
            None => Ok(Vec::new()),
        }
    }

    pub fn entries(&self) -> Result<Vec<(&'a str, Field<'a>)>, ImportError> {
        if !self.value.is_object() {
            return Err(self.mismatch("object"));
        }
        let entries = self.value.entries();
        Ok(entries.map(|(key, value)| (key, Field { value, path: format!("{}.{key}", self.path) })).collect())
    }

    pub fn is_str(&self) -> bool {
        self.value.is_string()
    }

    pub fn str(&self) -> Result<&'a str, ImportError> {
        self.value.as_str().ok_or_else(|| self.mismatch("string"))
    }

    pub fn u32(&self) -> Result<u32, ImportError> {
        self.value.as_u32().ok_or_else(|| self.mismatch("unsigned integer"))
    }

    /// A bit width; zero is rejected.
    pub fn width(&self) -> Result<u32, ImportError> {
        match self.u32()? {
            0 => Err(self.invalid("width must be at least 1")),
            width => Ok(width),
        }
    }

    pub fn u64(&self) -> Result<u64, ImportError> {
        self.value.as_u64().ok_or_else(|| self.mismatch("unsigned integer"))
    }

    pub fn i64(&self) -> Result<i64, ImportError> {
        self.value.as_i64().ok_or_else(|| self.mismatch("integer"))
    }

    pub fn bool(&self) -> Result<bool, ImportError> {
        self.value.as_bool().ok_or_else(|| self.mismatch("boolean"))
    }

    pub fn string_at(&self, key: &str) -> Result<String, ImportError> {
        Ok(self.get(key)?.str()?.to_owned())
    }

    pub fn u32_at(&self, key: &str) -> Result<u32, ImportError> {
        self.get(key)?.u32()
    }

    pub fn width_at(&self, key: &str) -> Result<u32, ImportError> {
        self.get(key)?.width()
    }

    pub fn u32_or(&self, key: &str, default: u32) -> Result<u32, ImportError> {
        self.optional(key)?.map_or(Ok(default), |field| field.u32())
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ImportError> {
        self.optional(key)?.map_or(Ok(default), |field| field.bool())
    }
}
