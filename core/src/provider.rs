//! Schema lookup seam.

use crate::error::SchemaError;
use crate::types::ResourceSchema;

/// Source of resource schemas.
///
/// Implementations load schemas once and hand out shared references for
/// the rest of the process.
pub trait SchemaProvider {
    /// Looks up a resource schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ResourceNotFound`] for unknown resources, or
    /// [`SchemaError::Unavailable`] if the schema source cannot be loaded.
    fn schema(&self, resource: &str) -> Result<&ResourceSchema, SchemaError>;
}

impl SchemaProvider for [ResourceSchema] {
    fn schema(&self, resource: &str) -> Result<&ResourceSchema, SchemaError> {
        self.iter()
            .find(|s| s.name == resource)
            .ok_or_else(|| SchemaError::ResourceNotFound(resource.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_provider_lookup() {
        let schemas = vec![
            ResourceSchema::new("smart_class_parameters"),
            ResourceSchema::new("override_values"),
        ];

        assert_eq!(
            schemas.as_slice().schema("override_values").unwrap().name,
            "override_values"
        );
        assert_eq!(
            schemas.as_slice().schema("hosts").unwrap_err(),
            SchemaError::ResourceNotFound("hosts".to_string())
        );
    }
}
