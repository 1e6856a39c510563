use serde::{Serialize, de::DeserializeOwned};

use super::descriptor::TypeDescriptor;
use crate::errors::ApiError;

/// A persisted record as seen by the facade: a JSON object keyed by attribute name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Capability implemented once per concrete record type.
///
/// Replaces runtime class lookup: a type only becomes reachable through the
/// facade after it is added to a [`Registry`](super::Registry), and everything
/// the query engine knows about it comes from [`Resource::describe`].
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// pub struct Customer {
///     pub id: Option<i64>,
///     pub name: String,
///     pub country: String,
/// }
///
/// impl Resource for Customer {
///     const TYPE_ID: &'static str = "customer";
///
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::new(Self::TYPE_ID, "customers")
///             .attribute("name", ValueDomain::Text)
///             .attribute("country", ValueDomain::Text)
///     }
/// }
/// ```
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable registry identifier; must equal `describe().name`
    const TYPE_ID: &'static str;

    fn describe() -> TypeDescriptor;

    /// Turn raw request data into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` when the data does not decode as `Self`.
    fn bind(raw: serde_json::Value) -> Result<Self, ApiError> {
        serde_json::from_value(raw)
            .map_err(|e| ApiError::bad_request(format!("Invalid {} payload: {e}", Self::TYPE_ID)))
    }

    /// Typed record into the generic record shape.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if `Self` does not serialize to a JSON object.
    fn into_record(self) -> Result<Record, ApiError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(ApiError::bad_request(format!(
                "{} must serialize to an object",
                Self::TYPE_ID
            ))),
            Err(e) => Err(ApiError::bad_request(format!(
                "Invalid {} record: {e}",
                Self::TYPE_ID
            ))),
        }
    }

    /// Generic record back into `Self`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` when the stored row does not fit `Self`.
    fn from_record(record: Record) -> Result<Self, ApiError> {
        Self::bind(serde_json::Value::Object(record))
    }
}
