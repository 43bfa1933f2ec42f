//! Tri-state field for update payloads.
//!
//! The Search Ads API treats a missing field as "leave unchanged" and an
//! explicit `null` as "clear". A plain `Option` cannot tell those apart, so
//! nullable fields on update bodies use [`Patch`] together with
//!
//! ```ignore
//! #[serde(default, skip_serializing_if = "Patch::is_omitted")]
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field is left out of the payload.
    Omit,
    /// Field is sent as `null`.
    Null,
    /// Field is sent with a value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Omit
    }
}

impl<T> Patch<T> {
    pub fn is_omitted(&self) -> bool {
        matches!(self, Patch::Omit)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Omit => Patch::Omit,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(value),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `None` becomes an explicit null; use [`Patch::Omit`] to leave a field out.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reachable when the field is not guarded by `skip_serializing_if`.
            Patch::Omit | Patch::Null => serializer.serialize_none(),
            Patch::Value(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A missing field never reaches here, `#[serde(default)]` yields `Omit`.
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Body {
        #[serde(default, skip_serializing_if = "Patch::is_omitted")]
        goal: Patch<u32>,
    }

    #[test]
    fn omitted_field_is_left_out() {
        let body = Body { goal: Patch::Omit };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({}));
    }

    #[test]
    fn null_field_is_sent_as_null() {
        let body = Body { goal: Patch::Null };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "goal": null }));
    }

    #[test]
    fn value_field_is_sent() {
        let body = Body { goal: Patch::Value(3) };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "goal": 3 }));
    }

    #[test]
    fn decoding_keeps_the_three_states_apart() {
        let omitted: Body = serde_json::from_value(json!({})).unwrap();
        let nulled: Body = serde_json::from_value(json!({ "goal": null })).unwrap();
        let valued: Body = serde_json::from_value(json!({ "goal": 7 })).unwrap();

        assert_eq!(omitted.goal, Patch::Omit);
        assert_eq!(nulled.goal, Patch::Null);
        assert_eq!(valued.goal, Patch::Value(7));
    }
}
