//! Profile model for storage and API.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Maximum length of a profile bio, in characters.
pub const MAX_BIO_CHARS: usize = 150;

/// Stored row of the `profiles` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Profile {
    /// Auth user ID (also the primary key)
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(length(max = 150))]
    pub bio: String,
    /// Storage object path of the avatar, empty when unset
    #[serde(default, deserialize_with = "null_as_empty")]
    pub avatar_url: String,
}

impl Profile {
    /// Blank profile created on first access.
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_columns_become_empty_strings() {
        let json = serde_json::json!({
            "id": "0c9f54a4-64a5-4a59-9c3f-7cbb0a3b9c2d",
            "name": null,
            "location": "Palo Alto",
            "bio": null,
        });

        let profile: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.name, "");
        assert_eq!(profile.location, "Palo Alto");
        assert_eq!(profile.avatar_url, "");
    }

    #[test]
    fn test_bio_length_is_validated_in_characters() {
        let mut profile = Profile::empty(Uuid::new_v4());
        profile.bio = "é".repeat(MAX_BIO_CHARS);
        assert!(profile.validate().is_ok());

        profile.bio.push('!');
        assert!(profile.validate().is_err());
    }
}
