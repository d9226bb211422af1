//! Operator (directory entry) model and session claims

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::Role;

/// Station operator, as read from the profile directory
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// "SURNAME Firstname"
    pub name: String,
    /// Grade (Sapeur, Caporal, Sergent...)
    pub rank: String,
    pub role: Role,
    pub email: Option<String>,
    /// Badge number
    pub matricule: Option<String>,
    /// Home station
    pub caserne: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Profile row from the remote directory
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub rank: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub matricule: Option<String>,
    pub caserne: Option<String>,
}

impl From<ProfileRow> for User {
    fn from(row: ProfileRow) -> Self {
        let name = display_name(row.first_name.as_deref(), row.last_name.as_deref())
            .or_else(|| row.email.clone())
            .unwrap_or_else(|| row.id.to_string());

        User {
            id: row.id,
            name,
            rank: row.rank.unwrap_or_default(),
            role: Role::from(row.role.as_deref()),
            email: row.email,
            matricule: row.matricule,
            caserne: row.caserne,
        }
    }
}

/// Build "SURNAME Firstname" from whatever parts are filled in
fn display_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let first = first.map(str::trim).filter(|s| !s.is_empty());
    let last = last.map(str::trim).filter(|s| !s.is_empty());
    match (last, first) {
        (Some(l), Some(f)) => Some(format!("{} {}", l.to_uppercase(), f)),
        (Some(l), None) => Some(l.to_uppercase()),
        (None, Some(f)) => Some(f.to_string()),
        (None, None) => None,
    }
}

/// Session claims carried by the identity provider's bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Operator id
    pub sub: Uuid,
    pub email: Option<String>,
    pub exp: i64,
    pub iat: Option<i64>,
}

impl UserClaims {
    /// Verify an HS256 token with the provider's shared secret
    pub fn from_token(
        token: &str,
        secret: &str,
        audience: Option<&str>,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};

        let mut validation = Validation::default();
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}
