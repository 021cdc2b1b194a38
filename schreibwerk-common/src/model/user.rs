use crate::model::{Id, notification::Notification};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

pub const USERNAME_MAX_LEN: usize = 50;
pub const EMAIL_MAX_LEN: usize = 255;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

/// A user as handed to request handlers and returned by public endpoints.
/// The password hash never lives here; credentials are fetched separately.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub username: Username,
    pub email: Email,
    pub roles: Vec<Role>,
    pub blocked: bool,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// A user profile together with the social graph and inbox state.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    pub following: Vec<Id<UserMarker>>,
    pub followers: Vec<Id<UserMarker>>,
    pub notifications: Vec<Notification>,
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
pub struct RegisterUser {
    pub username: Username,
    pub email: Email,
    pub password: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Unknown role: {0}")]
pub struct InvalidRoleError(String);

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(InvalidRoleError(other.to_owned())),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        let len = username.chars().count();
        if len > 0 && len <= USERNAME_MAX_LEN {
            Ok(Username(username))
        } else {
            Err(InvalidUsernameError(username))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The email address is invalid: {0}")]
pub struct InvalidEmailError(String);

impl Email {
    pub fn new(email: String) -> Result<Self, InvalidEmailError> {
        let well_formed = email.len() <= EMAIL_MAX_LEN
            && email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());

        if well_formed {
            Ok(Email(email))
        } else {
            Err(InvalidEmailError(email))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Email::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Email"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::{Email, Role, USERNAME_MAX_LEN, Username};
    use std::str::FromStr;

    #[test]
    fn username_validation() {
        assert!(Username::new("a".to_owned()).is_ok());
        assert!(Username::new("some_user".to_owned()).is_ok());
        assert!(Username::new("x".repeat(USERNAME_MAX_LEN)).is_ok());

        assert!(Username::new(String::new()).is_err());
        assert!(Username::new("x".repeat(USERNAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn email_validation() {
        let legal = ["a@b", "someone@example.com", "a+tag@sub.example.org"];
        let illegal = ["", "plainaddress", "@example.com", "someone@"];

        for email in legal {
            assert!(Email::new(email.to_owned()).is_ok());
        }
        for email in illegal {
            assert!(Email::new(email.to_owned()).is_err());
        }
    }

    #[test]
    fn role_round_trip() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()), Ok(role));
        }
        assert!(Role::from_str("superuser").is_err());
    }
}
