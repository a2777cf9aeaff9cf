use std::fmt;

use crate::entity::{identified_by_id, random_id};
use crate::error::BlackbookResult;
use crate::mapping::{BusinessObject, Hydrated, MappingResult, Property, Site, Slot, ValueKind};
use crate::password::{hash_password, verify_password};

/// A user who can log in. Only the password hash is ever stored.
#[derive(Debug, Clone)]
pub struct UserBo {
    pub id: String,
    pub username: String,
    pub name: String,
    hashed_password: String,
}

identified_by_id!(UserBo);

impl Default for UserBo {
    fn default() -> Self {
        UserBo {
            id: random_id(),
            username: String::new(),
            name: String::new(),
            hashed_password: String::new(),
        }
    }
}

pub fn user_bo(init: impl FnOnce(&mut UserBo)) -> UserBo {
    let mut bo = UserBo::default();
    init(&mut bo);
    bo
}

impl UserBo {
    /// What a password field shows: the stored hash.
    pub fn password(&self) -> &str {
        &self.hashed_password
    }

    /// Hash and store `password`. Handing back the current hash (an
    /// untouched password field) keeps it as is.
    pub fn set_password(&mut self, password: &str) -> BlackbookResult<()> {
        if password != self.hashed_password {
            self.hashed_password = hash_password(password)?;
        }
        Ok(())
    }

    pub fn matches(&self, password: &str) -> bool {
        if self.hashed_password.is_empty() {
            return false;
        }
        verify_password(password, &self.hashed_password).unwrap_or(false)
    }
}

impl fmt::Display for UserBo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl BusinessObject for UserBo {
    fn id(&self) -> &str {
        &self.id
    }

    fn properties() -> Vec<Property> {
        vec![
            Property::required("id", ValueKind::Text),
            Property::required("username", ValueKind::Text),
            Property::required("name", ValueKind::Text),
            Property::required("hashedPassword", ValueKind::Text),
            Property::required("password", ValueKind::Text).ignored(),
        ]
    }

    fn read(&self, property: &str) -> Option<Slot> {
        match property {
            "id" => Some(Slot::value(self.id.clone())),
            "username" => Some(Slot::value(self.username.clone())),
            "name" => Some(Slot::value(self.name.clone())),
            "hashedPassword" => Some(Slot::value(self.hashed_password.clone())),
            _ => None,
        }
    }

    fn write(&mut self, property: &str, value: Hydrated) -> MappingResult<()> {
        let site = Site::of::<Self>(property);
        match property {
            "id" => self.id = value.value(&site)?,
            "username" => self.username = value.value(&site)?,
            "name" => self.name = value.value(&site)?,
            "hashedPassword" => self.hashed_password = value.value(&site)?,
            _ => return Err(site.unknown()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_hashed_and_matches() {
        let mut user = user_bo(|u| u.username = "bait".into());
        user.set_password("secret").unwrap();

        assert_ne!(user.password(), "secret");
        assert!(user.matches("secret"));
        assert!(!user.matches("guess"));
    }

    #[test]
    fn test_resubmitting_the_hash_keeps_it() {
        let mut user = UserBo::default();
        user.set_password("secret").unwrap();
        let hash = user.password().to_string();

        user.set_password(&hash).unwrap();
        assert_eq!(user.password(), hash);
        assert!(user.matches("secret"));
    }

    #[test]
    fn test_user_without_password_never_matches() {
        assert!(!UserBo::default().matches(""));
    }
}
