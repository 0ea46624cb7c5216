use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Role tag carried by identities, magic links and credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserType {
    #[default]
    Influencer,
    Brand,
    Admin,
}

impl UserType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Influencer => "influencer",
            Self::Brand => "brand",
            Self::Admin => "admin",
        }
    }

    /// Role requested by an unauthenticated client: defaults to influencer
    /// when absent, case-insensitive, and never `admin`.
    pub fn from_request(raw: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        match raw.parse::<Self>() {
            Ok(Self::Admin) => Err(AppError::validation(
                "user_type 'admin' cannot be requested",
            )),
            Ok(user_type) => Ok(user_type),
            Err(UnknownUserType(value)) => Err(AppError::validation(format!(
                "user_type must be one of influencer, brand (got '{value}')"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUserType(pub String);

impl FromStr for UserType {
    type Err = UnknownUserType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "influencer" => Ok(Self::Influencer),
            "brand" => Ok(Self::Brand),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownUserType(s.to_string())),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_defaults_to_influencer() {
        assert_eq!(UserType::from_request(None).unwrap(), UserType::Influencer);
        assert_eq!(UserType::from_request(Some("  ")).unwrap(), UserType::Influencer);
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(UserType::from_request(Some("Brand")).unwrap(), UserType::Brand);
        assert_eq!(
            UserType::from_request(Some("INFLUENCER")).unwrap(),
            UserType::Influencer
        );
    }

    #[test]
    fn unknown_and_admin_are_rejected() {
        assert!(matches!(
            UserType::from_request(Some("celebrity")),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            UserType::from_request(Some("Admin")),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn stored_admin_still_parses() {
        assert_eq!("admin".parse::<UserType>(), Ok(UserType::Admin));
    }
}
