//! User entity, category-specific profiles, and provisioning commands.
//!
//! A user's category (Admin, Trainer, Student) determines which profile it
//! owns. The profile is modelled as a tagged variant so a user can never
//! carry a profile that disagrees with its category; the store enforces the
//! same rule transactionally on the profile tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::batch::BatchSummary;

/// Validation errors returned by user command constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyEmail,
    InvalidEmail,
    InvalidMobile,
    EmptyCredential,
    BlankStudentField { field: &'static str },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain a local part and a domain"),
            Self::InvalidMobile => write!(f, "mobile number must be positive"),
            Self::EmptyCredential => write!(f, "password credential must not be empty"),
            Self::BlankStudentField { field } => {
                write!(f, "student field {field} must not be blank")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Validated email address.
///
/// Only structural validity is checked here; deliverability is a collaborator
/// concern. Global uniqueness is enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`] from owned input.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let Some((local, domain)) = email.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Discriminant selecting which profile a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Admin,
    Trainer,
    Student,
}

impl Category {
    /// Stable string form used by the relational store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Trainer => "Trainer",
            Self::Student => "Student",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Admin" => Some(Self::Admin),
            "Trainer" => Some(Self::Trainer),
            "Student" => Some(Self::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role held by an admin user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    SuperAdmin,
    SubAdmin,
}

impl AdminRole {
    /// Stable string form used by the relational store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::SubAdmin => "SubAdmin",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SuperAdmin" => Some(Self::SuperAdmin),
            "SubAdmin" => Some(Self::SubAdmin),
            _ => None,
        }
    }
}

/// Seniority of a trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainerRole {
    SrTrainer,
    JrTrainer,
}

impl TrainerRole {
    /// Stable string form used by the relational store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SrTrainer => "SrTrainer",
            Self::JrTrainer => "JrTrainer",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SrTrainer" => Some(Self::SrTrainer),
            "JrTrainer" => Some(Self::JrTrainer),
            _ => None,
        }
    }
}

/// How a student attends their course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearningMode {
    Online,
    Offline,
    Hybrid,
}

impl LearningMode {
    /// Stable string form used by the relational store.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Hybrid => "Hybrid",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Online" => Some(Self::Online),
            "Offline" => Some(Self::Offline),
            "Hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

/// Category-specific attributes attached 1:1 to a user.
///
/// The variant is the category, so a mismatched profile cannot be expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all_fields = "camelCase")]
pub enum ProfileData {
    Admin {
        role: AdminRole,
    },
    Trainer {
        role: TrainerRole,
    },
    Student {
        course_id: i32,
        learning_mode: LearningMode,
        fee_detail: String,
        payment_mode: String,
    },
}

impl ProfileData {
    /// The category this profile belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::Admin { .. } => Category::Admin,
            Self::Trainer { .. } => Category::Trainer,
            Self::Student { .. } => Category::Student,
        }
    }
}

/// Application user with its category profile.
///
/// The password credential is deliberately absent: it is written through
/// provisioning commands and never read back out of the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: i32,
    name: String,
    email: EmailAddress,
    mobile: i64,
    #[serde(flatten)]
    profile: ProfileData,
}

impl User {
    /// Assemble a user from store-validated components.
    pub fn new(id: i32, name: String, email: EmailAddress, mobile: i64, profile: ProfileData) -> Self {
        Self {
            id,
            name,
            email,
            mobile,
            profile,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Full name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Contact number.
    pub fn mobile(&self) -> i64 {
        self.mobile
    }

    /// The category derived from the owned profile.
    pub fn category(&self) -> Category {
        self.profile.category()
    }

    /// Category-specific profile attributes.
    pub fn profile(&self) -> &ProfileData {
        &self.profile
    }
}

/// A user enriched with the batch associations relevant to its category.
///
/// Only students carry batch memberships; for other categories the list is
/// empty and omitted from serialised snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<BatchSummary>,
}

/// Command to provision a new user together with its profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    name: String,
    email: EmailAddress,
    credential: String,
    mobile: i64,
    profile: ProfileData,
}

impl NewUser {
    /// Validate and construct a provisioning command.
    ///
    /// The credential is expected to be hashed (or ready for hashing) by the
    /// calling layer; it is only checked for presence here.
    pub fn new(
        name: impl Into<String>,
        email: EmailAddress,
        credential: impl Into<String>,
        mobile: i64,
        profile: ProfileData,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let credential = credential.into();
        if credential.trim().is_empty() {
            return Err(UserValidationError::EmptyCredential);
        }
        if mobile <= 0 {
            return Err(UserValidationError::InvalidMobile);
        }
        validate_student_fields(&profile)?;

        Ok(Self {
            name,
            email,
            credential,
            mobile,
            profile,
        })
    }

    /// Full name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Unique email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Opaque password credential to persist.
    pub fn credential(&self) -> &str {
        self.credential.as_str()
    }

    /// Contact number.
    pub fn mobile(&self) -> i64 {
        self.mobile
    }

    /// Profile to create alongside the user row.
    pub fn profile(&self) -> &ProfileData {
        &self.profile
    }
}

fn validate_student_fields(profile: &ProfileData) -> Result<(), UserValidationError> {
    if let ProfileData::Student {
        fee_detail,
        payment_mode,
        ..
    } = profile
    {
        if fee_detail.trim().is_empty() {
            return Err(UserValidationError::BlankStudentField {
                field: "fee_detail",
            });
        }
        if payment_mode.trim().is_empty() {
            return Err(UserValidationError::BlankStudentField {
                field: "payment_mode",
            });
        }
    }
    Ok(())
}

/// Partial update for the profile matching the user's current category.
///
/// Supplying a variant that disagrees with the stored category is rejected:
/// category is immutable once a user is provisioned.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfilePatch {
    Admin {
        role: AdminRole,
    },
    Trainer {
        role: TrainerRole,
    },
    Student {
        course_id: Option<i32>,
        learning_mode: Option<LearningMode>,
        fee_detail: Option<String>,
        payment_mode: Option<String>,
    },
}

impl ProfilePatch {
    /// The category this patch applies to.
    pub fn category(&self) -> Category {
        match self {
            Self::Admin { .. } => Category::Admin,
            Self::Trainer { .. } => Category::Trainer,
            Self::Student { .. } => Category::Student,
        }
    }
}

/// Partial update for a user and its profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<EmailAddress>,
    pub credential: Option<String>,
    pub mobile: Option<i64>,
    pub profile: Option<ProfilePatch>,
}

impl UserPatch {
    /// Whether any base user column is touched by this patch.
    pub fn has_base_changes(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.credential.is_some()
            || self.mobile.is_some()
    }

    /// Check field-level constraints that do not need store access.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(UserValidationError::EmptyName);
            }
        }
        if let Some(credential) = &self.credential {
            if credential.trim().is_empty() {
                return Err(UserValidationError::EmptyCredential);
            }
        }
        if matches!(self.mobile, Some(mobile) if mobile <= 0) {
            return Err(UserValidationError::InvalidMobile);
        }
        if let Some(ProfilePatch::Student {
            fee_detail,
            payment_mode,
            ..
        }) = &self.profile
        {
            if matches!(fee_detail.as_deref(), Some(value) if value.trim().is_empty()) {
                return Err(UserValidationError::BlankStudentField {
                    field: "fee_detail",
                });
            }
            if matches!(payment_mode.as_deref(), Some(value) if value.trim().is_empty()) {
                return Err(UserValidationError::BlankStudentField {
                    field: "payment_mode",
                });
            }
        }
        Ok(())
    }
}

/// Trainer fields embedded in course and batch snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerSummary {
    pub id: i32,
    pub name: String,
    pub email: EmailAddress,
    pub role: TrainerRole,
}

/// Student fields embedded in batch and course snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: i32,
    pub name: String,
    pub email: EmailAddress,
    pub mobile: i64,
}
