//! Create/edit form state.
//!
//! The form is either creating a new profile or editing an existing one.
//! `submission` turns the current values into the request payload for the
//! active mode; it is pure and never touches the store or the network.

use crate::error::ValidationError;
use crate::types::{CreateProfile, UpdateProfile, UserProfile};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Editing(String),
}

/// Field values bound to the form inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone_number: None,
            country: None,
            avatar_url: None,
            is_active: true,
        }
    }
}

/// Payload ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(CreateProfile),
    Update { id: String, changes: UpdateProfile },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    mode: FormMode,
    values: FormValues,
}

impl ProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Editing(id) => Some(id),
            FormMode::Create => None,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut FormValues {
        &mut self.values
    }

    /// Switches to editing `profile`, loading its current values.
    pub fn begin_edit(&mut self, profile: &UserProfile) {
        self.mode = FormMode::Editing(profile.id.clone());
        self.values = FormValues {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone_number: profile.phone_number.clone(),
            country: profile.country.clone(),
            avatar_url: profile.avatar_url.clone(),
            is_active: profile.is_active,
        };
    }

    pub fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.values = FormValues::default();
    }

    pub fn set_avatar_url(&mut self, url: impl Into<String>) {
        self.values.avatar_url = Some(url.into());
    }

    pub fn remove_avatar(&mut self) {
        self.values.avatar_url = None;
    }

    /// Builds the payload for the current mode. Name and email are required
    /// in both modes; an update sends the whole current snapshot. A removed
    /// avatar is sent as an empty `avatarUrl`, which the server reads as a
    /// clear; leaving the field out would keep the stored image.
    pub fn submission(&self) -> Result<Submission, ValidationError> {
        let values = &self.values;
        if values.full_name.is_empty() {
            return Err(ValidationError::MissingField("fullName"));
        }
        if values.email.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }

        Ok(match &self.mode {
            FormMode::Create => Submission::Create(CreateProfile {
                full_name: values.full_name.clone(),
                email: values.email.clone(),
                phone_number: values.phone_number.clone(),
                country: values.country.clone(),
                avatar_url: values.avatar_url.clone(),
                is_active: Some(values.is_active),
            }),
            FormMode::Editing(id) => Submission::Update {
                id: id.clone(),
                changes: UpdateProfile {
                    full_name: Some(values.full_name.clone()),
                    email: Some(values.email.clone()),
                    phone_number: values.phone_number.clone(),
                    country: values.country.clone(),
                    avatar_url: Some(values.avatar_url.clone().unwrap_or_default()),
                    is_active: Some(values.is_active),
                },
            },
        })
    }
}
