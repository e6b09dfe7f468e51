//! Read-only projection of the store and form for whatever renders them.

use crate::form::ProfileForm;
use crate::store::ProfileStore;
use crate::types::UserProfile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone_number: Option<&'a str>,
    pub country: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub status: &'static str,
}

impl<'a> From<&'a UserProfile> for ProfileRow<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        Self {
            id: &profile.id,
            name: &profile.full_name,
            email: &profile.email,
            phone_number: profile.phone_number.as_deref(),
            country: profile.country.as_deref(),
            avatar_url: profile.avatar_url.as_deref(),
            status: status_label(profile.is_active),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Rows(Vec<ProfileRow<'a>>),
}

pub fn status_label(is_active: bool) -> &'static str {
    if is_active {
        "Active"
    } else {
        "Inactive"
    }
}

/// Loading wins over content, so a refresh in progress hides the stale list
/// and a store that was never fetched does not render as empty.
pub fn list_view(store: &ProfileStore) -> ListView<'_> {
    if store.loading() {
        ListView::Loading
    } else if store.is_empty() {
        ListView::Empty
    } else {
        ListView::Rows(store.profiles().iter().map(ProfileRow::from).collect())
    }
}

pub fn form_title(form: &ProfileForm) -> &'static str {
    if form.editing_id().is_some() {
        "Edit Profile"
    } else {
        "Add New Profile"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, is_active: bool) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            full_name: "Alan Turing".to_string(),
            email: "alan@example.com".to_string(),
            phone_number: None,
            country: Some("United Kingdom".to_string()),
            avatar_url: None,
            is_active,
            created_at: "t0".to_string(),
            updated_at: "t0".to_string(),
        }
    }

    #[test]
    fn unfetched_store_renders_loading() {
        assert_eq!(list_view(&ProfileStore::new()), ListView::Loading);
    }

    #[test]
    fn empty_fetch_renders_empty_state() {
        let mut store = ProfileStore::new();
        let ticket = store.begin_refresh();
        let _ = store.complete_refresh(ticket, Ok(Vec::new()));
        assert_eq!(list_view(&store), ListView::Empty);
    }

    #[test]
    fn loading_hides_rows() {
        let mut store = ProfileStore::new();
        let _ticket = store.begin_refresh();
        assert_eq!(list_view(&store), ListView::Loading);
    }

    #[test]
    fn rows_follow_store_order_with_status_labels() {
        let mut store = ProfileStore::new();
        let ticket = store.begin_refresh();
        let _ = store.complete_refresh(ticket, Ok(vec![profile("b", false), profile("a", true)]));

        match list_view(&store) {
            ListView::Rows(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].id, "b");
                assert_eq!(rows[0].status, "Inactive");
                assert_eq!(rows[1].status, "Active");
                assert_eq!(rows[1].country, Some("United Kingdom"));
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn form_title_tracks_mode() {
        let mut form = ProfileForm::new();
        assert_eq!(form_title(&form), "Add New Profile");
        form.begin_edit(&profile("a", true));
        assert_eq!(form_title(&form), "Edit Profile");
    }
}
