//! Group service
//!
//! Creating groups, unlocking them with a PIN, and checking editor tokens.

use std::sync::Arc;

use chrono::Utc;

use crate::auth::{hash_pin, verify_pin, EditorTokenSigner, IssuedToken, TokenError};
use crate::domain::entities::{Group, NewGroup};
use crate::domain::ports::GroupRepository;
use crate::error::{AppError, DomainError};

pub const MIN_GROUP_NAME_LEN: usize = 2;
pub const MAX_GROUP_NAME_LEN: usize = 80;
pub const MAX_SLUG_LEN: usize = 80;
pub const MIN_PIN_LEN: usize = 4;
pub const MAX_PIN_LEN: usize = 32;

/// Slug attempts before giving up on a taken name
const MAX_SLUG_ATTEMPTS: usize = 50;

const FALLBACK_SLUG: &str = "group";

/// Lowercase URL slug: runs of anything but `a-z0-9` become one `-`
pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for c in input.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Slug for the given attempt: the base itself, then `base-2`, `base-3`, ...
fn slug_candidate(base: &str, attempt: usize) -> String {
    if attempt == 1 {
        return base.to_string();
    }
    let suffix = format!("-{}", attempt);
    let stem: String = base.chars().take(MAX_SLUG_LEN - suffix.len()).collect();
    format!("{}{}", stem.trim_end_matches('-'), suffix)
}

fn char_len_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

fn validate_new_group(name: &str, slug: Option<&str>, pin: &str) -> Result<(), DomainError> {
    if !char_len_between(name, MIN_GROUP_NAME_LEN, MAX_GROUP_NAME_LEN) {
        return Err(DomainError::Validation(format!(
            "Group name must be {}-{} characters",
            MIN_GROUP_NAME_LEN, MAX_GROUP_NAME_LEN
        )));
    }
    if let Some(slug) = slug {
        let well_formed = slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !well_formed || !char_len_between(slug, 2, MAX_SLUG_LEN) {
            return Err(DomainError::Validation(
                "Slug may only contain a-z, 0-9 and '-' (2-80 characters)".to_string(),
            ));
        }
    }
    validate_pin(pin)
}

fn validate_pin(pin: &str) -> Result<(), DomainError> {
    if !char_len_between(pin, MIN_PIN_LEN, MAX_PIN_LEN) {
        return Err(DomainError::Validation(format!(
            "PIN must be {}-{} characters",
            MIN_PIN_LEN, MAX_PIN_LEN
        )));
    }
    Ok(())
}

/// Service for groups and editor access
pub struct GroupService<GR>
where
    GR: GroupRepository,
{
    groups: Arc<GR>,
    signer: EditorTokenSigner,
}

impl<GR> GroupService<GR>
where
    GR: GroupRepository,
{
    pub fn new(groups: Arc<GR>, signer: EditorTokenSigner) -> Self {
        Self { groups, signer }
    }

    /// Create a group, deriving a free slug from the requested slug or the name
    pub async fn create(
        &self,
        name: &str,
        slug: Option<&str>,
        pin: &str,
    ) -> Result<Group, AppError> {
        let name = name.trim();
        validate_new_group(name, slug, pin)?;

        let base = slugify(slug.unwrap_or(name));
        let pin_hash = hash_pin(pin);

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = slug_candidate(&base, attempt);
            let new_group = NewGroup {
                name: name.to_string(),
                slug: candidate.clone(),
                pin_hash: pin_hash.clone(),
            };

            match self.groups.create(&new_group).await {
                Ok(group) => {
                    tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
                    return Ok(group);
                }
                Err(DomainError::AlreadyExists(_)) => {
                    tracing::debug!(slug = %candidate, "Slug taken, trying next");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::AlreadyExists(format!(
            "Could not find a free slug for '{}'",
            base
        ))
        .into())
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Group, AppError> {
        self.groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))
    }

    /// Exchange the group PIN for an editor token
    pub async fn unlock(&self, slug: &str, pin: &str) -> Result<IssuedToken, AppError> {
        validate_pin(pin)?;
        let credentials = self
            .groups
            .find_credentials_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        if !verify_pin(pin, &credentials.pin_hash) {
            tracing::warn!(group_id = %credentials.group.id, "Unlock with wrong PIN");
            return Err(AppError::Unauthorized);
        }

        self.signer
            .issue(credentials.group.id, Utc::now())
            .map_err(|e| AppError::Internal(format!("Could not issue editor token: {}", e)))
    }

    /// Check that `token` grants edit access to `group`
    pub fn authorize_editor(&self, group: &Group, token: &str) -> Result<(), AppError> {
        match self.signer.verify(token, Utc::now()) {
            Ok(group_id) if group_id == group.id => Ok(()),
            Ok(_) => Err(AppError::Forbidden),
            Err(TokenError::Expired) => {
                tracing::debug!(group_id = %group.id, "Expired editor token");
                Err(AppError::Unauthorized)
            }
            Err(_) => Err(AppError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::GroupId;
    use crate::test_utils::{test_group, InMemoryGroupRepository};

    fn service(repo: InMemoryGroupRepository) -> GroupService<InMemoryGroupRepository> {
        GroupService::new(Arc::new(repo), EditorTokenSigner::new("test-secret", 3600))
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Tuesday Night Doubles!"), "tuesday-night-doubles");
        assert_eq!(slugify("  --Court #3--  "), "court-3");
        assert_eq!(slugify("!!!"), "group");
        assert_eq!(slugify(&"a".repeat(120)).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn slugify_collapses_and_drops_non_ascii() {
        assert_eq!(slugify("Café  Crème -- Club"), "caf-cr-me-club");
        assert_eq!(slugify("__a__b__"), "a-b");
        assert_eq!(slugify("ÉÉÉ"), "group");

        let long = format!("{} tail", "a".repeat(MAX_SLUG_LEN - 1));
        let slug = slugify(&long);
        assert_eq!(slug.len(), MAX_SLUG_LEN - 1);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slug_candidates_stay_within_limit() {
        let base = "b".repeat(MAX_SLUG_LEN);
        assert_eq!(slug_candidate("club", 1), "club");
        assert_eq!(slug_candidate("club", 2), "club-2");
        let long = slug_candidate(&base, 12);
        assert_eq!(long.len(), MAX_SLUG_LEN);
        assert!(long.ends_with("-12"));
    }

    #[tokio::test]
    async fn create_retries_taken_slugs() {
        let service = service(InMemoryGroupRepository::new());

        let first = service.create("Sunday Club", None, "1234").await.unwrap();
        let second = service.create("Sunday Club", None, "1234").await.unwrap();
        let third = service.create("Other", Some("sunday-club"), "1234").await.unwrap();

        assert_eq!(first.slug, "sunday-club");
        assert_eq!(second.slug, "sunday-club-2");
        assert_eq!(third.slug, "sunday-club-3");
    }

    #[tokio::test]
    async fn create_validates_input() {
        let service = service(InMemoryGroupRepository::new());

        for (name, slug, pin) in [
            ("A", None, "1234"),
            ("Club", Some("Bad Slug"), "1234"),
            ("Club", None, "123"),
            ("Club", None, &"9".repeat(33)[..]),
        ] {
            assert!(matches!(
                service.create(name, slug, pin).await,
                Err(AppError::Domain(DomainError::Validation(_)))
            ));
        }
    }

    #[tokio::test]
    async fn unlock_issues_token_for_the_group() {
        let service = service(InMemoryGroupRepository::new());
        let group = service.create("Sunday Club", None, "1234").await.unwrap();

        let issued = service.unlock("sunday-club", "1234").await.unwrap();

        assert!(service.authorize_editor(&group, &issued.token).is_ok());
        assert!(matches!(
            service.unlock("sunday-club", "4321").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            service.unlock("missing", "1234").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn token_for_another_group_is_forbidden() {
        let service = service(InMemoryGroupRepository::new());
        service.create("Sunday Club", None, "1234").await.unwrap();
        let issued = service.unlock("sunday-club", "1234").await.unwrap();

        let mut other = test_group("other");
        other.id = GroupId::new();

        assert!(matches!(
            service.authorize_editor(&other, &issued.token),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            service.authorize_editor(&other, "garbage"),
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn find_by_slug_not_found() {
        let service = service(InMemoryGroupRepository::new().with_group(test_group("club"), "x$y"));

        assert!(service.find_by_slug("club").await.is_ok());
        assert!(matches!(
            service.find_by_slug("nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}
