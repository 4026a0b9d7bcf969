//! One-shot profile reads

use natter_core::{DocumentStore, Query, Record, Result, UserId, UserProfile, UserRecord};
use tracing::warn;

fn profile_query(uid: &UserId) -> Query {
    Query::collection(UserProfile::COLLECTION).where_eq(UserProfile::UID, uid.as_str())
}

/// The `users` document for `uid`. When several exist the latest wins.
pub async fn find_profile(store: &dyn DocumentStore, uid: &UserId) -> Result<Option<UserRecord>> {
    let docs = store.get_once(&profile_query(uid)).await?;
    Ok(docs.iter().filter_map(UserRecord::from_document).last())
}

/// The profile for `uid`, or the placeholder when it cannot be read
pub async fn resolve_profile(store: &dyn DocumentStore, uid: &UserId) -> UserProfile {
    match find_profile(store, uid).await {
        Ok(Some(record)) => record.profile,
        Ok(None) => {
            warn!(%uid, "No profile found, using placeholder name");
            UserProfile::placeholder(uid.clone())
        }
        Err(e) => {
            warn!(%uid, error = %e, "Profile lookup failed, using placeholder name");
            UserProfile::placeholder(uid.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewmodel::testing::{context, put_profile};
    use natter_core::PLACEHOLDER_NAME;

    #[tokio::test]
    async fn test_resolves_stored_name() {
        let (db, _) = context();
        put_profile(&db, "u1", "Ann").await;
        let profile = resolve_profile(db.as_ref(), &UserId::from("u1")).await;
        assert_eq!(profile.name, "Ann");
    }

    #[tokio::test]
    async fn test_latest_profile_wins() {
        let (db, _) = context();
        put_profile(&db, "u1", "Ann").await;
        let latest = put_profile(&db, "u1", "Annie").await;
        let record = find_profile(db.as_ref(), &UserId::from("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.document_id, latest);
        assert_eq!(record.profile.name, "Annie");
    }

    #[tokio::test]
    async fn test_missing_profile_uses_placeholder() {
        let (db, _) = context();
        let profile = resolve_profile(db.as_ref(), &UserId::from("ghost")).await;
        assert_eq!(profile.name, PLACEHOLDER_NAME);
        assert_eq!(profile.uid.as_str(), "ghost");
    }
}
