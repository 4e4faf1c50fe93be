use rand::{distributions::Alphanumeric, thread_rng, Rng};
use thiserror::Error;
use tracing::{debug, warn};

use super::{repo::LinkStore, repo_types::Link};
use crate::error::StoreError;

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 16;

/// Attempts made before giving up on colliding codes.
pub const MAX_CODE_ATTEMPTS: u32 = 5;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Missing required fields: Destination")]
    EmptyDestination,
    #[error("Invalid Destination")]
    InvalidDestination,
    #[error("link not found")]
    NotFound,
    #[error("no free short code after {0} attempts")]
    CodesExhausted(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Random code of `CODE_LENGTH` chars from `[A-Za-z0-9]`. Not collision-free.
pub fn generate_code() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

pub async fn create_link(store: &dyn LinkStore, destination: &str) -> Result<String, LinkError> {
    create_link_with(store, destination, generate_code).await
}

/// Stores `destination` under a fresh code, regenerating on conflict.
pub async fn create_link_with<G>(
    store: &dyn LinkStore,
    destination: &str,
    mut next_code: G,
) -> Result<String, LinkError>
where
    G: FnMut() -> String + Send,
{
    if destination.is_empty() {
        return Err(LinkError::EmptyDestination);
    }
    // Must survive as a Location header value.
    if destination.chars().any(char::is_control) {
        return Err(LinkError::InvalidDestination);
    }

    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let link = Link {
            source: next_code(),
            destination: destination.to_owned(),
        };
        match store.insert(&link).await {
            Ok(()) => {
                debug!(source = %link.source, attempt, "link stored");
                return Ok(link.source);
            }
            Err(StoreError::Conflict) => {
                warn!(source = %link.source, attempt, "short code collision");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(LinkError::CodesExhausted(MAX_CODE_ATTEMPTS))
}

pub async fn resolve_link(store: &dyn LinkStore, source: &str) -> Result<String, LinkError> {
    store
        .find(source)
        .await?
        .map(|l| l.destination)
        .ok_or(LinkError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryLinkStore;

    #[test]
    fn codes_have_fixed_length_and_alphabet() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[tokio::test]
    async fn create_then_resolve() {
        let store = MemoryLinkStore::default();
        let code = create_link(&store, "https://example.com").await.unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
        assert_eq!(
            resolve_link(&store, &code).await.unwrap(),
            "https://example.com"
        );
    }

    #[tokio::test]
    async fn empty_destination_is_rejected() {
        let store = MemoryLinkStore::default();
        let err = create_link(&store, "").await.unwrap_err();
        assert!(matches!(err, LinkError::EmptyDestination));
    }

    #[tokio::test]
    async fn control_characters_are_rejected_before_storing() {
        let store = MemoryLinkStore::default();
        for bad in ["a\nb", "https://x.example/\r\nSet-Cookie: a=b", "tab\there", "nul\0"] {
            let err = create_link(&store, bad).await.unwrap_err();
            assert!(matches!(err, LinkError::InvalidDestination), "{bad:?}");
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let store = MemoryLinkStore::default();
        let err = resolve_link(&store, "nope").await.unwrap_err();
        assert!(matches!(err, LinkError::NotFound));
    }

    #[tokio::test]
    async fn collision_is_retried_and_original_kept() {
        let store = MemoryLinkStore::default();
        create_link_with(&store, "https://first.example", || "taken".into())
            .await
            .unwrap();

        let mut codes = vec!["fresh".to_string(), "taken".to_string()];
        let code = create_link_with(&store, "https://second.example", move || {
            codes.pop().unwrap()
        })
        .await
        .unwrap();

        assert_eq!(code, "fresh");
        assert_eq!(
            resolve_link(&store, "taken").await.unwrap(),
            "https://first.example"
        );
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let store = MemoryLinkStore::default();
        create_link_with(&store, "https://first.example", || "taken".into())
            .await
            .unwrap();

        let mut calls = 0;
        let err = create_link_with(&store, "https://second.example", || {
            calls += 1;
            "taken".into()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, LinkError::CodesExhausted(MAX_CODE_ATTEMPTS)));
        assert_eq!(calls, MAX_CODE_ATTEMPTS);
    }
}
