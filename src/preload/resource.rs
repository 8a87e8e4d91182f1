/// What a page renders from: the state of its preloaded data.
///
/// Borrowed from Elm's RemoteData pattern. A page shows a splash screen while
/// `Loading`, its content on `Success` and an error view on `Failure`, instead
/// of juggling a `loaded: bool` next to an `Option<T>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resource<T, E = String> {
    /// Nothing committed and no load running for the page
    NotAsked,

    /// A preload for the page is in flight
    Loading,

    /// Data has been committed for the page
    Success(T),

    /// The last load failed (or the committed data could not be decoded)
    Failure(E),
}

impl<T, E> Resource<T, E> {
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Resource::Success(data),
            Err(e) => Resource::Failure(e),
        }
    }

    pub fn is_not_asked(&self) -> bool {
        matches!(self, Resource::NotAsked)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Resource::Failure(_))
    }

    /// Whether the page should still show its splash screen
    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::NotAsked | Resource::Loading)
    }

    pub fn map<U, F>(self, f: F) -> Resource<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Resource::NotAsked => Resource::NotAsked,
            Resource::Loading => Resource::Loading,
            Resource::Success(data) => Resource::Success(f(data)),
            Resource::Failure(e) => Resource::Failure(e),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Resource::Failure(e) => Some(e),
            _ => None,
        }
    }
}

impl<T, E> Default for Resource<T, E> {
    fn default() -> Self {
        Resource::NotAsked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_asked() {
        let resource: Resource<u32> = Resource::default();
        assert!(resource.is_not_asked());
        assert!(resource.is_pending());
    }

    #[test]
    fn test_from_result() {
        let ok: Resource<u32> = Resource::from_result(Ok(3));
        let err: Resource<u32> = Resource::from_result(Err("NetworkError".to_string()));

        assert_eq!(ok.ok(), Some(3));
        assert_eq!(err.error().map(String::as_str), Some("NetworkError"));
        assert!(!err.is_pending());
    }

    #[test]
    fn test_map_keeps_state() {
        let loading: Resource<u32> = Resource::Loading;
        assert!(loading.map(|n| n * 2).is_loading());

        let success: Resource<u32> = Resource::Success(21);
        assert_eq!(success.map(|n| n * 2), Resource::Success(42));
    }
}
