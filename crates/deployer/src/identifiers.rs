//! Newtype domain identifiers.
//!
//! Every name that crosses a component boundary is a distinct newtype wrapping
//! a `String`. This prevents accidentally passing, for example, a
//! [`GitHubUsername`] where a [`ProjectName`] is expected even though both are
//! strings under the hood.
//!
//! Constructors only reject empty values. The stricter naming rules enforced on
//! incoming requests live in [`crate::validation`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single inbound HTTP request.
///
/// Generated fresh for every request and recorded on its tracing span so all
/// outbound GitHub calls made on behalf of that request can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (GitHub names)
// ---------------------------------------------------------------------------

string_id! {
    /// The name of a deployed project. Doubles as the GitHub repository name.
    ProjectName
}

string_id! {
    /// A GitHub account login that owns the deployed repository.
    GitHubUsername
}

string_id! {
    /// Identifies a deployment in `"owner/project"` format.
    ///
    /// Returned from a build so a later revision request can refer to it.
    /// Nothing checks that a revision's project id was ever issued.
    ProjectId
}

string_id! {
    /// A Git branch name (e.g. `"main"`).
    BranchName
}

string_id! {
    /// A file-system path relative to the repository root (e.g. `"index.html"`).
    ContentPath
}

string_id! {
    /// A Git commit SHA as reported by GitHub.
    CommitSha
}

// ---------------------------------------------------------------------------
// Composite repository reference
// ---------------------------------------------------------------------------

/// A GitHub repository addressed by owner and name.
///
/// All URLs reported back to callers are derived from this value, so the
/// response stays consistent with the calls that were made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Account that owns the repository.
    pub owner: GitHubUsername,
    /// Repository name.
    pub name: ProjectName,
}

impl RepositoryRef {
    /// Creates a new [`RepositoryRef`].
    pub fn new(owner: GitHubUsername, name: ProjectName) -> Self {
        Self { owner, name }
    }

    /// Returns the `"owner/name"` form used by the GitHub API.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Returns the [`ProjectId`] handed back to callers for this repository.
    pub fn project_id(&self) -> ProjectId {
        ProjectId(self.full_name())
    }

    /// Returns the repository's web URL.
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }

    /// Returns the URL GitHub Pages serves the repository from.
    pub fn pages_url(&self) -> String {
        format!("https://{}.github.io/{}/", self.owner, self.name)
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryRef {
        RepositoryRef::new(
            GitHubUsername::new("octocat").unwrap(),
            ProjectName::new("hello-world").unwrap(),
        )
    }

    #[test]
    fn test_string_id_rejects_empty() {
        assert!(ProjectName::new("").is_none());
        assert_eq!(ProjectName::new("demo").unwrap().as_str(), "demo");
    }

    #[test]
    fn test_repository_urls() {
        let repo = repo();
        assert_eq!(repo.full_name(), "octocat/hello-world");
        assert_eq!(repo.html_url(), "https://github.com/octocat/hello-world");
        assert_eq!(repo.pages_url(), "https://octocat.github.io/hello-world/");
        assert_eq!(repo.project_id().as_str(), "octocat/hello-world");
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new_random(), RequestId::new_random());
    }
}
