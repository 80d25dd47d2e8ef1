//! Remote store URL layout for one artifact.
//!
//! The store is an object bucket served over HTTP with a JSON listing API:
//!
//! ```text
//! {base_url}/storage/v1/b/{bucket}/o?prefix={artifact}/&delimiter=/   listing
//! {base_url}/{bucket}/{artifact}/{version}/{artifact}-{version}.tar.gz archive
//! {base_url}/{bucket}/{artifact}/{version}/README.md                  documentation
//! ```

use crate::version::Version;

/// Default public object store endpoint.
pub const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com";

/// File extension of published artifact archives.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Documentation file published next to each archive.
pub const README_FILENAME: &str = "README.md";

/// URL builder for one artifact in one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    bucket: String,
    artifact: String,
}

impl Endpoints {
    /// Create endpoints for `artifact` stored in `bucket` under `base_url`.
    ///
    /// Trailing slashes on the base URL are ignored.
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        artifact: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            bucket: bucket.into(),
            artifact: artifact.into(),
        }
    }

    /// The artifact name these endpoints address.
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// The bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The base URL of the store.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Directory-style listing of everything under `{artifact}/`.
    pub fn catalog_url(&self) -> String {
        format!(
            "{}/storage/v1/b/{}/o?prefix={}/&delimiter=/",
            self.base_url, self.bucket, self.artifact
        )
    }

    /// Archive for one version.
    ///
    /// # Example
    ///
    /// ```
    /// use kraftload::catalog::Endpoints;
    /// use kraftload::version::Version;
    ///
    /// let endpoints = Endpoints::new("https://store.example", "pkgs", "math_module");
    /// let v = Version::parse("1.2.0").unwrap();
    /// assert_eq!(
    ///     endpoints.archive_url(&v),
    ///     "https://store.example/pkgs/math_module/1.2.0/math_module-1.2.0.tar.gz"
    /// );
    /// ```
    pub fn archive_url(&self, version: &Version) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.base_url,
            self.bucket,
            self.artifact,
            version,
            archive_filename(&self.artifact, version)
        )
    }

    /// Documentation for one version.
    pub fn readme_url(&self, version: &Version) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.base_url, self.bucket, self.artifact, version, README_FILENAME
        )
    }
}

/// Remote archive filename: `{artifact}-{version}.tar.gz`.
pub fn archive_filename(artifact: &str, version: &Version) -> String {
    format!("{}-{}.{}", artifact, version, ARCHIVE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new(
            "https://storage.googleapis.com/",
            "kraft-packages",
            "math_module",
        )
    }

    #[test]
    fn test_catalog_url() {
        assert_eq!(
            endpoints().catalog_url(),
            "https://storage.googleapis.com/storage/v1/b/kraft-packages/o?prefix=math_module/&delimiter=/"
        );
    }

    #[test]
    fn test_archive_url_is_version_templated() {
        let v = Version::parse("2.0.1").unwrap();
        assert_eq!(
            endpoints().archive_url(&v),
            "https://storage.googleapis.com/kraft-packages/math_module/2.0.1/math_module-2.0.1.tar.gz"
        );
    }

    #[test]
    fn test_readme_url() {
        let v = Version::parse("2.0.1").unwrap();
        assert_eq!(
            endpoints().readme_url(&v),
            "https://storage.googleapis.com/kraft-packages/math_module/2.0.1/README.md"
        );
    }

    #[test]
    fn test_accessors() {
        let e = endpoints();
        assert_eq!(e.base_url(), "https://storage.googleapis.com");
        assert_eq!(e.bucket(), "kraft-packages");
        assert_eq!(e.artifact(), "math_module");
    }
}
