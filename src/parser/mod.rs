//! Catalog parser (verb module)
//!
//! Transforms YAML files into data cube types.

use std::path::Path;

use crate::data_cube::Catalog;
use crate::error::ParseError;

/// Parse a catalog from a YAML file
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Catalog, ParseError> {
    let path_str = path.as_ref().display().to_string();
    let contents = std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })?;
    parse_str(&contents)
}

/// Parse a catalog from a YAML string
pub fn parse_str(yaml: &str) -> Result<Catalog, ParseError> {
    let catalog: Catalog = serde_yaml::from_str(yaml)?;
    catalog.validate()?;
    tracing::debug!(cubes = catalog.data_cubes.len(), "parsed data cube catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_cube::fixtures::CATALOG_YAML;
    use crate::data_cube::{BucketingStrategy, DimensionKind};
    use crate::splits::Bucket;
    use std::io::Write;

    #[test]
    fn test_parse_wiki() {
        let catalog = parse_str(CATALOG_YAML).unwrap();

        assert_eq!(catalog.data_cubes.len(), 2);
        let wiki = catalog.get_data_cube("wiki").unwrap();
        assert_eq!(wiki.title(), "Wikipedia Edits");
        assert_eq!(wiki.dimensions.len(), 6);
        assert_eq!(wiki.measures.len(), 4);

        // Kind defaults to string when omitted, bucketing to defaultBucket
        let page = wiki.get_dimension("page").unwrap();
        assert_eq!(page.kind, DimensionKind::String);
        assert_eq!(page.bucketing_strategy, BucketingStrategy::DefaultBucket);

        let comment_length = wiki.get_dimension("commentLength").unwrap();
        assert_eq!(
            comment_length.granularities.as_ref().unwrap().first(),
            Some(&Bucket::Number(1.0))
        );
        assert!(comment_length.can_bucket_by_default());

        let user_id = wiki.get_dimension("userId").unwrap();
        assert!(!user_id.can_bucket_by_default());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG_YAML.as_bytes()).unwrap();

        let catalog = parse_file(file.path()).unwrap();
        assert!(catalog.get_data_cube("labels").is_some());
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ParseError::Io { ref path, .. } if path == "does/not/exist.yaml"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_str("not: [valid: yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_unknown_kind() {
        let yaml = r#"
dataCubes:
  - name: geo
    dimensions:
      - name: location
        kind: geopoint
    measures: []
"#;
        let err = parse_str(yaml).unwrap_err();
        assert!(err.to_string().contains("geopoint"));
    }
}
