//! Breed label files written by the training pipeline.
//!
//! Two shapes are accepted:
//!
//! ```json
//! { "class_names": ["Chihuahua", "..."], "num_classes": 120, "image_size": [224, 224] }
//! ```
//!
//! or a bare list of names. Extra keys are ignored.

use crate::config::validate_catalog;
use crate::error::{RegistryError, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelFile {
    Structured {
        class_names: Vec<String>,
        #[serde(default)]
        num_classes: Option<usize>,
    },
    Plain(Vec<String>),
}

/// Parse label data from a JSON string.
pub fn parse_breed_labels(contents: &str) -> Result<Vec<String>> {
    let parsed: LabelFile = serde_json::from_str(contents)?;

    let breeds = match parsed {
        LabelFile::Structured { class_names, num_classes } => {
            if let Some(count) = num_classes {
                if count != class_names.len() {
                    return Err(RegistryError::MalformedLabels(format!(
                        "num_classes is {} but class_names has {} entries",
                        count,
                        class_names.len()
                    )));
                }
            }
            class_names
        }
        LabelFile::Plain(names) => names,
    };

    validate_catalog(&breeds)?;
    Ok(breeds)
}

/// Read and validate a label file.
pub fn load_breed_labels(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(RegistryError::LabelFileMissing(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::LabelFileIo {
        path: path.to_path_buf(),
        source,
    })?;

    parse_breed_labels(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_labels() {
        let breeds = parse_breed_labels(
            r#"{"class_names": ["Beagle", "Pug"], "num_classes": 2, "normalization": "mobilenet"}"#,
        )
        .expect("valid labels");
        assert_eq!(breeds, vec!["Beagle".to_string(), "Pug".to_string()]);
    }

    #[test]
    fn test_count_is_optional() {
        let breeds = parse_breed_labels(r#"{"class_names": ["Beagle"]}"#).expect("valid labels");
        assert_eq!(breeds.len(), 1);
    }

    #[test]
    fn test_plain_list_labels() {
        let breeds = parse_breed_labels(r#"["Beagle", "Pug", "Boxer"]"#).expect("valid labels");
        assert_eq!(breeds.len(), 3);
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let err = parse_breed_labels(r#"{"class_names": ["Beagle"], "num_classes": 120}"#).unwrap_err();
        assert!(matches!(err, RegistryError::MalformedLabels(_)));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        assert!(parse_breed_labels(r#"{"labels": ["Beagle"]}"#).is_err());
        assert!(parse_breed_labels("not json").is_err());
        assert!(parse_breed_labels("[]").is_err());
        assert!(parse_breed_labels(r#"["Pug", "Pug"]"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_breed_labels(Path::new("/definitely/not/here/class_labels.json")).unwrap_err();
        assert!(matches!(err, RegistryError::LabelFileMissing(_)));
    }
}
