//! SM-009: S3 bucket fragment.
//!
//! The raw bucket name goes into every value position (bucket argument,
//! outputs); block labels use the sanitized form so names with hyphens or
//! dots still produce valid identifiers.

use crate::core::types::{sanitize_label, S3Spec};

/// Bucket, versioning, and server-side-encryption blocks plus outputs.
pub fn bucket_config(spec: &S3Spec) -> String {
    let label = sanitize_label(&spec.bucket_name);
    let versioning_status = if spec.versioning { "Enabled" } else { "Disabled" };

    format!(
        r#"provider "aws" {{
  region = "{region}"
}}

resource "aws_s3_bucket" "{label}" {{
  bucket = "{bucket}"

  tags = {{
    Name = "{bucket}"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

resource "aws_s3_bucket_versioning" "{label}_versioning" {{
  bucket = aws_s3_bucket.{label}.id

  versioning_configuration {{
    status = "{versioning_status}"
  }}
}}

resource "aws_s3_bucket_server_side_encryption_configuration" "{label}_encryption" {{
  bucket = aws_s3_bucket.{label}.id

  rule {{
    apply_server_side_encryption_by_default {{
      sse_algorithm = "AES256"
    }}
  }}
}}

output "bucket_name" {{
  description = "Name of the bucket"
  value       = aws_s3_bucket.{label}.bucket
}}

output "bucket_arn" {{
  description = "ARN of the bucket"
  value       = aws_s3_bucket.{label}.arn
}}
"#,
        region = spec.region,
        label = label,
        bucket = spec.bucket_name,
        versioning_status = versioning_status,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::default_region;

    fn spec(name: &str, versioning: bool) -> S3Spec {
        S3Spec {
            bucket_name: name.to_string(),
            region: default_region(),
            versioning,
        }
    }

    #[test]
    fn test_sm009_label_sanitized_value_raw() {
        let config = bucket_config(&spec("my-data-bucket", false));
        assert!(config.contains("resource \"aws_s3_bucket\" \"my_data_bucket\""));
        assert!(config.contains("bucket = \"my-data-bucket\""));
        assert!(config.contains("Name = \"my-data-bucket\""));
    }

    #[test]
    fn test_sm009_versioning_enabled() {
        let config = bucket_config(&spec("b", true));
        assert!(config.contains("status = \"Enabled\""));
    }

    #[test]
    fn test_sm009_versioning_disabled_by_default() {
        let config = bucket_config(&spec("b", false));
        assert!(config.contains("status = \"Disabled\""));
    }

    #[test]
    fn test_sm009_encryption_always_present() {
        let config = bucket_config(&spec("b", false));
        assert!(config.contains("sse_algorithm = \"AES256\""));
    }

    #[test]
    fn test_sm009_internal_references_use_label() {
        let config = bucket_config(&spec("dotted.name", false));
        assert!(config.contains("bucket = aws_s3_bucket.dotted_name.id"));
        assert!(config.contains("value       = aws_s3_bucket.dotted_name.arn"));
    }

    #[test]
    fn test_sm009_balanced_braces() {
        let config = bucket_config(&spec("my-bucket", true));
        assert_eq!(config.matches('{').count(), config.matches('}').count());
    }
}
