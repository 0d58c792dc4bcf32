//! SM-002: Intent resolution — natural language to a typed `Intent`.
//!
//! A deterministic, priority-ordered pattern matcher, not a statistical
//! classifier. Matching is case-insensitive and first-match-wins; missing
//! sub-matches fill in documented defaults. Every input resolves to some
//! intent — unresolvable text degrades to the `GenerateCode` fallback with
//! the original text attached.

use super::types::{Ec2Spec, Intent, RdsSpec, ResourceKind, S3Spec};
use regex::Regex;
use std::sync::LazyLock;

struct Patterns {
    create_ec2: Regex,
    create_s3: Regex,
    create_rds: Regex,
    delete: Regex,
    gen_code: Regex,
    deploy: Regex,
    state: Regex,

    instance_type: Regex,
    region: Regex,
    named: Regex,
    bucket: Regex,
    versioning: Regex,
    engine: Regex,
    db_class: Regex,
    database: Regex,
    instance_id: Regex,
    service_type: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    create_ec2: rx(r"\b(create|launch|start)\b.*\bec2\b.*\binstance"),
    create_s3: rx(r"\b(create|make)\b.*\bs3\b.*\bbucket"),
    create_rds: rx(r"\b(create|setup)\b.*\brds\b.*\bdatabase"),
    delete: rx(r"\b(delete|destroy|remove)\b"),
    gen_code: rx(r"\b(generate|create|show)\b.*\bcode\b"),
    deploy: rx(r"\b(deploy|build|setup)\b"),
    state: rx(r"\b(state|status|info)\b"),

    instance_type: rx(r"\b(t[0-9]\.[a-z]+)\b"),
    region: rx(r"\b(us-[a-z]+-[0-9]|eu-[a-z]+-[0-9]|ap-[a-z]+-[0-9])\b"),
    named: rx(r#"\bnamed?\s+["']?([a-zA-Z0-9_-]+)["']?"#),
    bucket: rx(r#"\bbucket\s+["']?([a-zA-Z0-9._-]+)["']?"#),
    versioning: rx(r"\bversioning\b"),
    engine: rx(r"\b(mysql|postgres|postgresql|mariadb|oracle|sqlserver)\b"),
    db_class: rx(r"\b(db\.[a-z0-9.]+)\b"),
    database: rx(r#"\bdatabase\s+["']?([a-zA-Z0-9_-]+)["']?"#),
    instance_id: rx(r"\b(i-[a-zA-Z0-9]+)\b"),
    service_type: rx(r"\b(terraform|boto3|python)\b"),
});

fn rx(pattern: &str) -> Regex {
    // All patterns are fixed literals checked by tests
    Regex::new(pattern).expect("hardcoded pattern compiles")
}

/// Resolve free-form text into an intent. Never fails.
pub fn resolve(text: &str) -> Intent {
    let raw = text.trim();
    let lower = raw.to_lowercase();
    let p = &*PATTERNS;

    if p.create_ec2.is_match(&lower) {
        return Intent::CreateEc2(Ec2Spec {
            instance_type: capture(&p.instance_type, &lower)
                .unwrap_or_else(|| "t2.micro".to_string()),
            region: capture(&p.region, &lower).unwrap_or_else(|| "ap-south-1".to_string()),
            instance_name: capture(&p.named, &lower).unwrap_or_else(|| "example".to_string()),
            ..Ec2Spec::default()
        });
    }

    if p.create_s3.is_match(&lower) {
        return Intent::CreateS3(S3Spec {
            bucket_name: capture(&p.bucket, &lower).unwrap_or_else(|| fallback_bucket(&lower)),
            region: capture(&p.region, &lower).unwrap_or_else(|| "ap-south-1".to_string()),
            versioning: p.versioning.is_match(&lower),
        });
    }

    if p.create_rds.is_match(&lower) {
        let engine = match capture(&p.engine, &lower).as_deref() {
            Some("postgresql") | Some("postgres") => "postgres".to_string(),
            Some(other) => other.to_string(),
            None => "mysql".to_string(),
        };
        return Intent::CreateRds(RdsSpec {
            engine,
            db_instance_class: capture(&p.db_class, &lower)
                .unwrap_or_else(|| "db.t3.micro".to_string()),
            db_name: capture(&p.named, &lower).unwrap_or_else(|| "testdb".to_string()),
            region: capture(&p.region, &lower).unwrap_or_else(|| "ap-south-1".to_string()),
        });
    }

    // Deletion needs a resource keyword; without one the text keeps falling
    // through to the remaining categories.
    if p.delete.is_match(&lower) {
        if let Some(intent) = resolve_delete(&lower) {
            return intent;
        }
    }

    if p.gen_code.is_match(&lower) {
        return Intent::GenerateCode {
            service_type: capture(&p.service_type, &lower)
                .unwrap_or_else(|| "terraform".to_string()),
            user_input: raw.to_string(),
        };
    }

    if p.deploy.is_match(&lower) {
        return Intent::DeployCustom {
            user_input: raw.to_string(),
        };
    }

    if p.state.is_match(&lower) {
        return Intent::GetState {
            resource_type: kind_keyword(&lower).unwrap_or(ResourceKind::Ec2),
        };
    }

    Intent::GenerateCode {
        service_type: "terraform".to_string(),
        user_input: raw.to_string(),
    }
}

fn resolve_delete(lower: &str) -> Option<Intent> {
    let p = &*PATTERNS;
    let resource_type = kind_keyword(lower)?;
    let resource_identifier = match resource_type {
        ResourceKind::Ec2 => capture(&p.instance_id, lower),
        ResourceKind::S3 => capture(&p.bucket, lower),
        ResourceKind::Rds => capture(&p.database, lower),
        ResourceKind::Custom => None,
    }
    .unwrap_or_else(|| "unknown".to_string());

    Some(Intent::DeleteResource {
        resource_type,
        resource_identifier,
    })
}

/// Which of the three first-class kinds the text mentions, in fixed
/// precedence order.
fn kind_keyword(lower: &str) -> Option<ResourceKind> {
    if lower.contains("ec2") {
        Some(ResourceKind::Ec2)
    } else if lower.contains("s3") {
        Some(ResourceKind::S3)
    } else if lower.contains("rds") {
        Some(ResourceKind::Rds)
    } else {
        None
    }
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Deterministic bucket-name fallback when no name is given. Derived from
/// the request text so the same input always names the same bucket.
fn fallback_bucket(lower: &str) -> String {
    let digest = blake3::hash(lower.as_bytes()).to_hex();
    format!("test-bucket-{}", &digest.as_str()[..6])
}
