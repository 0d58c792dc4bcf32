//! SM-008: EC2 instance fragment.
//!
//! The instance template carries the placeholder label `example` and the
//! placeholder tag `ExampleInstance`; `instance_config` renames both to the
//! requested instance name by textual substitution, keeping the template
//! itself a single literal.

use crate::core::types::Ec2Spec;

/// Provider block pinned to the spec's region.
pub fn provider(region: &str) -> String {
    format!(
        r#"provider "aws" {{
  region = "{region}"
}}
"#,
        region = region
    )
}

/// The instance block plus its public-IP output, renamed to the spec's
/// instance name.
pub fn instance_config(spec: &Ec2Spec) -> String {
    let template = format!(
        r#"resource "aws_instance" "example" {{
  ami           = "{image_id}"
  instance_type = "{instance_type}"
  subnet_id     = aws_subnet.default.id

  vpc_security_group_ids = [aws_security_group.default.id]

  tags = {{
    Name = "ExampleInstance"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

output "instance_public_ip" {{
  description = "Public IP of the instance"
  value       = aws_instance.example.public_ip
}}
"#,
        image_id = spec.image_id,
        instance_type = spec.instance_type,
    );

    template
        .replace(
            "resource \"aws_instance\" \"example\"",
            &format!("resource \"aws_instance\" \"{}\"", spec.instance_name),
        )
        .replace(
            "aws_instance.example.public_ip",
            &format!("aws_instance.{}.public_ip", spec.instance_name),
        )
        .replace(
            "Name = \"ExampleInstance\"",
            &format!("Name = \"{}\"", spec.instance_name),
        )
}

/// Contents of `terraform.tfvars` for an EC2 config. The CIDR line can be
/// rewritten afterwards with `Composer::override_ssh_cidr`.
pub fn tfvars(spec: &Ec2Spec) -> String {
    format!(
        "allowed_ssh_cidrs = \"{cidrs}\"\ninstance_type = \"{instance_type}\"\nami_id = \"{ami_id}\"\nregion = \"{region}\"\n",
        cidrs = spec.allowed_ssh_cidrs,
        instance_type = spec.instance_type,
        ami_id = spec.image_id,
        region = spec.region,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sm008_provider_region() {
        assert!(provider("us-east-1").contains("region = \"us-east-1\""));
    }

    #[test]
    fn test_sm008_rename_label_and_tag() {
        let spec = Ec2Spec {
            instance_name: "web-server".to_string(),
            ..Ec2Spec::default()
        };
        let config = instance_config(&spec);
        assert!(config.contains("resource \"aws_instance\" \"web-server\""));
        assert!(config.contains("Name = \"web-server\""));
        assert!(config.contains("aws_instance.web-server.public_ip"));
        assert!(!config.contains("example"));
        assert!(!config.contains("ExampleInstance"));
    }

    #[test]
    fn test_sm008_default_name_keeps_placeholders() {
        // The default name IS the placeholder, so substitution is a no-op
        // for the label but still rewrites the tag
        let config = instance_config(&Ec2Spec::default());
        assert!(config.contains("resource \"aws_instance\" \"example\""));
        assert!(config.contains("Name = \"example\""));
    }

    #[test]
    fn test_sm008_instance_parameters() {
        let spec = Ec2Spec {
            instance_type: "t3.small".to_string(),
            image_id: "ami-deadbeef".to_string(),
            ..Ec2Spec::default()
        };
        let config = instance_config(&spec);
        assert!(config.contains("instance_type = \"t3.small\""));
        assert!(config.contains("ami           = \"ami-deadbeef\""));
    }

    #[test]
    fn test_sm008_network_references_symbolic() {
        let config = instance_config(&Ec2Spec::default());
        assert!(config.contains("subnet_id     = aws_subnet.default.id"));
        assert!(config.contains("vpc_security_group_ids = [aws_security_group.default.id]"));
    }

    #[test]
    fn test_sm008_tfvars_lines() {
        let spec = Ec2Spec {
            allowed_ssh_cidrs: "192.168.1.0/24".to_string(),
            ..Ec2Spec::default()
        };
        let vars = tfvars(&spec);
        assert!(vars.contains("allowed_ssh_cidrs = \"192.168.1.0/24\"\n"));
        assert!(vars.contains("instance_type = \"t2.micro\"\n"));
        assert!(vars.contains("ami_id = \"ami-03f4878755434977f\"\n"));
        assert!(vars.contains("region = \"ap-south-1\"\n"));
    }
}
