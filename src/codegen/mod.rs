//! SM-013: Code-generation seam.
//!
//! The orchestrator never understands free-form language itself; it hands
//! the text to a `CodeGenerator`. The default implementation renders prompt
//! scaffolds — the exact text a model-backed generator would be driven
//! with — so the pipeline runs end to end with no model attached and a real
//! backend can be swapped in behind the same trait.

/// Produces configuration or client code from a free-form request.
pub trait CodeGenerator {
    /// Terraform configuration text for the request. Whatever comes back is
    /// persisted verbatim by the composer.
    fn generate_terraform(&self, user_input: &str) -> Result<String, String>;

    /// Client-SDK code text for the request, routed by `service_type`
    /// (`terraform` routes to `generate_terraform`).
    fn generate_code(&self, service_type: &str, user_input: &str) -> Result<String, String> {
        if service_type == "terraform" {
            self.generate_terraform(user_input)
        } else {
            Err(format!("unsupported service type \"{}\"", service_type))
        }
    }
}

/// Default generator: renders the prompt scaffold for the request instead of
/// calling a model.
#[derive(Debug, Clone, Default)]
pub struct PromptTemplates;

impl CodeGenerator for PromptTemplates {
    fn generate_terraform(&self, user_input: &str) -> Result<String, String> {
        Ok(format!(
            r#"You are a Terraform AWS specialist. Convert natural language into Terraform AWS provider configuration.

Generate complete, production-ready Terraform code with:
- Proper resource naming
- Required variables
- Output values

Respond ONLY with Terraform code, no explanations or markdown.

User request:
"{}"
"#,
            user_input
        ))
    }

    fn generate_code(&self, service_type: &str, user_input: &str) -> Result<String, String> {
        if service_type == "terraform" {
            return self.generate_terraform(user_input);
        }
        Ok(sdk_scaffold(user_input))
    }
}

/// AWS-SDK scaffold selected by the first service keyword in the request.
fn sdk_scaffold(user_input: &str) -> String {
    let lower = user_input.to_lowercase();
    let (service, examples) = if lower.contains("ec2") || lower.contains("instance") {
        (
            "EC2",
            "- \"Launch a t2.micro instance in us-east-1\" -> ec2.run_instances(...)\n\
             - \"Stop instance i-1234567890abcdef0\" -> ec2.stop_instances(...)\n\
             - \"Create a security group allowing SSH\" -> ec2.create_security_group(...)",
        )
    } else if lower.contains("s3") || lower.contains("bucket") {
        (
            "S3",
            "- \"Create a public S3 bucket called test-bucket\" -> s3.create_bucket(...)\n\
             - \"Upload file.txt to my-bucket\" -> s3.upload_file(...)\n\
             - \"Set bucket policy for public read\" -> s3.put_bucket_policy(...)",
        )
    } else if lower.contains("rds") || lower.contains("database") {
        (
            "RDS",
            "- \"Create MySQL RDS instance\" -> rds.create_db_instance(...)\n\
             - \"Create RDS snapshot\" -> rds.create_db_snapshot(...)\n\
             - \"Modify RDS instance class\" -> rds.modify_db_instance(...)",
        )
    } else if lower.contains("lambda") {
        (
            "Lambda",
            "- \"Create Lambda function from zip file\" -> lambda_client.create_function(...)\n\
             - \"Invoke Lambda function with payload\" -> lambda_client.invoke(...)\n\
             - \"Update Lambda function code\" -> lambda_client.update_function_code(...)",
        )
    } else if lower.contains("vpc") || lower.contains("subnet") {
        (
            "VPC",
            "- \"Create VPC with CIDR 10.0.0.0/16\" -> ec2.create_vpc(...)\n\
             - \"Create subnet in VPC\" -> ec2.create_subnet(...)\n\
             - \"Attach internet gateway\" -> ec2.attach_internet_gateway(...)",
        )
    } else if lower.contains("iam") || lower.contains("role") || lower.contains("policy") {
        (
            "IAM",
            "- \"Create IAM user\" -> iam.create_user(...)\n\
             - \"Attach policy to user\" -> iam.attach_user_policy(...)\n\
             - \"Create IAM role\" -> iam.create_role(...)",
        )
    } else {
        (
            "AWS",
            "Handle requests involving multiple AWS services:\n\
             - Web application deployments (EC2 + RDS + S3)\n\
             - Serverless architectures (Lambda + API Gateway + DynamoDB)",
        )
    };

    format!(
        r#"You are an {service} infrastructure assistant. Convert natural language into AWS SDK calls.
Only generate code, no explanations or text.

User request:
"{input}"

Examples:
{examples}
"#,
        service = service,
        input = user_input,
        examples = examples,
    )
}
