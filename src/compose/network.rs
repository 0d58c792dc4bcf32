//! SM-007: Shared network fragment — VPC, public subnet, routing, and the
//! default security group.
//!
//! Referenced symbolically by the compute fragment (`aws_subnet.default.id`,
//! `aws_security_group.default.id`) so the two stay valid together without
//! resolved identifiers.

/// Default VPC stack with one public subnet in `<region>a`.
///
/// SSH ingress is restricted to `var.allowed_ssh_cidrs`; HTTP/HTTPS are open
/// to the world and egress is unrestricted. That permissive posture is a
/// documented development default, surfaced to callers rather than hidden.
pub fn vpc_stack(region: &str) -> String {
    format!(
        r#"resource "aws_vpc" "default" {{
  cidr_block           = "10.0.0.0/16"
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = {{
    Name = "DefaultVPC"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

resource "aws_subnet" "default" {{
  vpc_id                  = aws_vpc.default.id
  cidr_block              = "10.0.1.0/24"
  availability_zone       = "{region}a"
  map_public_ip_on_launch = true

  tags = {{
    Name = "DefaultSubnet"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

resource "aws_internet_gateway" "default" {{
  vpc_id = aws_vpc.default.id

  tags = {{
    Name = "DefaultIGW"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

resource "aws_route_table" "default" {{
  vpc_id = aws_vpc.default.id

  route {{
    cidr_block = "0.0.0.0/0"
    gateway_id = aws_internet_gateway.default.id
  }}

  tags = {{
    Name = "DefaultRouteTable"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

resource "aws_route_table_association" "default" {{
  subnet_id      = aws_subnet.default.id
  route_table_id = aws_route_table.default.id
}}

resource "aws_security_group" "default" {{
  name        = "default_sg"
  description = "Default security group"
  vpc_id      = aws_vpc.default.id

  ingress {{
    from_port   = 22
    to_port     = 22
    protocol    = "tcp"
    cidr_blocks = ["${{var.allowed_ssh_cidrs}}"]
    description = "SSH access"
  }}

  ingress {{
    from_port   = 80
    to_port     = 80
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
    description = "HTTP access"
  }}

  ingress {{
    from_port   = 443
    to_port     = 443
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
    description = "HTTPS access"
  }}

  egress {{
    from_port   = 0
    to_port     = 0
    protocol    = "-1"
    cidr_blocks = ["0.0.0.0/0"]
    description = "All outbound traffic"
  }}

  tags = {{
    Name = "DefaultSG"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

variable "allowed_ssh_cidrs" {{
  description = "CIDR blocks allowed for SSH access"
  type        = string
  default     = "10.0.0.0/8"
}}

output "vpc_id" {{
  description = "ID of the VPC"
  value       = aws_vpc.default.id
}}

output "subnet_id" {{
  description = "ID of the subnet"
  value       = aws_subnet.default.id
}}

output "security_group_id" {{
  description = "ID of the security group"
  value       = aws_security_group.default.id
}}
"#,
        region = region
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sm007_vpc_stack_region_az() {
        let stack = vpc_stack("us-east-1");
        assert!(stack.contains("availability_zone       = \"us-east-1a\""));
    }

    #[test]
    fn test_sm007_ssh_restricted_to_variable() {
        let stack = vpc_stack("ap-south-1");
        assert!(stack.contains("cidr_blocks = [\"${var.allowed_ssh_cidrs}\"]"));
        assert!(stack.contains("variable \"allowed_ssh_cidrs\""));
    }

    #[test]
    fn test_sm007_http_https_open_egress_all() {
        let stack = vpc_stack("ap-south-1");
        assert!(stack.contains("from_port   = 80"));
        assert!(stack.contains("from_port   = 443"));
        assert!(stack.contains("protocol    = \"-1\""));
    }

    #[test]
    fn test_sm007_balanced_braces() {
        let stack = vpc_stack("eu-west-2");
        assert_eq!(stack.matches('{').count(), stack.matches('}').count());
    }

    #[test]
    fn test_sm007_symbolic_outputs() {
        let stack = vpc_stack("ap-south-1");
        assert!(stack.contains("value       = aws_subnet.default.id"));
        assert!(stack.contains("value       = aws_security_group.default.id"));
    }
}
