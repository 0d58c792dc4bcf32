//! SM-010: RDS database fragment.
//!
//! A self-contained stack: its own VPC, two subnets across availability
//! zones (the subnet-group minimum), a security group opening only the
//! engine's port inside the VPC, and the instance itself.
//!
//! The master password is the fixed placeholder `changeme123!`, emitted
//! deliberately so generated configs are inert until an operator replaces
//! it. Secret management is out of scope here.

use crate::core::types::{sanitize_label, RdsSpec};

/// Fixed engine version table. Unrecognized engines get the mysql defaults
/// instead of an error, matching the permissive resolution front-end.
pub fn engine_version(engine: &str) -> &'static str {
    match engine {
        "mysql" => "8.0",
        "postgres" => "13.7",
        "mariadb" => "10.6",
        "oracle-ee" => "19.0.0.0.ru-2022-01.rur-2022-01.r1",
        "sqlserver-ex" => "15.00.4153.1.v1",
        _ => "8.0",
    }
}

/// Port the engine listens on; same fallback policy as `engine_version`.
pub fn engine_port(engine: &str) -> u16 {
    match engine {
        "mysql" | "mariadb" => 3306,
        "postgres" => 5432,
        "oracle-ee" => 1521,
        "sqlserver-ex" => 1433,
        _ => 3306,
    }
}

/// Full database stack for one RDS instance.
pub fn database_config(spec: &RdsSpec) -> String {
    let label = sanitize_label(&spec.db_name);
    let port = engine_port(&spec.engine);
    let version = engine_version(&spec.engine);

    format!(
        r#"provider "aws" {{
  region = "{region}"
}}

resource "aws_vpc" "rds_vpc" {{
  cidr_block           = "10.0.0.0/16"
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = {{
    Name = "RDSVPC"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

resource "aws_subnet" "rds_subnet_a" {{
  vpc_id            = aws_vpc.rds_vpc.id
  cidr_block        = "10.0.1.0/24"
  availability_zone = "{region}a"

  tags = {{
    Name = "RDSSubnetA"
  }}
}}

resource "aws_subnet" "rds_subnet_b" {{
  vpc_id            = aws_vpc.rds_vpc.id
  cidr_block        = "10.0.2.0/24"
  availability_zone = "{region}b"

  tags = {{
    Name = "RDSSubnetB"
  }}
}}

resource "aws_db_subnet_group" "{label}_subnet_group" {{
  name       = "{label}-subnet-group"
  subnet_ids = [aws_subnet.rds_subnet_a.id, aws_subnet.rds_subnet_b.id]

  tags = {{
    Name = "RDSSubnetGroup"
  }}
}}

resource "aws_security_group" "rds_sg" {{
  name        = "rds_sg"
  description = "Security group for RDS"
  vpc_id      = aws_vpc.rds_vpc.id

  ingress {{
    from_port   = {port}
    to_port     = {port}
    protocol    = "tcp"
    cidr_blocks = ["10.0.0.0/16"]
    description = "Database access from within the VPC"
  }}

  egress {{
    from_port   = 0
    to_port     = 0
    protocol    = "-1"
    cidr_blocks = ["0.0.0.0/0"]
  }}

  tags = {{
    Name = "RDSSG"
  }}
}}

resource "aws_db_instance" "{label}" {{
  identifier             = "{db_name}-instance"
  allocated_storage      = 20
  storage_type           = "gp2"
  db_name                = "{db_name}"
  engine                 = "{engine}"
  engine_version         = "{version}"
  instance_class         = "{db_instance_class}"
  username               = "admin"
  password               = "changeme123!" # placeholder - not suitable for production
  db_subnet_group_name   = aws_db_subnet_group.{label}_subnet_group.name
  vpc_security_group_ids = [aws_security_group.rds_sg.id]
  backup_retention_period = 7
  backup_window           = "03:00-04:00"
  maintenance_window      = "mon:04:00-mon:05:00"
  skip_final_snapshot    = true

  tags = {{
    Name = "{db_name}"
    Environment = "development"
    ManagedBy = "terraform"
  }}
}}

output "db_endpoint" {{
  description = "Connection endpoint of the database"
  value       = aws_db_instance.{label}.endpoint
}}

output "db_port" {{
  description = "Port the database listens on"
  value       = aws_db_instance.{label}.port
}}
"#,
        region = spec.region,
        label = label,
        db_name = spec.db_name,
        engine = spec.engine,
        version = version,
        db_instance_class = spec.db_instance_class,
        port = port,
    )
}
