pub mod managed_deployment;
