use kube::core::CustomResourceExt;
use managed_deployment_operator::crd::managed_deployment::ManagedDeployment;

fn main() {
    let crd = ManagedDeployment::crd();
    let yaml = serde_yaml::to_string(&crd).expect("serialize CRD to YAML");
    println!("{}", yaml);
}
