//! Prints the CRD manifests as a multi-document YAML stream.
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd/odigos.yaml`

use crds::{CollectorsGroup, Destination};
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let manifests = [
        serde_yaml::to_string(&Destination::crd())?,
        serde_yaml::to_string(&CollectorsGroup::crd())?,
    ];

    for manifest in manifests {
        println!("---");
        print!("{manifest}");
    }

    Ok(())
}
