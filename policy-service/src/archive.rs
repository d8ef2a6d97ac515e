//! Bundle blob assembly: a gzipped tar of the included policy modules plus
//! a manifest describing them.

use flate2::write::GzEncoder;
use flate2::Compression;
use shared::domain::entities::{Policy, PolicyType};
use shared::{AppError, AppResult};
use uuid::Uuid;

fn module_file_name(policy: &Policy) -> String {
    let extension = match policy.policy_type {
        PolicyType::Rego => "rego",
        PolicyType::Json => "json",
        PolicyType::Wasm => "wasm",
    };
    format!("{}.{}", policy.name, extension)
}

fn append_file(
    builder: &mut tar::Builder<GzEncoder<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
) -> AppResult<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, name, bytes)
        .map_err(|e| AppError::BundleBuildFailed(format!("archive: {}", e)))
}

/// Serialise the included policies into a tar.gz blob.
pub fn build(bundle_id: Uuid, policies: &[Policy]) -> AppResult<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let manifest = serde_json::json!({
        "bundleId": bundle_id,
        "policies": policies
            .iter()
            .map(|p| serde_json::json!({
                "id": p.id,
                "name": p.name,
                "path": p.path,
                "version": p.version,
            }))
            .collect::<Vec<_>>(),
    });
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;
    append_file(&mut builder, "manifest.json", &manifest_bytes)?;

    for policy in policies {
        append_file(&mut builder, &module_file_name(policy), policy.content.as_bytes())?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| AppError::BundleBuildFailed(format!("archive: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| AppError::BundleBuildFailed(format!("archive: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn policy(name: &str) -> Policy {
        let mut policy = Policy::new(
            Uuid::new_v4(),
            name.to_string(),
            None,
            PolicyType::Rego,
            format!("package {}\n\ndefault allow = false\n", name),
        );
        policy.publish(Uuid::new_v4());
        policy
    }

    #[test]
    fn archive_contains_manifest_and_modules() {
        let bundle_id = Uuid::new_v4();
        let policies = vec![policy("alpha"), policy("beta")];
        let blob = build(bundle_id, &policies).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(&blob[..]));
        let mut names = Vec::new();
        let mut manifest = String::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().to_string();
            if path == "manifest.json" {
                entry.read_to_string(&mut manifest).unwrap();
            }
            names.push(path);
        }
        names.sort();
        assert_eq!(names, vec!["alpha.rego", "beta.rego", "manifest.json"]);

        let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(manifest["bundleId"], serde_json::json!(bundle_id));
        assert_eq!(manifest["policies"].as_array().unwrap().len(), 2);
    }
}
