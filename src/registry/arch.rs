use crate::operator::PackageDescriptor;

/// Select the package entry matching the cluster architecture.
///
/// An `mcpb` package matches when its identifier contains `linux-{arch}`;
/// any other registry type is treated as architecture-agnostic (§4.1 step 2,
/// §4.3.1 step 3). The first match in declaration order wins.
pub fn select_package_for_arch<'a>(
    packages: &'a [PackageDescriptor],
    arch: &str,
) -> Option<&'a PackageDescriptor> {
    let marker = format!("linux-{arch}");
    packages.iter().find(|package| {
        if package.registry_type == "mcpb" {
            package.identifier.contains(&marker)
        } else {
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(registry_type: &str, identifier: &str) -> PackageDescriptor {
        PackageDescriptor {
            registry_type: registry_type.to_string(),
            identifier: identifier.to_string(),
            version: None,
            sha256: None,
            runtime_arguments: Vec::new(),
            environment_variables: Vec::new(),
            transport: None,
        }
    }

    #[test]
    fn test_select_mcpb_package_for_matching_arch() {
        let packages = vec![
            package("mcpb", "https://example.com/tool-linux-arm64.mcpb"),
            package("mcpb", "https://example.com/tool-linux-amd64.mcpb"),
        ];
        let selected = select_package_for_arch(&packages, "amd64").unwrap();
        assert!(selected.identifier.contains("linux-amd64"));
    }

    #[test]
    fn test_select_returns_none_on_arch_mismatch() {
        let packages = vec![package("mcpb", "https://example.com/tool-linux-amd64.mcpb")];
        assert!(select_package_for_arch(&packages, "arm64").is_none());
    }

    #[test]
    fn test_select_oci_package_is_arch_agnostic() {
        let packages = vec![package("oci", "org/tool")];
        assert!(select_package_for_arch(&packages, "arm64").is_some());
    }
}
