//! Fixed shape of the API description and the generated client tree.

use std::path::{Path, PathBuf};

/// Path parameter value the client generator substitutes in its tests
pub const TEST_PATH_VALUE: &str = "testString";

/// Where generic tool operations live and where generated files land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLayout {
    /// Collection path of the generic tool operations
    pub tools_path: String,
    /// Go package of the generated SDK and command plugin
    pub sdk_package: String,
}

impl GeneratedLayout {
    pub fn new(tools_path: impl Into<String>, sdk_package: impl Into<String>) -> Self {
        Self {
            tools_path: tools_path.into().trim_end_matches('/').to_string(),
            sdk_package: sdk_package.into(),
        }
    }

    /// Path of the generic update-by-id operation
    pub fn tools_by_id_path(&self) -> String {
        format!("{}/{{tool_id}}", self.tools_path)
    }

    /// Collection path registered for one service
    pub fn service_path(&self, service_id: &str) -> String {
        format!("{}/{service_id}", self.tools_path)
    }

    /// Resource path registered for one service
    pub fn service_by_id_path(&self, service_id: &str) -> String {
        format!("{}/{service_id}/{{tool_id}}", self.tools_path)
    }

    /// Tools collection path as it appears in generated tests,
    /// with every `{param}` replaced by the generator's test value
    pub fn test_tools_path(&self) -> String {
        let mut out = String::with_capacity(self.tools_path.len());
        let mut rest = self.tools_path.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            match rest[open..].find('}') {
                Some(close) => {
                    out.push_str(TEST_PATH_VALUE);
                    rest = &rest[open + close + 1..];
                }
                None => {
                    rest = &rest[open..];
                    break;
                }
            }
        }
        out.push_str(rest);
        out
    }

    pub fn commands_file(&self, root: &Path) -> PathBuf {
        root.join("plugin")
            .join("commands")
            .join(&self.sdk_package)
            .join("commands.go")
    }

    pub fn mock_senders_file(&self, root: &Path) -> PathBuf {
        root.join("plugin")
            .join("commands")
            .join(&self.sdk_package)
            .join("mock_senders_for_test.go")
    }

    pub fn main_test_file(&self, root: &Path) -> PathBuf {
        root.join("main_test.go")
    }

    /// Every file the client generator must produce before patching
    pub fn generated_files(&self, root: &Path) -> Vec<PathBuf> {
        vec![
            self.commands_file(root),
            self.mock_senders_file(root),
            self.main_test_file(root),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GeneratedLayout {
        GeneratedLayout::new("/toolchains/{toolchain_id}/tools/", "cdtoolchainv2")
    }

    #[test]
    fn service_paths() {
        let layout = layout();
        assert_eq!(layout.tools_by_id_path(), "/toolchains/{toolchain_id}/tools/{tool_id}");
        assert_eq!(
            layout.service_path("my_service"),
            "/toolchains/{toolchain_id}/tools/my_service"
        );
        assert_eq!(
            layout.service_by_id_path("my_service"),
            "/toolchains/{toolchain_id}/tools/my_service/{tool_id}"
        );
    }

    #[test]
    fn test_path_substitutes_parameters() {
        assert_eq!(layout().test_tools_path(), "/toolchains/testString/tools");
        assert_eq!(
            GeneratedLayout::new("/a/{b}/c/{d}", "pkg").test_tools_path(),
            "/a/testString/c/testString"
        );
        assert_eq!(GeneratedLayout::new("/a/{broken", "pkg").test_tools_path(), "/a/{broken");
    }

    #[test]
    fn generated_file_locations() {
        let root = Path::new("/out");
        let layout = layout();
        assert_eq!(
            layout.commands_file(root),
            Path::new("/out/plugin/commands/cdtoolchainv2/commands.go")
        );
        assert_eq!(
            layout.mock_senders_file(root),
            Path::new("/out/plugin/commands/cdtoolchainv2/mock_senders_for_test.go")
        );
        assert_eq!(layout.main_test_file(root), Path::new("/out/main_test.go"));
        assert_eq!(layout.generated_files(root).len(), 3);
    }
}
