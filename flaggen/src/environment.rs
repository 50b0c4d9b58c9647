// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment variables which influence what the build tool prints.

use std::collections::HashSet;
use std::sync::LazyLock;

// man page for `exec` (Linux system call)
pub const KEY_OS__PATH: &str = "PATH";

// https://gcc.gnu.org/onlinedocs/cpp/Environment-Variables.html
pub const KEY_GCC__C_INCLUDE_1: &str = "CPATH";
pub const KEY_GCC__C_INCLUDE_2: &str = "C_INCLUDE_PATH";
pub const KEY_GCC__C_INCLUDE_3: &str = "CPLUS_INCLUDE_PATH";

// https://www.gnu.org/software/make/manual/html_node/Implicit-Variables.html
pub const KEY_MAKE__C_COMPILER: &str = "CC";
pub const KEY_MAKE__CXX_COMPILER: &str = "CXX";
pub const KEY_MAKE__C_PREPROCESSOR: &str = "CPP";
pub const KEY_MAKE__ASSEMBLER: &str = "AS";

pub const KEY_MAKE__C_FLAGS: &str = "CFLAGS";
pub const KEY_MAKE__CXX_FLAGS: &str = "CXXFLAGS";
pub const KEY_MAKE__C_PREPROCESSOR_FLAGS: &str = "CPPFLAGS";

// https://www.gnu.org/software/make/manual/html_node/Options_002fRecursion.html
pub const KEY_MAKE__FLAGS: &str = "MAKEFLAGS";

// Set by `build/envsetup.sh` and `lunch` in the Android source tree.
pub const KEY_ANDROID__BUILD_TOP: &str = "ANDROID_BUILD_TOP";
pub const KEY_ANDROID__PRODUCT: &str = "TARGET_PRODUCT";
pub const KEY_ANDROID__VARIANT: &str = "TARGET_BUILD_VARIANT";
pub const KEY_ANDROID__OUT_DIR: &str = "OUT_DIR";

// https://ccache.dev/manual/latest.html#_configuration
pub const KEY_CCACHE__ENABLED: &str = "USE_CCACHE";
pub const KEY_CCACHE__DIRECTORY: &str = "CCACHE_DIR";

static MAKE_KEYS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        KEY_MAKE__C_COMPILER,
        KEY_MAKE__CXX_COMPILER,
        KEY_MAKE__C_PREPROCESSOR,
        KEY_MAKE__ASSEMBLER,
        KEY_MAKE__C_FLAGS,
        KEY_MAKE__CXX_FLAGS,
        KEY_MAKE__C_PREPROCESSOR_FLAGS,
        KEY_MAKE__FLAGS,
    ]
    .iter()
    .cloned()
    .collect()
});

static GCC_INCLUDE_KEYS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [KEY_GCC__C_INCLUDE_1, KEY_GCC__C_INCLUDE_2, KEY_GCC__C_INCLUDE_3].iter().cloned().collect()
});

static ANDROID_KEYS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        KEY_ANDROID__BUILD_TOP,
        KEY_ANDROID__PRODUCT,
        KEY_ANDROID__VARIANT,
        KEY_ANDROID__OUT_DIR,
        KEY_CCACHE__ENABLED,
        KEY_CCACHE__DIRECTORY,
    ]
    .iter()
    .cloned()
    .collect()
});

pub fn relevant_env(key: &str) -> bool {
    MAKE_KEYS.contains(key)
        || GCC_INCLUDE_KEYS.contains(key)
        || ANDROID_KEYS.contains(key)
        || key.to_uppercase() == KEY_OS__PATH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_env() {
        assert!(relevant_env("CC"));
        assert!(relevant_env("CXXFLAGS"));
        assert!(relevant_env("MAKEFLAGS"));
        assert!(relevant_env("CPATH"));
        assert!(relevant_env("TARGET_PRODUCT"));
        assert!(relevant_env("USE_CCACHE"));
        assert!(relevant_env("PATH"));
        assert!(relevant_env("Path"));

        assert!(!relevant_env("HOME"));
        assert!(!relevant_env("RUSTFLAGS"));
    }
}
