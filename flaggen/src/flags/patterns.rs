// SPDX-License-Identifier: GPL-3.0-or-later

//! Precompiled matchers used by the scan.
//!
//! All patterns are compiled once, on first use, and shared by every line.

use regex_lite::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Lines matching this are not a genuine compilation of a tracked file:
/// assembler-only invocations, outputs into temporary files, or anything
/// writing to (or reading from) the null device.
static SKIP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-x assembler)|(-o\s+[a-zA-Z0-9._]*\.tmp(\s|$))|(/dev/null)").expect("Invalid skip pattern")
});

/// Flag shapes worth keeping: includes, defines, frameworks, warnings
/// (but not `-Wa,...` and friends) and standard library toggles.
static FLAG_WHITELIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:-[iIDF].*|-W[^,]*|-(?:no)?std(?:lib|inc))$").expect("Invalid whitelist pattern")
});

/// Word size selector, like `-m32` or `-m64`.
static WORD_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-m([0-9]+)$").expect("Invalid word size pattern"));

/// Macro definition with a value.
static MACRO_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-D([a-zA-Z0-9_]+)=(.*)$").expect("Invalid macro pattern"));

/// Paths which should never end up in the output.
static INVALID_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^.*out/.+_intermediates.*$)|(.+/proguard\.flags$)").expect("Invalid path pattern")
});

/// Source files a compilation database entry can be keyed by.
static SOURCE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?:c|cc|cpp|cxx)$").expect("Invalid source file pattern"));

/// Known C/C++ compiler wrapper name patterns.
static COMPILER_WRAPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:distcc|ccache)$").expect("Invalid wrapper pattern"));

/// Known C compiler executable name patterns.
#[rustfmt::skip]
static COMPILER_CC: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(?:[^-]*-)*[mg]cc(?:-?\d+(?:\.\d+){0,2})?$",
        r"^(?:[^-]*-)*clang(?:-\d+(?:\.\d+){0,2})?$",
        r"^i?cc$",
        r"^g?xlc$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid C compiler pattern"))
    .collect()
});

/// Known C++ compiler executable name patterns.
#[rustfmt::skip]
static COMPILER_CXX: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(?:c\+\+|cxx|CC)$",
        r"^(?:[^-]*-)*[mg]\+\+(?:-?\d+(?:\.\d+){0,2})?$",
        r"^(?:[^-]*-)*clang\+\+(?:-\d+(?:\.\d+){0,2})?$",
        r"^icpc$",
        r"^g?xl(?:C|c\+\+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid C++ compiler pattern"))
    .collect()
});

/// Options which take a path as the following token.
pub const PATH_OPTIONS: [&str; 7] = ["-o", "-I", "-isystem", "-iquote", "-include", "-imacros", "-isysroot"];

pub fn is_skipped_line(line: &str) -> bool {
    SKIP_LINE.is_match(line)
}

pub fn is_whitelisted(token: &str) -> bool {
    FLAG_WHITELIST.is_match(token)
}

pub fn is_word_size(token: &str) -> bool {
    WORD_SIZE.is_match(token)
}

/// Returns the numeric width of a word size flag.
///
/// Returns `None` when the token is not a word size flag, or when the width
/// does not fit into an integer.
pub fn word_size(token: &str) -> Option<u32> {
    WORD_SIZE.captures(token).and_then(|captures| captures.get(1)).and_then(|width| width.as_str().parse().ok())
}

/// Splits a `-D<name>=<value>` token into its name and value.
pub fn macro_definition(token: &str) -> Option<(&str, &str)> {
    let captures = MACRO_DEFINITION.captures(token)?;
    let name = captures.get(1)?.as_str();
    let value = captures.get(2)?.as_str();
    Some((name, value))
}

pub fn is_invalid_path(path: &str) -> bool {
    INVALID_PATH.is_match(path)
}

pub fn is_path_option(token: &str) -> bool {
    PATH_OPTIONS.contains(&token)
}

pub fn looks_like_a_source_file(token: &str) -> bool {
    !token.starts_with('-') && SOURCE_FILE.is_match(token)
}

pub fn is_compiler_wrapper(executable: &str) -> bool {
    COMPILER_WRAPPER.is_match(basename(executable))
}

pub fn is_c_compiler(executable: &str) -> bool {
    is_pattern_match(basename(executable), &COMPILER_CC)
}

pub fn is_cxx_compiler(executable: &str) -> bool {
    is_pattern_match(basename(executable), &COMPILER_CXX)
}

/// Match against a list of regex and return true if any of those were match.
fn is_pattern_match(candidate: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(candidate))
}

/// Returns the file name of the given path, or the path itself.
fn basename(file: &str) -> &str {
    Path::new(file).file_name().and_then(|name| name.to_str()).unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_lines() {
        assert!(is_skipped_line("gcc -x assembler-with-cpp -c start.S"));
        assert!(is_skipped_line("cc1 -Wall -DFOO=1 -Iinclude -o tmp.tmp file.c"));
        assert!(is_skipped_line("gcc -E -o a.tmp conftest.c"));
        assert!(is_skipped_line("gcc -c conftest.c -o /dev/null"));
        assert!(is_skipped_line("echo x > /dev/null"));

        assert!(!is_skipped_line("gcc -c main.c -o main.o"));
        assert!(!is_skipped_line("gcc -c main.c -o out/main.tmpl.o"));
        assert!(!is_skipped_line("gcc -Iinc main.c -o main.o"));
    }

    #[test]
    fn test_whitelist() {
        for flag in [
            "-I", "-Iinclude", "-isystem", "-iquote", "-include", "-DFOO", "-DFOO=1", "-F/Library", "-Wall",
            "-Werror=format", "-nostdlib", "-stdlib", "-nostdinc", "-stdinc",
        ] {
            assert!(is_whitelisted(flag), "{flag} should be whitelisted");
        }

        for flag in ["-Wa,--noexecstack", "-Wl,-z", "-o", "-c", "-O2", "-std=c99", "-m64", "-g", "-stdlib=libc++"] {
            assert!(!is_whitelisted(flag), "{flag} should not be whitelisted");
        }
    }

    #[test]
    fn test_word_size() {
        assert!(is_word_size("-m32"));
        assert!(is_word_size("-m64"));
        assert!(!is_word_size("-march=armv7"));
        assert!(!is_word_size("-m"));

        assert_eq!(word_size("-m32"), Some(32));
        assert_eq!(word_size("-m128"), Some(128));
        assert_eq!(word_size("-mthumb"), None);
        assert_eq!(word_size("-m99999999999999999999"), None);
    }

    #[test]
    fn test_macro_definition() {
        assert_eq!(macro_definition("-DFOO=1"), Some(("FOO", "1")));
        assert_eq!(macro_definition("-DFOO="), Some(("FOO", "")));
        assert_eq!(macro_definition("-DNAME='\"a b\"'"), Some(("NAME", "'\"a b\"'")));
        assert_eq!(macro_definition("-DFOO"), None);
        assert_eq!(macro_definition("-I/usr/include"), None);
    }

    #[test]
    fn test_invalid_paths() {
        assert!(is_invalid_path("/aosp/out/target/product/generic/obj/SHARED_LIBRARIES/libc_intermediates"));
        assert!(is_invalid_path("/aosp/out/target/obj/STATIC_LIBRARIES/libz_intermediates/include"));
        assert!(is_invalid_path("/aosp/frameworks/base/proguard.flags"));

        assert!(!is_invalid_path("/aosp/bionic/libc/include"));
        assert!(!is_invalid_path("/aosp/out/include"));
        assert!(!is_invalid_path("proguard.flags"));
    }

    #[test]
    fn test_source_files() {
        assert!(looks_like_a_source_file("main.c"));
        assert!(looks_like_a_source_file("src/main.cc"));
        assert!(looks_like_a_source_file("main.cpp"));
        assert!(looks_like_a_source_file("main.cxx"));

        assert!(!looks_like_a_source_file("main.o"));
        assert!(!looks_like_a_source_file("main.h"));
        assert!(!looks_like_a_source_file("main.S"));
        assert!(!looks_like_a_source_file("-Dmain.c"));
    }

    #[test]
    fn test_compiler_recognition() {
        assert!(is_c_compiler("gcc"));
        assert!(is_c_compiler("cc"));
        assert!(is_c_compiler("/usr/bin/gcc-11"));
        assert!(is_c_compiler("prebuilts/gcc/linux-x86/arm/arm-linux-androideabi-4.9/bin/arm-linux-androideabi-gcc"));
        assert!(is_c_compiler("prebuilts/clang/host/linux-x86/clang-2690385/bin/clang"));

        assert!(is_cxx_compiler("g++"));
        assert!(is_cxx_compiler("c++"));
        assert!(is_cxx_compiler("/usr/bin/clang++-15"));
        assert!(is_cxx_compiler("aarch64-linux-android-g++"));

        assert!(!is_c_compiler("g++"));
        assert!(!is_c_compiler("ar"));
        assert!(!is_c_compiler("cc1"));
        assert!(!is_cxx_compiler("gcc"));
        assert!(!is_cxx_compiler("ld"));
    }

    #[test]
    fn test_compiler_wrappers() {
        assert!(is_compiler_wrapper("ccache"));
        assert!(is_compiler_wrapper("prebuilts/misc/linux-x86/ccache/ccache"));
        assert!(is_compiler_wrapper("distcc"));
        assert!(!is_compiler_wrapper("gcc"));
    }
}
